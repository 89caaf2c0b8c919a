use regex::Regex;
use serde::Serialize;

use batas_config::ListQuery;
use batas_domain::{EntrySummary, ListTopic, is_follow_up};

use crate::EntryStore;

/// A canned or aggregated answer that bypasses retrieval. `skip_rag: false`
/// tells the caller to fall through to normal retrieval instead.
#[derive(Debug, Clone, Serialize)]
pub struct DirectAnswer {
	pub answer: String,
	pub sources: Vec<EntrySummary>,
	pub skip_rag: bool,
}

/// Outcome of follow-up rewriting: either the query untouched, a synthetic
/// list request, or the previous question carried along as context.
#[derive(Debug, Clone)]
pub struct FollowUpRewrite {
	pub query: String,
	pub is_list: bool,
	pub context_added: bool,
}

const META_CAPABILITIES: &str = "I can answer questions about Philippine law: statutes, rules of \
court, agency circulars, traffic rules, constitutional provisions, and practical checklists. Ask \
me to explain a provision, walk through a procedure, or list laws on a topic.";
const META_IDENTITY: &str = "I'm Batas, a legal research assistant for Philippine law. I search a \
curated library of statutes, rules, and advisories, and I always cite the entries my answers come \
from. I'm not a lawyer, and nothing I say is legal advice.";
const META_HELP: &str = "Ask me a legal question in plain language — for example \"What is \
estafa?\", \"How do I file a small claims case?\", or \"list 5 republic acts about labor\". I'll \
cite the legal entries behind every answer.";

/// Answers a meta question with one of three canned responses. Never
/// touches retrieval.
pub fn meta_answer(query: &str) -> DirectAnswer {
	let answer = if matches_pattern(query, r"(?i)\bwhat\s+can\s+you\s+(do|answer|help)\b") {
		META_CAPABILITIES
	} else if matches_pattern(query, r"(?i)\bwho\s+(are|made|built)\s+you\b|\bwhat\s+(are|is)\s+(you|this)\b")
	{
		META_IDENTITY
	} else {
		META_HELP
	};

	DirectAnswer { answer: answer.to_string(), sources: Vec::new(), skip_rag: true }
}

/// Answers a list query from one aggregate store sample. Zero rows or a
/// store failure return `skip_rag: false` so the caller falls back to
/// normal retrieval; this path is a safe fallback, not an error surface.
pub async fn list_answer(store: &dyn EntryStore, cfg: &ListQuery, query: &str) -> DirectAnswer {
	let count = parse_requested_count(query, cfg);
	let topic = ListTopic::parse(query);
	let rows = match store.sample_entries(topic, count).await {
		Ok(rows) => rows,
		Err(err) => {
			tracing::warn!(stage = "list", error = %err, "List sample failed; falling back to retrieval.");

			return fall_through();
		},
	};

	if rows.is_empty() {
		return fall_through();
	}

	let mut answer = format!("Here are {} {}:\n", rows.len(), topic.label());

	for (index, row) in rows.iter().enumerate() {
		answer.push_str(&format!("\n{}. **{}**", index + 1, row.title));

		if let Some(citation) = row.canonical_citation.as_deref().filter(|c| !c.trim().is_empty())
		{
			answer.push_str(&format!(" \u{2014} {citation}"));
		}
		if let Some(summary) = row.summary.as_deref().filter(|s| !s.trim().is_empty()) {
			answer.push_str(&format!("\n   {summary}"));
		}
	}

	DirectAnswer { answer, sources: rows, skip_rag: true }
}

fn fall_through() -> DirectAnswer {
	DirectAnswer { answer: String::new(), sources: Vec::new(), skip_rag: false }
}

/// Requested item count from the query text: default 5, hard cap 20 (both
/// configurable).
pub fn parse_requested_count(query: &str, cfg: &ListQuery) -> u32 {
	let count = Regex::new(r"\b(\d{1,3})\b")
		.ok()
		.and_then(|re| re.captures(query))
		.and_then(|caps| caps.get(1))
		.and_then(|m| m.as_str().parse::<u32>().ok())
		.unwrap_or(cfg.default_count);

	count.clamp(1, cfg.max_count)
}

/// Rewrites a follow-up fragment against the previous question. Queries
/// outside the closed set of follow-up leads come back unchanged.
pub fn follow_up_rewrite(query: &str, previous: Option<&str>) -> FollowUpRewrite {
	if !is_follow_up(query) {
		return FollowUpRewrite { query: query.to_string(), is_list: false, context_added: false };
	}

	let Some(previous) = previous.map(str::trim).filter(|prev| !prev.is_empty()) else {
		return FollowUpRewrite { query: query.to_string(), is_list: false, context_added: false };
	};

	// "another 5" inherits the topical domain of the previous question and
	// becomes a synthetic list request.
	if let Some(count) = parse_numbered_follow_up(query) {
		let topic = ListTopic::parse(previous);

		return FollowUpRewrite {
			query: format!("list {count} {}", topic.label()),
			is_list: true,
			context_added: false,
		};
	}

	FollowUpRewrite {
		query: format!("{previous} \u{2014} follow-up: {query}"),
		is_list: false,
		context_added: true,
	}
}

fn parse_numbered_follow_up(query: &str) -> Option<u32> {
	let re = Regex::new(r"(?i)^\s*(another|more|give\s+me)\s+(\d{1,3})\b").ok()?;
	let caps = re.captures(query)?;

	caps.get(2)?.as_str().parse().ok()
}

fn matches_pattern(query: &str, pattern: &str) -> bool {
	Regex::new(pattern).map(|re| re.is_match(query)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn list_cfg() -> ListQuery {
		ListQuery { default_count: 5, max_count: 20 }
	}

	#[test]
	fn meta_answers_are_canned_and_skip_retrieval() {
		let capabilities = meta_answer("What can you do?");
		let identity = meta_answer("who are you");
		let help = meta_answer("hello");

		for answer in [&capabilities, &identity, &help] {
			assert!(answer.skip_rag);
			assert!(answer.sources.is_empty());
			assert!(!answer.answer.is_empty());
		}
		assert_ne!(capabilities.answer, identity.answer);
		assert_ne!(identity.answer, help.answer);
	}

	#[test]
	fn requested_count_defaults_and_caps() {
		let cfg = list_cfg();

		assert_eq!(parse_requested_count("list republic acts", &cfg), 5);
		assert_eq!(parse_requested_count("list 3 republic acts", &cfg), 3);
		assert_eq!(parse_requested_count("list 100 republic acts", &cfg), 20);
	}

	#[test]
	fn non_follow_up_queries_pass_through_unchanged() {
		let rewrite = follow_up_rewrite("What is estafa?", Some("What is theft?"));

		assert_eq!(rewrite.query, "What is estafa?");
		assert!(!rewrite.is_list);
		assert!(!rewrite.context_added);
	}

	#[test]
	fn numbered_follow_up_becomes_a_list_request() {
		let rewrite =
			follow_up_rewrite("another 5", Some("What crimes are in the penal code?"));

		assert!(rewrite.is_list);
		assert_eq!(rewrite.query, "list 5 penal code provisions");
	}

	#[test]
	fn plain_follow_up_carries_previous_context() {
		let rewrite = follow_up_rewrite("what about minors?", Some("What is the penalty for theft?"));

		assert!(rewrite.context_added);
		assert!(rewrite.query.contains("What is the penalty for theft?"));
		assert!(rewrite.query.contains("what about minors?"));
	}

	#[test]
	fn follow_up_without_previous_context_is_unchanged() {
		let rewrite = follow_up_rewrite("what about minors?", None);

		assert_eq!(rewrite.query, "what about minors?");
		assert!(!rewrite.context_added);
	}
}
