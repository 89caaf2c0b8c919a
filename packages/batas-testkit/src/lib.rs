use uuid::Uuid;

use batas_config::Config;
use batas_domain::{Candidate, EntrySummary};

/// A fully-defaulted config for tests. Every field carries its documented
/// default, so tests override only what they exercise.
pub fn config() -> Config {
	Config::default()
}

/// A config with instrumentation on, for tests asserting counters.
pub fn config_with_metrics() -> Config {
	let mut cfg = Config::default();

	cfg.metrics.enabled = true;

	cfg
}

/// A retrieval candidate with the given similarity; the fused retrieval
/// score starts equal to the similarity, and lexical overlap defaults to
/// the same value.
pub fn candidate(title: &str, similarity: f32) -> Candidate {
	Candidate {
		entry_id: Uuid::new_v4(),
		entry_type: "statute_section".to_string(),
		title: title.to_string(),
		canonical_citation: Some(format!("RA 0000 \u{00a7} {title}")),
		summary: Some(format!("Summary of {title}.")),
		text: None,
		similarity,
		lexical: similarity,
		final_score: similarity,
		cross_score: None,
		llm_score: None,
	}
}

pub fn entry_summary(title: &str) -> EntrySummary {
	EntrySummary {
		entry_id: Uuid::new_v4(),
		entry_type: "statute_section".to_string(),
		title: title.to_string(),
		canonical_citation: Some(format!("RA 0000 \u{00a7} {title}")),
		summary: Some(format!("Summary of {title}.")),
	}
}
