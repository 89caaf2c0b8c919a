use serde_json::Value;
use tracing::warn;

use batas_domain::{StructuredQuery, coerce_structured_query, fallback_structured_query};

use crate::{CacheKind, Pipeline};

impl Pipeline {
	/// Expands a raw question into a structured retrieval query. Always
	/// resolves: model output is coerced field by field, and any model or
	/// parse failure falls back to the deterministic heuristic. Only
	/// validated model output enters the cache, so a transient outage does
	/// not pin degraded expansions for a TTL.
	pub async fn structured_query(&self, question: &str) -> StructuredQuery {
		let key = question.trim();

		if let Some(cached) = self.caches.sqg.get(key) {
			self.metrics.record_cache_hit(CacheKind::Sqg);

			return cached;
		}

		self.metrics.record_cache_miss(CacheKind::Sqg);

		let messages = build_sqg_messages(question, &self.cfg.retrieval.jurisdiction);
		let chat_cfg = &self.cfg.providers.chat;
		let raw = match self.providers.chat.complete(chat_cfg, &chat_cfg.model, &messages).await {
			Ok(value) => value,
			Err(err) => {
				warn!(stage = "sqg", error = %err, "Structured query generation failed; using heuristic fallback.");

				return fallback_structured_query(question);
			},
		};
		let structured = coerce_structured_query(question, raw);

		self.caches.sqg.insert(key, structured.clone());

		structured
	}
}

pub(crate) fn build_sqg_messages(question: &str, jurisdiction: &str) -> Vec<Value> {
	let schema = serde_json::json!({
		"normalized_question": "string",
		"keywords": ["string"],
		"legal_topics": ["string"],
		"statutes_referenced": ["string"],
		"jurisdiction": "string",
		"temporal_scope": "string or null",
		"related_terms": ["string"],
		"urgency": "low | medium | high",
		"query_expansions": ["string"]
	});
	let schema_text = serde_json::to_string_pretty(&schema)
		.unwrap_or_else(|_| "{}".to_string());
	let example = serde_json::json!({
		"normalized_question": "What are the requirements for filing a small claims case?",
		"keywords": ["small claims", "filing", "requirements"],
		"legal_topics": ["civil procedure"],
		"statutes_referenced": ["A.M. No. 08-8-7-SC"],
		"jurisdiction": "Philippines",
		"temporal_scope": null,
		"related_terms": ["money claims", "statement of claim"],
		"urgency": "medium",
		"query_expansions": ["small claims court filing steps", "requirements to sue in small claims"]
	});
	let example_text = serde_json::to_string_pretty(&example)
		.unwrap_or_else(|_| "{}".to_string());
	let system_prompt = "You are a structured query generator for a Philippine legal retrieval \
system. Output must be valid JSON only and must match the provided schema exactly. Normalize the \
question, extract retrieval keywords, name any statutes referenced, and rate urgency. Do not add \
explanations or extra fields.";
	let user_prompt = format!(
		"Return JSON matching this exact schema:\n{schema}\n\nWorked example for \"how do I file a \
small claims case?\":\n{example}\n\nDefault jurisdiction: {jurisdiction}\n\nQuestion:\n{question}",
		schema = schema_text,
		example = example_text,
		jurisdiction = jurisdiction,
		question = question
	);

	vec![
		serde_json::json!({ "role": "system", "content": system_prompt }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sqg_messages_carry_schema_and_question() {
		let messages = build_sqg_messages("What is bail?", "Philippines");

		assert_eq!(messages.len(), 2);
		assert_eq!(messages[0]["role"], "system");

		let user = messages[1]["content"].as_str().expect("missing user content");

		assert!(user.contains("query_expansions"));
		assert!(user.contains("Worked example"));
		assert!(user.contains("What is bail?"));
	}
}
