use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use batas_domain::Candidate;

use super::{
	GateDecision, ScoreSlot, blend_scores, gate, min_max_normalize, rerank_cache_key,
	sort_and_truncate, truncate_chars,
};
use crate::{CacheKind, Pipeline};

const CANDIDATE_SUMMARY_MAX_CHARS: usize = 280;

impl Pipeline {
	/// Reranks by asking the remote model to score each candidate. The
	/// high-confidence behavior deliberately differs from the
	/// cross-encoder: above the high threshold this strategy returns the
	/// caller's candidates truncated to `top_n` in their original order,
	/// while the cross-encoder returns `None`.
	pub async fn llm_rerank(
		&self,
		query: &str,
		candidates: &[Candidate],
		confidence: f32,
	) -> Option<Vec<Candidate>> {
		let cfg = &self.cfg.rerank.llm;

		match gate(confidence, cfg.low_confidence, cfg.high_confidence) {
			GateDecision::PassThrough => {
				self.metrics.record_early_termination();

				return Some(candidates.iter().take(cfg.top_n as usize).cloned().collect());
			},
			GateDecision::Skip => {
				self.metrics.record_early_termination();

				return None;
			},
			GateDecision::Score => {},
		}

		// Candidates with no displayable content cannot be meaningfully
		// judged by the model.
		let pool: Vec<Candidate> = candidates
			.iter()
			.filter(|candidate| {
				candidate.similarity >= cfg.min_similarity
					&& candidate.lexical >= cfg.min_lexical
					&& candidate.content().is_some()
			})
			.take(cfg.max_candidates as usize)
			.cloned()
			.collect();

		if pool.is_empty() {
			return None;
		}

		let ids: Vec<Uuid> = pool.iter().map(|candidate| candidate.entry_id).collect();
		let cache_key = match rerank_cache_key("llm", query, &ids) {
			Ok(key) => Some(key),
			Err(err) => {
				warn!(stage = "llm_rerank", error = %err, "Cache key build failed.");

				None
			},
		};
		let scores = match cache_key.as_ref().and_then(|key| self.caches.llm_rerank.get(key)) {
			Some(cached) => {
				self.metrics.record_cache_hit(CacheKind::LlmRerank);

				cached
			},
			None => {
				self.metrics.record_cache_miss(CacheKind::LlmRerank);

				let scored = self.judge_pool(query, &pool, &ids, confidence).await?;

				if let Some(key) = cache_key.as_ref() {
					self.caches.llm_rerank.insert(key, scored.clone());
				}

				scored
			},
		};
		let mut pool = pool;

		blend_scores(&mut pool, &scores, cfg.blend_weight, ScoreSlot::Llm);

		Some(sort_and_truncate(pool, cfg.top_n as usize))
	}

	async fn judge_pool(
		&self,
		query: &str,
		pool: &[Candidate],
		ids: &[Uuid],
		confidence: f32,
	) -> Option<HashMap<Uuid, f32>> {
		let cfg = &self.cfg.rerank.llm;
		let chat_cfg = &self.cfg.providers.chat;
		// Queries near the low-confidence boundary escalate to the strong
		// model variant; the system is already uncertain there.
		let model = if confidence < cfg.low_confidence + cfg.escalation_margin {
			chat_cfg.strong_model.as_str()
		} else {
			chat_cfg.model.as_str()
		};
		let messages = build_rerank_messages(query, pool);
		let raw = match self.providers.chat.complete(chat_cfg, model, &messages).await {
			Ok(value) => value,
			Err(err) => {
				warn!(stage = "llm_rerank", error = %err, "LLM rerank call failed; keeping retrieval order.");

				return None;
			},
		};
		let Some(votes) = parse_rerank_votes(raw) else {
			warn!(stage = "llm_rerank", "LLM rerank returned an unusable payload; keeping retrieval order.");

			return None;
		};
		let by_id: HashMap<Uuid, f32> = votes.into_iter().collect();
		let raw_scores: Vec<f32> =
			ids.iter().map(|id| by_id.get(id).copied().unwrap_or(0.0)).collect();

		Some(ids.iter().copied().zip(min_max_normalize(&raw_scores)).collect())
	}
}

fn build_rerank_messages(query: &str, pool: &[Candidate]) -> Vec<Value> {
	let candidates: Vec<Value> = pool
		.iter()
		.map(|candidate| {
			serde_json::json!({
				"id": candidate.entry_id,
				"title": candidate.title,
				"citation": candidate.canonical_citation,
				"summary": candidate
					.content()
					.map(|text| truncate_chars(text, CANDIDATE_SUMMARY_MAX_CHARS)),
			})
		})
		.collect();
	let payload = serde_json::json!({
		"task": "Score each candidate's relevance to the query from 0 to 100.",
		"rubric": "100 = directly answers the query; 50 = related background; 0 = unrelated.",
		"query": query,
		"candidates": candidates,
	});
	let system_prompt = "You are a relevance judge for a Philippine legal retrieval system. \
Output must be valid JSON only: an array of objects with \"id\" and \"score\" fields, one per \
candidate. Do not add explanations or extra fields.";
	let user_prompt = serde_json::to_string_pretty(&payload)
		.unwrap_or_else(|_| payload.to_string());

	vec![
		serde_json::json!({ "role": "system", "content": system_prompt }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}

/// Accepts the documented array shape plus the common wrappers models
/// produce (`{"results": [...]}`, `{"scores": [...]}`). Items missing an id
/// or score are dropped; scores clamp to the 0-100 rubric.
fn parse_rerank_votes(value: Value) -> Option<Vec<(Uuid, f32)>> {
	let items = match &value {
		Value::Array(items) => items,
		Value::Object(_) => value
			.get("results")
			.or_else(|| value.get("scores"))
			.and_then(Value::as_array)?,
		_ => return None,
	};
	let mut out = Vec::with_capacity(items.len());

	for item in items {
		let Some(id) = item.get("id").and_then(Value::as_str).and_then(|raw| Uuid::parse_str(raw).ok())
		else {
			continue;
		};
		let Some(score) = item.get("score").and_then(Value::as_f64) else { continue };

		out.push((id, (score as f32).clamp(0.0, 100.0)));
	}

	if out.is_empty() { None } else { Some(out) }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_bare_arrays_and_wrapped_results() {
		let id = Uuid::new_v4();
		let bare = serde_json::json!([{ "id": id, "score": 80 }]);
		let wrapped = serde_json::json!({ "results": [{ "id": id, "score": 80 }] });

		assert_eq!(parse_rerank_votes(bare).expect("parse failed"), vec![(id, 80.0)]);
		assert_eq!(parse_rerank_votes(wrapped).expect("parse failed"), vec![(id, 80.0)]);
	}

	#[test]
	fn drops_malformed_votes_and_clamps_scores() {
		let id = Uuid::new_v4();
		let value = serde_json::json!([
			{ "id": id, "score": 250 },
			{ "id": "not-a-uuid", "score": 10 },
			{ "score": 10 },
		]);
		let votes = parse_rerank_votes(value).expect("parse failed");

		assert_eq!(votes, vec![(id, 100.0)]);
	}

	#[test]
	fn unusable_payloads_parse_to_none() {
		assert!(parse_rerank_votes(serde_json::json!("nope")).is_none());
		assert!(parse_rerank_votes(serde_json::json!({ "answer": 42 })).is_none());
		assert!(parse_rerank_votes(serde_json::json!([])).is_none());
	}
}
