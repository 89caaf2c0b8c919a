mod cross_encoder;
mod llm;

use std::{cmp::Ordering, collections::HashMap};

use uuid::Uuid;

use batas_domain::Candidate;

const CACHE_KEY_SCHEMA_VERSION: i32 = 1;
const SNIPPET_MAX_CHARS: usize = 360;

/// Which reranking strategy the pipeline runs; the two are interchangeable
/// and independently tuned, so deployments A/B them via config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerankStrategy {
	CrossEncoder,
	Llm,
	Off,
}
impl RerankStrategy {
	pub fn parse(raw: &str) -> Self {
		match raw {
			"llm" => Self::Llm,
			"off" => Self::Off,
			_ => Self::CrossEncoder,
		}
	}
}

/// Confidence gate shared by both strategies. Above the high threshold
/// retrieval is already trustworthy; below the low threshold the answer is
/// likely "don't know" regardless of reranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GateDecision {
	Skip,
	PassThrough,
	Score,
}

pub(crate) fn gate(confidence: f32, low: f32, high: f32) -> GateDecision {
	if confidence > high {
		return GateDecision::PassThrough;
	}
	if confidence < low {
		return GateDecision::Skip;
	}

	GateDecision::Score
}

/// Min-max normalizes a batch of raw scores to [0, 1]. The denominator is
/// floored so a zero-range batch maps to zero instead of dividing by zero.
pub(crate) fn min_max_normalize(scores: &[f32]) -> Vec<f32> {
	let Some(first) = scores.first().copied() else { return Vec::new() };
	let (min, max) = scores
		.iter()
		.fold((first, first), |(min, max), score| (min.min(*score), max.max(*score)));
	let range = (max - min).max(1e-6);

	scores.iter().map(|score| (score - min) / range).collect()
}

/// Replaces each candidate's `final_score` with the blended value; the
/// pre-stage score always contributes through the complement weight, so the
/// original signal is never dropped.
pub(crate) fn blend_scores(
	pool: &mut [Candidate],
	scores: &HashMap<Uuid, f32>,
	weight: f32,
	slot: ScoreSlot,
) {
	for candidate in pool {
		let score = scores.get(&candidate.entry_id).copied().unwrap_or(0.0);

		match slot {
			ScoreSlot::CrossEncoder => candidate.cross_score = Some(score),
			ScoreSlot::Llm => candidate.llm_score = Some(score),
		}

		candidate.final_score = weight * score + (1.0 - weight) * candidate.final_score;
	}
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum ScoreSlot {
	CrossEncoder,
	Llm,
}

pub(crate) fn sort_and_truncate(mut pool: Vec<Candidate>, top_n: usize) -> Vec<Candidate> {
	pool.sort_by(|left, right| cmp_f32_desc(left.final_score, right.final_score));
	pool.truncate(top_n);

	pool
}

pub(crate) fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}

/// Cache key over the query plus the ordered pooled entry IDs, so any
/// change in the candidate set invalidates the cache even for the same
/// query text.
pub(crate) fn rerank_cache_key(kind: &str, query: &str, ids: &[Uuid]) -> crate::Result<String> {
	let payload = serde_json::json!({
		"kind": kind,
		"schema_version": CACHE_KEY_SCHEMA_VERSION,
		"query": query.trim(),
		"ids": ids,
	});
	let raw = serde_json::to_vec(&payload).map_err(|err| crate::Error::Provider {
		message: format!("Failed to encode cache key payload: {err}"),
	})?;

	Ok(blake3::hash(&raw).to_hex().to_string())
}

/// Compact scoring snippet: title, citation, and a capped content excerpt.
pub(crate) fn build_snippet(candidate: &Candidate, max_chars: usize) -> String {
	let mut out = candidate.title.trim().to_string();

	if let Some(citation) =
		candidate.canonical_citation.as_deref().filter(|text| !text.trim().is_empty())
	{
		out.push_str(" (");
		out.push_str(citation.trim());
		out.push(')');
	}
	if let Some(content) = candidate.content() {
		out.push_str(" — ");
		out.push_str(content.trim());
	}

	truncate_chars(&out, max_chars)
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
	match text.char_indices().nth(max_chars) {
		Some((offset, _)) => text[..offset].to_string(),
		None => text.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn candidate(score: f32) -> Candidate {
		Candidate {
			entry_id: Uuid::new_v4(),
			entry_type: "statute_section".to_string(),
			title: "Entry".to_string(),
			canonical_citation: None,
			summary: Some("summary".to_string()),
			text: None,
			similarity: score,
			lexical: score,
			final_score: score,
			cross_score: None,
			llm_score: None,
		}
	}

	#[test]
	fn gate_splits_the_confidence_band() {
		assert_eq!(gate(0.9, 0.22, 0.85), GateDecision::PassThrough);
		assert_eq!(gate(0.1, 0.22, 0.85), GateDecision::Skip);
		assert_eq!(gate(0.5, 0.22, 0.85), GateDecision::Score);
		assert_eq!(gate(0.85, 0.22, 0.85), GateDecision::Score);
		assert_eq!(gate(0.22, 0.22, 0.85), GateDecision::Score);
	}

	#[test]
	fn min_max_normalization_spans_the_unit_interval() {
		let normalized = min_max_normalize(&[2.0, 6.0, 4.0]);

		assert_eq!(normalized, vec![0.0, 1.0, 0.5]);
	}

	#[test]
	fn zero_range_batches_normalize_to_zero() {
		let normalized = min_max_normalize(&[3.0, 3.0, 3.0]);

		assert!(normalized.iter().all(|score| *score == 0.0));
	}

	#[test]
	fn blending_mixes_stage_and_prior_scores() {
		let mut pool = vec![candidate(0.4)];
		let mut scores = HashMap::new();

		scores.insert(pool[0].entry_id, 1.0f32);
		blend_scores(&mut pool, &scores, 0.7, ScoreSlot::CrossEncoder);

		assert_eq!(pool[0].cross_score, Some(1.0));
		assert!((pool[0].final_score - (0.7 + 0.3 * 0.4)).abs() < 1e-6);
	}

	#[test]
	fn sort_and_truncate_orders_descending() {
		let pool = vec![candidate(0.2), candidate(0.9), candidate(0.5)];
		let sorted = sort_and_truncate(pool, 2);

		assert_eq!(sorted.len(), 2);
		assert!(sorted[0].final_score >= sorted[1].final_score);
	}

	#[test]
	fn cache_key_changes_with_the_candidate_set() {
		let ids_a = vec![Uuid::new_v4(), Uuid::new_v4()];
		let mut ids_b = ids_a.clone();

		ids_b.reverse();

		let key_a = rerank_cache_key("cross_encoder", "bail", &ids_a).expect("key failed");
		let key_b = rerank_cache_key("cross_encoder", "bail", &ids_b).expect("key failed");
		let key_c = rerank_cache_key("cross_encoder", "bail", &ids_a).expect("key failed");

		assert_ne!(key_a, key_b);
		assert_eq!(key_a, key_c);
	}

	#[test]
	fn snippets_cap_their_length() {
		let mut long = candidate(0.5);

		long.summary = Some("x".repeat(1_000));

		let snippet = build_snippet(&long, 100);

		assert_eq!(snippet.chars().count(), 100);
	}
}
