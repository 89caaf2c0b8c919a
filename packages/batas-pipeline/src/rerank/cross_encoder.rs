use std::collections::HashMap;

use tracing::warn;
use uuid::Uuid;

use batas_domain::Candidate;

use super::{
	GateDecision, SNIPPET_MAX_CHARS, ScoreSlot, blend_scores, build_snippet, gate,
	min_max_normalize, rerank_cache_key, sort_and_truncate,
};
use crate::{CacheKind, Pipeline};

impl Pipeline {
	/// Reranks with the local cross-encoder. Returns `None` whenever the
	/// stage decides not to (or cannot) rerank: outside the confidence
	/// band, an empty pool after prefiltering, or any inference failure.
	/// The caller then keeps the original order; this stage must never be
	/// the reason a request fails.
	pub async fn cross_encoder_rerank(
		&self,
		query: &str,
		candidates: &[Candidate],
		confidence: f32,
	) -> Option<Vec<Candidate>> {
		let cfg = &self.cfg.rerank.cross_encoder;

		match gate(confidence, cfg.low_confidence, cfg.high_confidence) {
			GateDecision::PassThrough | GateDecision::Skip => {
				self.metrics.record_early_termination();

				return None;
			},
			GateDecision::Score => {},
		}

		let pool: Vec<Candidate> = candidates
			.iter()
			.filter(|candidate| candidate.similarity >= cfg.min_similarity)
			.take(cfg.max_candidates as usize)
			.cloned()
			.collect();

		if pool.is_empty() {
			return None;
		}

		let ids: Vec<Uuid> = pool.iter().map(|candidate| candidate.entry_id).collect();
		let cache_key = match rerank_cache_key("cross_encoder", query, &ids) {
			Ok(key) => Some(key),
			Err(err) => {
				warn!(stage = "cross_encoder", error = %err, "Cache key build failed.");

				None
			},
		};
		let scores = match cache_key.as_ref().and_then(|key| self.caches.cross_encoder.get(key)) {
			Some(cached) => {
				self.metrics.record_cache_hit(CacheKind::CrossEncoder);

				cached
			},
			None => {
				self.metrics.record_cache_miss(CacheKind::CrossEncoder);

				let scored = self.score_pool(query, &pool, &ids).await?;

				if let Some(key) = cache_key.as_ref() {
					self.caches.cross_encoder.insert(key, scored.clone());
				}

				scored
			},
		};
		let mut pool = pool;

		blend_scores(&mut pool, &scores, cfg.blend_weight, ScoreSlot::CrossEncoder);

		Some(sort_and_truncate(pool, cfg.top_n as usize))
	}

	async fn score_pool(
		&self,
		query: &str,
		pool: &[Candidate],
		ids: &[Uuid],
	) -> Option<HashMap<Uuid, f32>> {
		let docs: Vec<String> =
			pool.iter().map(|candidate| build_snippet(candidate, SNIPPET_MAX_CHARS)).collect();
		let raw = match self.providers.cross_encoder.score(query, &docs).await {
			Ok(scores) => scores,
			Err(err) => {
				warn!(stage = "cross_encoder", error = %err, "Cross-encoder scoring failed; keeping retrieval order.");

				return None;
			},
		};

		if raw.len() != docs.len() {
			warn!(
				stage = "cross_encoder",
				expected = docs.len(),
				got = raw.len(),
				"Cross-encoder returned a mismatched score count; keeping retrieval order."
			);

			return None;
		}

		Some(ids.iter().copied().zip(min_max_normalize(&raw)).collect())
	}
}
