use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::warn;

use batas_domain::{Candidate, EntrySummary, Intent, StructuredQuery, classify};

use crate::{
	Error, Pipeline, RerankStrategy, Result, Stage,
	intent::{DirectAnswer, follow_up_rewrite, list_answer, meta_answer},
};

#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
	pub question: String,
	#[serde(default)]
	pub previous_question: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
	pub intent: String,
	pub intent_confidence: f32,
	/// Set only on the direct-answer path (meta and list shortcuts).
	pub answer: Option<String>,
	pub sources: Vec<EntrySummary>,
	/// Set only on the retrieval path.
	pub structured_query: Option<StructuredQuery>,
	pub retrieval_confidence: Option<f32>,
	pub candidates: Vec<Candidate>,
	pub reranked: bool,
}

impl Pipeline {
	/// Runs a question through the pipeline: classify, short-circuit meta,
	/// list, and follow-up intents, then expand, retrieve, gate, and
	/// rerank. No internal failure surfaces as an error; worst case the
	/// caller receives unreranked or unexpanded retrieval, or no
	/// candidates at all.
	pub async fn ask(&self, req: AskRequest) -> Result<AskResponse> {
		let question = req.question.trim();

		if question.is_empty() {
			return Err(Error::InvalidRequest { message: "question is required.".to_string() });
		}

		let started = Instant::now();
		let timer = self.metrics.start(Stage::Classify);
		let rewrite = follow_up_rewrite(question, req.previous_question.as_deref());
		let classification = classify(&rewrite.query);

		self.metrics.finish(timer);

		match classification.intent {
			Intent::Meta => {
				self.metrics.record_shortcut();

				let direct = meta_answer(&rewrite.query);

				self.metrics.record_query(started.elapsed());

				return Ok(direct_response(classification.intent, classification.confidence, direct));
			},
			Intent::List => {
				let direct = list_answer(self.store.as_ref(), &self.cfg.list, &rewrite.query).await;

				if direct.skip_rag {
					self.metrics.record_shortcut();
					self.metrics.record_query(started.elapsed());

					return Ok(direct_response(
						classification.intent,
						classification.confidence,
						direct,
					));
				}
			},
			// A follow-up that could not be rewritten (no previous
			// question) or that carries context proceeds to retrieval.
			_ => {},
		}

		let timer = self.metrics.start(Stage::StructuredQuery);
		let structured = self.structured_query(&rewrite.query).await;

		self.metrics.finish(timer);

		let keywords = retrieval_keywords(&structured);
		let timer = self.metrics.start(Stage::Retrieval);
		let candidates = match self
			.store
			.hybrid_search(&structured.normalized_question, &keywords, self.cfg.retrieval.candidate_k)
			.await
		{
			Ok(candidates) => candidates,
			Err(err) => {
				warn!(stage = "retrieval", error = %err, "Hybrid search failed; answering without candidates.");

				Vec::new()
			},
		};

		self.metrics.finish(timer);

		// The gating confidence is the top candidate's vector similarity.
		let confidence = candidates.first().map(|candidate| candidate.similarity).unwrap_or(0.0);
		let timer = self.metrics.start(Stage::Rerank);
		let reranked = match RerankStrategy::parse(&self.cfg.rerank.strategy) {
			RerankStrategy::CrossEncoder =>
				self.cross_encoder_rerank(&rewrite.query, &candidates, confidence).await,
			RerankStrategy::Llm => self.llm_rerank(&rewrite.query, &candidates, confidence).await,
			RerankStrategy::Off => None,
		};

		self.metrics.finish(timer);

		let (candidates, was_reranked) = match reranked {
			Some(candidates) => (candidates, true),
			None => {
				let mut original = candidates;

				original.truncate(self.cfg.retrieval.top_k as usize);

				(original, false)
			},
		};

		self.metrics.record_query(started.elapsed());

		Ok(AskResponse {
			intent: classification.intent.as_str().to_string(),
			intent_confidence: classification.confidence,
			answer: None,
			sources: Vec::new(),
			structured_query: Some(structured),
			retrieval_confidence: Some(confidence),
			candidates,
			reranked: was_reranked,
		})
	}
}

fn direct_response(intent: Intent, confidence: f32, direct: DirectAnswer) -> AskResponse {
	AskResponse {
		intent: intent.as_str().to_string(),
		intent_confidence: confidence,
		answer: Some(direct.answer),
		sources: direct.sources,
		structured_query: None,
		retrieval_confidence: None,
		candidates: Vec::new(),
		reranked: false,
	}
}

/// The structured query augments the hybrid call with its keywords and
/// expansions, deduplicated case-insensitively in stable order.
fn retrieval_keywords(structured: &StructuredQuery) -> Vec<String> {
	let mut out = Vec::new();
	let mut seen = std::collections::HashSet::new();

	for term in structured
		.keywords
		.iter()
		.chain(structured.related_terms.iter())
		.chain(structured.query_expansions.iter())
	{
		let trimmed = term.trim();

		if trimmed.is_empty() {
			continue;
		}

		if seen.insert(trimmed.to_lowercase()) {
			out.push(trimmed.to_string());
		}
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use batas_domain::Urgency;

	#[test]
	fn retrieval_keywords_merge_and_dedupe() {
		let structured = StructuredQuery {
			normalized_question: "q".to_string(),
			keywords: vec!["bail".to_string(), "warrant".to_string()],
			legal_topics: Vec::new(),
			statutes_referenced: Vec::new(),
			jurisdiction: "Philippines".to_string(),
			temporal_scope: None,
			related_terms: vec!["Bail".to_string(), "recognizance".to_string()],
			urgency: Urgency::High,
			query_expansions: vec!["  ".to_string(), "bail bond".to_string()],
		};

		assert_eq!(
			retrieval_keywords(&structured),
			vec!["bail", "warrant", "recognizance", "bail bond"]
		);
	}
}
