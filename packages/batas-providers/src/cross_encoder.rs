use std::sync::Arc;

use color_eyre::{Result, eyre};
use fastembed::{RerankInitOptions, RerankerModel, TextRerank};

/// Local cross-encoder scoring (query, snippet) pairs with a relevance
/// probability per pair. Inference is synchronous in fastembed, so scoring
/// runs on the blocking pool.
pub struct CrossEncoder {
	model: Arc<TextRerank>,
}
impl CrossEncoder {
	pub fn new(cfg: &batas_config::CrossEncoderConfig) -> Result<Self> {
		let model_kind = match cfg.model.as_str() {
			"bge-reranker-base" => RerankerModel::BGERerankerBase,
			"bge-reranker-v2-m3" => RerankerModel::BGERerankerV2M3,
			other => return Err(eyre::eyre!("Unsupported cross-encoder model: {other}.")),
		};
		let options = RerankInitOptions::new(model_kind)
			.with_show_download_progress(cfg.show_download_progress);
		let model = TextRerank::try_new(options)
			.map_err(|err| eyre::eyre!("Cross-encoder initialization failed: {err}."))?;

		Ok(Self { model: Arc::new(model) })
	}

	/// Scores every document against the query, returning one score per
	/// document aligned to the input order.
	pub async fn score(&self, query: &str, docs: &[String]) -> Result<Vec<f32>> {
		if docs.is_empty() {
			return Ok(Vec::new());
		}

		let model = self.model.clone();
		let query = query.to_string();
		let docs = docs.to_vec();
		let doc_count = docs.len();
		let results = tokio::task::spawn_blocking(move || {
			let documents: Vec<&str> = docs.iter().map(|doc| doc.as_str()).collect();

			model
				.rerank(query.as_str(), documents, false, None)
				.map_err(|err| eyre::eyre!("Cross-encoder inference failed: {err}."))
		})
		.await
		.map_err(|err| eyre::eyre!("Cross-encoder task failed: {err}."))??;

		Ok(align_scores(results.into_iter().map(|item| (item.index, item.score)), doc_count))
	}
}

/// Fastembed returns results sorted by score; realign them to document
/// order by index.
fn align_scores(pairs: impl IntoIterator<Item = (usize, f32)>, doc_count: usize) -> Vec<f32> {
	let mut scores = vec![0.0f32; doc_count];

	for (index, score) in pairs {
		if index < scores.len() {
			scores[index] = score;
		}
	}

	scores
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn aligns_scores_by_index() {
		let scores = align_scores([(1, 0.2), (0, 0.9)], 2);
		assert_eq!(scores, vec![0.9, 0.2]);
	}

	#[test]
	fn ignores_out_of_range_indices() {
		let scores = align_scores([(0, 0.5), (7, 0.8)], 2);
		assert_eq!(scores, vec![0.5, 0.0]);
	}
}
