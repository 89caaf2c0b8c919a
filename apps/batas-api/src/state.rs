use std::sync::Arc;

use batas_pipeline::{DisabledCrossEncoder, Pipeline, Providers, RerankStrategy};
use batas_providers::cross_encoder::CrossEncoder;
use batas_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub pipeline: Arc<Pipeline>,
}
impl AppState {
	pub async fn new(config: batas_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;
		// The local model is only loaded when the configured strategy can
		// actually reach it.
		let providers = match RerankStrategy::parse(&config.rerank.strategy) {
			RerankStrategy::CrossEncoder => {
				let cross_encoder = CrossEncoder::new(&config.providers.cross_encoder)?;

				Providers::with_cross_encoder(Arc::new(cross_encoder))
			},
			RerankStrategy::Llm | RerankStrategy::Off =>
				Providers::with_cross_encoder(Arc::new(DisabledCrossEncoder)),
		};
		let pipeline = Pipeline::new(config, Arc::new(db), providers);

		Ok(Self { pipeline: Arc::new(pipeline) })
	}
}
