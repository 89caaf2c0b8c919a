pub mod ask;
pub mod cache;
pub mod intent;
pub mod metrics;
pub mod rerank;
pub mod sqg;

mod error;

use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc, time::Duration};

use serde_json::Value;
use uuid::Uuid;

pub use ask::{AskRequest, AskResponse};
pub use cache::TtlCache;
pub use error::{Error, Result};
pub use intent::{DirectAnswer, FollowUpRewrite};
pub use metrics::{CacheKind, Metrics, MetricsSnapshot, Stage};
pub use rerank::RerankStrategy;

use batas_config::{ChatProviderConfig, Config};
use batas_domain::{Candidate, EntrySummary, ListTopic, StructuredQuery};
use batas_providers::{chat, cross_encoder::CrossEncoder};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Remote language model returning strict JSON; used by the structured
/// query generator and the LLM reranker with different prompt schemas.
pub trait ChatProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a ChatProviderConfig,
		model: &'a str,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Value>>;
}

/// Local neural classifier emitting a relevance probability per
/// (query, snippet) pair, aligned to input order.
pub trait CrossEncoderProvider
where
	Self: Send + Sync,
{
	fn score<'a>(
		&'a self,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>>;
}

/// The consumed retrieval interfaces: the black-box hybrid search and the
/// aggregate diversity sample used by list queries.
pub trait EntryStore
where
	Self: Send + Sync,
{
	fn hybrid_search<'a>(
		&'a self,
		query: &'a str,
		keywords: &'a [String],
		limit: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Candidate>>>;

	fn sample_entries<'a>(
		&'a self,
		topic: ListTopic,
		count: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<EntrySummary>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub chat: Arc<dyn ChatProvider>,
	pub cross_encoder: Arc<dyn CrossEncoderProvider>,
}
impl Providers {
	pub fn new(chat: Arc<dyn ChatProvider>, cross_encoder: Arc<dyn CrossEncoderProvider>) -> Self {
		Self { chat, cross_encoder }
	}

	/// Default chat over HTTP plus the given cross-encoder. The
	/// cross-encoder is injected because constructing one loads a local
	/// model; pass [`DisabledCrossEncoder`] when the strategy never uses it.
	pub fn with_cross_encoder(cross_encoder: Arc<dyn CrossEncoderProvider>) -> Self {
		Self { chat: Arc::new(DefaultChat), cross_encoder }
	}
}

struct DefaultChat;
impl ChatProvider for DefaultChat {
	fn complete<'a>(
		&'a self,
		cfg: &'a ChatProviderConfig,
		model: &'a str,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Value>> {
		Box::pin(chat::complete(cfg, model, messages))
	}
}

impl CrossEncoderProvider for CrossEncoder {
	fn score<'a>(
		&'a self,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(CrossEncoder::score(self, query, docs))
	}
}

/// Stand-in for deployments that never run the local cross-encoder; any
/// attempt to score reports failure, which the reranker converts to a
/// no-rerank result.
pub struct DisabledCrossEncoder;
impl CrossEncoderProvider for DisabledCrossEncoder {
	fn score<'a>(
		&'a self,
		_query: &'a str,
		_docs: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(async { Err(color_eyre::eyre::eyre!("Cross-encoder is not configured.")) })
	}
}

impl EntryStore for batas_storage::db::Db {
	fn hybrid_search<'a>(
		&'a self,
		query: &'a str,
		keywords: &'a [String],
		limit: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Candidate>>> {
		Box::pin(async move {
			let args = batas_storage::entries::HybridSearchArgs { query, keywords, limit };

			batas_storage::entries::hybrid_search(&self.pool, args).await.map_err(Into::into)
		})
	}

	fn sample_entries<'a>(
		&'a self,
		topic: ListTopic,
		count: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<EntrySummary>>> {
		Box::pin(async move {
			batas_storage::entries::sample_entries(&self.pool, topic, count)
				.await
				.map_err(Into::into)
		})
	}
}

/// The three independent caches. Explicitly constructed and owned by the
/// pipeline so tests supply isolated instances instead of hidden process
/// state.
pub struct PipelineCaches {
	pub sqg: TtlCache<StructuredQuery>,
	pub cross_encoder: TtlCache<HashMap<Uuid, f32>>,
	pub llm_rerank: TtlCache<HashMap<Uuid, f32>>,
}
impl PipelineCaches {
	pub fn from_config(cfg: &Config) -> Self {
		Self {
			sqg: TtlCache::new(
				Duration::from_secs(cfg.sqg.cache_ttl_secs),
				cfg.sqg.cache_max_entries,
			),
			cross_encoder: TtlCache::new(
				Duration::from_secs(cfg.rerank.cross_encoder.cache_ttl_secs),
				cfg.rerank.cross_encoder.cache_max_entries,
			),
			llm_rerank: TtlCache::new(
				Duration::from_secs(cfg.rerank.llm.cache_ttl_secs),
				cfg.rerank.llm.cache_max_entries,
			),
		}
	}
}

pub struct Pipeline {
	pub cfg: Config,
	pub store: Arc<dyn EntryStore>,
	pub providers: Providers,
	pub caches: PipelineCaches,
	pub metrics: Metrics,
}
impl Pipeline {
	pub fn new(cfg: Config, store: Arc<dyn EntryStore>, providers: Providers) -> Self {
		let caches = PipelineCaches::from_config(&cfg);
		let metrics = Metrics::new(cfg.metrics.enabled);

		Self { cfg, store, providers, caches, metrics }
	}
}
