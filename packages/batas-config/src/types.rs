use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub retrieval: Retrieval,
	pub list: ListQuery,
	pub sqg: Sqg,
	pub rerank: Rerank,
	pub metrics: Metrics,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { http_bind: "127.0.0.1:8080".to_string(), log_level: "info".to_string() }
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}
impl Default for Postgres {
	fn default() -> Self {
		Self { dsn: "postgres://localhost/batas".to_string(), pool_max_conns: 5 }
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Providers {
	pub chat: ChatProviderConfig,
	pub cross_encoder: CrossEncoderConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ChatProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub strong_model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}
impl Default for ChatProviderConfig {
	fn default() -> Self {
		Self {
			provider_id: "openai".to_string(),
			api_base: "https://api.openai.com".to_string(),
			api_key: String::new(),
			path: "/v1/chat/completions".to_string(),
			model: "gpt-4o-mini".to_string(),
			strong_model: "gpt-4o".to_string(),
			temperature: 0.1,
			timeout_ms: 20_000,
			default_headers: Map::new(),
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CrossEncoderConfig {
	pub model: String,
	pub show_download_progress: bool,
}
impl Default for CrossEncoderConfig {
	fn default() -> Self {
		Self { model: "bge-reranker-base".to_string(), show_download_progress: false }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	pub candidate_k: u32,
	pub top_k: u32,
	pub jurisdiction: String,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self { candidate_k: 40, top_k: 8, jurisdiction: "Philippines".to_string() }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ListQuery {
	pub default_count: u32,
	pub max_count: u32,
}
impl Default for ListQuery {
	fn default() -> Self {
		Self { default_count: 5, max_count: 20 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Sqg {
	pub cache_ttl_secs: u64,
	pub cache_max_entries: usize,
}
impl Default for Sqg {
	fn default() -> Self {
		Self { cache_ttl_secs: 600, cache_max_entries: 300 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Rerank {
	pub strategy: String,
	pub cross_encoder: CrossEncoderRerank,
	pub llm: LlmRerank,
}
impl Default for Rerank {
	fn default() -> Self {
		Self {
			strategy: "cross_encoder".to_string(),
			cross_encoder: CrossEncoderRerank::default(),
			llm: LlmRerank::default(),
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CrossEncoderRerank {
	pub high_confidence: f32,
	pub low_confidence: f32,
	pub min_similarity: f32,
	pub max_candidates: u32,
	pub top_n: u32,
	pub blend_weight: f32,
	pub cache_ttl_secs: u64,
	pub cache_max_entries: usize,
}
impl Default for CrossEncoderRerank {
	fn default() -> Self {
		Self {
			high_confidence: 0.85,
			low_confidence: 0.22,
			min_similarity: 0.15,
			max_candidates: 24,
			top_n: 8,
			blend_weight: 0.7,
			cache_ttl_secs: 600,
			cache_max_entries: 200,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LlmRerank {
	pub high_confidence: f32,
	pub low_confidence: f32,
	pub min_similarity: f32,
	pub min_lexical: f32,
	pub escalation_margin: f32,
	pub max_candidates: u32,
	pub top_n: u32,
	pub blend_weight: f32,
	pub cache_ttl_secs: u64,
	pub cache_max_entries: usize,
}
impl Default for LlmRerank {
	fn default() -> Self {
		Self {
			high_confidence: 0.85,
			low_confidence: 0.22,
			min_similarity: 0.15,
			min_lexical: 0.1,
			escalation_margin: 0.1,
			max_candidates: 24,
			top_n: 8,
			blend_weight: 0.7,
			cache_ttl_secs: 600,
			cache_max_entries: 200,
		}
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Metrics {
	pub enabled: bool,
}
