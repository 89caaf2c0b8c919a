mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	ChatProviderConfig, Config, CrossEncoderConfig, CrossEncoderRerank, ListQuery, LlmRerank,
	Metrics, Postgres, Providers, Rerank, Retrieval, Service, Sqg, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.chat.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.chat.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if !cfg.providers.chat.temperature.is_finite() || cfg.providers.chat.temperature < 0.0 {
		return Err(Error::Validation {
			message: "providers.chat.temperature must be a finite number, zero or greater."
				.to_string(),
		});
	}
	if cfg.retrieval.candidate_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.candidate_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.list.default_count == 0 {
		return Err(Error::Validation {
			message: "list.default_count must be greater than zero.".to_string(),
		});
	}
	if cfg.list.max_count < cfg.list.default_count {
		return Err(Error::Validation {
			message: "list.max_count must be at least list.default_count.".to_string(),
		});
	}
	if cfg.sqg.cache_ttl_secs == 0 {
		return Err(Error::Validation {
			message: "sqg.cache_ttl_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.sqg.cache_max_entries == 0 {
		return Err(Error::Validation {
			message: "sqg.cache_max_entries must be greater than zero.".to_string(),
		});
	}
	if !matches!(cfg.rerank.strategy.as_str(), "cross_encoder" | "llm" | "off") {
		return Err(Error::Validation {
			message: "rerank.strategy must be one of cross_encoder, llm, or off.".to_string(),
		});
	}

	let ce = &cfg.rerank.cross_encoder;

	validate_band("rerank.cross_encoder", ce.low_confidence, ce.high_confidence)?;
	validate_weight("rerank.cross_encoder.blend_weight", ce.blend_weight)?;
	validate_weight("rerank.cross_encoder.min_similarity", ce.min_similarity)?;
	validate_pool("rerank.cross_encoder", ce.max_candidates, ce.top_n)?;
	validate_cache("rerank.cross_encoder", ce.cache_ttl_secs, ce.cache_max_entries)?;

	let llm = &cfg.rerank.llm;

	validate_band("rerank.llm", llm.low_confidence, llm.high_confidence)?;
	validate_weight("rerank.llm.blend_weight", llm.blend_weight)?;
	validate_weight("rerank.llm.min_similarity", llm.min_similarity)?;
	validate_weight("rerank.llm.min_lexical", llm.min_lexical)?;
	validate_weight("rerank.llm.escalation_margin", llm.escalation_margin)?;
	validate_pool("rerank.llm", llm.max_candidates, llm.top_n)?;
	validate_cache("rerank.llm", llm.cache_ttl_secs, llm.cache_max_entries)?;

	Ok(())
}

fn validate_band(label: &str, low: f32, high: f32) -> Result<()> {
	for (field, value) in [("low_confidence", low), ("high_confidence", high)] {
		if !value.is_finite() || !(0.0..=1.0).contains(&value) {
			return Err(Error::Validation {
				message: format!("{label}.{field} must be in the range 0.0-1.0."),
			});
		}
	}
	if low >= high {
		return Err(Error::Validation {
			message: format!("{label}.low_confidence must be less than {label}.high_confidence."),
		});
	}

	Ok(())
}

fn validate_weight(label: &str, value: f32) -> Result<()> {
	if !value.is_finite() || !(0.0..=1.0).contains(&value) {
		return Err(Error::Validation {
			message: format!("{label} must be in the range 0.0-1.0."),
		});
	}

	Ok(())
}

fn validate_pool(label: &str, max_candidates: u32, top_n: u32) -> Result<()> {
	if top_n == 0 {
		return Err(Error::Validation {
			message: format!("{label}.top_n must be greater than zero."),
		});
	}
	if max_candidates < top_n {
		return Err(Error::Validation {
			message: format!("{label}.max_candidates must be at least {label}.top_n."),
		});
	}

	Ok(())
}

fn validate_cache(label: &str, ttl_secs: u64, max_entries: usize) -> Result<()> {
	if ttl_secs == 0 {
		return Err(Error::Validation {
			message: format!("{label}.cache_ttl_secs must be greater than zero."),
		});
	}
	if max_entries == 0 {
		return Err(Error::Validation {
			message: format!("{label}.cache_max_entries must be greater than zero."),
		});
	}

	Ok(())
}
