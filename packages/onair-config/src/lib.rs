mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, LlmProviderConfig, Postgres, Providers, Recommend, Service,
	Storage, Worker,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}

	for (label, api_base, timeout_ms) in [
		("embedding", &cfg.providers.embedding.api_base, cfg.providers.embedding.timeout_ms),
		("llm", &cfg.providers.llm.api_base, cfg.providers.llm.timeout_ms),
	] {
		if api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("providers.{label}.api_base must be non-empty."),
			});
		}
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("providers.{label}.timeout_ms must be greater than zero."),
			});
		}
	}

	if !(0.0..=1.0).contains(&cfg.providers.llm.temperature) {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be in the range 0.0-1.0.".to_string(),
		});
	}
	if !(1..=50).contains(&cfg.recommend.top_k) {
		return Err(Error::Validation {
			message: "recommend.top_k must be in the range 1-50.".to_string(),
		});
	}
	if !(1..=10).contains(&cfg.recommend.final_results) {
		return Err(Error::Validation {
			message: "recommend.final_results must be in the range 1-10.".to_string(),
		});
	}
	if cfg.recommend.llm_candidates == 0 {
		return Err(Error::Validation {
			message: "recommend.llm_candidates must be greater than zero.".to_string(),
		});
	}

	for (label, weight) in [
		("recommend.similarity_weight", cfg.recommend.similarity_weight),
		("recommend.llm_weight", cfg.recommend.llm_weight),
	] {
		if !weight.is_finite() {
			return Err(Error::Validation {
				message: format!("{label} must be a finite number."),
			});
		}
		if weight < 0.0 {
			return Err(Error::Validation {
				message: format!("{label} must be zero or greater."),
			});
		}
	}

	if cfg.recommend.similarity_weight + cfg.recommend.llm_weight <= 0.0 {
		return Err(Error::Validation {
			message: "recommend.similarity_weight and recommend.llm_weight must not both be zero."
				.to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.recommend.default_llm_score) {
		return Err(Error::Validation {
			message: "recommend.default_llm_score must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.worker.poll_interval_ms == 0 {
		return Err(Error::Validation {
			message: "worker.poll_interval_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg
		.providers
		.embedding
		.api_key
		.as_deref()
		.map(|key| key.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.embedding.api_key = None;
	}
	if cfg.providers.llm.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.providers.llm.api_key = None;
	}
}
