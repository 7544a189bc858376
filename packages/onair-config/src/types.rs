use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub recommend: Recommend,
	#[serde(default)]
	pub worker: Worker,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub llm: LlmProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub api_base: String,
	pub api_key: Option<String>,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub api_base: String,
	pub api_key: Option<String>,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Tunables for the recommendation pipeline. The confidence thresholds are
/// deliberately not configurable; they live in `onair-domain` as constants.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Recommend {
	/// Vector-search candidate count when the request does not specify one.
	pub top_k: u32,
	/// Result count when the request does not specify one.
	pub final_results: u32,
	pub use_llm: bool,
	/// How many retrieved candidates are handed to the LLM prompt.
	pub llm_candidates: u32,
	pub similarity_weight: f32,
	pub llm_weight: f32,
	/// Score assigned to candidates the LLM did not pick.
	pub default_llm_score: f32,
}
impl Default for Recommend {
	fn default() -> Self {
		Self {
			top_k: 10,
			final_results: 3,
			use_llm: true,
			llm_candidates: 5,
			similarity_weight: 0.4,
			llm_weight: 0.6,
			default_llm_score: 0.3,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Worker {
	pub poll_interval_ms: u64,
}
impl Default for Worker {
	fn default() -> Self {
		Self { poll_interval_ms: 60_000 }
	}
}
