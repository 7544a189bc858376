use serde::{Deserialize, Serialize};

use crate::RecommendService;

/// Fixed probe text; the embedding backend must handle Japanese input.
const PROBE_TEXT: &str = "テスト";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HealthReport {
	pub status: String,
	pub embedding_service: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub embedding_dimension: Option<usize>,
	pub llm_service: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl RecommendService {
	/// Exercises the embedding backend with a probe string. The LLM client is
	/// built per call from validated config, so it only gets a
	/// construction-level check here.
	pub async fn health(&self) -> HealthReport {
		match self.embed_text(PROBE_TEXT).await {
			Ok(vector) => HealthReport {
				status: "healthy".to_string(),
				embedding_service: "ok".to_string(),
				embedding_dimension: Some(vector.len()),
				llm_service: "ok".to_string(),
				error: None,
			},
			Err(err) => HealthReport {
				status: "unhealthy".to_string(),
				embedding_service: "error".to_string(),
				embedding_dimension: None,
				llm_service: "unknown".to_string(),
				error: Some(err.to_string()),
			},
		}
	}
}
