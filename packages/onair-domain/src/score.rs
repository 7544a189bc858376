use serde::{Deserialize, Serialize};

/// Fused scores at or above this are labelled high confidence.
pub const HIGH_CONFIDENCE_THRESHOLD: f32 = 0.8;
/// Fused scores at or below this are labelled low confidence.
pub const LOW_CONFIDENCE_THRESHOLD: f32 = 0.3;
/// Separate from the low-confidence threshold: callers surface a manual-review
/// warning for anything at or below this.
pub const WARN_THRESHOLD: f32 = 0.5;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
	High,
	Medium,
	Low,
}
impl Confidence {
	pub fn from_score(score: f32) -> Self {
		if score >= HIGH_CONFIDENCE_THRESHOLD {
			Self::High
		} else if score <= LOW_CONFIDENCE_THRESHOLD {
			Self::Low
		} else {
			Self::Medium
		}
	}
}

/// Blends vector similarity and LLM confidence into one score.
///
/// Weights are normalized by their sum first, so callers may pass
/// un-normalized pairs. A non-positive weight sum falls back to the raw
/// similarity.
pub fn combine_scores(similarity: f32, llm_score: f32, similarity_weight: f32, llm_weight: f32) -> f32 {
	let total = similarity_weight + llm_weight;

	if !total.is_finite() || total <= 0.0 {
		return clamp_unit(similarity);
	}

	let fused = similarity * (similarity_weight / total) + llm_score * (llm_weight / total);

	clamp_unit(fused)
}

pub fn should_warn(score: f32) -> bool {
	score <= WARN_THRESHOLD
}

pub fn clamp_unit(value: f32) -> f32 {
	value.clamp(0.0, 1.0)
}
