use serde::{Deserialize, Serialize};

use crate::score::{self, Confidence};

/// One corner flowing through a single recommendation request.
///
/// Built from the vector-search result, enriched with the LLM verdict when
/// that stage runs, then ranked. Never persisted.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Candidate {
	#[serde(rename = "id")]
	pub corner_id: i64,
	pub title: String,
	pub description: String,
	pub program_id: i64,
	pub similarity: f32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub llm_score: Option<f32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reasoning: Option<String>,
	pub score: f32,
	pub confidence: Confidence,
}
impl Candidate {
	/// A fresh candidate straight out of retrieval: the fused score equals the
	/// similarity until the LLM stage contributes.
	pub fn from_similarity(
		corner_id: i64,
		title: String,
		description: String,
		program_id: i64,
		similarity: f32,
	) -> Self {
		let similarity = score::clamp_unit(similarity);

		Self {
			corner_id,
			title,
			description,
			program_id,
			similarity,
			llm_score: None,
			reasoning: None,
			score: similarity,
			confidence: Confidence::from_score(similarity),
		}
	}

	/// Folds an LLM score into the candidate and refreshes the fused score and
	/// confidence label.
	pub fn apply_llm(
		&mut self,
		llm_score: f32,
		reasoning: Option<String>,
		similarity_weight: f32,
		llm_weight: f32,
	) {
		let llm_score = score::clamp_unit(llm_score);

		self.llm_score = Some(llm_score);
		self.reasoning = reasoning;
		self.score =
			score::combine_scores(self.similarity, llm_score, similarity_weight, llm_weight);
		self.confidence = Confidence::from_score(self.score);
	}

	pub fn should_warn(&self) -> bool {
		score::should_warn(self.score)
	}
}
