use serde::{Deserialize, Serialize};
use tracing::warn;

use onair_domain::{candidate::Candidate, ranking};

use crate::{Error, RecommendService, Result};

pub const TOP_K_MIN: u32 = 1;
pub const TOP_K_MAX: u32 = 50;
pub const FINAL_RESULTS_MIN: u32 = 1;
pub const FINAL_RESULTS_MAX: u32 = 10;

/// Method label when retrieval found nothing to rank.
pub const METHOD_VECTOR_SEARCH: &str = "vector_search";
pub const METHOD_VECTOR_SEARCH_ONLY: &str = "vector_search_only";
pub const METHOD_VECTOR_SEARCH_WITH_LLM: &str = "vector_search_with_llm";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RecommendRequest {
	pub memo_content: String,
	pub user_id: i64,
	pub top_k: Option<u32>,
	pub use_llm: Option<bool>,
	pub final_results: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RecommendMetadata {
	pub memo_content: String,
	pub method: String,
	pub candidates_found: u32,
	pub top_results: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RecommendResponse {
	pub recommendations: Vec<Candidate>,
	pub metadata: RecommendMetadata,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MemoInput {
	pub id: i64,
	pub content: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MemoRecommendation {
	pub memo_id: i64,
	pub memo_content: String,
	pub recommendation: Option<Candidate>,
}

impl RecommendService {
	/// Recommends corners for a memo.
	///
	/// Embedding failure is fatal for the request. An empty retrieval
	/// short-circuits to an empty list. An LLM failure degrades to
	/// similarity-only ranking instead of failing the request.
	pub async fn recommend_corners(&self, req: RecommendRequest) -> Result<RecommendResponse> {
		if req.memo_content.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "memo_content must be non-empty.".to_string(),
			});
		}

		let top_k = bounded(
			req.top_k.unwrap_or(self.cfg.recommend.top_k),
			TOP_K_MIN,
			TOP_K_MAX,
			"top_k",
		)?;
		let final_results = bounded(
			req.final_results.unwrap_or(self.cfg.recommend.final_results),
			FINAL_RESULTS_MIN,
			FINAL_RESULTS_MAX,
			"final_results",
		)?;
		let use_llm = req.use_llm.unwrap_or(self.cfg.recommend.use_llm);

		let query_vector = self.embed_text(&req.memo_content).await?;
		let similar = self.catalog.find_similar(&query_vector, req.user_id, top_k).await?;

		if similar.is_empty() {
			return Ok(RecommendResponse {
				recommendations: Vec::new(),
				metadata: RecommendMetadata {
					memo_content: req.memo_content,
					method: METHOD_VECTOR_SEARCH.to_string(),
					candidates_found: 0,
					top_results: 0,
				},
			});
		}

		let mut candidates: Vec<Candidate> = similar
			.into_iter()
			.map(|row| {
				Candidate::from_similarity(
					row.id,
					row.title,
					row.description,
					row.program_id,
					row.similarity,
				)
			})
			.collect();
		let candidates_found = candidates.len() as u32;
		let method = if use_llm && self.llm_stage(&req.memo_content, &mut candidates).await {
			METHOD_VECTOR_SEARCH_WITH_LLM
		} else {
			METHOD_VECTOR_SEARCH_ONLY
		};
		let ranked = ranking::rank(candidates, final_results as usize);

		Ok(RecommendResponse {
			metadata: RecommendMetadata {
				memo_content: req.memo_content,
				method: method.to_string(),
				candidates_found,
				top_results: ranked.len() as u32,
			},
			recommendations: ranked,
		})
	}

	/// The single best corner for a memo, or None when the scope has nothing
	/// to recommend.
	pub async fn recommend_single_best(
		&self,
		memo_content: &str,
		user_id: i64,
	) -> Result<Option<Candidate>> {
		let response = self
			.recommend_corners(RecommendRequest {
				memo_content: memo_content.to_string(),
				user_id,
				top_k: Some(5),
				use_llm: Some(true),
				final_results: Some(1),
			})
			.await?;

		Ok(response.recommendations.into_iter().next())
	}

	/// One single-best recommendation per memo, in input order.
	pub async fn recommend_for_memos(
		&self,
		memos: &[MemoInput],
		user_id: i64,
	) -> Result<Vec<MemoRecommendation>> {
		let mut results = Vec::with_capacity(memos.len());

		for memo in memos {
			let recommendation = self.recommend_single_best(&memo.content, user_id).await?;

			results.push(MemoRecommendation {
				memo_id: memo.id,
				memo_content: memo.content.clone(),
				recommendation,
			});
		}

		Ok(results)
	}

	/// Runs the LLM single-best stage over the retrieved candidates. The
	/// model's pick keeps its parsed score and rationale; every other
	/// candidate gets the configured default so ranking leans toward the
	/// pick. Returns false when the backend failed and the caller should fall
	/// back to similarity-only scores.
	async fn llm_stage(&self, memo: &str, candidates: &mut [Candidate]) -> bool {
		let recommend = &self.cfg.recommend;
		let max_candidates = (recommend.llm_candidates as usize).min(candidates.len());
		let verdict = match self
			.providers
			.llm
			.recommend(&self.cfg.providers.llm, memo, candidates, max_candidates)
			.await
		{
			Ok(verdict) => verdict,
			Err(err) => {
				warn!(error = %err, "LLM stage failed; ranking on similarity only.");

				return false;
			},
		};

		for candidate in candidates.iter_mut() {
			if candidate.corner_id == verdict.corner_id {
				candidate.apply_llm(
					verdict.score,
					Some(verdict.reasoning.clone()),
					recommend.similarity_weight,
					recommend.llm_weight,
				);
			} else {
				candidate.apply_llm(
					recommend.default_llm_score,
					None,
					recommend.similarity_weight,
					recommend.llm_weight,
				);
			}
		}

		true
	}
}

fn bounded(value: u32, min: u32, max: u32, label: &str) -> Result<u32> {
	if !(min..=max).contains(&value) {
		return Err(Error::InvalidRequest {
			message: format!("{label} must be in the range {min}-{max}."),
		});
	}

	Ok(value)
}
