use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use onair_domain::candidate::Candidate;
use onair_service::{
	EmbeddingRefreshReport, Error as ServiceError, HealthReport, MemoInput, MemoRecommendation,
	RecommendRequest, RecommendResponse,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/api/recommendations/corners", post(recommend_corners))
		.route("/api/recommendations/corners/single", post(recommend_single_corner))
		.route("/api/recommendations/memos", post(recommend_for_memos))
		.route("/api/recommendations/embeddings/update", post(update_embeddings))
		.route("/api/recommendations/health", get(health))
		.with_state(state)
}

async fn recommend_corners(
	State(state): State<AppState>,
	Json(payload): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, ApiError> {
	let response = state.service.recommend_corners(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct SingleRecommendationRequest {
	memo_content: String,
	user_id: i64,
}

async fn recommend_single_corner(
	State(state): State<AppState>,
	Json(payload): Json<SingleRecommendationRequest>,
) -> Result<Json<Candidate>, ApiError> {
	let best =
		state.service.recommend_single_best(&payload.memo_content, payload.user_id).await?;

	best.map(Json).ok_or_else(|| {
		ApiError::new(
			StatusCode::NOT_FOUND,
			"not_found",
			"適切なコーナーが見つかりませんでした。",
		)
	})
}

#[derive(Debug, Deserialize)]
struct BatchRecommendationRequest {
	memos: Vec<MemoInput>,
	user_id: i64,
}

async fn recommend_for_memos(
	State(state): State<AppState>,
	Json(payload): Json<BatchRecommendationRequest>,
) -> Result<Json<Vec<MemoRecommendation>>, ApiError> {
	let results = state.service.recommend_for_memos(&payload.memos, payload.user_id).await?;

	Ok(Json(results))
}

#[derive(Debug, Deserialize)]
struct UpdateEmbeddingRequest {
	corner_id: Option<i64>,
	user_id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct UpdateEmbeddingResponse {
	success: bool,
	message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	details: Option<EmbeddingRefreshReport>,
}

/// A specific corner takes precedence over the owner-scoped bulk refresh,
/// which takes precedence over the global one. An unknown corner id is a
/// `success: false` payload rather than an HTTP error.
async fn update_embeddings(
	State(state): State<AppState>,
	Json(payload): Json<UpdateEmbeddingRequest>,
) -> Result<Json<UpdateEmbeddingResponse>, ApiError> {
	if let Some(corner_id) = payload.corner_id {
		return match state.service.update_embedding(corner_id).await {
			Ok(()) => Ok(Json(UpdateEmbeddingResponse {
				success: true,
				message: format!("コーナーID {corner_id} の埋め込みを更新しました。"),
				details: None,
			})),
			Err(ServiceError::NotFound { .. }) => Ok(Json(UpdateEmbeddingResponse {
				success: false,
				message: format!("コーナーID {corner_id} が見つかりませんでした。"),
				details: None,
			})),
			Err(err) => Err(err.into()),
		};
	}

	let report = state.service.bulk_update_embeddings(payload.user_id).await?;

	Ok(Json(UpdateEmbeddingResponse {
		success: true,
		message: format!("{}件のコーナーの埋め込みを更新しました。", report.updated),
		details: Some(report),
	}))
}

async fn health(State(state): State<AppState>) -> Json<HealthReport> {
	Json(state.service.health().await)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}

impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let message = err.to_string();

		match err {
			ServiceError::InvalidRequest { .. } =>
				Self::new(StatusCode::BAD_REQUEST, "invalid_request", message),
			ServiceError::NotFound { .. } =>
				Self::new(StatusCode::NOT_FOUND, "not_found", message),
			ServiceError::Provider { .. } =>
				Self::new(StatusCode::BAD_GATEWAY, "provider_error", message),
			ServiceError::Storage { .. } =>
				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", message),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
