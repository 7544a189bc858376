use std::sync::Arc;

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use onair_api::{routes, state::AppState};
use onair_service::{Providers, RecommendService};
use onair_testkit::{HashEmbedding, InMemoryCatalog, ScriptedLlm, SeedCorner};

const DIMENSIONS: usize = 128;

fn seeded_corners(embedding: &HashEmbedding) -> Vec<SeedCorner> {
	vec![
		SeedCorner::new(1, 1, 1, "街角スポットライト", "駅前のカフェや商店街のお店を紹介するコーナー")
			.with_embedding(embedding.embed_text("駅前のカフェや商店街のお店を紹介するコーナー")),
		SeedCorner::new(2, 1, 1, "ジャズの歴史", "ジャズの名盤と歴史を辿る音楽コーナー")
			.with_embedding(embedding.embed_text("ジャズの名盤と歴史を辿る音楽コーナー")),
	]
}

fn test_router(corners: Vec<SeedCorner>, embedding: Arc<HashEmbedding>) -> Router {
	let catalog = Arc::new(InMemoryCatalog::new(corners));
	let service = RecommendService::with_parts(
		onair_testkit::config(DIMENSIONS as u32),
		catalog,
		Providers::new(embedding, Arc::new(ScriptedLlm::default())),
	);

	routes::router(AppState::with_service(Arc::new(service)))
}

async fn post_json(router: Router, uri: &str, payload: Value) -> (StatusCode, Value) {
	let request = Request::builder()
		.method("POST")
		.uri(uri)
		.header("content-type", "application/json")
		.body(Body::from(payload.to_string()))
		.unwrap();
	let response = router.oneshot(request).await.unwrap();
	let status = response.status();
	let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
	let value: Value = serde_json::from_slice(&bytes).unwrap();

	(status, value)
}

#[tokio::test]
async fn recommend_endpoint_returns_ranked_candidates() {
	let embedding = Arc::new(HashEmbedding::new(DIMENSIONS));
	let router = test_router(seeded_corners(&embedding), embedding.clone());
	let (status, body) = post_json(
		router,
		"/api/recommendations/corners",
		json!({
			"memo_content": "駅前のカフェ",
			"user_id": 1,
			"use_llm": false
		}),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["metadata"]["method"], "vector_search_only");
	assert_eq!(body["metadata"]["candidates_found"], 2);

	let recommendations = body["recommendations"].as_array().unwrap();

	assert_eq!(recommendations[0]["id"], 1);
	assert!(recommendations[0]["similarity"].is_f64() || recommendations[0]["similarity"].is_u64());
	assert!(recommendations[0]["confidence"].is_string());
}

#[tokio::test]
async fn single_recommendation_without_candidates_is_404() {
	let embedding = Arc::new(HashEmbedding::new(DIMENSIONS));
	let router = test_router(Vec::new(), embedding.clone());
	let (status, body) = post_json(
		router,
		"/api/recommendations/corners/single",
		json!({ "memo_content": "駅前のカフェ", "user_id": 1 }),
	)
	.await;

	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error_code"], "not_found");
}

#[tokio::test]
async fn updating_unknown_corner_reports_failure_payload() {
	let embedding = Arc::new(HashEmbedding::new(DIMENSIONS));
	let router = test_router(Vec::new(), embedding.clone());
	let (status, body) = post_json(
		router,
		"/api/recommendations/embeddings/update",
		json!({ "corner_id": 404 }),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["success"], false);
	assert!(body["message"].as_str().unwrap().contains("見つかりませんでした"));
}

#[tokio::test]
async fn bulk_embedding_update_reports_counts() {
	let embedding = Arc::new(HashEmbedding::new(DIMENSIONS));
	let corners = vec![
		SeedCorner::new(1, 1, 1, "a", "説明その一"),
		SeedCorner::new(2, 1, 1, "b", "説明その二"),
	];
	let router = test_router(corners, embedding.clone());
	let (status, body) =
		post_json(router, "/api/recommendations/embeddings/update", json!({ "user_id": 1 })).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["success"], true);
	assert_eq!(body["details"]["total"], 2);
	assert_eq!(body["details"]["updated"], 2);
	assert_eq!(body["details"]["failed"], 0);
}

#[tokio::test]
async fn out_of_bounds_top_k_is_a_bad_request() {
	let embedding = Arc::new(HashEmbedding::new(DIMENSIONS));
	let router = test_router(seeded_corners(&embedding), embedding.clone());
	let (status, body) = post_json(
		router,
		"/api/recommendations/corners",
		json!({ "memo_content": "メモ", "user_id": 1, "top_k": 51 }),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error_code"], "invalid_request");
}

#[tokio::test]
async fn health_reports_embedding_dimension() {
	let embedding = Arc::new(HashEmbedding::new(DIMENSIONS));
	let router = test_router(Vec::new(), embedding.clone());
	let request =
		Request::builder().uri("/api/recommendations/health").body(Body::empty()).unwrap();
	let response = router.oneshot(request).await.unwrap();

	assert_eq!(response.status(), StatusCode::OK);

	let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
	let value: Value = serde_json::from_slice(&bytes).unwrap();

	assert_eq!(value["status"], "healthy");
	assert_eq!(value["embedding_dimension"], DIMENSIONS);
}
