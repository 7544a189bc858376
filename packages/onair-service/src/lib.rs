pub mod embeddings;
pub mod health;
pub mod recommend;

mod error;

use std::{future::Future, pin::Pin, sync::Arc};

use time::OffsetDateTime;

pub use embeddings::EmbeddingRefreshReport;
pub use error::{Error, Result};
pub use health::HealthReport;
pub use recommend::{
	MemoInput, MemoRecommendation, RecommendMetadata, RecommendRequest, RecommendResponse,
};

use onair_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use onair_domain::candidate::Candidate;
use onair_providers::{embedding, llm, llm::LlmRecommendation};
use onair_storage::{
	corners,
	db::Db,
	models::{CornerRecord, SimilarCorner},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait LlmProvider
where
	Self: Send + Sync,
{
	fn recommend<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		memo: &'a str,
		candidates: &'a [Candidate],
		max_candidates: usize,
	) -> BoxFuture<'a, color_eyre::Result<LlmRecommendation>>;
}

/// The narrow catalog contract the recommendation core depends on. The
/// Postgres adapter below is the production implementation; onair-testkit
/// ships an in-memory one for tests.
pub trait CornerCatalog
where
	Self: Send + Sync,
{
	fn fetch_corner(&self, corner_id: i64) -> BoxFuture<'_, Result<Option<CornerRecord>>>;
	fn list_corners(&self, owner_id: Option<i64>) -> BoxFuture<'_, Result<Vec<CornerRecord>>>;
	fn list_unembedded(&self) -> BoxFuture<'_, Result<Vec<CornerRecord>>>;
	fn find_similar<'a>(
		&'a self,
		query_vector: &'a [f32],
		owner_id: i64,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<SimilarCorner>>>;
	fn store_embedding<'a>(
		&'a self,
		corner_id: i64,
		embedding: &'a [f32],
	) -> BoxFuture<'a, Result<bool>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub llm: Arc<dyn LlmProvider>,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl LlmProvider for DefaultProviders {
	fn recommend<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		memo: &'a str,
		candidates: &'a [Candidate],
		max_candidates: usize,
	) -> BoxFuture<'a, color_eyre::Result<LlmRecommendation>> {
		Box::pin(llm::recommend(cfg, memo, candidates, max_candidates))
	}
}

impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, llm: Arc<dyn LlmProvider>) -> Self {
		Self { embedding, llm }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), llm: provider }
	}
}

/// Postgres-backed corner catalog.
pub struct PgCatalog {
	pub db: Db,
}

impl CornerCatalog for PgCatalog {
	fn fetch_corner(&self, corner_id: i64) -> BoxFuture<'_, Result<Option<CornerRecord>>> {
		Box::pin(async move { Ok(corners::fetch_corner(&self.db, corner_id).await?) })
	}

	fn list_corners(&self, owner_id: Option<i64>) -> BoxFuture<'_, Result<Vec<CornerRecord>>> {
		Box::pin(async move { Ok(corners::list_corners(&self.db, owner_id).await?) })
	}

	fn list_unembedded(&self) -> BoxFuture<'_, Result<Vec<CornerRecord>>> {
		Box::pin(async move { Ok(corners::list_unembedded_corners(&self.db).await?) })
	}

	fn find_similar<'a>(
		&'a self,
		query_vector: &'a [f32],
		owner_id: i64,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<SimilarCorner>>> {
		Box::pin(async move {
			Ok(corners::find_similar(&self.db, query_vector, owner_id, limit).await?)
		})
	}

	fn store_embedding<'a>(
		&'a self,
		corner_id: i64,
		embedding: &'a [f32],
	) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move {
			let now = OffsetDateTime::now_utc();

			Ok(corners::store_embedding(&self.db, corner_id, embedding, now).await?)
		})
	}
}

/// The use-case coordinator: embed, retrieve, optionally reason, fuse, rank.
/// Constructed once at process start and shared across requests; it holds no
/// per-request state.
pub struct RecommendService {
	pub cfg: Config,
	pub catalog: Arc<dyn CornerCatalog>,
	pub providers: Providers,
}
impl RecommendService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, catalog: Arc::new(PgCatalog { db }), providers: Providers::default() }
	}

	pub fn with_parts(cfg: Config, catalog: Arc<dyn CornerCatalog>, providers: Providers) -> Self {
		Self { cfg, catalog, providers }
	}

	/// Embeds one text and checks the configured dimension, shared by the
	/// query path and the maintenance path.
	pub(crate) async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
		let texts = [text.to_string()];
		let vectors = self.providers.embedding.embed(&self.cfg.providers.embedding, &texts).await?;
		let Some(vector) = vectors.into_iter().next() else {
			return Err(Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};

		if vector.len() != self.cfg.providers.embedding.dimensions as usize {
			return Err(Error::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		Ok(vector)
	}
}
