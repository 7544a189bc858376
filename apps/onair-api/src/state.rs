use std::sync::Arc;

use onair_service::RecommendService;
use onair_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<RecommendService>,
}
impl AppState {
	pub async fn new(config: onair_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(config.providers.embedding.dimensions).await?;

		let service = RecommendService::new(config, db);

		Ok(Self { service: Arc::new(service) })
	}

	/// Wraps an already-built service; tests use this with testkit doubles.
	pub fn with_service(service: Arc<RecommendService>) -> Self {
		Self { service }
	}
}
