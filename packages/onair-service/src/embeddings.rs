use serde::{Deserialize, Serialize};
use tracing::warn;

use onair_storage::models::CornerRecord;

use crate::{Error, RecommendService, Result};

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct EmbeddingRefreshReport {
	pub total: u32,
	pub updated: u32,
	pub failed: u32,
}

impl RecommendService {
	/// Recomputes one corner's embedding from its current description.
	pub async fn update_embedding(&self, corner_id: i64) -> Result<()> {
		let corner = self.catalog.fetch_corner(corner_id).await?.ok_or_else(|| {
			Error::NotFound { message: format!("Corner {corner_id} was not found.") }
		})?;
		let embedding = self.embed_text(&corner.description).await?;

		if !self.catalog.store_embedding(corner.id, &embedding).await? {
			return Err(Error::NotFound { message: format!("Corner {corner_id} was not found.") });
		}

		Ok(())
	}

	/// Re-embeds every corner, optionally restricted to one owner. Per-corner
	/// failures are counted, never fatal to the batch.
	pub async fn bulk_update_embeddings(
		&self,
		owner_id: Option<i64>,
	) -> Result<EmbeddingRefreshReport> {
		let corners = self.catalog.list_corners(owner_id).await?;

		Ok(self.refresh_corners(corners).await)
	}

	/// Embeds only the corners that have no stored vector yet. Idempotent;
	/// the worker runs this on a timer.
	pub async fn refresh_missing_embeddings(&self) -> Result<EmbeddingRefreshReport> {
		let corners = self.catalog.list_unembedded().await?;

		Ok(self.refresh_corners(corners).await)
	}

	async fn refresh_corners(&self, corners: Vec<CornerRecord>) -> EmbeddingRefreshReport {
		let total = corners.len() as u32;
		let mut updated = 0_u32;
		let mut failed = 0_u32;

		for corner in corners {
			match self.refresh_one(&corner).await {
				Ok(true) => updated += 1,
				Ok(false) => {
					warn!(corner_id = corner.id, "Corner vanished during embedding refresh.");

					failed += 1;
				},
				Err(err) => {
					warn!(
						corner_id = corner.id,
						error = %err,
						"Embedding refresh failed for corner.",
					);

					failed += 1;
				},
			}
		}

		EmbeddingRefreshReport { total, updated, failed }
	}

	async fn refresh_one(&self, corner: &CornerRecord) -> Result<bool> {
		let embedding = self.embed_text(&corner.description).await?;

		self.catalog.store_embedding(corner.id, &embedding).await
	}
}
