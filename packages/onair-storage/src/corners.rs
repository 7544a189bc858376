use time::OffsetDateTime;

use crate::{Result, db::Db, models::{CornerRecord, SimilarCorner}, pgvector};

const CORNER_COLUMNS: &str = "id, program_id, title, description, embedded_at";

pub async fn fetch_corner(db: &Db, corner_id: i64) -> Result<Option<CornerRecord>> {
	let row = sqlx::query_as::<_, CornerRecord>(&format!(
		"\
SELECT {CORNER_COLUMNS}
FROM corners
WHERE id = $1"
	))
	.bind(corner_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(row)
}

/// Every corner, optionally restricted to one owner's programs. Feeds the
/// bulk embedding refresh.
pub async fn list_corners(db: &Db, owner_id: Option<i64>) -> Result<Vec<CornerRecord>> {
	let rows = match owner_id {
		Some(owner_id) => {
			sqlx::query_as::<_, CornerRecord>(
				"\
SELECT c.id, c.program_id, c.title, c.description, c.embedded_at
FROM corners c
JOIN programs p ON p.id = c.program_id
WHERE p.user_id = $1
ORDER BY c.id",
			)
			.bind(owner_id)
			.fetch_all(&db.pool)
			.await?
		},
		None =>
			sqlx::query_as::<_, CornerRecord>(&format!(
				"\
SELECT {CORNER_COLUMNS}
FROM corners
ORDER BY id"
			))
			.fetch_all(&db.pool)
			.await?,
	};

	Ok(rows)
}

/// Corners that have never been embedded. The worker's periodic target.
pub async fn list_unembedded_corners(db: &Db) -> Result<Vec<CornerRecord>> {
	let rows = sqlx::query_as::<_, CornerRecord>(&format!(
		"\
SELECT {CORNER_COLUMNS}
FROM corners
WHERE embedding IS NULL
ORDER BY id"
	))
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

/// Top `limit` corners by cosine similarity to the query vector, restricted
/// to the owner's programs. Similarity is clamped to [0, 1] in SQL; ties
/// break on ascending corner id so results are deterministic. Corners without
/// a stored embedding are never compared.
pub async fn find_similar(
	db: &Db,
	query_vector: &[f32],
	owner_id: i64,
	limit: u32,
) -> Result<Vec<SimilarCorner>> {
	let vec_text = pgvector::vector_to_pg(query_vector);
	let rows = sqlx::query_as::<_, SimilarCorner>(
		"\
SELECT
	c.id,
	c.title,
	c.description,
	c.program_id,
	LEAST(1.0, GREATEST(0.0, 1 - (c.embedding <=> $1::text::vector)))::real AS similarity
FROM corners c
JOIN programs p ON p.id = c.program_id
WHERE p.user_id = $2 AND c.embedding IS NOT NULL
ORDER BY similarity DESC, c.id ASC
LIMIT $3",
	)
	.bind(vec_text.as_str())
	.bind(owner_id)
	.bind(i64::from(limit))
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

/// Persists a corner's embedding. Returns false when the corner id does not
/// exist.
pub async fn store_embedding(
	db: &Db,
	corner_id: i64,
	embedding: &[f32],
	now: OffsetDateTime,
) -> Result<bool> {
	let vec_text = pgvector::vector_to_pg(embedding);
	let result = sqlx::query(
		"\
UPDATE corners
SET embedding = $1::text::vector, embedded_at = $2
WHERE id = $3",
	)
	.bind(vec_text.as_str())
	.bind(now)
	.bind(corner_id)
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected() > 0)
}
