use time::OffsetDateTime;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CornerRecord {
	pub id: i64,
	pub program_id: i64,
	pub title: String,
	pub description: String,
	pub embedded_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SimilarCorner {
	pub id: i64,
	pub title: String,
	pub description: String,
	pub program_id: i64,
	pub similarity: f32,
}
