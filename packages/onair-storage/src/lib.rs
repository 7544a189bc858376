pub mod corners;
pub mod db;
pub mod models;
pub mod pgvector;
pub mod schema;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
