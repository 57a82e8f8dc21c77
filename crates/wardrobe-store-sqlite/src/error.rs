//! Error type for `wardrobe-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Input rejected by core validation before reaching the database.
  #[error(transparent)]
  Core(#[from] wardrobe_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A column held a value outside its enum.
  #[error("invalid {column} value: {value:?}")]
  Decode { column: &'static str, value: String },

  #[error("outfit not found: {0}")]
  OutfitNotFound(uuid::Uuid),

  #[error("item not found: {0}")]
  ItemNotFound(uuid::Uuid),

  #[error("history record not found: {0}")]
  RecordNotFound(uuid::Uuid),
}

impl From<Error> for wardrobe_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(inner) => inner,
      Error::OutfitNotFound(id) => Self::OutfitNotFound(id),
      Error::ItemNotFound(id) => Self::ItemNotFound(id),
      Error::RecordNotFound(id) => Self::RecordNotFound(id),
      other => Self::Unavailable(other.to_string()),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
