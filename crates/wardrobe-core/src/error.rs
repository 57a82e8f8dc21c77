//! Error types for `wardrobe-core`.
//!
//! Every public operation of the core reports one of these variants, never a
//! merged generic error, so callers can choose between retrying, prompting
//! the user and refreshing.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// The store could not be reached, failed internally, or did not answer
  /// within the configured timeout. Retryable by the caller.
  #[error("store unavailable: {0}")]
  Unavailable(String),

  #[error("outfit not found: {0}")]
  OutfitNotFound(Uuid),

  #[error("history record not found: {0}")]
  RecordNotFound(Uuid),

  #[error("item not found: {0}")]
  ItemNotFound(Uuid),

  /// `change_today` was asked to free a day the outfit does not hold.
  #[error("outfit {outfit_id} has no record on {date}")]
  NotWornOn { outfit_id: Uuid, date: NaiveDate },

  /// The one-outfit-per-day rule would be (or already is) broken in a way an
  /// idempotent merge cannot resolve.
  #[error("wear-day invariant violated on {date}: {detail}")]
  InvariantViolation { date: NaiveDate, detail: String },

  /// The recommendation filters left nothing to choose from.
  #[error("no outfits match the recommendation criteria")]
  NoCandidates,

  #[error("recommendation session is terminal")]
  SessionTerminal,

  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// A failure that is neither a store outage nor bad input, reported by a
  /// remote server. Not retryable.
  #[error("internal error: {0}")]
  Internal(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Whether repeating the same call may succeed.
  pub fn is_retryable(&self) -> bool { matches!(self, Self::Unavailable(_)) }

  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::OutfitNotFound(_)
        | Self::RecordNotFound(_)
        | Self::ItemNotFound(_)
        | Self::NotWornOn { .. }
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
