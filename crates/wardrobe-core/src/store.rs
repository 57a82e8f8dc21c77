//! Store traits and the recommendation query type.
//!
//! The traits are implemented by storage backends (`wardrobe-store-sqlite`)
//! and by the HTTP client in `wardrobe-cli`. The core components depend on
//! these abstractions, never on a concrete backend.
//!
//! The traits form a chain so that a single associated `Error` type is shared:
//! [`HistoryStore`] ⊂ [`OutfitCatalog`] ⊂ [`WardrobeStore`].

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  history::{DateRange, HistoryRecord},
  item::{Item, ItemQuery, NewItem},
  outfit::{NewOutfit, Outfit, OutfitQuery},
};

/// Default look-back window for the catalog's recent-wear exclusion.
pub const DEFAULT_EXCLUDE_DAYS: u32 = 2;

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`OutfitCatalog::recommend`]. Missing fields take their
/// defaults when deserialised: rating and formality of at least 3, with
/// outfits worn in the last [`DEFAULT_EXCLUDE_DAYS`] days left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecommendQuery {
  pub min_rating:     u8,
  pub min_formality:  u8,
  /// Drop outfits worn within the last `exclude_days` days.
  pub exclude_recent: bool,
  pub exclude_days:   u32,
  /// The day the exclusion window is measured from; the store's own date when
  /// absent.
  pub as_of:          Option<NaiveDate>,
}

impl RecommendQuery {
  pub fn validate(&self) -> crate::Result<()> {
    for (what, value) in [("rating", self.min_rating), ("formality", self.min_formality)] {
      if !crate::outfit::SCALE.contains(&value) {
        return Err(crate::Error::InvalidInput(format!(
          "minimum {what} must be between 1 and 5, got {value}"
        )));
      }
    }
    Ok(())
  }
}

impl Default for RecommendQuery {
  fn default() -> Self {
    Self {
      min_rating:     3,
      min_formality:  3,
      exclude_recent: true,
      exclude_days:   DEFAULT_EXCLUDE_DAYS,
      as_of:          None,
    }
  }
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Access to the wear-history log.
///
/// Implementations perform no business validation beyond input shape; in
/// particular they do not enforce one record per day. That is the job of
/// [`crate::wear::WearDayManager`].
pub trait HistoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  /// All records whose `worn_date` falls inside `range` (inclusive).
  fn list_range(
    &self,
    range: DateRange,
  ) -> impl Future<Output = Result<Vec<HistoryRecord>, Self::Error>> + Send + '_;

  /// All records referencing `outfit_id`. Fails if the outfit is unknown.
  fn list_by_outfit(
    &self,
    outfit_id: Uuid,
  ) -> impl Future<Output = Result<Vec<HistoryRecord>, Self::Error>> + Send + '_;

  /// Append a record. The `created_at` timestamp is set by the store.
  fn create(
    &self,
    outfit_id: Uuid,
    worn_date: NaiveDate,
  ) -> impl Future<Output = Result<HistoryRecord, Self::Error>> + Send + '_;

  /// Remove a record. Fails if it does not exist.
  fn delete(
    &self,
    record_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Read access to outfits plus the external ranking collaborator.
pub trait OutfitCatalog: HistoryStore {
  /// Retrieve an outfit with its items and wear stats. `None` if not found.
  fn get_outfit(
    &self,
    outfit_id: Uuid,
  ) -> impl Future<Output = Result<Option<Outfit>, Self::Error>> + Send + '_;

  /// Candidate outfits for a recommendation, in the catalog's preferred
  /// order. The ordering heuristic is opaque to callers.
  fn recommend(
    &self,
    query: RecommendQuery,
  ) -> impl Future<Output = Result<Vec<Outfit>, Self::Error>> + Send + '_;
}

/// The full wardrobe backend used by the API server.
pub trait WardrobeStore: OutfitCatalog {
  // ── Items ─────────────────────────────────────────────────────────────

  fn add_item(
    &self,
    input: NewItem,
  ) -> impl Future<Output = Result<Item, Self::Error>> + Send + '_;

  fn get_item(
    &self,
    item_id: Uuid,
  ) -> impl Future<Output = Result<Option<Item>, Self::Error>> + Send + '_;

  fn list_items<'a>(
    &'a self,
    query: &'a ItemQuery,
  ) -> impl Future<Output = Result<Vec<Item>, Self::Error>> + Send + 'a;

  /// Replace every editable field of an item.
  fn update_item(
    &self,
    item_id: Uuid,
    input: NewItem,
  ) -> impl Future<Output = Result<Item, Self::Error>> + Send + '_;

  /// Delete an item and drop it from every outfit that contains it.
  fn delete_item(
    &self,
    item_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Outfits ───────────────────────────────────────────────────────────

  /// Create an outfit. Fails if any referenced item does not exist.
  fn add_outfit(
    &self,
    input: NewOutfit,
  ) -> impl Future<Output = Result<Outfit, Self::Error>> + Send + '_;

  fn list_outfits(
    &self,
  ) -> impl Future<Output = Result<Vec<Outfit>, Self::Error>> + Send + '_;

  /// Outfits within the query's rating and formality bounds, newest first.
  fn find_outfits<'a>(
    &'a self,
    query: &'a OutfitQuery,
  ) -> impl Future<Output = Result<Vec<Outfit>, Self::Error>> + Send + 'a;

  /// Replace an outfit's fields and its item set.
  fn update_outfit(
    &self,
    outfit_id: Uuid,
    input: NewOutfit,
  ) -> impl Future<Output = Result<Outfit, Self::Error>> + Send + '_;

  /// Delete an outfit together with its history records.
  fn delete_outfit(
    &self,
    outfit_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── History reads ─────────────────────────────────────────────────────

  fn get_record(
    &self,
    record_id: Uuid,
  ) -> impl Future<Output = Result<Option<HistoryRecord>, Self::Error>> + Send + '_;

  /// Every record, newest `worn_date` first.
  fn list_history(
    &self,
  ) -> impl Future<Output = Result<Vec<HistoryRecord>, Self::Error>> + Send + '_;
}
