//! History records and the timeout-bounded history client.
//!
//! A history record says "this outfit was worn on this day". Records are only
//! ever created or deleted, never edited.

use std::{future::Future, sync::Arc, time::Duration};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, calendar::MonthKey, store::HistoryStore};

// ─── Records ─────────────────────────────────────────────────────────────────

/// The slice of an outfit a history record carries along for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitRef {
  pub outfit_id:       Uuid,
  pub name:            String,
  pub formality_level: u8,
}

/// One entry of the wear-history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
  pub record_id:  Uuid,
  pub outfit:     OutfitRef,
  /// Calendar day the outfit was worn; no time component.
  pub worn_date:  NaiveDate,
  /// Server-assigned; never changes after creation.
  pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
  pub fn outfit_id(&self) -> Uuid { self.outfit.outfit_id }
}

// ─── Date range ──────────────────────────────────────────────────────────────

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
  start: NaiveDate,
  end:   NaiveDate,
}

impl DateRange {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
    if start > end {
      return Err(Error::InvalidInput(format!(
        "range start {start} is after end {end}"
      )));
    }
    Ok(Self { start, end })
  }

  /// A range covering exactly one day.
  pub fn day(date: NaiveDate) -> Self { Self { start: date, end: date } }

  pub fn start(&self) -> NaiveDate { self.start }

  pub fn end(&self) -> NaiveDate { self.end }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start <= date && date <= self.end
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Typed, timeout-bounded access to a [`HistoryStore`].
///
/// Every call either completes within `timeout` or fails with
/// [`Error::Unavailable`]. Store errors are converted into the core taxonomy
/// unchanged; nothing is retried here.
pub struct HistoryClient<S> {
  store:   Arc<S>,
  timeout: Duration,
}

impl<S> Clone for HistoryClient<S> {
  fn clone(&self) -> Self {
    Self {
      store:   Arc::clone(&self.store),
      timeout: self.timeout,
    }
  }
}

impl<S: HistoryStore> HistoryClient<S> {
  pub fn new(store: Arc<S>, timeout: Duration) -> Self { Self { store, timeout } }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn timeout(&self) -> Duration { self.timeout }

  pub async fn list(&self, range: DateRange) -> Result<Vec<HistoryRecord>> {
    bounded(self.timeout, "list history", self.store.list_range(range)).await
  }

  pub async fn list_month(&self, month: MonthKey) -> Result<Vec<HistoryRecord>> {
    self.list(month.range()).await
  }

  pub async fn list_by_outfit(&self, outfit_id: Uuid) -> Result<Vec<HistoryRecord>> {
    bounded(
      self.timeout,
      "list history by outfit",
      self.store.list_by_outfit(outfit_id),
    )
    .await
  }

  pub async fn create(
    &self,
    outfit_id: Uuid,
    worn_date: NaiveDate,
  ) -> Result<HistoryRecord> {
    bounded(
      self.timeout,
      "create history",
      self.store.create(outfit_id, worn_date),
    )
    .await
  }

  pub async fn delete(&self, record_id: Uuid) -> Result<()> {
    bounded(self.timeout, "delete history", self.store.delete(record_id)).await
  }
}

/// Await `fut` for at most `limit`, mapping its error into [`Error`].
pub(crate) async fn bounded<T, E, F>(
  limit: Duration,
  op: &'static str,
  fut: F,
) -> Result<T>
where
  F: Future<Output = Result<T, E>>,
  E: Into<Error>,
{
  match tokio::time::timeout(limit, fut).await {
    Ok(res) => res.map_err(Into::into),
    Err(_) => Err(Error::Unavailable(format!(
      "{op} timed out after {}ms",
      limit.as_millis()
    ))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(s: &str) -> NaiveDate { s.parse().unwrap() }

  #[test]
  fn range_rejects_reversed_bounds() {
    assert!(DateRange::new(date("2024-05-02"), date("2024-05-01")).is_err());

    let range = DateRange::new(date("2024-05-01"), date("2024-05-31")).unwrap();
    assert!(range.contains(date("2024-05-01")));
    assert!(range.contains(date("2024-05-31")));
    assert!(!range.contains(date("2024-06-01")));
  }

  #[test]
  fn record_serialises_dates_as_plain_days() {
    let record = HistoryRecord {
      record_id:  Uuid::nil(),
      outfit:     OutfitRef {
        outfit_id:       Uuid::nil(),
        name:            "Weekend".into(),
        formality_level: 2,
      },
      worn_date:  date("2024-05-01"),
      created_at: Utc::now(),
    };
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["wornDate"], "2024-05-01");
    assert_eq!(json["outfit"]["formalityLevel"], 2);
  }
}
