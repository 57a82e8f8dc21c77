//! The wear-day invariant manager.
//!
//! At most one outfit may be recorded per calendar day. Storage does not
//! enforce this, so every write goes through [`WearDayManager`], which checks
//! the day before writing and re-reads it afterwards to resolve races between
//! independent clients.
//!
//! The manager keeps no state of its own. Whether an outfit is "worn today"
//! is always answered by scanning that outfit's history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  history::{DateRange, HistoryClient, HistoryRecord},
  outfit::WearStats,
  store::HistoryStore,
};

// ─── States and outcomes ─────────────────────────────────────────────────────

/// Whether an outfit holds a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum WearDayState {
  NotWornToday,
  WornToday { record: HistoryRecord },
}

impl WearDayState {
  pub fn is_worn(&self) -> bool { matches!(self, Self::WornToday { .. }) }

  pub fn record(&self) -> Option<&HistoryRecord> {
    match self {
      Self::WornToday { record } => Some(record),
      Self::NotWornToday => None,
    }
  }
}

/// Result of [`WearDayManager::record_today`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "record", rename_all = "camelCase")]
pub enum RecordOutcome {
  /// A new record was written by this call.
  Recorded(HistoryRecord),
  /// The outfit already held the day; nothing was written, or a duplicate
  /// written by this call was removed again.
  AlreadyRecorded(HistoryRecord),
}

impl RecordOutcome {
  pub fn record(&self) -> &HistoryRecord {
    match self {
      Self::Recorded(r) | Self::AlreadyRecorded(r) => r,
    }
  }

  pub fn is_new(&self) -> bool { matches!(self, Self::Recorded(_)) }
}

/// Passes `change_today` makes before giving up on a day that keeps
/// gaining records.
const CLEAR_ATTEMPTS: usize = 3;

/// The record that survives when several exist for one day: the earliest
/// created, ties broken by id. Every client computes the same keeper.
fn keeper(records: &[HistoryRecord]) -> Option<&HistoryRecord> {
  records.iter().min_by_key(|r| (r.created_at, r.record_id))
}

// ─── Manager ─────────────────────────────────────────────────────────────────

pub struct WearDayManager<S> {
  history: HistoryClient<S>,
}

impl<S> Clone for WearDayManager<S> {
  fn clone(&self) -> Self {
    Self {
      history: self.history.clone(),
    }
  }
}

impl<S: HistoryStore> WearDayManager<S> {
  pub fn new(history: HistoryClient<S>) -> Self { Self { history } }

  pub fn history(&self) -> &HistoryClient<S> { &self.history }

  /// The outfit's records on `date`, from a scan of its history.
  async fn records_on(&self, outfit_id: Uuid, date: NaiveDate) -> Result<Vec<HistoryRecord>> {
    let records = self.history.list_by_outfit(outfit_id).await?;
    Ok(records.into_iter().filter(|r| r.worn_date == date).collect())
  }

  /// Scan the outfit's history for a record on `date`.
  pub async fn status(&self, outfit_id: Uuid, date: NaiveDate) -> Result<WearDayState> {
    let on_day = self.records_on(outfit_id, date).await?;

    Ok(match keeper(&on_day) {
      Some(record) => WearDayState::WornToday {
        record: record.clone(),
      },
      None => WearDayState::NotWornToday,
    })
  }

  /// Derive the outfit's wear statistics from its history.
  pub async fn wear_stats(&self, outfit_id: Uuid) -> Result<WearStats> {
    let records = self.history.list_by_outfit(outfit_id).await?;
    Ok(WearStats::from_records(outfit_id, &records))
  }

  /// Record `outfit_id` as worn on `date`.
  ///
  /// Idempotent: if the outfit already holds the day, the existing record is
  /// returned and nothing is written. Fails with
  /// [`Error::InvariantViolation`] if a different outfit holds the day.
  /// A create that times out leaves no record behind.
  pub async fn record_today(
    &self,
    outfit_id: Uuid,
    date: NaiveDate,
  ) -> Result<RecordOutcome> {
    let before = self.history.list(DateRange::day(date)).await?;

    if let Some(holder) = keeper(&before) {
      if holder.outfit_id() == outfit_id {
        debug!(%outfit_id, %date, record_id = %holder.record_id, "already recorded");
        return Ok(RecordOutcome::AlreadyRecorded(holder.clone()));
      }
      return Err(occupied(date, holder));
    }

    let created = match self.history.create(outfit_id, date).await {
      Ok(created) => created,
      Err(e @ Error::Unavailable(_)) => {
        return Err(self.discard_late_write(outfit_id, date, &before, e).await);
      }
      Err(e) => return Err(e),
    };
    debug!(%outfit_id, %date, record_id = %created.record_id, "recorded");

    // Re-read the day to catch a concurrent writer.
    let day = match self.history.list(DateRange::day(date)).await {
      Ok(day) => day,
      Err(e) => {
        warn!(%date, error = %e, "could not verify day after recording");
        return Ok(RecordOutcome::Recorded(created));
      }
    };

    let kept = match keeper(&day) {
      Some(k) if k.record_id != created.record_id => k.clone(),
      _ => return Ok(RecordOutcome::Recorded(created)),
    };

    warn!(
      %date,
      ours = %created.record_id,
      kept = %kept.record_id,
      "concurrent record for the same day; removing ours"
    );
    match self.history.delete(created.record_id).await {
      Ok(()) | Err(Error::RecordNotFound(_)) => {}
      Err(e) => {
        return Err(Error::InvariantViolation {
          date,
          detail: format!(
            "duplicate record {} could not be removed: {e}",
            created.record_id
          ),
        });
      }
    }

    if kept.outfit_id() == outfit_id {
      Ok(RecordOutcome::AlreadyRecorded(kept))
    } else {
      Err(occupied(date, &kept))
    }
  }

  /// A timed-out create may still land in the store. Remove any record for
  /// `outfit_id` on `date` that was not there before, then report `cause`.
  async fn discard_late_write(
    &self,
    outfit_id: Uuid,
    date: NaiveDate,
    before: &[HistoryRecord],
    cause: Error,
  ) -> Error {
    let after = match self.history.list(DateRange::day(date)).await {
      Ok(after) => after,
      Err(e) => {
        return Error::InvariantViolation {
          date,
          detail: format!("{cause}; could not check for a late write: {e}"),
        };
      }
    };

    let late = after.iter().filter(|r| {
      r.outfit_id() == outfit_id && !before.iter().any(|b| b.record_id == r.record_id)
    });
    for record in late {
      warn!(%date, record_id = %record.record_id, "removing record written after create timed out");
      match self.history.delete(record.record_id).await {
        Ok(()) | Err(Error::RecordNotFound(_)) => {}
        Err(e) => {
          return Error::InvariantViolation {
            date,
            detail: format!(
              "record {} written after a timed-out create could not be removed: {e}",
              record.record_id
            ),
          };
        }
      }
    }
    cause
  }

  /// Free `date` for a different outfit by removing every record
  /// `outfit_id` has on that day.
  ///
  /// Returns the record the day was held by. Succeeds only once the outfit
  /// has no record left on `date`; if a delete fails its error is returned
  /// and the outfit still holds the day.
  pub async fn change_today(
    &self,
    outfit_id: Uuid,
    date: NaiveDate,
  ) -> Result<HistoryRecord> {
    let mut held = self.records_on(outfit_id, date).await?;
    let Some(removed) = keeper(&held).cloned() else {
      return Err(Error::NotWornOn { outfit_id, date });
    };

    for _ in 0..CLEAR_ATTEMPTS {
      for record in &held {
        match self.history.delete(record.record_id).await {
          Ok(()) => debug!(%outfit_id, %date, record_id = %record.record_id, "record removed"),
          // Someone else removed it between our lookup and delete.
          Err(Error::RecordNotFound(_)) => {
            debug!(%outfit_id, %date, record_id = %record.record_id, "record already gone")
          }
          Err(e) => return Err(e),
        }
      }

      held = self.records_on(outfit_id, date).await?;
      if held.is_empty() {
        debug!(%outfit_id, %date, "day freed");
        return Ok(removed);
      }
      warn!(%outfit_id, %date, remaining = held.len(), "records reappeared while freeing day");
    }

    Err(Error::InvariantViolation {
      date,
      detail: format!(
        "{} record(s) for outfit {outfit_id} remain after freeing the day",
        held.len()
      ),
    })
  }
}

fn occupied(date: NaiveDate, holder: &HistoryRecord) -> Error {
  Error::InvariantViolation {
    date,
    detail: format!(
      "day is already recorded for outfit {} ({})",
      holder.outfit.name,
      holder.outfit_id()
    ),
  }
}
