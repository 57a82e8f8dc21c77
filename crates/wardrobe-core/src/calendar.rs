//! Calendar aggregation over the wear-history log.
//!
//! A [`CalendarView`] is never stored; it is rebuilt from the records of a
//! month on every read, so it can never drift from the log.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{
  Error, Result,
  history::{DateRange, HistoryRecord},
};

// ─── Month ───────────────────────────────────────────────────────────────────

/// A calendar month (1-based), with its first and last day precomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "MonthParts", try_from = "MonthParts")]
pub struct MonthKey {
  first: NaiveDate,
  last:  NaiveDate,
}

#[derive(Serialize, Deserialize)]
struct MonthParts {
  year:  i32,
  month: u32,
}

impl From<MonthKey> for MonthParts {
  fn from(m: MonthKey) -> Self {
    Self {
      year:  m.year(),
      month: m.month(),
    }
  }
}

impl TryFrom<MonthParts> for MonthKey {
  type Error = Error;

  fn try_from(p: MonthParts) -> Result<Self> { Self::new(p.year, p.month) }
}

impl MonthKey {
  pub fn new(year: i32, month: u32) -> Result<Self> {
    let invalid = || Error::InvalidInput(format!("invalid month {year}-{month:02}"));
    if !(1..=12).contains(&month) {
      return Err(invalid());
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let last = first
      .checked_add_months(chrono::Months::new(1))
      .and_then(|next| next.pred_opt())
      .ok_or_else(invalid)?;
    Ok(Self { first, last })
  }

  /// The month containing `date`.
  pub fn containing(date: NaiveDate) -> Self {
    Self::new(date.year(), date.month()).unwrap_or(Self { first: date, last: date })
  }

  pub fn year(&self) -> i32 { self.first.year() }

  pub fn month(&self) -> u32 { self.first.month() }

  pub fn first_day(&self) -> NaiveDate { self.first }

  pub fn last_day(&self) -> NaiveDate { self.last }

  pub fn range(&self) -> DateRange {
    DateRange::new(self.first, self.last).unwrap_or(DateRange::day(self.first))
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.first <= date && date <= self.last
  }

  /// The month before this one; January wraps to December of the previous
  /// year. Saturates at the edge of the representable calendar.
  pub fn previous(&self) -> Self {
    let (year, month) = match self.month() {
      1 => (self.year() - 1, 12),
      m => (self.year(), m - 1),
    };
    Self::new(year, month).unwrap_or(*self)
  }

  /// The month after this one; December wraps to January of the next year.
  pub fn next(&self) -> Self {
    let (year, month) = match self.month() {
      12 => (self.year() + 1, 1),
      m => (self.year(), m + 1),
    };
    Self::new(year, month).unwrap_or(*self)
  }
}

impl std::fmt::Display for MonthKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:04}-{:02}", self.year(), self.month())
  }
}

// ─── View ────────────────────────────────────────────────────────────────────

/// What the calendar shows for a day that has a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayEntry {
  pub record_id:       Uuid,
  pub outfit_id:       Uuid,
  pub outfit_name:     String,
  pub formality_level: u8,
}

impl From<&HistoryRecord> for DayEntry {
  fn from(r: &HistoryRecord) -> Self {
    Self {
      record_id:       r.record_id,
      outfit_id:       r.outfit.outfit_id,
      outfit_name:     r.outfit.name.clone(),
      formality_level: r.outfit.formality_level,
    }
  }
}

/// Summary statistics over every fetched record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSummary {
  /// Raw record count. Exceeds the number of day entries when the log holds
  /// duplicate days.
  pub days_tracked:    usize,
  pub unique_outfits:  usize,
  /// Mean formality with one decimal place, halves rounded up; `"0"` when
  /// there are no records.
  pub avg_formality:   String,
  pub most_worn_count: usize,
}

impl CalendarSummary {
  pub fn from_records(records: &[HistoryRecord]) -> Self {
    let mut counts: HashMap<Uuid, usize> = HashMap::new();
    for r in records {
      *counts.entry(r.outfit_id()).or_default() += 1;
    }

    let avg_formality = if records.is_empty() {
      "0".to_owned()
    } else {
      let total: u32 = records
        .iter()
        .map(|r| u32::from(r.outfit.formality_level))
        .sum();
      let n = records.len() as u32;
      // Integer tenths; halves round up.
      let tenths = (total * 20 + n) / (2 * n);
      format!("{}.{}", tenths / 10, tenths % 10)
    };

    Self {
      days_tracked: records.len(),
      unique_outfits: counts.len(),
      avg_formality,
      most_worn_count: counts.values().copied().max().unwrap_or(0),
    }
  }
}

/// The computed read model for one month of the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarView {
  pub month:   MonthKey,
  /// Keyed by `YYYY-MM-DD`; days without a record are absent.
  pub days:    BTreeMap<NaiveDate, DayEntry>,
  pub summary: CalendarSummary,
}

impl CalendarView {
  /// Build the view for `month` from the records fetched for it.
  ///
  /// When two records share a day, the one created later is shown.
  pub fn build(month: MonthKey, records: &[HistoryRecord]) -> Self {
    let mut ordered: Vec<&HistoryRecord> = records.iter().collect();
    // Stable sort: equal timestamps keep their fetch order, later wins.
    ordered.sort_by_key(|r| r.created_at);

    let mut days = BTreeMap::new();
    for record in ordered {
      if let Some(shadowed) = days.insert(record.worn_date, DayEntry::from(record)) {
        warn!(
          date = %record.worn_date,
          kept = %record.record_id,
          shadowed = %shadowed.record_id,
          "duplicate history records for one day"
        );
      }
    }

    Self {
      month,
      days,
      summary: CalendarSummary::from_records(records),
    }
  }

  pub fn entry(&self, date: NaiveDate) -> Option<&DayEntry> { self.days.get(&date) }
}

/// Number of distinct days that have at least one record.
pub fn recorded_days(records: &[HistoryRecord]) -> usize {
  records.iter().map(|r| r.worn_date).collect::<HashSet<_>>().len()
}

/// Totals shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeStats {
  pub item_count:    usize,
  pub outfit_count:  usize,
  /// Distinct days with at least one history record.
  pub recorded_days: usize,
}
