//! Outfits and their wear statistics.
//!
//! `worn_count` and `last_worn_date` are a projection of the history log.
//! Stores compute them on every read; nothing in the system writes them.

use std::ops::RangeInclusive;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, history::HistoryRecord, item::Item};

/// Valid values for both [`Outfit::rating`] and [`Outfit::formality_level`].
pub const SCALE: RangeInclusive<u8> = 1..=5;

// ─── Wear statistics ─────────────────────────────────────────────────────────

/// How often and how recently an outfit was worn, derived from history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WearStats {
  pub worn_count:     u32,
  pub last_worn_date: Option<NaiveDate>,
}

impl WearStats {
  /// Project the stats for `outfit_id` out of a slice of history records.
  /// Records for other outfits are ignored.
  pub fn from_records(outfit_id: Uuid, records: &[HistoryRecord]) -> Self {
    records
      .iter()
      .filter(|r| r.outfit.outfit_id == outfit_id)
      .fold(Self::default(), |acc, r| Self {
        worn_count:     acc.worn_count + 1,
        last_worn_date: acc.last_worn_date.max(Some(r.worn_date)),
      })
  }

  /// Whether the outfit was worn on or after `today - days`.
  ///
  /// `days == 0` disables the check.
  pub fn worn_within(&self, days: u32, today: NaiveDate) -> bool {
    if days == 0 {
      return false;
    }
    let Some(last) = self.last_worn_date else {
      return false;
    };
    match today.checked_sub_days(chrono::Days::new(u64::from(days))) {
      Some(cutoff) => last >= cutoff,
      None => true,
    }
  }
}

// ─── Outfit ──────────────────────────────────────────────────────────────────

/// A named combination of items, as read from a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outfit {
  pub outfit_id:       Uuid,
  pub name:            String,
  pub rating:          u8,
  /// 1 (most casual) to 5 (most formal).
  pub formality_level: u8,
  pub memo:            Option<String>,
  pub items:           Vec<Item>,
  #[serde(flatten)]
  pub stats:           WearStats,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

impl Outfit {
  pub fn contains_item(&self, item_id: Uuid) -> bool {
    self.items.iter().any(|i| i.item_id == item_id)
  }

  /// Outfits without items may exist while being authored but are never
  /// offered as recommendations.
  pub fn is_recommendable(&self) -> bool { !self.items.is_empty() }
}

/// Input to [`crate::store::WardrobeStore::add_outfit`] and
/// [`crate::store::WardrobeStore::update_outfit`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOutfit {
  pub name:            String,
  pub rating:          u8,
  pub formality_level: u8,
  pub memo:            Option<String>,
  #[serde(default)]
  pub item_ids:        Vec<Uuid>,
}

impl NewOutfit {
  /// Check the name and the rating and formality bounds.
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::InvalidInput("outfit name must not be empty".into()));
    }
    if !SCALE.contains(&self.rating) {
      return Err(Error::InvalidInput(format!(
        "rating must be between 1 and 5, got {}",
        self.rating
      )));
    }
    if !SCALE.contains(&self.formality_level) {
      return Err(Error::InvalidInput(format!(
        "formality level must be between 1 and 5, got {}",
        self.formality_level
      )));
    }
    Ok(())
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Filter for [`crate::store::WardrobeStore::find_outfits`]. Every bound is
/// inclusive; unset bounds do not filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitQuery {
  pub min_rating:    Option<u8>,
  pub min_formality: Option<u8>,
  pub max_formality: Option<u8>,
}

impl OutfitQuery {
  pub fn validate(&self) -> Result<()> {
    let bounds = [
      ("minimum rating", self.min_rating),
      ("minimum formality", self.min_formality),
      ("maximum formality", self.max_formality),
    ];
    for (what, value) in bounds {
      if let Some(v) = value.filter(|v| !SCALE.contains(v)) {
        return Err(Error::InvalidInput(format!("{what} must be between 1 and 5, got {v}")));
      }
    }
    match (self.min_formality, self.max_formality) {
      (Some(min), Some(max)) if min > max => Err(Error::InvalidInput(format!(
        "minimum formality {min} is above maximum {max}"
      ))),
      _ => Ok(()),
    }
  }

  pub fn matches(&self, outfit: &Outfit) -> bool {
    self.min_rating.is_none_or(|r| outfit.rating >= r)
      && self.min_formality.is_none_or(|f| outfit.formality_level >= f)
      && self.max_formality.is_none_or(|f| outfit.formality_level <= f)
  }
}

// ─── Presentation ────────────────────────────────────────────────────────────

/// Short human description of how long ago an outfit was last worn.
pub fn describe_last_worn(last: Option<NaiveDate>, today: NaiveDate) -> String {
  let Some(last) = last else {
    return "Never worn".to_owned();
  };
  let days = (today - last).num_days().abs();
  match days {
    0 => "Worn today".to_owned(),
    1 => "Worn yesterday".to_owned(),
    2..=6 => format!("Worn {days} days ago"),
    7..=13 => "Worn 1 week ago".to_owned(),
    14..=29 => format!("Worn {} weeks ago", days / 7),
    _ => "Not worn recently".to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(s: &str) -> NaiveDate { s.parse().unwrap() }

  #[test]
  fn worn_within_includes_the_cutoff_day() {
    let today = date("2024-05-05");
    let stats = |d: &str| WearStats {
      worn_count:     1,
      last_worn_date: Some(date(d)),
    };

    assert!(stats("2024-05-04").worn_within(2, today));
    assert!(stats("2024-05-03").worn_within(2, today));
    assert!(!stats("2024-05-02").worn_within(2, today));
    assert!(!stats("2024-04-01").worn_within(2, today));
    assert!(!stats("2024-05-05").worn_within(0, today));
    assert!(!WearStats::default().worn_within(30, today));
  }

  #[test]
  fn validate_rejects_out_of_scale_values() {
    let mut input = NewOutfit {
      name:            "Office".into(),
      rating:          4,
      formality_level: 3,
      memo:            None,
      item_ids:        vec![],
    };
    assert!(input.validate().is_ok());

    input.rating = 0;
    assert!(matches!(input.validate(), Err(Error::InvalidInput(_))));

    input.rating = 5;
    input.formality_level = 6;
    assert!(matches!(input.validate(), Err(Error::InvalidInput(_))));
  }

  #[test]
  fn outfit_query_bounds_are_checked() {
    assert!(OutfitQuery::default().validate().is_ok());
    let query = OutfitQuery {
      min_rating:    Some(4),
      min_formality: Some(2),
      max_formality: Some(3),
    };
    assert!(query.validate().is_ok());

    let inverted = OutfitQuery {
      min_formality: Some(4),
      max_formality: Some(2),
      ..Default::default()
    };
    assert!(matches!(inverted.validate(), Err(Error::InvalidInput(_))));

    let off_scale = OutfitQuery {
      min_rating: Some(0),
      ..Default::default()
    };
    assert!(matches!(off_scale.validate(), Err(Error::InvalidInput(_))));
  }

  #[test]
  fn last_worn_descriptions() {
    let today = date("2024-05-31");
    assert_eq!(describe_last_worn(None, today), "Never worn");
    assert_eq!(describe_last_worn(Some(today), today), "Worn today");
    assert_eq!(describe_last_worn(Some(date("2024-05-30")), today), "Worn yesterday");
    assert_eq!(describe_last_worn(Some(date("2024-05-27")), today), "Worn 4 days ago");
    assert_eq!(describe_last_worn(Some(date("2024-05-21")), today), "Worn 1 week ago");
    assert_eq!(describe_last_worn(Some(date("2024-05-10")), today), "Worn 3 weeks ago");
    assert_eq!(describe_last_worn(Some(date("2024-01-01")), today), "Not worn recently");
  }
}
