//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that text ordering matches time ordering. Calendar days are stored as
//! `YYYY-MM-DD`. UUIDs are stored as hyphenated lowercase strings. Enums use
//! their `strum` string forms.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use uuid::Uuid;
use wardrobe_core::{
  history::{HistoryRecord, OutfitRef},
  item::{Item, ItemCategory, Season},
  outfit::{Outfit, WearStats},
};

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

fn decode_enum<T: FromStr>(column: &'static str, value: &str) -> Result<T> {
  T::from_str(value).map_err(|_| Error::Decode {
    column,
    value: value.to_owned(),
  })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `items` row.
pub struct RawItem {
  pub item_id:    String,
  pub category:   String,
  pub name:       String,
  pub image_ref:  String,
  pub color:      String,
  pub season:     Option<String>,
  pub created_at: String,
  pub updated_at: String,
}

impl RawItem {
  /// Column order expected by [`RawItem::from_row`], prefixed with `i.`.
  pub const COLUMNS: &'static str =
    "i.item_id, i.category, i.name, i.image_ref, i.color, i.season, i.created_at, i.updated_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      item_id:    row.get(0)?,
      category:   row.get(1)?,
      name:       row.get(2)?,
      image_ref:  row.get(3)?,
      color:      row.get(4)?,
      season:     row.get(5)?,
      created_at: row.get(6)?,
      updated_at: row.get(7)?,
    })
  }

  pub fn into_item(self) -> Result<Item> {
    Ok(Item {
      item_id:    decode_uuid(&self.item_id)?,
      category:   decode_enum::<ItemCategory>("category", &self.category)?,
      name:       self.name,
      image_ref:  self.image_ref,
      color:      self.color,
      season:     self
        .season
        .as_deref()
        .map(|s| decode_enum::<Season>("season", s))
        .transpose()?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// An `outfits` row joined with its history aggregate and its items.
pub struct RawOutfit {
  pub outfit_id:       String,
  pub name:            String,
  pub rating:          u8,
  pub formality_level: u8,
  pub memo:            Option<String>,
  pub created_at:      String,
  pub updated_at:      String,
  pub worn_count:      u32,
  pub last_worn_date:  Option<String>,
  pub items:           Vec<RawItem>,
}

impl RawOutfit {
  /// Select list and join producing the columns [`RawOutfit::from_row`]
  /// reads. Must be followed by a `GROUP BY o.outfit_id`.
  pub const SELECT: &'static str = "SELECT
       o.outfit_id, o.name, o.rating, o.formality_level, o.memo,
       o.created_at, o.updated_at,
       COUNT(h.record_id) AS worn_count,
       MAX(h.worn_date)   AS last_worn_date
     FROM outfits o
     LEFT JOIN history h ON h.outfit_id = o.outfit_id";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      outfit_id:       row.get(0)?,
      name:            row.get(1)?,
      rating:          row.get(2)?,
      formality_level: row.get(3)?,
      memo:            row.get(4)?,
      created_at:      row.get(5)?,
      updated_at:      row.get(6)?,
      worn_count:      row.get(7)?,
      last_worn_date:  row.get(8)?,
      items:           Vec::new(),
    })
  }

  pub fn into_outfit(self) -> Result<Outfit> {
    Ok(Outfit {
      outfit_id:       decode_uuid(&self.outfit_id)?,
      name:            self.name,
      rating:          self.rating,
      formality_level: self.formality_level,
      memo:            self.memo,
      items:           self
        .items
        .into_iter()
        .map(RawItem::into_item)
        .collect::<Result<_>>()?,
      stats:           WearStats {
        worn_count:     self.worn_count,
        last_worn_date: self.last_worn_date.as_deref().map(decode_date).transpose()?,
      },
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}

/// A `history` row joined with the outfit fields it carries.
pub struct RawRecord {
  pub record_id:       String,
  pub outfit_id:       String,
  pub outfit_name:     String,
  pub formality_level: u8,
  pub worn_date:       String,
  pub created_at:      String,
}

impl RawRecord {
  pub const SELECT: &'static str = "SELECT
       h.record_id, h.outfit_id, o.name, o.formality_level,
       h.worn_date, h.created_at
     FROM history h
     JOIN outfits o ON o.outfit_id = h.outfit_id";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record_id:       row.get(0)?,
      outfit_id:       row.get(1)?,
      outfit_name:     row.get(2)?,
      formality_level: row.get(3)?,
      worn_date:       row.get(4)?,
      created_at:      row.get(5)?,
    })
  }

  pub fn into_record(self) -> Result<HistoryRecord> {
    Ok(HistoryRecord {
      record_id:  decode_uuid(&self.record_id)?,
      outfit:     OutfitRef {
        outfit_id:       decode_uuid(&self.outfit_id)?,
        name:            self.outfit_name,
        formality_level: self.formality_level,
      },
      worn_date:  decode_date(&self.worn_date)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_are_fixed_width() {
    let a = "2024-05-01T08:00:00Z".parse::<DateTime<Utc>>().unwrap();
    let b = a + chrono::Duration::microseconds(1500);
    assert_eq!(encode_dt(a), "2024-05-01T08:00:00.000000Z");
    assert_eq!(encode_dt(a).len(), encode_dt(b).len());
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(decode_dt(&encode_dt(b)).unwrap(), b);
  }

  #[test]
  fn unknown_enum_values_are_decode_errors() {
    let err = decode_enum::<ItemCategory>("category", "HATS").unwrap_err();
    assert!(matches!(err, Error::Decode { column: "category", .. }));
    assert!(decode_date("2024-13-01").is_err());
  }
}
