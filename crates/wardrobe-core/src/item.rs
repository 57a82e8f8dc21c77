//! Wardrobe items: the individual garments outfits are composed from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

/// Which slot of an outfit an item fills.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ItemCategory {
  Tops,
  Bottoms,
  Shoes,
  Outerwear,
  Accessories,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Season {
  Spring,
  Summer,
  Fall,
  Winter,
}

/// A single garment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
  pub item_id:    Uuid,
  pub category:   ItemCategory,
  pub name:       String,
  /// Opaque reference to the item's picture; never interpreted here.
  pub image_ref:  String,
  pub color:      String,
  pub season:     Option<Season>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::WardrobeStore::add_item`] and
/// [`crate::store::WardrobeStore::update_item`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
  pub category:  ItemCategory,
  pub name:      String,
  pub image_ref: String,
  #[serde(default)]
  pub color:     String,
  pub season:    Option<Season>,
}

impl NewItem {
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::InvalidInput("item name must not be empty".into()));
    }
    if self.image_ref.trim().is_empty() {
      return Err(Error::InvalidInput("item image reference must not be empty".into()));
    }
    Ok(())
  }
}

/// Filter for [`crate::store::WardrobeStore::list_items`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemQuery {
  pub category: Option<ItemCategory>,
  pub season:   Option<Season>,
  pub color:    Option<String>,
  /// Case-insensitive substring of the item name.
  pub name:     Option<String>,
}

impl ItemQuery {
  pub fn matches(&self, item: &Item) -> bool {
    self.category.is_none_or(|c| c == item.category)
      && self.season.is_none_or(|s| item.season == Some(s))
      && self
        .color
        .as_deref()
        .is_none_or(|c| item.color.eq_ignore_ascii_case(c))
      && self.name.as_deref().is_none_or(|n| {
        item
          .name
          .to_ascii_lowercase()
          .contains(&n.to_ascii_lowercase())
      })
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn category_string_forms_match_wire_format() {
    assert_eq!(ItemCategory::Outerwear.as_ref(), "OUTERWEAR");
    assert_eq!(ItemCategory::from_str("tops").unwrap(), ItemCategory::Tops);
    assert_eq!(
      serde_json::to_string(&ItemCategory::Accessories).unwrap(),
      "\"ACCESSORIES\""
    );
  }

  #[test]
  fn item_query_filters_on_every_set_field() {
    let item = Item {
      item_id:    Uuid::new_v4(),
      category:   ItemCategory::Shoes,
      name:       "Loafers".into(),
      image_ref:  "img/loafers.png".into(),
      color:      "Brown".into(),
      season:     Some(Season::Fall),
      created_at: Utc::now(),
      updated_at: Utc::now(),
    };

    assert!(ItemQuery::default().matches(&item));
    assert!(
      ItemQuery {
        category: Some(ItemCategory::Shoes),
        season:   Some(Season::Fall),
        color:    Some("brown".into()),
        name:     Some("LOAF".into()),
      }
      .matches(&item)
    );
    assert!(
      !ItemQuery {
        season: Some(Season::Summer),
        ..Default::default()
      }
      .matches(&item)
    );
    assert!(
      !ItemQuery {
        name: Some("boot".into()),
        ..Default::default()
      }
      .matches(&item)
    );
  }
}
