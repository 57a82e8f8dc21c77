//! [`SqliteStore`]: the SQLite implementation of the wardrobe store traits.

use std::{collections::HashSet, path::Path};

use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension as _};
use tracing::debug;
use uuid::Uuid;
use wardrobe_core::{
  history::{DateRange, HistoryRecord},
  item::{Item, ItemQuery, NewItem},
  outfit::{NewOutfit, Outfit, OutfitQuery},
  store::{HistoryStore, OutfitCatalog, RecommendQuery, WardrobeStore},
};

use crate::{
  Error, Result,
  encode::{RawItem, RawOutfit, RawRecord, decode_uuid, encode_date, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Query helpers ───────────────────────────────────────────────────────────
//
// These run on the connection thread inside `Connection::call`.

fn query_outfits(
  conn: &Connection,
  tail: &str,
  params: impl rusqlite::Params,
) -> rusqlite::Result<Vec<RawOutfit>> {
  let mut stmt = conn.prepare(&format!("{} {tail}", RawOutfit::SELECT))?;
  let mut outfits = stmt
    .query_map(params, RawOutfit::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut items = conn.prepare_cached(&format!(
    "SELECT {} FROM outfit_items oi
     JOIN items i ON i.item_id = oi.item_id
     WHERE oi.outfit_id = ?1
     ORDER BY oi.position",
    RawItem::COLUMNS
  ))?;
  for outfit in &mut outfits {
    outfit.items = items
      .query_map([&outfit.outfit_id], RawItem::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
  }
  Ok(outfits)
}

fn query_records(
  conn: &Connection,
  tail: &str,
  params: impl rusqlite::Params,
) -> rusqlite::Result<Vec<RawRecord>> {
  let mut stmt = conn.prepare(&format!("{} {tail}", RawRecord::SELECT))?;
  stmt
    .query_map(params, RawRecord::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()
}

fn outfit_exists(conn: &Connection, outfit_id: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM outfits WHERE outfit_id = ?1",
        [outfit_id],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

/// The first id in `item_ids` with no `items` row.
fn first_missing_item(conn: &Connection, item_ids: &[String]) -> rusqlite::Result<Option<String>> {
  let mut stmt = conn.prepare_cached("SELECT 1 FROM items WHERE item_id = ?1")?;
  for id in item_ids {
    if !stmt.exists([id])? {
      return Ok(Some(id.clone()));
    }
  }
  Ok(None)
}

fn replace_outfit_items(
  conn: &Connection,
  outfit_id: &str,
  item_ids: &[String],
) -> rusqlite::Result<()> {
  conn.execute("DELETE FROM outfit_items WHERE outfit_id = ?1", [outfit_id])?;
  let mut stmt = conn.prepare_cached(
    "INSERT INTO outfit_items (outfit_id, item_id, position) VALUES (?1, ?2, ?3)",
  )?;
  for (position, item_id) in item_ids.iter().enumerate() {
    stmt.execute(rusqlite::params![outfit_id, item_id, position as i64])?;
  }
  Ok(())
}

/// Encode item ids, dropping repeats while keeping first-seen order.
fn encode_item_ids(ids: &[Uuid]) -> Vec<String> {
  let mut seen = HashSet::new();
  ids
    .iter()
    .filter(|id| seen.insert(**id))
    .map(|id| encode_uuid(*id))
    .collect()
}

/// Why an outfit write did not happen.
enum OutfitWrite {
  Done,
  MissingOutfit,
  MissingItem(String),
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A wardrobe store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_outfit(&self, outfit_id: Uuid) -> Result<Option<Outfit>> {
    let id_str = encode_uuid(outfit_id);

    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          query_outfits(conn, "WHERE o.outfit_id = ?1 GROUP BY o.outfit_id", [id_str])?
            .pop(),
        )
      })
      .await?;

    raw.map(RawOutfit::into_outfit).transpose()
  }

  async fn fetch_records(
    &self,
    tail: &'static str,
    params: Vec<String>,
  ) -> Result<Vec<HistoryRecord>> {
    let raws = self
      .conn
      .call(move |conn| Ok(query_records(conn, tail, rusqlite::params_from_iter(params))?))
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }
}

// ─── HistoryStore impl ───────────────────────────────────────────────────────

impl HistoryStore for SqliteStore {
  type Error = Error;

  async fn list_range(&self, range: DateRange) -> Result<Vec<HistoryRecord>> {
    self
      .fetch_records(
        "WHERE h.worn_date BETWEEN ?1 AND ?2
         ORDER BY h.worn_date, h.created_at, h.record_id",
        vec![encode_date(range.start()), encode_date(range.end())],
      )
      .await
  }

  async fn list_by_outfit(&self, outfit_id: Uuid) -> Result<Vec<HistoryRecord>> {
    let id_str = encode_uuid(outfit_id);

    let raws = self
      .conn
      .call(move |conn| {
        if !outfit_exists(conn, &id_str)? {
          return Ok(None);
        }
        Ok(Some(query_records(
          conn,
          "WHERE h.outfit_id = ?1 ORDER BY h.worn_date DESC, h.created_at DESC",
          [id_str],
        )?))
      })
      .await?
      .ok_or(Error::OutfitNotFound(outfit_id))?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn create(&self, outfit_id: Uuid, worn_date: NaiveDate) -> Result<HistoryRecord> {
    let record_id = Uuid::new_v4();
    let record_id_str = encode_uuid(record_id);
    let outfit_id_str = encode_uuid(outfit_id);
    let date_str = encode_date(worn_date);
    let at_str = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        if !outfit_exists(conn, &outfit_id_str)? {
          return Ok(None);
        }
        conn.execute(
          "INSERT INTO history (record_id, outfit_id, worn_date, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![record_id_str, outfit_id_str, date_str, at_str],
        )?;
        Ok(query_records(conn, "WHERE h.record_id = ?1", [&record_id_str])?.pop())
      })
      .await?
      .ok_or(Error::OutfitNotFound(outfit_id))?;

    debug!(%record_id, %outfit_id, %worn_date, "history record inserted");
    raw.into_record()
  }

  async fn delete(&self, record_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(record_id);

    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM history WHERE record_id = ?1", [id_str])?))
      .await?;

    if removed == 0 {
      return Err(Error::RecordNotFound(record_id));
    }
    Ok(())
  }
}

// ─── OutfitCatalog impl ──────────────────────────────────────────────────────

impl OutfitCatalog for SqliteStore {
  async fn get_outfit(&self, outfit_id: Uuid) -> Result<Option<Outfit>> {
    self.fetch_outfit(outfit_id).await
  }

  async fn recommend(&self, query: RecommendQuery) -> Result<Vec<Outfit>> {
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let cutoff = as_of
      .checked_sub_days(chrono::Days::new(u64::from(query.exclude_days)))
      .unwrap_or(NaiveDate::MIN);
    let cutoff_str = encode_date(cutoff);
    let exclude = query.exclude_recent;

    let raws = self
      .conn
      .call(move |conn| {
        Ok(query_outfits(
          conn,
          "WHERE o.rating >= ?1 AND o.formality_level >= ?2
           GROUP BY o.outfit_id
           HAVING NOT ?3 OR MAX(h.worn_date) IS NULL OR MAX(h.worn_date) < ?4
           ORDER BY MAX(h.worn_date) IS NOT NULL, MAX(h.worn_date), o.created_at, o.outfit_id",
          rusqlite::params![query.min_rating, query.min_formality, exclude, cutoff_str],
        )?)
      })
      .await?;

    raws.into_iter().map(RawOutfit::into_outfit).collect()
  }
}

// ─── WardrobeStore impl ──────────────────────────────────────────────────────

impl WardrobeStore for SqliteStore {
  // ── Items ─────────────────────────────────────────────────────────────────

  async fn add_item(&self, input: NewItem) -> Result<Item> {
    input.validate()?;
    let item_id = Uuid::new_v4();
    let id_str = encode_uuid(item_id);
    let category = input.category.as_ref().to_owned();
    let season = input.season.map(|s| s.as_ref().to_owned());
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO items (item_id, category, name, image_ref, color, season, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
          rusqlite::params![
            id_str,
            category,
            input.name,
            input.image_ref,
            input.color,
            season,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    self.get_item(item_id).await?.ok_or(Error::ItemNotFound(item_id))
  }

  async fn get_item(&self, item_id: Uuid) -> Result<Option<Item>> {
    let id_str = encode_uuid(item_id);

    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM items i WHERE i.item_id = ?1", RawItem::COLUMNS),
              [id_str],
              RawItem::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawItem::into_item).transpose()
  }

  async fn list_items<'a>(&'a self, query: &'a ItemQuery) -> Result<Vec<Item>> {
    let category = query.category.map(|c| c.as_ref().to_owned());
    let season = query.season.map(|s| s.as_ref().to_owned());
    let color = query.color.clone();
    let name = query.name.clone();

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM items i
           WHERE (?1 IS NULL OR i.category = ?1)
             AND (?2 IS NULL OR i.season = ?2)
             AND (?3 IS NULL OR lower(i.color) = lower(?3))
             AND (?4 IS NULL OR instr(lower(i.name), lower(?4)) > 0)
           ORDER BY i.created_at DESC, i.item_id",
          RawItem::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![category, season, color, name], RawItem::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawItem::into_item).collect()
  }

  async fn update_item(&self, item_id: Uuid, input: NewItem) -> Result<Item> {
    input.validate()?;
    let id_str = encode_uuid(item_id);
    let category = input.category.as_ref().to_owned();
    let season = input.season.map(|s| s.as_ref().to_owned());
    let at_str = encode_dt(Utc::now());

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE items
           SET category = ?2, name = ?3, image_ref = ?4, color = ?5, season = ?6, updated_at = ?7
           WHERE item_id = ?1",
          rusqlite::params![
            id_str,
            category,
            input.name,
            input.image_ref,
            input.color,
            season,
            at_str,
          ],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::ItemNotFound(item_id));
    }
    self.get_item(item_id).await?.ok_or(Error::ItemNotFound(item_id))
  }

  async fn delete_item(&self, item_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(item_id);

    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM items WHERE item_id = ?1", [id_str])?))
      .await?;

    if removed == 0 {
      return Err(Error::ItemNotFound(item_id));
    }
    Ok(())
  }

  // ── Outfits ───────────────────────────────────────────────────────────────

  async fn add_outfit(&self, input: NewOutfit) -> Result<Outfit> {
    input.validate()?;
    let outfit_id = Uuid::new_v4();
    let id_str = encode_uuid(outfit_id);
    let item_ids = encode_item_ids(&input.item_ids);
    let at_str = encode_dt(Utc::now());

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Some(missing) = first_missing_item(&tx, &item_ids)? {
          return Ok(OutfitWrite::MissingItem(missing));
        }
        tx.execute(
          "INSERT INTO outfits (outfit_id, name, rating, formality_level, memo, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
          rusqlite::params![
            id_str,
            input.name,
            input.rating,
            input.formality_level,
            input.memo,
            at_str,
          ],
        )?;
        replace_outfit_items(&tx, &id_str, &item_ids)?;
        tx.commit()?;
        Ok(OutfitWrite::Done)
      })
      .await?;

    self.finish_outfit_write(outfit_id, outcome).await
  }

  async fn list_outfits(&self) -> Result<Vec<Outfit>> {
    let raws = self
      .conn
      .call(|conn| {
        Ok(query_outfits(
          conn,
          "GROUP BY o.outfit_id ORDER BY o.created_at DESC, o.outfit_id",
          [],
        )?)
      })
      .await?;

    raws.into_iter().map(RawOutfit::into_outfit).collect()
  }

  async fn find_outfits<'a>(&'a self, query: &'a OutfitQuery) -> Result<Vec<Outfit>> {
    query.validate()?;
    let OutfitQuery {
      min_rating,
      min_formality,
      max_formality,
    } = *query;

    let raws = self
      .conn
      .call(move |conn| {
        Ok(query_outfits(
          conn,
          "WHERE (?1 IS NULL OR o.rating >= ?1)
             AND (?2 IS NULL OR o.formality_level >= ?2)
             AND (?3 IS NULL OR o.formality_level <= ?3)
           GROUP BY o.outfit_id
           ORDER BY o.created_at DESC, o.outfit_id",
          rusqlite::params![min_rating, min_formality, max_formality],
        )?)
      })
      .await?;

    raws.into_iter().map(RawOutfit::into_outfit).collect()
  }

  async fn update_outfit(&self, outfit_id: Uuid, input: NewOutfit) -> Result<Outfit> {
    input.validate()?;
    let id_str = encode_uuid(outfit_id);
    let item_ids = encode_item_ids(&input.item_ids);
    let at_str = encode_dt(Utc::now());

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !outfit_exists(&tx, &id_str)? {
          return Ok(OutfitWrite::MissingOutfit);
        }
        if let Some(missing) = first_missing_item(&tx, &item_ids)? {
          return Ok(OutfitWrite::MissingItem(missing));
        }
        tx.execute(
          "UPDATE outfits
           SET name = ?2, rating = ?3, formality_level = ?4, memo = ?5, updated_at = ?6
           WHERE outfit_id = ?1",
          rusqlite::params![
            id_str,
            input.name,
            input.rating,
            input.formality_level,
            input.memo,
            at_str,
          ],
        )?;
        replace_outfit_items(&tx, &id_str, &item_ids)?;
        tx.commit()?;
        Ok(OutfitWrite::Done)
      })
      .await?;

    self.finish_outfit_write(outfit_id, outcome).await
  }

  async fn delete_outfit(&self, outfit_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(outfit_id);

    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM outfits WHERE outfit_id = ?1", [id_str])?))
      .await?;

    if removed == 0 {
      return Err(Error::OutfitNotFound(outfit_id));
    }
    debug!(%outfit_id, "outfit deleted with its history");
    Ok(())
  }

  // ── History reads ─────────────────────────────────────────────────────────

  async fn get_record(&self, record_id: Uuid) -> Result<Option<HistoryRecord>> {
    Ok(
      self
        .fetch_records("WHERE h.record_id = ?1", vec![encode_uuid(record_id)])
        .await?
        .pop(),
    )
  }

  async fn list_history(&self) -> Result<Vec<HistoryRecord>> {
    self
      .fetch_records("ORDER BY h.worn_date DESC, h.created_at DESC", Vec::new())
      .await
  }
}

impl SqliteStore {
  async fn finish_outfit_write(&self, outfit_id: Uuid, outcome: OutfitWrite) -> Result<Outfit> {
    match outcome {
      OutfitWrite::Done => {}
      OutfitWrite::MissingOutfit => return Err(Error::OutfitNotFound(outfit_id)),
      OutfitWrite::MissingItem(id) => return Err(Error::ItemNotFound(decode_uuid(&id)?)),
    }
    self
      .fetch_outfit(outfit_id)
      .await?
      .ok_or(Error::OutfitNotFound(outfit_id))
  }
}
