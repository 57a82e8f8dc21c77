//! SQL schema for the wardrobe SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS items (
    item_id     TEXT PRIMARY KEY,
    category    TEXT NOT NULL,   -- 'TOPS' | 'BOTTOMS' | 'SHOES' | 'OUTERWEAR' | 'ACCESSORIES'
    name        TEXT NOT NULL,
    image_ref   TEXT NOT NULL,
    color       TEXT NOT NULL DEFAULT '',
    season      TEXT,            -- 'SPRING' | 'SUMMER' | 'FALL' | 'WINTER' or NULL
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS outfits (
    outfit_id        TEXT PRIMARY KEY,
    name             TEXT NOT NULL,
    rating           INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    formality_level  INTEGER NOT NULL CHECK (formality_level BETWEEN 1 AND 5),
    memo             TEXT,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS outfit_items (
    outfit_id  TEXT NOT NULL REFERENCES outfits(outfit_id) ON DELETE CASCADE,
    item_id    TEXT NOT NULL REFERENCES items(item_id) ON DELETE CASCADE,
    position   INTEGER NOT NULL,
    PRIMARY KEY (outfit_id, item_id)
);

-- One row per outfit per day worn. Rows are inserted and deleted, never
-- updated. Nothing here enforces one row per day.
CREATE TABLE IF NOT EXISTS history (
    record_id   TEXT PRIMARY KEY,
    outfit_id   TEXT NOT NULL REFERENCES outfits(outfit_id) ON DELETE CASCADE,
    worn_date   TEXT NOT NULL,   -- YYYY-MM-DD
    created_at  TEXT NOT NULL    -- RFC 3339 UTC, fixed width; server-assigned
);

CREATE INDEX IF NOT EXISTS history_date_idx   ON history(worn_date);
CREATE INDEX IF NOT EXISTS history_outfit_idx ON history(outfit_id);
CREATE INDEX IF NOT EXISTS outfit_items_item_idx ON outfit_items(item_id);

PRAGMA user_version = 1;
";
