//! Recommendation sessions.
//!
//! A session is a snapshot of candidate outfits taken once per set of
//! criteria, plus a cursor that cycles through them. Committing records the
//! current candidate as worn and makes the session terminal.
//!
//! [`Recommender`] owns the single active session of a user and guards it
//! with a generation counter, so a slow fetch for old criteria can never
//! replace a session started for newer ones.

use std::{
  collections::HashSet,
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
  time::Duration,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::{
  Error, Result,
  history::bounded,
  outfit::Outfit,
  store::{DEFAULT_EXCLUDE_DAYS, HistoryStore, OutfitCatalog, RecommendQuery},
  wear::{RecordOutcome, WearDayManager},
};

// ─── Criteria ────────────────────────────────────────────────────────────────

/// What the user asked for. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationCriteria {
  pub min_rating:                 u8,
  pub min_formality:              u8,
  /// Skip outfits worn within this many days; 0 disables the check.
  #[serde(default)]
  pub exclude_recent_within_days: u32,
  /// Only outfits containing this item qualify.
  pub required_item_id:           Option<Uuid>,
}

impl Default for RecommendationCriteria {
  fn default() -> Self {
    Self {
      min_rating:                 3,
      min_formality:              3,
      exclude_recent_within_days: DEFAULT_EXCLUDE_DAYS,
      required_item_id:           None,
    }
  }
}

impl RecommendationCriteria {
  pub fn validate(&self) -> Result<()> {
    RecommendQuery {
      min_rating: self.min_rating,
      min_formality: self.min_formality,
      ..Default::default()
    }
    .validate()
  }

  /// The catalog query for these criteria as of `today`.
  pub fn to_query(&self, today: NaiveDate) -> RecommendQuery {
    RecommendQuery {
      min_rating:     self.min_rating,
      min_formality:  self.min_formality,
      exclude_recent: self.exclude_recent_within_days > 0,
      exclude_days:   self.exclude_recent_within_days,
      as_of:          Some(today),
    }
  }

  /// Whether `outfit` passes every filter as of `today`.
  pub fn admits(&self, outfit: &Outfit, today: NaiveDate) -> bool {
    outfit.is_recommendable()
      && outfit.rating >= self.min_rating
      && outfit.formality_level >= self.min_formality
      && self.required_item_id.is_none_or(|id| outfit.contains_item(id))
      && !outfit
        .stats
        .worn_within(self.exclude_recent_within_days, today)
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// A cursor over a fixed, non-empty list of candidates.
#[derive(Debug, Clone)]
pub struct RecommendationSession {
  criteria:   RecommendationCriteria,
  today:      NaiveDate,
  candidates: Vec<Outfit>,
  cursor:     usize,
  visited:    HashSet<usize>,
  terminal:   bool,
}

impl RecommendationSession {
  /// Build a session from the catalog's answer.
  ///
  /// Every filter is re-applied locally because the catalog is opaque and
  /// cannot express `required_item_id`. The catalog's order is kept. Fails
  /// with [`Error::NoCandidates`] if nothing survives.
  pub fn new(
    criteria: RecommendationCriteria,
    today: NaiveDate,
    fetched: Vec<Outfit>,
  ) -> Result<Self> {
    let fetched_len = fetched.len();
    let candidates: Vec<Outfit> = fetched
      .into_iter()
      .filter(|o| criteria.admits(o, today))
      .collect();
    debug!(fetched = fetched_len, kept = candidates.len(), "filtered candidates");

    if candidates.is_empty() {
      return Err(Error::NoCandidates);
    }

    Ok(Self {
      criteria,
      today,
      candidates,
      cursor: 0,
      visited: HashSet::from([0]),
      terminal: false,
    })
  }

  pub fn criteria(&self) -> &RecommendationCriteria { &self.criteria }

  pub fn today(&self) -> NaiveDate { self.today }

  pub fn candidates(&self) -> &[Outfit] { &self.candidates }

  pub fn len(&self) -> usize { self.candidates.len() }

  pub fn is_empty(&self) -> bool { self.candidates.is_empty() }

  pub fn cursor(&self) -> usize { self.cursor }

  pub fn is_terminal(&self) -> bool { self.terminal }

  /// Candidates not yet shown in this session.
  pub fn unseen(&self) -> usize { self.candidates.len() - self.visited.len() }

  /// The candidate under the cursor.
  pub fn current(&self) -> Result<&Outfit> {
    if self.terminal {
      return Err(Error::SessionTerminal);
    }
    Ok(&self.candidates[self.cursor])
  }

  /// Move to the next candidate, wrapping at the end.
  ///
  /// With a single candidate this returns the same outfit again.
  pub fn advance(&mut self) -> Result<&Outfit> {
    if self.terminal {
      return Err(Error::SessionTerminal);
    }
    self.cursor = (self.cursor + 1) % self.candidates.len();
    self.visited.insert(self.cursor);
    Ok(&self.candidates[self.cursor])
  }

  /// Record the current candidate as worn on the session's day.
  ///
  /// On success the session becomes terminal. On failure it stays active so
  /// the caller can retry.
  pub async fn commit<S: HistoryStore>(
    &mut self,
    manager: &WearDayManager<S>,
  ) -> Result<RecordOutcome> {
    let outfit_id = self.current()?.outfit_id;
    let outcome = manager.record_today(outfit_id, self.today).await?;
    self.terminal = true;
    debug!(%outfit_id, date = %self.today, "session committed");
    Ok(outcome)
  }
}

// ─── Recommender ─────────────────────────────────────────────────────────────

/// Result of [`Recommender::start`].
#[derive(Debug, Clone)]
pub enum Started {
  /// The session was installed and `current` is its first candidate.
  Active {
    generation: u64,
    candidates: usize,
    current:    Outfit,
  },
  /// A newer `start` or a `cancel` happened while fetching; the result was
  /// discarded.
  Superseded { generation: u64 },
}

/// Owner of the one active recommendation session.
pub struct Recommender<S> {
  catalog:    Arc<S>,
  manager:    WearDayManager<S>,
  timeout:    Duration,
  generation: AtomicU64,
  slot:       Mutex<Option<RecommendationSession>>,
}

impl<S: OutfitCatalog> Recommender<S> {
  /// Uses the manager's store as the catalog and its timeout for fetches.
  pub fn new(manager: WearDayManager<S>) -> Self {
    Self {
      catalog: Arc::clone(manager.history().store()),
      timeout: manager.history().timeout(),
      manager,
      generation: AtomicU64::new(0),
      slot: Mutex::new(None),
    }
  }

  pub fn generation(&self) -> u64 { self.generation.load(Ordering::SeqCst) }

  /// Discard any session and start a new one for `criteria`.
  pub async fn start(
    &self,
    criteria: RecommendationCriteria,
    today: NaiveDate,
  ) -> Result<Started> {
    criteria.validate()?;
    let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
    *self.slot.lock().await = None;

    let fetched = bounded(
      self.timeout,
      "recommend outfits",
      self.catalog.recommend(criteria.to_query(today)),
    )
    .await;

    if self.generation() != generation {
      debug!(generation, "discarding stale recommendation fetch");
      return Ok(Started::Superseded { generation });
    }
    let session = RecommendationSession::new(criteria, today, fetched?)?;

    let mut slot = self.slot.lock().await;
    if self.generation() != generation {
      debug!(generation, "discarding stale recommendation fetch");
      return Ok(Started::Superseded { generation });
    }
    let started = Started::Active {
      generation,
      candidates: session.len(),
      current: session.current()?.clone(),
    };
    *slot = Some(session);
    Ok(started)
  }

  /// Drop the active session and invalidate any fetch in flight.
  pub async fn cancel(&self) {
    self.generation.fetch_add(1, Ordering::SeqCst);
    *self.slot.lock().await = None;
  }

  pub async fn current(&self) -> Result<Outfit> {
    let slot = self.slot.lock().await;
    let session = slot.as_ref().ok_or(Error::SessionTerminal)?;
    session.current().cloned()
  }

  pub async fn advance(&self) -> Result<Outfit> {
    let mut slot = self.slot.lock().await;
    let session = slot.as_mut().ok_or(Error::SessionTerminal)?;
    session.advance().cloned()
  }

  /// Number of candidates in the active session not yet shown.
  pub async fn unseen(&self) -> Result<usize> {
    let slot = self.slot.lock().await;
    let session = slot.as_ref().ok_or(Error::SessionTerminal)?;
    Ok(session.unseen())
  }

  pub async fn commit(&self) -> Result<RecordOutcome> {
    let mut slot = self.slot.lock().await;
    let session = slot.as_mut().ok_or(Error::SessionTerminal)?;
    session.commit(&self.manager).await
  }
}
