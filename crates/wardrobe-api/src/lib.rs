//! JSON REST API for the wardrobe.
//!
//! Exposes an axum [`Router`] backed by any [`WardrobeStore`]. Every response
//! body is a [`wardrobe_core::envelope::Envelope`]. Writes that touch the
//! one-outfit-per-day rule go through [`WearDayManager`], so the invariant
//! holds for every client of this API.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", wardrobe_api::api_router(store.clone(), timeout))
//! ```

pub mod calendar;
pub mod error;
pub mod histories;
pub mod items;
pub mod outfits;

use std::{sync::Arc, time::Duration};

use axum::{Json, Router, routing::get};
use wardrobe_core::{
  envelope::Envelope,
  history::HistoryClient,
  store::WardrobeStore,
  wear::WearDayManager,
};

pub use error::ApiError;

/// Handler return type: an envelope on success, an [`ApiError`] otherwise.
pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

pub(crate) fn ok<T>(data: T) -> Json<Envelope<T>> { Json(Envelope::success(data)) }

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  store: Arc<S>,
  wear:  WearDayManager<S>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      wear:  self.wear.clone(),
    }
  }
}

impl<S: WardrobeStore> ApiState<S> {
  /// History reads and wear-day writes are bounded by `timeout`.
  pub fn new(store: Arc<S>, timeout: Duration) -> Self {
    let history = HistoryClient::new(Arc::clone(&store), timeout);
    Self {
      store,
      wear: WearDayManager::new(history),
    }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn history(&self) -> &HistoryClient<S> { self.wear.history() }

  pub fn wear(&self) -> &WearDayManager<S> { &self.wear }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, timeout: Duration) -> Router<()>
where
  S: WardrobeStore + 'static,
{
  Router::new()
    // Items
    .route("/items", get(items::list::<S>).post(items::create::<S>))
    .route("/items/search", get(items::search::<S>))
    .route(
      "/items/{id}",
      get(items::get_one::<S>)
        .put(items::update::<S>)
        .delete(items::delete::<S>),
    )
    // Outfits
    .route("/outfits", get(outfits::list::<S>).post(outfits::create::<S>))
    .route("/outfits/recommend", get(outfits::recommend::<S>))
    .route("/outfits/rating/{min_rating}", get(outfits::by_rating::<S>))
    .route("/outfits/formality", get(outfits::by_formality::<S>))
    .route(
      "/outfits/{id}",
      get(outfits::get_one::<S>)
        .put(outfits::update::<S>)
        .delete(outfits::delete::<S>),
    )
    .route(
      "/outfits/{id}/worn",
      get(outfits::wear_status::<S>)
        .post(outfits::record_worn::<S>)
        .delete(outfits::change_worn::<S>),
    )
    // History
    .route("/histories", get(histories::list::<S>).post(histories::create::<S>))
    .route("/histories/month", get(histories::by_month::<S>))
    .route("/histories/range", get(histories::by_range::<S>))
    .route("/histories/outfit/{outfit_id}", get(histories::by_outfit::<S>))
    .route(
      "/histories/{id}",
      get(histories::get_one::<S>).delete(histories::delete::<S>),
    )
    // Read models
    .route("/calendar", get(calendar::month::<S>))
    .route("/stats", get(calendar::stats::<S>))
    .with_state(ApiState::new(store, timeout))
}

#[cfg(test)]
mod tests;
