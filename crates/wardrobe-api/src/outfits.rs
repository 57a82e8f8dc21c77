//! Handlers for `/outfits` endpoints.
//!
//! | Method   | Path                  | Notes |
//! |----------|-----------------------|-------|
//! | `GET`    | `/outfits`            | Newest first |
//! | `POST`   | `/outfits`            | Body: [`NewOutfit`] |
//! | `GET`    | `/outfits/recommend`  | `?minRating&minFormality&excludeRecent&excludeDays&asOf` |
//! | `GET`    | `/outfits/rating/{min}` | Rated at least `min` |
//! | `GET`    | `/outfits/formality`  | `?minFormality&maxFormality`, both inclusive |
//! | `GET`    | `/outfits/{id}`       | With items and wear stats |
//! | `PUT`    | `/outfits/{id}`       | Replaces fields and item set |
//! | `DELETE` | `/outfits/{id}`       | Deletes its history too |
//! | `GET`    | `/outfits/{id}/worn`  | Wear-day state for `?date` (default today) |
//! | `POST`   | `/outfits/{id}/worn`  | Record as worn on `?date` |
//! | `DELETE` | `/outfits/{id}/worn`  | Free `?date` for another outfit |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use wardrobe_core::{
  Error,
  history::HistoryRecord,
  outfit::{NewOutfit, Outfit, OutfitQuery},
  store::{OutfitCatalog, RecommendQuery, WardrobeStore},
  wear::{RecordOutcome, WearDayState},
};

use crate::{ApiResult, ApiState, error::ApiError, ok};

// ─── CRUD ────────────────────────────────────────────────────────────────────

/// `GET /outfits`
pub async fn list<S: WardrobeStore>(State(state): State<ApiState<S>>) -> ApiResult<Vec<Outfit>> {
  let outfits = state.store().list_outfits().await.map_err(ApiError::store)?;
  Ok(ok(outfits))
}

/// `POST /outfits`
pub async fn create<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  body: Result<Json<NewOutfit>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  let outfit = state.store().add_outfit(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, ok(outfit)))
}

/// `GET /outfits/{id}`
pub async fn get_one<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Outfit> {
  let Path(id) = id?;
  let outfit = state
    .store()
    .get_outfit(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(Error::OutfitNotFound(id))?;
  Ok(ok(outfit))
}

/// `PUT /outfits/{id}`
pub async fn update<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  id: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<NewOutfit>, JsonRejection>,
) -> ApiResult<Outfit> {
  let Path(id) = id?;
  let Json(body) = body?;
  let outfit = state.store().update_outfit(id, body).await.map_err(ApiError::store)?;
  Ok(ok(outfit))
}

/// `DELETE /outfits/{id}`
pub async fn delete<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<()> {
  let Path(id) = id?;
  state.store().delete_outfit(id).await.map_err(ApiError::store)?;
  Ok(ok(()))
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// `GET /outfits/rating/{min}`
pub async fn by_rating<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  min: Result<Path<u8>, PathRejection>,
) -> ApiResult<Vec<Outfit>> {
  let Path(min_rating) = min?;
  find(&state, OutfitQuery {
    min_rating: Some(min_rating),
    ..Default::default()
  })
  .await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormalityParams {
  pub min_formality: Option<u8>,
  pub max_formality: Option<u8>,
}

/// `GET /outfits/formality`
pub async fn by_formality<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  params: Result<Query<FormalityParams>, QueryRejection>,
) -> ApiResult<Vec<Outfit>> {
  let Query(params) = params?;
  find(&state, OutfitQuery {
    min_formality: params.min_formality,
    max_formality: params.max_formality,
    ..Default::default()
  })
  .await
}

async fn find<S: WardrobeStore>(state: &ApiState<S>, query: OutfitQuery) -> ApiResult<Vec<Outfit>> {
  query.validate()?;
  let outfits = state.store().find_outfits(&query).await.map_err(ApiError::store)?;
  Ok(ok(outfits))
}

// ─── Recommendation ──────────────────────────────────────────────────────────

/// `GET /outfits/recommend`
///
/// An empty list is a valid answer here; deciding that nothing matched is the
/// recommendation session's job.
pub async fn recommend<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  query: Result<Query<RecommendQuery>, QueryRejection>,
) -> ApiResult<Vec<Outfit>> {
  let Query(query) = query?;
  query.validate()?;
  let outfits = state.store().recommend(query).await.map_err(ApiError::store)?;
  Ok(ok(outfits))
}

// ─── Wear day ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct DateParams {
  /// Defaults to the server's local date.
  pub date: Option<NaiveDate>,
}

impl DateParams {
  fn day(&self) -> NaiveDate { self.date.unwrap_or_else(|| chrono::Local::now().date_naive()) }
}

/// `GET /outfits/{id}/worn`
pub async fn wear_status<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  id: Result<Path<Uuid>, PathRejection>,
  params: Result<Query<DateParams>, QueryRejection>,
) -> ApiResult<WearDayState> {
  let Path(id) = id?;
  let Query(params) = params?;
  Ok(ok(state.wear().status(id, params.day()).await?))
}

/// `POST /outfits/{id}/worn`
///
/// `201` when a record was written, `200` when the outfit already held the
/// day. Another outfit holding the day is a `409 wear_day_conflict`.
pub async fn record_worn<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  id: Result<Path<Uuid>, PathRejection>,
  params: Result<Query<DateParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Path(id) = id?;
  let Query(params) = params?;
  let date = params.day();

  let outcome = state.wear().record_today(id, date).await?;
  let status = match &outcome {
    RecordOutcome::Recorded(record) => {
      info!(outfit_id = %id, %date, record_id = %record.record_id, "outfit worn");
      StatusCode::CREATED
    }
    RecordOutcome::AlreadyRecorded(_) => StatusCode::OK,
  };
  Ok((status, ok(outcome)))
}

/// `DELETE /outfits/{id}/worn`
///
/// Returns the removed record.
pub async fn change_worn<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  id: Result<Path<Uuid>, PathRejection>,
  params: Result<Query<DateParams>, QueryRejection>,
) -> ApiResult<HistoryRecord> {
  let Path(id) = id?;
  let Query(params) = params?;
  let date = params.day();

  let removed = state.wear().change_today(id, date).await?;
  info!(outfit_id = %id, %date, record_id = %removed.record_id, "wear day freed");
  Ok(ok(removed))
}
