//! Handlers for `/histories` endpoints.
//!
//! These expose the raw wear-history log. `POST /histories` appends without
//! checking the one-outfit-per-day rule; clients that care use
//! `POST /outfits/{id}/worn` or run the wear-day manager themselves.

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
use uuid::Uuid;
use wardrobe_core::{
  Error,
  calendar::MonthKey,
  history::{DateRange, HistoryRecord},
  store::WardrobeStore,
};

use crate::{ApiResult, ApiState, error::ApiError, ok};

#[derive(Debug, Deserialize)]
pub struct MonthParams {
  pub year:  i32,
  pub month: u32,
}

impl MonthParams {
  pub fn key(&self) -> Result<MonthKey, Error> { MonthKey::new(self.year, self.month) }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeParams {
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub outfit_id: Uuid,
  pub worn_date: NaiveDate,
}

/// `GET /histories`: every record, newest first.
pub async fn list<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
) -> ApiResult<Vec<HistoryRecord>> {
  let records = state.store().list_history().await.map_err(ApiError::store)?;
  Ok(ok(records))
}

/// `GET /histories/month?year=2024&month=5`
pub async fn by_month<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  params: Result<Query<MonthParams>, QueryRejection>,
) -> ApiResult<Vec<HistoryRecord>> {
  let Query(params) = params?;
  Ok(ok(state.history().list_month(params.key()?).await?))
}

/// `GET /histories/range?startDate=2024-05-01&endDate=2024-05-31`
pub async fn by_range<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  params: Result<Query<RangeParams>, QueryRejection>,
) -> ApiResult<Vec<HistoryRecord>> {
  let Query(params) = params?;
  let range = DateRange::new(params.start_date, params.end_date)?;
  Ok(ok(state.history().list(range).await?))
}

/// `GET /histories/outfit/{outfit_id}`
pub async fn by_outfit<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  outfit_id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Vec<HistoryRecord>> {
  let Path(outfit_id) = outfit_id?;
  Ok(ok(state.history().list_by_outfit(outfit_id).await?))
}

/// `GET /histories/{id}`
pub async fn get_one<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<HistoryRecord> {
  let Path(id) = id?;
  let record = state
    .store()
    .get_record(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(Error::RecordNotFound(id))?;
  Ok(ok(record))
}

/// `POST /histories`: body `{"outfitId": "...", "wornDate": "2024-05-01"}`
pub async fn create<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  let record = state.history().create(body.outfit_id, body.worn_date).await?;
  Ok((StatusCode::CREATED, ok(record)))
}

/// `DELETE /histories/{id}`
pub async fn delete<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<()> {
  let Path(id) = id?;
  state.history().delete(id).await?;
  Ok(ok(()))
}
