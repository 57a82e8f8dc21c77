//! Computed read models: the monthly calendar and dashboard statistics.

use axum::extract::{Query, State, rejection::QueryRejection};
use wardrobe_core::{
  calendar::{CalendarView, WardrobeStats, recorded_days},
  item::ItemQuery,
  store::WardrobeStore,
};

use crate::{ApiResult, ApiState, error::ApiError, histories::MonthParams, ok};

/// `GET /calendar?year=2024&month=5`
pub async fn month<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  params: Result<Query<MonthParams>, QueryRejection>,
) -> ApiResult<CalendarView> {
  let Query(params) = params?;
  let month = params.key()?;
  let records = state.history().list_month(month).await?;
  Ok(ok(CalendarView::build(month, &records)))
}

/// `GET /stats`
pub async fn stats<S: WardrobeStore>(State(state): State<ApiState<S>>) -> ApiResult<WardrobeStats> {
  let store = state.store();
  let items = store.list_items(&ItemQuery::default()).await.map_err(ApiError::store)?;
  let outfits = store.list_outfits().await.map_err(ApiError::store)?;
  let history = store.list_history().await.map_err(ApiError::store)?;

  Ok(ok(WardrobeStats {
    item_count:    items.len(),
    outfit_count:  outfits.len(),
    recorded_days: recorded_days(&history),
  }))
}
