//! Handlers for `/items` endpoints.
//!
//! | Method   | Path          | Notes |
//! |----------|---------------|-------|
//! | `GET`    | `/items`      | Optional `?category=TOPS&season=FALL&color=navy&name=shirt` |
//! | `GET`    | `/items/search` | `?name=`, case-insensitive substring |
//! | `POST`   | `/items`      | Body: [`NewItem`] |
//! | `GET`    | `/items/{id}` | `item_not_found` if missing |
//! | `PUT`    | `/items/{id}` | Replaces every editable field |
//! | `DELETE` | `/items/{id}` | Also drops the item from its outfits |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use wardrobe_core::{
  Error,
  item::{Item, ItemQuery, NewItem},
  store::WardrobeStore,
};

use crate::{ApiResult, ApiState, error::ApiError, ok};

/// `GET /items`
pub async fn list<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  query: Result<Query<ItemQuery>, QueryRejection>,
) -> ApiResult<Vec<Item>> {
  let Query(query) = query?;
  let items = state.store().list_items(&query).await.map_err(ApiError::store)?;
  Ok(ok(items))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  #[serde(default)]
  pub name: String,
}

/// `GET /items/search`
pub async fn search<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Vec<Item>> {
  let Query(params) = params?;
  let name = params.name.trim();
  if name.is_empty() {
    return Err(Error::InvalidInput("search name must not be empty".into()).into());
  }
  let query = ItemQuery {
    name: Some(name.to_owned()),
    ..Default::default()
  };
  let items = state.store().list_items(&query).await.map_err(ApiError::store)?;
  Ok(ok(items))
}

/// `POST /items`
pub async fn create<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  body: Result<Json<NewItem>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  let item = state.store().add_item(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, ok(item)))
}

/// `GET /items/{id}`
pub async fn get_one<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Item> {
  let Path(id) = id?;
  let item = state
    .store()
    .get_item(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(Error::ItemNotFound(id))?;
  Ok(ok(item))
}

/// `PUT /items/{id}`
pub async fn update<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  id: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<NewItem>, JsonRejection>,
) -> ApiResult<Item> {
  let Path(id) = id?;
  let Json(body) = body?;
  let item = state.store().update_item(id, body).await.map_err(ApiError::store)?;
  Ok(ok(item))
}

/// `DELETE /items/{id}`
pub async fn delete<S: WardrobeStore>(
  State(state): State<ApiState<S>>,
  id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<()> {
  let Path(id) = id?;
  state.store().delete_item(id).await.map_err(ApiError::store)?;
  Ok(ok(()))
}
