//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, warn};
use wardrobe_core::envelope::{Envelope, ErrorBody, ErrorCode};

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] wardrobe_core::Error),

  /// The request could not be decoded.
  #[error("bad request: {0}")]
  BadRequest(String),
}

impl ApiError {
  /// Convert a store's own error type through the core taxonomy.
  pub fn store<E: Into<wardrobe_core::Error>>(e: E) -> Self { Self::Core(e.into()) }
}

impl From<JsonRejection> for ApiError {
  fn from(r: JsonRejection) -> Self { Self::BadRequest(r.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(r: QueryRejection) -> Self { Self::BadRequest(r.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(r: PathRejection) -> Self { Self::BadRequest(r.body_text()) }
}

pub fn status_for(code: ErrorCode) -> StatusCode {
  match code {
    ErrorCode::OutfitNotFound
    | ErrorCode::HistoryNotFound
    | ErrorCode::ItemNotFound
    | ErrorCode::NoCandidates => StatusCode::NOT_FOUND,
    ErrorCode::WearDayConflict => StatusCode::CONFLICT,
    ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
    ErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let body = match &self {
      ApiError::Core(e) => ErrorBody::from(e),
      ApiError::BadRequest(m) => ErrorBody {
        code:    ErrorCode::InvalidInput,
        message: m.clone(),
        id:      None,
        date:    None,
      },
    };
    let status = status_for(body.code);
    if status.is_server_error() {
      warn!(code = %body.code, message = %body.message, "request failed");
    } else {
      debug!(code = %body.code, message = %body.message, "request rejected");
    }
    (status, Json(Envelope::<()>::failure(body))).into_response()
  }
}
