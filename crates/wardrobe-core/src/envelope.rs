//! The JSON envelope every API response is wrapped in.
//!
//! ```json
//! { "result": true,  "data": { ... } }
//! { "result": false, "error": { "code": "outfit_not_found", "message": "...", "id": "..." } }
//! ```
//!
//! The server builds envelopes from [`Error`]; clients turn them back into
//! [`Error`] with [`Envelope::into_data`], so both sides share one taxonomy.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

/// Stable machine-readable error codes.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCode {
  OutfitNotFound,
  HistoryNotFound,
  ItemNotFound,
  WearDayConflict,
  NoCandidates,
  InvalidInput,
  StoreUnavailable,
  Internal,
}

impl ErrorCode {
  pub fn of(error: &Error) -> Self {
    match error {
      Error::Unavailable(_) => Self::StoreUnavailable,
      Error::OutfitNotFound(_) => Self::OutfitNotFound,
      Error::RecordNotFound(_) | Error::NotWornOn { .. } => Self::HistoryNotFound,
      Error::ItemNotFound(_) => Self::ItemNotFound,
      Error::InvariantViolation { .. } => Self::WearDayConflict,
      Error::NoCandidates => Self::NoCandidates,
      Error::InvalidInput(_) => Self::InvalidInput,
      Error::SessionTerminal | Error::Serialization(_) | Error::Internal(_) => Self::Internal,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
  pub code:    ErrorCode,
  pub message: String,
  /// The entity a not-found error refers to.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:      Option<Uuid>,
  /// The day a wear-day conflict happened on.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date:    Option<NaiveDate>,
}

impl From<&Error> for ErrorBody {
  fn from(error: &Error) -> Self {
    let (id, date) = match error {
      Error::OutfitNotFound(id) | Error::RecordNotFound(id) | Error::ItemNotFound(id) => {
        (Some(*id), None)
      }
      Error::NotWornOn { outfit_id, date } => (Some(*outfit_id), Some(*date)),
      Error::InvariantViolation { date, .. } => (None, Some(*date)),
      _ => (None, None),
    };
    let message = match error {
      Error::InvariantViolation { detail, .. } => detail.clone(),
      other => other.to_string(),
    };
    Self {
      code: ErrorCode::of(error),
      message,
      id,
      date,
    }
  }
}

impl ErrorBody {
  /// Rebuild the core error this body was produced from.
  ///
  /// Missing ids decode as [`Uuid::nil`]; a missing conflict date decodes
  /// as today's date in UTC.
  pub fn into_error(self) -> Error {
    let id = self.id.unwrap_or_else(Uuid::nil);
    match self.code {
      ErrorCode::OutfitNotFound => Error::OutfitNotFound(id),
      ErrorCode::HistoryNotFound => Error::RecordNotFound(id),
      ErrorCode::ItemNotFound => Error::ItemNotFound(id),
      ErrorCode::WearDayConflict => Error::InvariantViolation {
        date:   self.date.unwrap_or_else(|| chrono::Utc::now().date_naive()),
        detail: self.message,
      },
      ErrorCode::NoCandidates => Error::NoCandidates,
      ErrorCode::InvalidInput => Error::InvalidInput(self.message),
      ErrorCode::StoreUnavailable => Error::Unavailable(self.message),
      ErrorCode::Internal => Error::Internal(self.message),
    }
  }
}

/// A response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
  pub result: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data:   Option<T>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error:  Option<ErrorBody>,
}

impl<T> Envelope<T> {
  pub fn success(data: T) -> Self {
    Self {
      result: true,
      data:   Some(data),
      error:  None,
    }
  }

  pub fn failure(error: ErrorBody) -> Self {
    Self {
      result: false,
      data:   None,
      error:  Some(error),
    }
  }

  /// `Ok` with the payload, if any, of a successful envelope. A
  /// `result: false` envelope is an error regardless of the HTTP status it
  /// arrived with.
  pub fn into_result(self) -> Result<Option<T>> {
    if self.result {
      return Ok(self.data);
    }
    Err(match self.error {
      Some(body) => body.into_error(),
      None => Error::Unavailable("failed response without an error body".into()),
    })
  }

  /// Like [`Envelope::into_result`], but a missing payload is an error.
  pub fn into_data(self) -> Result<T> {
    self
      .into_result()?
      .ok_or_else(|| Error::Unavailable("successful response without data".into()))
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn failure_envelope_maps_back_to_the_core_error() {
    let id = Uuid::new_v4();
    let env: Envelope<serde_json::Value> = serde_json::from_value(json!({
      "result": false,
      "error": { "code": "outfit_not_found", "message": "outfit not found", "id": id },
    }))
    .unwrap();

    assert!(matches!(env.into_data(), Err(Error::OutfitNotFound(got)) if got == id));
  }

  #[test]
  fn conflict_keeps_its_date_and_detail() {
    let date: NaiveDate = "2024-05-05".parse().unwrap();
    let original = Error::InvariantViolation {
      date,
      detail: "held by Office".into(),
    };
    let body = ErrorBody::from(&original);
    assert_eq!(body.code, ErrorCode::WearDayConflict);

    let wire = serde_json::to_value(Envelope::<()>::failure(body)).unwrap();
    assert_eq!(wire["error"]["code"], "wear_day_conflict");
    assert_eq!(wire["error"]["date"], "2024-05-05");
    assert!(wire.get("data").is_none());

    let back: Envelope<()> = serde_json::from_value(wire).unwrap();
    match back.into_result() {
      Err(Error::InvariantViolation { date: d, detail }) => {
        assert_eq!(d, date);
        assert_eq!(detail, "held by Office");
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn success_without_data_is_only_ok_for_unit_results() {
    let env: Envelope<u32> = serde_json::from_value(json!({ "result": true })).unwrap();
    assert!(matches!(env.clone().into_result(), Ok(None)));
    assert!(matches!(env.into_data(), Err(Error::Unavailable(_))));

    let env: Envelope<u32> = serde_json::from_value(json!({ "result": true, "data": 7 })).unwrap();
    assert_eq!(env.into_data().unwrap(), 7);
  }

  #[test]
  fn unavailable_round_trips_as_retryable() {
    let body = ErrorBody::from(&Error::Unavailable("list history timed out after 5000ms".into()));
    assert_eq!(body.code.as_ref(), "store_unavailable");
    assert!(body.into_error().is_retryable());
  }

  #[test]
  fn internal_failures_are_not_retryable() {
    let env: Envelope<serde_json::Value> = serde_json::from_value(json!({
      "result": false,
      "error": { "code": "internal", "message": "recommendation session is terminal" },
    }))
    .unwrap();

    let err = env.into_data().unwrap_err();
    assert!(matches!(err, Error::Internal(ref m) if m == "recommendation session is terminal"));
    assert!(!err.is_retryable());
    assert_eq!(ErrorCode::of(&err), ErrorCode::Internal);
  }
}
