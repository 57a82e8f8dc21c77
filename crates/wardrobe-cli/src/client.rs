//! Async HTTP client wrapping the wardrobe JSON API.
//!
//! [`ApiClient`] implements the history and catalog store traits over HTTP,
//! so the wear-day and recommendation logic from `wardrobe-core` runs in the
//! CLI unchanged.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;
use wardrobe_core::{
  calendar::{CalendarView, MonthKey, WardrobeStats},
  envelope::Envelope,
  history::{DateRange, HistoryRecord},
  outfit::Outfit,
  store::{HistoryStore, OutfitCatalog, RecommendQuery},
};

/// An error from the HTTP client.
#[derive(Debug, Error)]
pub enum ClientError {
  /// Transport failure or an undecodable body.
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// The server answered with a failure envelope.
  #[error(transparent)]
  Api(#[from] wardrobe_core::Error),
}

impl From<ClientError> for wardrobe_core::Error {
  fn from(e: ClientError) -> Self {
    match e {
      ClientError::Api(inner) => inner,
      ClientError::Http(e) => Self::Unavailable(e.to_string()),
    }
  }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Connection settings for the wardrobe API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub timeout:  Duration,
}

/// Async HTTP client for the wardrobe JSON API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Send a request and unwrap the envelope's payload.
  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
    let envelope: Envelope<T> = req.send().await?.json().await?;
    Ok(envelope.into_data()?)
  }

  /// Send a request whose successful payload carries nothing.
  async fn send_unit(&self, req: RequestBuilder) -> Result<()> {
    let envelope: Envelope<serde_json::Value> = req.send().await?.json().await?;
    envelope.into_result()?;
    Ok(())
  }

  // ── Outfits ───────────────────────────────────────────────────────────────

  /// `GET /api/outfits`
  pub async fn list_outfits(&self) -> Result<Vec<Outfit>> {
    self.send(self.client.get(self.url("/outfits"))).await
  }

  // ── Read models ───────────────────────────────────────────────────────────

  /// `GET /api/calendar?year&month`
  pub async fn calendar(&self, month: MonthKey) -> Result<CalendarView> {
    let req = self
      .client
      .get(self.url("/calendar"))
      .query(&[("year", month.year().to_string()), ("month", month.month().to_string())]);
    self.send(req).await
  }

  /// `GET /api/stats`
  pub async fn stats(&self) -> Result<WardrobeStats> {
    self.send(self.client.get(self.url("/stats"))).await
  }
}

fn date_param(date: NaiveDate) -> String { date.format("%Y-%m-%d").to_string() }

impl HistoryStore for ApiClient {
  type Error = ClientError;

  async fn list_range(&self, range: DateRange) -> Result<Vec<HistoryRecord>> {
    let req = self.client.get(self.url("/histories/range")).query(&[
      ("startDate", date_param(range.start())),
      ("endDate", date_param(range.end())),
    ]);
    self.send(req).await
  }

  async fn list_by_outfit(&self, outfit_id: Uuid) -> Result<Vec<HistoryRecord>> {
    self
      .send(self.client.get(self.url(&format!("/histories/outfit/{outfit_id}"))))
      .await
  }

  async fn create(&self, outfit_id: Uuid, worn_date: NaiveDate) -> Result<HistoryRecord> {
    let req = self.client.post(self.url("/histories")).json(&serde_json::json!({
      "outfitId": outfit_id,
      "wornDate": date_param(worn_date),
    }));
    self.send(req).await
  }

  async fn delete(&self, record_id: Uuid) -> Result<()> {
    self
      .send_unit(self.client.delete(self.url(&format!("/histories/{record_id}"))))
      .await
  }
}

impl OutfitCatalog for ApiClient {
  async fn get_outfit(&self, outfit_id: Uuid) -> Result<Option<Outfit>> {
    let req = self.client.get(self.url(&format!("/outfits/{outfit_id}")));
    match self.send(req).await {
      Ok(outfit) => Ok(Some(outfit)),
      Err(ClientError::Api(wardrobe_core::Error::OutfitNotFound(_))) => Ok(None),
      Err(e) => Err(e),
    }
  }

  async fn recommend(&self, query: RecommendQuery) -> Result<Vec<Outfit>> {
    let mut params = vec![
      ("minRating", query.min_rating.to_string()),
      ("minFormality", query.min_formality.to_string()),
      ("excludeRecent", query.exclude_recent.to_string()),
      ("excludeDays", query.exclude_days.to_string()),
    ];
    if let Some(as_of) = query.as_of {
      params.push(("asOf", date_param(as_of)));
    }
    let req = self.client.get(self.url("/outfits/recommend")).query(&params);
    self.send(req).await
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use wardrobe_core::Error;

  use super::*;

  #[test]
  fn api_errors_pass_through_unchanged() {
    let id = Uuid::new_v4();
    let err: Error = ClientError::Api(Error::RecordNotFound(id)).into();
    assert!(matches!(err, Error::RecordNotFound(got) if got == id));
  }

  #[test]
  fn conflict_envelope_becomes_an_invariant_violation() {
    let env: Envelope<HistoryRecord> = serde_json::from_value(json!({
      "result": false,
      "error": {
        "code": "wear_day_conflict",
        "message": "2024-05-05 is already recorded for Office",
        "date": "2024-05-05",
      },
    }))
    .unwrap();
    let err: Error = ClientError::from(env.into_data().unwrap_err()).into();
    assert!(matches!(err, Error::InvariantViolation { .. }));
  }

  #[test]
  fn unit_delete_response_decodes() {
    let env: Envelope<serde_json::Value> =
      serde_json::from_value(json!({ "result": true, "data": null })).unwrap();
    assert!(env.into_result().is_ok());
  }

  #[test]
  fn urls_are_rooted_under_api() {
    let client = ApiClient::new(ApiConfig {
      base_url: "http://localhost:8080/".into(),
      timeout:  Duration::from_secs(1),
    })
    .unwrap();
    assert_eq!(client.url("/stats"), "http://localhost:8080/api/stats");
  }
}
