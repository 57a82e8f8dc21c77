//! HTTP server for the wardrobe API.
//!
//! Mounts [`wardrobe_api::api_router`] under `/api` with request tracing, and
//! answers `GET /health` for liveness checks.

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use wardrobe_core::store::WardrobeStore;

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/wardrobe/wardrobe.db") }
fn default_store_timeout_ms() -> u64 { 5_000 }

/// Runtime server configuration, deserialised from `config.toml` and
/// `WARDROBE_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  #[serde(default = "default_store_path")]
  pub store_path:       PathBuf,
  /// Upper bound on any single store call made by the wear-day logic.
  #[serde(default = "default_store_timeout_ms")]
  pub store_timeout_ms: u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             default_host(),
      port:             default_port(),
      store_path:       default_store_path(),
      store_timeout_ms: default_store_timeout_ms(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn store_timeout(&self) -> Duration { Duration::from_millis(self.store_timeout_ms) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S: WardrobeStore + 'static>(store: Arc<S>, timeout: Duration) -> Router {
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", wardrobe_api::api_router(store, timeout))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use tower::ServiceExt as _;
  use wardrobe_store_sqlite::SqliteStore;

  use super::*;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    router(Arc::new(store), Duration::from_secs(5))
  }

  async fn get_status(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let resp = app
      .oneshot(Request::get(uri).body(Body::empty()).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
  }

  #[tokio::test]
  async fn health_responds() {
    let (status, body) = get_status(app().await, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
  }

  #[tokio::test]
  async fn api_is_nested() {
    let (status, body) = get_status(app().await, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["result"], true);
    assert_eq!(json["data"]["outfitCount"], 0);

    let (status, _) = get_status(app().await, "/stats").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[test]
  fn config_fills_defaults() {
    let cfg: ServerConfig = config::Config::builder()
      .set_override("port", 9000_i64)
      .unwrap()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.store_timeout(), Duration::from_secs(5));
    assert_eq!(cfg.address(), "127.0.0.1:9000");
  }
}
