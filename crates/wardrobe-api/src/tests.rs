//! Router tests against an in-memory SQLite store.

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt as _;
use wardrobe_store_sqlite::SqliteStore;

use crate::api_router;

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  api_router(Arc::new(store), Duration::from_secs(5))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, json)
}

/// Create one item and an outfit holding it; returns the outfit id.
async fn outfit(app: &Router, name: &str, rating: u8, formality: u8) -> String {
  let (status, item) = call(
    app,
    "POST",
    "/items",
    Some(json!({
      "category": "TOPS",
      "name": format!("{name} shirt"),
      "imageRef": "img/shirt.png",
      "color": "Navy",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{item}");

  let (status, outfit) = call(
    app,
    "POST",
    "/outfits",
    Some(json!({
      "name": name,
      "rating": rating,
      "formalityLevel": formality,
      "itemIds": [item["data"]["itemId"]],
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{outfit}");
  outfit["data"]["outfitId"].as_str().unwrap().to_owned()
}

// ─── Envelope ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn success_is_wrapped_in_an_envelope() {
  let app = app().await;
  let id = outfit(&app, "Office", 4, 4).await;

  let (status, body) = call(&app, "GET", &format!("/outfits/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["result"], true);
  assert_eq!(body["data"]["name"], "Office");
  assert_eq!(body["data"]["wornCount"], 0);
  assert_eq!(body["data"]["lastWornDate"], Value::Null);
  assert_eq!(body["data"]["items"][0]["category"], "TOPS");
  assert!(body.get("error").is_none());
}

#[tokio::test]
async fn missing_outfit_is_a_404_envelope() {
  let app = app().await;
  let id = uuid::Uuid::new_v4();

  let (status, body) = call(&app, "GET", &format!("/outfits/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["result"], false);
  assert_eq!(body["error"]["code"], "outfit_not_found");
  assert_eq!(body["error"]["id"], id.to_string());
}

#[tokio::test]
async fn malformed_input_is_invalid_input() {
  let app = app().await;

  let (status, body) = call(&app, "GET", "/calendar?year=2024&month=13", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"]["code"], "invalid_input");

  let (status, body) = call(&app, "POST", "/outfits", Some(json!({ "name": "No scores" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"]["code"], "invalid_input");

  let (status, body) = call(&app, "GET", "/items/not-a-uuid", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["result"], false);

  let (status, _) = call(
    &app,
    "GET",
    "/histories/range?startDate=2024-05-31&endDate=2024-05-01",
    None,
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Wear day ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn worn_endpoint_enforces_one_outfit_per_day() {
  let app = app().await;
  let a = outfit(&app, "A", 3, 2).await;
  let b = outfit(&app, "B", 3, 4).await;
  let day = "2024-05-05";

  let (status, body) = call(&app, "POST", &format!("/outfits/{a}/worn?date={day}"), None).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["data"]["outcome"], "recorded");
  let record_id = body["data"]["record"]["recordId"].clone();

  let (status, body) = call(&app, "POST", &format!("/outfits/{a}/worn?date={day}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["outcome"], "alreadyRecorded");
  assert_eq!(body["data"]["record"]["recordId"], record_id);

  let (status, body) = call(&app, "POST", &format!("/outfits/{b}/worn?date={day}"), None).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["error"]["code"], "wear_day_conflict");
  assert_eq!(body["error"]["date"], day);

  let (status, body) = call(&app, "GET", &format!("/outfits/{a}/worn?date={day}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["state"], "wornToday");

  let (status, body) = call(&app, "DELETE", &format!("/outfits/{a}/worn?date={day}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["recordId"], record_id);

  let (status, _) = call(&app, "POST", &format!("/outfits/{b}/worn?date={day}"), None).await;
  assert_eq!(status, StatusCode::CREATED);

  let (_, body) = call(&app, "GET", "/histories/range?startDate=2024-05-05&endDate=2024-05-05", None).await;
  let records = body["data"].as_array().unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0]["outfit"]["outfitId"], b);
}

#[tokio::test]
async fn changing_a_day_that_was_not_worn_is_history_not_found() {
  let app = app().await;
  let a = outfit(&app, "A", 3, 3).await;

  let (status, body) =
    call(&app, "DELETE", &format!("/outfits/{a}/worn?date=2024-05-05"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"]["code"], "history_not_found");
}

// ─── History and calendar ────────────────────────────────────────────────────

#[tokio::test]
async fn calendar_summarises_the_month() {
  let app = app().await;
  let a = outfit(&app, "A", 3, 2).await;
  let b = outfit(&app, "B", 3, 4).await;
  for (id, day) in [(&a, "2024-05-01"), (&b, "2024-05-03"), (&a, "2024-06-01")] {
    let (status, _) = call(
      &app,
      "POST",
      "/histories",
      Some(json!({ "outfitId": id, "wornDate": day })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
  }

  let (status, body) = call(&app, "GET", "/calendar?year=2024&month=5", None).await;
  assert_eq!(status, StatusCode::OK);
  let view = &body["data"];
  assert_eq!(view["month"], json!({ "year": 2024, "month": 5 }));
  assert_eq!(view["summary"]["daysTracked"], 2);
  assert_eq!(view["summary"]["uniqueOutfits"], 2);
  assert_eq!(view["summary"]["avgFormality"], "3.0");
  let days: Vec<&String> = view["days"].as_object().unwrap().keys().collect();
  assert_eq!(days, ["2024-05-01", "2024-05-03"]);

  let (_, body) = call(&app, "GET", "/histories/month?year=2024&month=6", None).await;
  assert_eq!(body["data"].as_array().unwrap().len(), 1);

  let (_, body) = call(&app, "GET", &format!("/histories/outfit/{a}"), None).await;
  assert_eq!(body["data"].as_array().unwrap().len(), 2);

  let (_, body) = call(&app, "GET", "/stats", None).await;
  assert_eq!(body["data"], json!({ "itemCount": 2, "outfitCount": 2, "recordedDays": 3 }));
}

#[tokio::test]
async fn history_record_lifecycle() {
  let app = app().await;
  let a = outfit(&app, "A", 3, 3).await;

  let (_, body) = call(
    &app,
    "POST",
    "/histories",
    Some(json!({ "outfitId": a, "wornDate": "2024-05-02" })),
  )
  .await;
  let id = body["data"]["recordId"].as_str().unwrap().to_owned();

  let (status, body) = call(&app, "GET", &format!("/histories/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["wornDate"], "2024-05-02");

  let (status, _) = call(&app, "DELETE", &format!("/histories/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);

  let (status, body) = call(&app, "DELETE", &format!("/histories/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"]["code"], "history_not_found");

  let (_, body) = call(&app, "GET", &format!("/outfits/{a}"), None).await;
  assert_eq!(body["data"]["wornCount"], 0);
}

// ─── Recommendation ──────────────────────────────────────────────────────────

#[tokio::test]
async fn recommend_excludes_recent_wear() {
  let app = app().await;
  let a = outfit(&app, "A", 4, 4).await;
  let c = outfit(&app, "C", 4, 4).await;
  call(&app, "POST", &format!("/outfits/{a}/worn?date=2024-05-04"), None).await;
  call(&app, "POST", &format!("/outfits/{c}/worn?date=2024-04-01"), None).await;

  let (status, body) = call(
    &app,
    "GET",
    "/outfits/recommend?minRating=3&minFormality=3&excludeRecent=true&excludeDays=2&asOf=2024-05-05",
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  let ids: Vec<&Value> = body["data"].as_array().unwrap().iter().map(|o| &o["outfitId"]).collect();
  assert_eq!(ids, [&json!(c)]);

  let (status, body) = call(&app, "GET", "/outfits/recommend?minRating=5", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"], json!([]));

  let (status, _) = call(&app, "GET", "/outfits/recommend?minRating=9", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bare_recommend_uses_the_default_filters() {
  let app = app().await;
  let a = outfit(&app, "A", 4, 4).await;
  let c = outfit(&app, "C", 3, 3).await;
  outfit(&app, "Low rating", 2, 4).await;
  outfit(&app, "Too casual", 4, 2).await;
  call(&app, "POST", &format!("/outfits/{a}/worn?date=2024-05-04"), None).await;

  let (status, body) = call(&app, "GET", "/outfits/recommend?asOf=2024-05-05", None).await;
  assert_eq!(status, StatusCode::OK);
  let ids: Vec<&Value> = body["data"].as_array().unwrap().iter().map(|o| &o["outfitId"]).collect();
  assert_eq!(ids, [&json!(c)]);
}

// ─── Items ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn item_crud() {
  let app = app().await;

  let (_, body) = call(
    &app,
    "POST",
    "/items",
    Some(json!({ "category": "SHOES", "name": "Boots", "imageRef": "img/boots.png", "season": "WINTER" })),
  )
  .await;
  let id = body["data"]["itemId"].as_str().unwrap().to_owned();
  assert_eq!(body["data"]["color"], "");

  let (_, body) = call(&app, "GET", "/items?category=SHOES", None).await;
  assert_eq!(body["data"].as_array().unwrap().len(), 1);
  let (_, body) = call(&app, "GET", "/items?season=SUMMER", None).await;
  assert_eq!(body["data"], json!([]));

  let (status, body) = call(
    &app,
    "PUT",
    &format!("/items/{id}"),
    Some(json!({ "category": "SHOES", "name": "Chelsea boots", "imageRef": "img/boots.png", "color": "Black" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["name"], "Chelsea boots");
  assert_eq!(body["data"]["season"], Value::Null);

  let (status, _) = call(&app, "DELETE", &format!("/items/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  let (status, body) = call(&app, "GET", &format!("/items/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"]["code"], "item_not_found");
}

#[tokio::test]
async fn item_search_matches_name_fragments() {
  let app = app().await;
  outfit(&app, "Office", 4, 4).await;
  outfit(&app, "Weekend", 3, 2).await;

  let (status, body) = call(&app, "GET", "/items/search?name=office", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"].as_array().unwrap().len(), 1);
  assert_eq!(body["data"][0]["name"], "Office shirt");

  let (_, body) = call(&app, "GET", "/items/search?name=SHIRT", None).await;
  assert_eq!(body["data"].as_array().unwrap().len(), 2);

  let (status, body) = call(&app, "GET", "/items/search?name=%20", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"]["code"], "invalid_input");
}

// ─── Outfit filters ──────────────────────────────────────────────────────────

#[tokio::test]
async fn outfits_filter_by_rating_and_formality() {
  let app = app().await;
  let casual = outfit(&app, "Casual", 3, 1).await;
  outfit(&app, "Smart", 4, 3).await;
  let formal = outfit(&app, "Formal", 5, 5).await;

  let names = |body: &Value| {
    let mut names: Vec<String> = body["data"]
      .as_array()
      .unwrap()
      .iter()
      .map(|o| o["name"].as_str().unwrap().to_owned())
      .collect();
    names.sort();
    names
  };

  let (status, body) = call(&app, "GET", "/outfits/rating/4", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(names(&body), ["Formal", "Smart"]);

  let (status, body) =
    call(&app, "GET", "/outfits/formality?minFormality=1&maxFormality=3", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(names(&body), ["Casual", "Smart"]);

  let (_, body) = call(&app, "GET", "/outfits/formality?minFormality=5", None).await;
  assert_eq!(body["data"][0]["outfitId"], json!(formal));
  assert_eq!(body["data"].as_array().unwrap().len(), 1);

  let (status, _) = call(&app, "GET", "/outfits/formality?minFormality=4&maxFormality=2", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let (status, _) = call(&app, "GET", "/outfits/rating/9", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  // Fixed segments do not shadow outfit ids.
  let (status, body) = call(&app, "GET", &format!("/outfits/{casual}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["outfitId"], json!(casual));
}
