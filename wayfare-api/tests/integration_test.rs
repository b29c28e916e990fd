use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wayfare_api::{
    app,
    middleware::auth::UserClaims,
    state::{AppState, AuthConfig, Repositories},
};
use wayfare_catalog::RecommendedCatalog;
use wayfare_store::app_config::PlannerConfig;

const SECRET: &str = "integration-secret";

fn test_app() -> Router {
    let state = AppState::new(
        Repositories::in_memory(),
        Arc::new(RecommendedCatalog::builtin().unwrap()),
        AuthConfig { secret: SECRET.to_string() },
        PlannerConfig::default(),
    );
    app(state)
}

fn token(sub: &str) -> String {
    let claims = UserClaims {
        sub: sub.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("Authorization", format!("Bearer {}", token(user)));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_trip(app: &Router, user: &str) -> String {
    let (status, trip) = send(
        app,
        Method::POST,
        "/v1/trips",
        Some(user),
        Some(json!({
            "name": "Lisbon",
            "city": "Lisbon",
            "start_date": "2025-06-01",
            "end_date": "2025-06-03"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    trip["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_authentication_flow() {
    let app = test_app();

    let (status, _) = send(&app, Method::GET, "/v1/trips", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = Request::builder()
        .uri("/v1/trips")
        .header("Authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(forged).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::GET, "/v1/trips", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_template_catalog() {
    let app = test_app();

    let (status, all) = send(&app, Method::GET, "/v1/templates", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, beach) = send(&app, Method::GET, "/v1/templates?category=beach", Some("alice"), None).await;
    let beach = beach.as_array().unwrap();
    assert_eq!(beach.len(), 1);
    assert_eq!(beach[0]["id"], "ibiza-formentera");

    let (status, _) = send(&app, Method::GET, "/v1/templates/atlantis", Some("alice"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_instantiate_template_into_dated_plan() {
    let app = test_app();

    let (status, outcome) = send(
        &app,
        Method::POST,
        "/v1/templates/paris-getaway/instantiate",
        Some("alice"),
        Some(json!({ "start_date": "2025-07-10" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(outcome["trip"]["start_date"], "2025-07-10");
    assert_eq!(outcome["trip"]["end_date"], "2025-07-12");
    assert_eq!(outcome["created_items"].as_array().unwrap().len(), 6);
    assert_eq!(outcome["created_stays"].as_array().unwrap().len(), 2);
    assert_eq!(outcome["created_stays"][0]["stay_end"], "2025-07-12");
    assert_eq!(outcome["failed"], json!([]));

    let trip_id = outcome["trip"]["id"].as_str().unwrap();
    let (status, view) = send(&app, Method::GET, &format!("/v1/trips/{}", trip_id), Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    let days = view["itinerary"]["days"].as_array().unwrap();
    assert_eq!(days.len(), 3);
    assert_eq!(days[0]["day_number"], 1);
    assert_eq!(days[0]["date"], "2025-07-10");
    let first_day: Vec<_> = days[0]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["activity_id"].as_i64().unwrap())
        .collect();
    assert_eq!(first_day, vec![9, 10]);
    assert_eq!(view["stay_warnings"], json!([]));

    // Somebody else's trip does not exist for them
    let (status, _) = send(&app, Method::GET, &format!("/v1/trips/{}", trip_id), Some("mallory"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trip_validation_and_editing() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/trips",
        Some("alice"),
        Some(json!({ "name": "Oops", "city": "Rome", "start_date": "2025-06-05", "end_date": "2025-06-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("Invalid date range"));

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/trips",
        Some("alice"),
        Some(json!({ "name": " ", "city": "Rome", "start_date": "2025-06-01", "end_date": "2025-06-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let trip_id = create_trip(&app, "alice").await;

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/v1/trips/{}/items", trip_id),
        Some("alice"),
        Some(json!({ "activity_id": 4, "realized_date": "2025-06-09" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, item) = send(
        &app,
        Method::POST,
        &format!("/v1/trips/{}/items", trip_id),
        Some("alice"),
        Some(json!({ "activity_id": 4, "realized_date": "2025-06-02" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let item_id = item["id"].as_str().unwrap();

    let (status, patched) = send(
        &app,
        Method::PATCH,
        &format!("/v1/trips/{}", trip_id),
        Some("alice"),
        Some(json!({ "notes": "pack light" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["notes"], "pack light");

    let item_uri = format!("/v1/trips/{}/items/{}", trip_id, item_id);
    let (status, _) = send(&app, Method::DELETE, &item_uri, Some("alice"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &item_uri, Some("alice"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let trip_uri = format!("/v1/trips/{}", trip_id);
    let (status, _) = send(&app, Method::DELETE, &trip_uri, Some("mallory"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &trip_uri, Some("alice"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &trip_uri, Some("alice"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stays_validate_order_and_warn_on_overflow() {
    let app = test_app();
    let trip_id = create_trip(&app, "alice").await;
    let uri = format!("/v1/trips/{}/stays", trip_id);

    let (status, _) = send(
        &app,
        Method::POST,
        &uri,
        Some("alice"),
        Some(json!({ "hotel_id": 6, "stay_start": "2025-06-03", "stay_end": "2025-06-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        Method::POST,
        &uri,
        Some("alice"),
        Some(json!({ "hotel_id": 6, "stay_start": "2025-06-02", "stay_end": "2025-06-08" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, view) = send(&app, Method::GET, &format!("/v1/trips/{}", trip_id), Some("alice"), None).await;
    assert_eq!(view["stays"].as_array().unwrap().len(), 1);
    assert_eq!(view["stay_warnings"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_publication_lifecycle() {
    let app = test_app();
    let trip_id = create_trip(&app, "alice").await;
    let publish = format!("/v1/trips/{}/publish", trip_id);
    let unpublish = format!("/v1/trips/{}/unpublish", trip_id);

    let (status, _) = send(&app, Method::POST, &publish, Some("alice"), Some(json!({ "comment": "" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (_, status_body) = send(
        &app,
        Method::GET,
        &format!("/v1/trips/{}/publication", trip_id),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status_body["record"], Value::Null);

    let (status, published) = send(
        &app,
        Method::POST,
        &publish,
        Some("alice"),
        Some(json!({ "comment": "Pasteis de nata everywhere" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(published["record"]["comment"], "Pasteis de nata everywhere");
    let record_id = published["record"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::POST, &publish, Some("alice"), Some(json!({ "comment": "again" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Only the owner may publish
    let (status, _) = send(&app, Method::POST, &publish, Some("bob"), Some(json!({ "comment": "mine" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let like = format!("/v1/publications/{}/like", record_id);
    let (status, liked) = send(&app, Method::POST, &like, Some("bob"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(liked["record"]["like_count"], 1);
    assert_eq!(liked["viewer_has_liked"], true);
    let (_, liked_again) = send(&app, Method::POST, &like, Some("bob"), None).await;
    assert_eq!(liked_again["record"]["like_count"], 1);

    let (status, feed) = send(&app, Method::GET, "/v1/feed?order=popular", Some("bob"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed.as_array().unwrap().len(), 1);
    assert_eq!(feed[0]["viewer_has_liked"], true);

    let (_, unliked) = send(&app, Method::POST, &format!("/v1/publications/{}/unlike", record_id), Some("bob"), None).await;
    assert_eq!(unliked["record"]["like_count"], 0);

    let (status, private) = send(&app, Method::POST, &unpublish, Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(private["record"], Value::Null);
    let (status, _) = send(&app, Method::POST, &unpublish, Some("alice"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::POST, &like, Some("bob"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expense_flow() {
    let app = test_app();
    let trip_id = create_trip(&app, "alice").await;
    let uri = format!("/v1/trips/{}/expenses", trip_id);

    for (concept, amount, category, day) in [
        ("Hotel", json!("12.50"), "lodging", "2025-06-01"),
        ("Tram", json!(7.25), "transport", "2025-06-03"),
        ("Gum", json!("0.01"), "food", "2025-06-02"),
    ] {
        let (status, _) = send(
            &app,
            Method::POST,
            &uri,
            Some("alice"),
            Some(json!({ "concept": concept, "amount": amount, "category": category, "spent_on": day })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = send(
        &app,
        Method::POST,
        &uri,
        Some("alice"),
        Some(json!({ "concept": "Free", "amount": "0", "category": "other", "spent_on": "2025-06-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, summary) = send(&app, Method::GET, &format!("{}/summary", uri), Some("alice"), None).await;
    assert_eq!(summary["total"], "19.76");
    assert_eq!(summary["currency"], "EUR");
    assert_eq!(summary["count"], 3);
    assert_eq!(summary["by_category"].as_array().unwrap().len(), 3);

    let (_, by_amount) = send(&app, Method::GET, &format!("{}?sort=amount", uri), Some("alice"), None).await;
    let concepts: Vec<_> = by_amount
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["concept"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(concepts, vec!["Hotel", "Tram", "Gum"]);

    let (_, by_date) = send(&app, Method::GET, &uri, Some("alice"), None).await;
    assert_eq!(by_date[0]["concept"], "Tram");

    let expense_id = by_date[0]["id"].as_str().unwrap();
    let (status, _) = send(&app, Method::DELETE, &format!("{}/{}", uri, expense_id), Some("alice"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &uri, Some("bob"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
