/// HTTP tests for the generic collection endpoints
///
/// Drives the full router in-process with `tower::ServiceExt::oneshot`.
/// Run with: cargo test --test http_crud_tests

use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use docgate::{AppState, ConnectionConfig, InMemoryStore, StoreConnection, build_router};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> axum::Router {
    let connection = StoreConnection::with_store(Arc::new(InMemoryStore::new()));
    build_router(AppState::new(connection))
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("response expected");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should be readable");

    if body.is_empty() {
        return (status, Value::Null);
    }

    let json = serde_json::from_slice::<Value>(&body).expect("body should be valid JSON");
    (status, json)
}

async fn send_json(app: &axum::Router, method: Method, uri: &str, payload: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request should build");
    send(app, request).await
}

async fn send_empty(app: &axum::Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

async fn create(app: &axum::Router, collection: &str, payload: Value) -> String {
    let (status, body) = send_json(app, Method::POST, &format!("/collections/{collection}"), payload).await;
    assert_eq!(status, StatusCode::CREATED);
    body["insertedId"]
        .as_str()
        .expect("created response should have insertedId")
        .to_string()
}

#[tokio::test]
async fn create_then_get_returns_fields_and_id() {
    let app = app();

    let (status, created) = send_json(
        &app,
        Method::POST,
        "/collections/lessons",
        json!({"topic": "Maths", "price": 100, "location": "London"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["acknowledged"], true);
    let id = created["insertedId"].as_str().unwrap();
    assert_eq!(id.len(), 24);

    let (status, fetched) = send_empty(&app, Method::GET, &format!("/collections/lessons/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["_id"], id);
    assert_eq!(fetched["topic"], "Maths");
    assert_eq!(fetched["price"], 100);
}

#[tokio::test]
async fn list_returns_insertion_order() {
    let app = app();
    for topic in ["Art", "Biology", "Chess"] {
        create(&app, "lessons", json!({ "topic": topic })).await;
    }

    let (status, listed) = send_empty(&app, Method::GET, "/collections/lessons").await;
    assert_eq!(status, StatusCode::OK);
    let topics: Vec<_> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|doc| doc["topic"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(topics, ["Art", "Biology", "Chess"]);
}

#[tokio::test]
async fn unknown_collection_lists_empty() {
    let app = app();
    let (status, listed) = send_empty(&app, Method::GET, "/collections/nothing_here").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn sorted_list_honours_max_and_direction() {
    let app = app();
    for price in [10, 30, 20] {
        create(&app, "lessons", json!({ "price": price })).await;
    }

    let (status, top) = send_empty(&app, Method::GET, "/collections/lessons/2/price/desc").await;
    assert_eq!(status, StatusCode::OK);
    let prices: Vec<_> = top.as_array().unwrap().iter().map(|d| d["price"].clone()).collect();
    assert_eq!(prices, [json!(30), json!(20)]);

    let (status, bottom) = send_empty(&app, Method::GET, "/collections/lessons/5/price/asc").await;
    assert_eq!(status, StatusCode::OK);
    let prices: Vec<_> = bottom.as_array().unwrap().iter().map(|d| d["price"].clone()).collect();
    assert_eq!(prices, [json!(10), json!(20), json!(30)]);
}

#[tokio::test]
async fn sorted_list_rejects_bad_max() {
    let app = app();
    for uri in [
        "/collections/lessons/0/price/asc",
        "/collections/lessons/-1/price/asc",
        "/collections/lessons/many/price/asc",
    ] {
        let (status, body) = send_empty(&app, Method::GET, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].as_str().unwrap().contains("max"));
    }
}

#[tokio::test]
async fn featured_list_is_top_ten_by_price() {
    let app = app();
    for price in 1..=12 {
        create(&app, "lessons", json!({ "price": price })).await;
    }

    let (status, featured) = send_empty(&app, Method::GET, "/collections1/lessons").await;
    assert_eq!(status, StatusCode::OK);
    let featured = featured.as_array().unwrap();
    assert_eq!(featured.len(), 10);
    assert_eq!(featured[0]["price"], 12);
    assert_eq!(featured[9]["price"], 3);
}

#[tokio::test]
async fn update_merges_fields() {
    let app = app();
    let id = create(&app, "lessons", json!({"topic": "Art", "price": 50})).await;

    let (status, body) = send_json(
        &app,
        Method::PUT,
        &format!("/collections/lessons/{id}"),
        json!({"price": 75, "location": "Leeds"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"msg": "Success"}));

    let (_, fetched) = send_empty(&app, Method::GET, &format!("/collections/lessons/{id}")).await;
    assert_eq!(fetched["topic"], "Art");
    assert_eq!(fetched["price"], 75);
    assert_eq!(fetched["location"], "Leeds");
}

#[tokio::test]
async fn update_cannot_change_id() {
    let app = app();
    let id = create(&app, "lessons", json!({"topic": "Art"})).await;

    let (status, body) = send_json(
        &app,
        Method::PUT,
        &format!("/collections/lessons/{id}"),
        json!({"_id": "65a1b2c3d4e5f60718293a4b"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("_id"));
}

#[tokio::test]
async fn update_may_repeat_own_id_in_any_case() {
    let app = app();
    let id = create(&app, "lessons", json!({"topic": "Art"})).await;

    let (status, _) = send_json(
        &app,
        Method::PUT,
        &format!("/collections/lessons/{id}"),
        json!({"_id": id.to_uppercase(), "topic": "Drawing"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, fetched) = send_empty(&app, Method::GET, &format!("/collections/lessons/{id}")).await;
    assert_eq!(fetched["_id"], id.as_str());
    assert_eq!(fetched["topic"], "Drawing");
}

#[tokio::test]
async fn empty_update_is_rejected() {
    let app = app();
    let id = create(&app, "lessons", json!({"topic": "Art"})).await;

    let (status, body) = send_json(&app, Method::PUT, &format!("/collections/lessons/{id}"), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let app = app();
    let id = create(&app, "lessons", json!({"topic": "Art"})).await;

    let (status, body) = send_empty(&app, Method::DELETE, &format!("/collections/lessons/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"msg": "Success"}));

    let (status, body) = send_empty(&app, Method::GET, &format!("/collections/lessons/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = send_empty(&app, Method::DELETE, &format!("/collections/lessons/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_documents_are_not_found() {
    let app = app();
    let absent = "65a1b2c3d4e5f60718293a4b";

    let (status, _) = send_empty(&app, Method::GET, &format!("/collections/lessons/{absent}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(
        &app,
        Method::PUT,
        &format!("/collections/lessons/{absent}"),
        json!({"topic": "Art"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_identifiers_are_bad_requests() {
    let app = app();
    for id in ["not-an-id", "65a1b2c3d4e5f60718293a4", "zza1b2c3d4e5f60718293a4b"] {
        let (status, body) = send_empty(&app, Method::GET, &format!("/collections/lessons/{id}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{id}");
        assert!(body["error"].is_string());
    }

    let (status, _) = send_empty(&app, Method::DELETE, "/collections/lessons/nope").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_rejects_non_object_and_broken_json() {
    let app = app();

    let (status, body) = send_json(&app, Method::POST, "/collections/lessons", json!([1, 2])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/collections/lessons")
        .header("content-type", "application/json")
        .body(Body::from("{\"topic\":"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn create_with_duplicate_id_conflicts() {
    let app = app();
    let doc = json!({"_id": "65a1b2c3d4e5f60718293a4b", "topic": "Art"});

    let (status, created) = send_json(&app, Method::POST, "/collections/lessons", doc.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["insertedId"], "65a1b2c3d4e5f60718293a4b");

    let (status, body) = send_json(&app, Method::POST, "/collections/lessons", doc).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn uppercase_explicit_id_stays_addressable() {
    let app = app();
    let upper = "65A1B2C3D4E5F60718293A4B";
    let lower = "65a1b2c3d4e5f60718293a4b";

    let (status, created) = send_json(
        &app,
        Method::POST,
        "/collections/lessons",
        json!({"_id": upper, "topic": "Art"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["insertedId"], lower);

    for id in [lower, upper] {
        let (status, fetched) = send_empty(&app, Method::GET, &format!("/collections/lessons/{id}")).await;
        assert_eq!(status, StatusCode::OK, "{id}");
        assert_eq!(fetched["_id"], lower);
    }

    let (status, _) = send_empty(&app, Method::DELETE, &format!("/collections/lessons/{upper}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/collections/lessons",
        json!({"_id": upper, "topic": "Art"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn requests_before_connect_are_unavailable() {
    let connection = StoreConnection::new(ConnectionConfig::new("pending"));
    let app = build_router(AppState::new(connection.clone()));

    let (status, body) = send_empty(&app, Method::GET, "/collections/lessons").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"error": "store not ready"}));

    let (status, body) = send_empty(&app, Method::GET, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "connecting");

    connection.connect().await.unwrap();

    let (status, _) = send_empty(&app, Method::GET, "/collections/lessons").await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send_empty(&app, Method::GET, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_routes_answer_json_not_found() {
    let app = app();
    let (status, body) = send_empty(&app, Method::GET, "/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn wrong_methods_answer_json_method_not_allowed() {
    let app = app();
    let id = create(&app, "courses", json!({"name": "Pottery", "Space": 1})).await;

    for (method, uri) in [
        (Method::GET, format!("/collections/courses/{id}/add-to-cart")),
        (Method::PATCH, "/collections/x".to_string()),
    ] {
        let (status, body) = send_empty(&app, method, &uri).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}
