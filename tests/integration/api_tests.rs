//! API integration tests
//!
//! The in-process tests drive the router with `oneshot` over a lazily
//! connected pool, so they only cover paths that are rejected before any
//! query runs. The `#[ignore]` tests need a running server and database:
//! `cargo test -- --ignored`.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use bookshelf_server::{
    config::AppConfig, create_router, models::user::UserClaims, repository::Repository,
    services::Services, AppState,
};

const BASE_URL: &str = "http://localhost:8000/api/v1";

fn app() -> (Router, AppConfig) {
    let config = AppConfig::default();
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .expect("Invalid database url");
    let services = Services::new(Repository::new(pool), &config);
    let state = AppState {
        config: Arc::new(config.clone()),
        services: Arc::new(services),
    };
    (create_router(state), config)
}

fn token_for(user_id: i64, config: &AppConfig) -> String {
    let now = Utc::now().timestamp();
    UserClaims {
        sub: format!("user{}", user_id),
        user_id,
        exp: now + 3600,
        iat: now,
    }
    .create_token(&config.auth.jwt_secret)
    .expect("Failed to sign token")
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("Request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = app();
    let request = Request::get("/api/v1/health").body(Body::empty()).unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_write_endpoints_require_token() {
    let cases = [
        (Method::POST, "/api/v1/books/create/", r#"{"title": "Dune"}"#),
        (Method::PATCH, "/api/v1/books/1/", "{}"),
        (Method::POST, "/api/v1/lists/create/", r#"{"title": "Summer"}"#),
        (Method::POST, "/api/v1/list_items/create/", r#"{"book": 1, "list": 1}"#),
        (Method::POST, "/api/v1/list_items/1/move/", r#"{"direction": "up"}"#),
        (Method::DELETE, "/api/v1/list_items/1/", ""),
    ];

    for (method, uri, body) in cases {
        let (app, _) = app();
        let (status, body) = send(app, json_request(method.clone(), uri, None, body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body["error"], "NotAuthenticated");
    }
}

#[tokio::test]
async fn test_private_collections_require_token() {
    for uri in ["/api/v1/notes/", "/api/v1/book_cards/", "/api/v1/user/details/"] {
        let (app, _) = app();
        let request = Request::get(uri).body(Body::empty()).unwrap();
        let (status, _) = send(app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
    }
}

#[tokio::test]
async fn test_invalid_token_is_rejected_on_required_endpoints() {
    let (app, _) = app();
    let request = json_request(Method::POST, "/api/v1/lists/create/", Some("garbage"), r#"{"title": "x"}"#);

    let (status, _) = send(app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_only_own_lists_needs_authentication() {
    let (app, _) = app();
    let request = Request::get("/api/v1/lists/?only_own_lists=true")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_numeric_page_is_not_found() {
    let (app, _) = app();
    let request = Request::get("/api/v1/books/?page=abc").body(Body::empty()).unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchEntity");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (app, _) = app();
    let request = json_request(Method::POST, "/api/v1/token/login/", None, "{not json");

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let (app, _) = app();
    let request = Request::get("/api/v1/lists/abc/").body(Body::empty()).unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    let (app, config) = crate::app();
    let token = token_for(1, &config);
    let request = json_request(Method::PATCH, "/api/v1/list_items/1x/", Some(&token), "{}");

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6);
}

#[tokio::test]
async fn test_unknown_move_direction_is_bad_request() {
    let (app, config) = app();
    let token = token_for(1, &config);
    let request = json_request(
        Method::POST,
        "/api/v1/list_items/1/move/",
        Some(&token),
        r#"{"direction": "sideways"}"#,
    );

    let (status, _) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_negative_insert_position_is_rejected() {
    let (app, config) = app();
    let token = token_for(1, &config);
    let request = json_request(
        Method::POST,
        "/api/v1/list_items/create/",
        Some(&token),
        r#"{"book": 1, "list": 1, "position": -1}"#,
    );

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["position"].is_array());
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (app, _) = app();
    let request = Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/lists/{id}/"].is_object());
}

// ---------------------------------------------------------------------------
// Against a running server
// ---------------------------------------------------------------------------

/// Register a fresh user and return its token
async fn register_and_login(client: &Client, username: &str) -> String {
    let password = "correct horse battery";
    client
        .post(format!("{}/users/", BASE_URL))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send register request");

    let response = client
        .post(format!("{}/token/login/", BASE_URL))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["auth_token"].as_str().expect("No token in response").to_string()
}

fn unique(prefix: &str) -> String {
    format!("{}{}", prefix, Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

async fn post(client: &Client, token: &str, path: &str, body: Value) -> reqwest::Response {
    client
        .post(format!("{}{}", BASE_URL, path))
        .header("Authorization", format!("Token {}", token))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request")
}

async fn create_book(client: &Client, token: &str, title: &str) -> i64 {
    let author: Value = post(client, token, "/authors/create/", json!({ "last_name": "Herbert" }))
        .await
        .json()
        .await
        .unwrap();

    let book: Value = post(
        client,
        token,
        "/books/create/",
        json!({ "title": title, "authors": [author["id"]] }),
    )
    .await
    .json()
    .await
    .unwrap();
    book["id"].as_i64().expect("No book id")
}

async fn list_orders(client: &Client, token: &str, list_id: i64) -> Vec<(i64, i64)> {
    let list: Value = client
        .get(format!("{}/lists/{}/", BASE_URL, list_id))
        .header("Authorization", format!("Token {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    list["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| (item["id"].as_i64().unwrap(), item["order"].as_i64().unwrap()))
        .collect()
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/token/login/", BASE_URL))
        .json(&json!({ "username": "nobody", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_list_items_stay_dense() {
    let client = Client::new();
    let token = register_and_login(&client, &unique("reader")).await;

    let list: Value = post(&client, &token, "/lists/create/", json!({ "title": "Shelf" }))
        .await
        .json()
        .await
        .unwrap();
    let list_id = list["id"].as_i64().unwrap();

    let mut items = Vec::new();
    for title in ["A", "B", "C", "D"] {
        let book = create_book(&client, &token, title).await;
        let response = post(&client, &token, "/list_items/create/", json!({ "book": book, "list": list_id })).await;
        assert_eq!(response.status(), 201);
        let item: Value = response.json().await.unwrap();
        assert_eq!(item["order"].as_i64().unwrap(), items.len() as i64);
        items.push(item["id"].as_i64().unwrap());
    }

    // Removing B closes the gap
    let response = client
        .delete(format!("{}/list_items/{}/", BASE_URL, items[1]))
        .header("Authorization", format!("Token {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);
    assert_eq!(
        list_orders(&client, &token, list_id).await,
        vec![(items[0], 0), (items[2], 1), (items[3], 2)]
    );

    // D to the top
    let response = post(&client, &token, &format!("/list_items/{}/move/", items[3]), json!({ "direction": "top" })).await;
    assert_eq!(response.status(), 200);
    let moved: Vec<Value> = response.json().await.unwrap();
    let ids: Vec<i64> = moved.iter().map(|i| i["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![items[3], items[0], items[2]]);

    // Appending after a delete lands at the end
    let book = create_book(&client, &token, "E").await;
    let item: Value = post(&client, &token, "/list_items/create/", json!({ "book": book, "list": list_id }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(item["order"], 3);
}

#[tokio::test]
#[ignore]
async fn test_list_item_create_rules() {
    let client = Client::new();
    let owner = register_and_login(&client, &unique("owner")).await;
    let stranger = register_and_login(&client, &unique("stranger")).await;

    let list: Value = post(&client, &owner, "/lists/create/", json!({ "title": "Mine", "is_public": true }))
        .await
        .json()
        .await
        .unwrap();
    let book = create_book(&client, &owner, "Dune").await;
    let payload = json!({ "book": book, "list": list["id"] });

    let response = post(&client, &stranger, "/list_items/create/", payload.clone()).await;
    assert_eq!(response.status(), 403);

    let response = post(&client, &owner, "/list_items/create/", payload.clone()).await;
    assert_eq!(response.status(), 201);

    let response = post(&client, &owner, "/list_items/create/", payload).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_private_list_is_forbidden_to_others() {
    let client = Client::new();
    let owner = register_and_login(&client, &unique("owner")).await;
    let stranger = register_and_login(&client, &unique("stranger")).await;

    let list: Value = post(&client, &owner, "/lists/create/", json!({ "title": "Secret" }))
        .await
        .json()
        .await
        .unwrap();

    let response = client
        .get(format!("{}/lists/{}/", BASE_URL, list["id"]))
        .header("Authorization", format!("Token {}", stranger))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = client
        .get(format!("{}/lists/{}/", BASE_URL, list["id"]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

/// Create a list and append the given books in order, returning (list id, item ids)
async fn filled_list(client: &Client, token: &str, title: &str, books: &[i64]) -> (i64, Vec<i64>) {
    let list: Value = post(client, token, "/lists/create/", json!({ "title": title }))
        .await
        .json()
        .await
        .unwrap();
    let list_id = list["id"].as_i64().unwrap();

    let mut items = Vec::new();
    for book in books {
        let item: Value = post(client, token, "/list_items/create/", json!({ "book": book, "list": list_id }))
            .await
            .json()
            .await
            .unwrap();
        items.push(item["id"].as_i64().unwrap());
    }
    (list_id, items)
}

#[tokio::test]
#[ignore]
async fn test_insert_at_position_shifts_later_items() {
    let client = Client::new();
    let token = register_and_login(&client, &unique("reader")).await;

    let mut books = Vec::new();
    for title in ["A", "B", "C"] {
        books.push(create_book(&client, &token, title).await);
    }
    let (list_id, items) = filled_list(&client, &token, "Queue", &books).await;

    let d = create_book(&client, &token, "D").await;
    let response = post(
        &client,
        &token,
        "/list_items/create/",
        json!({ "book": d, "list": list_id, "position": 1 }),
    )
    .await;
    assert_eq!(response.status(), 201);
    let inserted: Value = response.json().await.unwrap();
    assert_eq!(inserted["order"], 1);
    let d_item = inserted["id"].as_i64().unwrap();

    assert_eq!(
        list_orders(&client, &token, list_id).await,
        vec![(items[0], 0), (d_item, 1), (items[1], 2), (items[2], 3)]
    );

    // Past the end clamps to an append
    let e = create_book(&client, &token, "E").await;
    let appended: Value = post(
        &client,
        &token,
        "/list_items/create/",
        json!({ "book": e, "list": list_id, "position": 40 }),
    )
    .await
    .json()
    .await
    .unwrap();
    assert_eq!(appended["order"], 4);
}

#[tokio::test]
#[ignore]
async fn test_book_delete_keeps_every_list_dense() {
    let client = Client::new();
    let token = register_and_login(&client, &unique("reader")).await;

    let shared = create_book(&client, &token, "Shared").await;
    let first = create_book(&client, &token, "First").await;
    let last = create_book(&client, &token, "Last").await;

    let (front_list, front_items) = filled_list(&client, &token, "Front", &[shared, first, last]).await;
    let (middle_list, middle_items) = filled_list(&client, &token, "Middle", &[first, shared, last]).await;

    let response = client
        .delete(format!("{}/books/{}/", BASE_URL, shared))
        .header("Authorization", format!("Token {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    assert_eq!(
        list_orders(&client, &token, front_list).await,
        vec![(front_items[1], 0), (front_items[2], 1)]
    );
    assert_eq!(
        list_orders(&client, &token, middle_list).await,
        vec![(middle_items[0], 0), (middle_items[2], 1)]
    );
}
