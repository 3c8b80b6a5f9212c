mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use colabri_rooms::build_app;
use colabri_rooms::models::{Plan, Role};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{app_state, token};

async fn call(app: &Router, method: Method, uri: &str, bearer: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", bearer));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

#[tokio::test]
async fn health_is_public() {
    let app = build_app(app_state(Plan::Free).await);
    let (status, body) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn api_requires_a_token() {
    let app = build_app(app_state(Plan::Free).await);

    let (status, body) = call(&app, Method::GET, "/rooms", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = call(&app, Method::GET, "/rooms", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn staged_change_review_flow() {
    let app = build_app(app_state(Plan::Pro).await);
    let admin = token("admin", "Admin", Role::Admin);
    let bob = token("bob", "Bob", Role::User);

    let (status, body) = call(&app, Method::POST, "/rooms", Some(&admin), Some(json!({"name": "standup"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let room_id = body["room"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/projects/{}/content", room_id),
        Some(&admin),
        Some(json!({"content": "Hello"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["staged"], false);

    let (_, body) = call(
        &app,
        Method::PUT,
        &format!("/projects/{}/content", room_id),
        Some(&bob),
        Some(json!({"content": "Hello\nWorld"})),
    )
    .await;
    assert_eq!(body["staged"], true);

    let (_, body) = call(&app, Method::GET, &format!("/projects/{}", room_id), Some(&bob), None).await;
    assert_eq!(body["project"]["content"], "Hello");

    let (_, body) = call(&app, Method::GET, &format!("/projects/{}/staged-changes", room_id), Some(&admin), None).await;
    let changes = body["changes"].as_array().unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(
        changes[0]["diff"],
        json!([
            {"lineNumber": 1, "type": "unchanged", "content": "Hello"},
            {"lineNumber": 2, "type": "added", "content": "World"}
        ])
    );
    let change_id = changes[0]["id"].as_str().unwrap().to_string();

    // Editors cannot review
    let (status, _) = call(
        &app,
        Method::PUT,
        &format!("/staged-changes/{}", change_id),
        Some(&bob),
        Some(json!({"approve": true})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(
        &app,
        Method::PUT,
        &format!("/staged-changes/{}", change_id),
        Some(&admin),
        Some(json!({"approve": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = call(
        &app,
        Method::PUT,
        &format!("/staged-changes/{}", change_id),
        Some(&admin),
        Some(json!({"approve": false, "feedback": "too late"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = call(&app, Method::GET, &format!("/projects/{}", room_id), Some(&bob), None).await;
    assert_eq!(body["project"]["content"], "Hello\nWorld");

    let (_, body) = call(&app, Method::GET, &format!("/projects/{}/history", room_id), Some(&bob), None).await;
    let history = body["history"].as_array().unwrap();
    assert_eq!(history[0]["type"], "merge");
    assert_eq!(history[0]["message"], "Approved changes from Bob");
    assert_eq!(history[1]["type"], "edit");
}

#[tokio::test]
async fn free_plan_room_limit() {
    let app = build_app(app_state(Plan::Free).await);
    let admin = token("admin", "Admin", Role::Admin);

    for name in ["a", "b", "c"] {
        let (status, _) = call(&app, Method::POST, "/rooms", Some(&admin), Some(json!({"name": name}))).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, body) = call(&app, Method::POST, "/rooms", Some(&admin), Some(json!({"name": "d"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Room limit exceeded for your plan");

    let (_, body) = call(&app, Method::GET, "/rooms", Some(&admin), None).await;
    assert_eq!(body["rooms"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn comments_can_only_be_deleted_by_admins() {
    let app = build_app(app_state(Plan::Pro).await);
    let admin = token("admin", "Admin", Role::Admin);
    let bob = token("bob", "Bob", Role::User);

    let (_, body) = call(&app, Method::POST, "/rooms", Some(&admin), Some(json!({"name": "docs"}))).await;
    let room_id = body["room"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/projects/{}/comments", room_id),
        Some(&bob),
        Some(json!({"text": "typo", "selectedText": "Helo", "startPosition": 0, "endPosition": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let comment_id = body["comment"]["id"].as_str().unwrap().to_string();
    let uri = format!("/projects/{}/comments/{}", room_id, comment_id);

    let (status, body) = call(&app, Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 403);

    let (status, _) = call(&app, Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&app, Method::GET, &format!("/projects/{}/comments", room_id), Some(&bob), None).await;
    assert!(body["comments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn diagnostics_is_admin_only() {
    let app = build_app(app_state(Plan::Free).await);

    let (status, _) = call(&app, Method::GET, "/diagnostics", Some(&token("bob", "Bob", Role::User)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&app, Method::GET, "/diagnostics", Some(&token("root", "Root", Role::SuperAdmin)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["n_conn"], 0);
}

#[tokio::test]
async fn rooms_can_be_joined_and_left_over_rest() {
    let state = app_state(Plan::Pro).await;
    let app = build_app(state.clone());
    let admin = token("admin", "Admin", Role::Admin);
    let bob = token("bob", "Bob", Role::User);

    let (status, body) = call(
        &app,
        Method::POST,
        "/webhooks",
        Some(&admin),
        Some(json!({"url": "https://hooks.test/rooms"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["webhook"]["events"], json!(["room.created", "room.joined", "room.left"]));
    assert_eq!(body["webhook"]["active"], true);

    let (_, body) = call(&app, Method::POST, "/rooms", Some(&admin), Some(json!({"name": "standup"}))).await;
    let room_id = body["room"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/rooms/{}/join", room_id),
        Some(&bob),
        Some(json!({"userData": {"name": "Bob"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["room"]["memberCount"], 1);
    assert_eq!(body["room"]["isActive"], true);

    // Editors cannot move someone else
    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/rooms/{}/leave", room_id),
        Some(&bob),
        Some(json!({"userId": "carol"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&app, Method::POST, &format!("/rooms/{}/leave", room_id), Some(&bob), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, body) = call(&app, Method::GET, "/rooms", Some(&bob), None).await;
    assert_eq!(body["rooms"][0]["memberCount"], 0);
    assert_eq!(body["rooms"][0]["isActive"], false);

    // created, joined, left
    assert_eq!(state.webhooks.deliveries(), 3);

    let (_, body) = call(&app, Method::GET, "/analytics", Some(&admin), None).await;
    assert_eq!(body["analytics"]["roomJoins"], 1);
    assert_eq!(body["analytics"]["roomLeaves"], 1);
}

#[tokio::test]
async fn webhooks_need_an_admin_and_an_http_url() {
    let app = build_app(app_state(Plan::Free).await);

    let (status, _) = call(
        &app,
        Method::POST,
        "/webhooks",
        Some(&token("bob", "Bob", Role::User)),
        Some(json!({"url": "https://hooks.test"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        Method::POST,
        "/webhooks",
        Some(&token("admin", "Admin", Role::Admin)),
        Some(json!({"url": "mailto:ops@example.test"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::POST, "/rooms/room_missing/join", Some(&token("bob", "Bob", Role::User)), Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
