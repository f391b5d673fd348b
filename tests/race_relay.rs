//! HTTP tests for the race relay and health endpoints.
//!
//! The router is driven in-process with `oneshot`; no socket is bound.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio_test::assert_ok;
use tower::ServiceExt;

use nightwatch_server::app::AppState;
use nightwatch_server::config::Config;
use nightwatch_server::http::build_router;
use nightwatch_server::relay::InMemorySessionStore;
use nightwatch_server::util::time::ManualClock;

fn router() -> Router {
    let state = AppState::with_parts(
        Config::default(),
        Arc::new(InMemorySessionStore::new()),
        Arc::new(ManualClock::new(0)),
    );
    build_router(state)
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    };
    let response = assert_ok!(router.clone().oneshot(assert_ok!(request)).await);
    let status = response.status();
    let bytes = assert_ok!(to_bytes(response.into_body(), usize::MAX).await);
    (status, bytes.to_vec())
}

fn json_body(bytes: &[u8]) -> Value {
    assert_ok!(serde_json::from_slice::<Value>(bytes))
}

async fn create(router: &Router, user_id: Value) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/api/games/race/create",
        Some(json!({ "userId": user_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json_body(&body)["sessionId"]
        .as_str()
        .expect("sessionId should be a string")
        .to_string()
}

#[tokio::test]
async fn join_hands_out_the_session_seed() {
    let router = router();
    let sid = create(&router, json!("u1")).await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/games/race/join",
        Some(json!({ "sessionId": sid, "userId": "u2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let joined = json_body(&body);
    assert_eq!(joined["success"], true);

    let (status, body) = send(&router, Method::GET, &format!("/api/games/race/{sid}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let session = json_body(&body);
    assert_eq!(session["seed"], joined["seed"]);
    assert_eq!(session["roadSpeed"], 3.0);
    assert_eq!(session["players"].as_array().map(Vec::len), Some(2));
    assert_eq!(session["players"][1]["userId"], "u2");
}

#[tokio::test]
async fn third_player_is_turned_away() {
    let router = router();
    let sid = create(&router, json!(1)).await;

    for (user, expected) in [(2, StatusCode::OK), (3, StatusCode::BAD_REQUEST)] {
        let (status, _) = send(
            &router,
            Method::POST,
            "/api/games/race/join",
            Some(json!({ "sessionId": sid, "userId": user })),
        )
        .await;
        assert_eq!(status, expected);
    }

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/games/race/join",
        Some(json!({ "sessionId": "not-a-session", "userId": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json_body(&body)["error"].is_string());
}

#[tokio::test]
async fn update_returns_both_players() {
    let router = router();
    let sid = create(&router, json!("host")).await;
    send(
        &router,
        Method::POST,
        "/api/games/race/join",
        Some(json!({ "sessionId": sid, "userId": "guest" })),
    )
    .await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/games/race/update",
        Some(json!({ "sessionId": sid, "userId": "guest", "x": 420.0, "score": 9.5, "avoided": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let snapshot = json_body(&body);
    assert_eq!(snapshot["players"][0]["x"], 300.0);
    assert_eq!(snapshot["players"][1]["x"], 420.0);
    assert_eq!(snapshot["players"][1]["score"], 9.5);
    assert_eq!(snapshot["players"][1]["avoided"], 2);
    assert!(snapshot.get("seed").is_some());
}

#[tokio::test]
async fn updates_for_unknown_targets_are_dropped() {
    let router = router();
    let sid = create(&router, json!("host")).await;

    let cases = [
        json!({ "sessionId": uuid::Uuid::new_v4(), "userId": "host", "x": 1.0, "score": 1.0 }),
        json!({ "sessionId": sid, "userId": "stranger", "x": 1.0, "score": 1.0 }),
        json!({ "sessionId": "garbage", "userId": "host", "x": 1.0, "score": 1.0 }),
    ];
    for case in cases {
        let (status, body) = send(&router, Method::POST, "/api/games/race/update", Some(case)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
    }
}

#[tokio::test]
async fn unknown_session_is_404() {
    let router = router();
    let (status, _) = send(
        &router,
        Method::GET,
        &format!("/api/games/race/{}", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, Method::GET, "/api/games/race/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_bodies_get_a_json_error() {
    let router = router();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/games/race/create")
        .header("content-type", "application/json")
        .body(Body::from("{\"userId\":"));
    let response = assert_ok!(router.clone().oneshot(assert_ok!(request)).await);
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = assert_ok!(to_bytes(response.into_body(), usize::MAX).await);
    assert!(json_body(&bytes)["error"].is_string());

    // Well-formed JSON with a missing field
    let (status, body) = send(
        &router,
        Method::POST,
        "/api/games/race/update",
        Some(json!({ "sessionId": "abc" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json_body(&body)["error"].is_string());

    // No content type at all
    let (status, body) = send(&router, Method::POST, "/api/games/race/join", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json_body(&body)["error"].is_string());
}

#[tokio::test]
async fn health_counts_sessions() {
    let router = router();
    create(&router, json!("u1")).await;

    let (status, body) = send(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    let health = json_body(&body);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["race_sessions"], 1);
    assert_eq!(health["active_arenas"], 0);
}
