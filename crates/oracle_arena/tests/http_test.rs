//! HTTP routes exercised through the router without a socket.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use oracle_arena::oracles::RuleOracle;
use oracle_arena::{ErrorResponse, OracleRegistry, SessionSettings, SessionStore, Snapshot, router};
use oracle_board::{Cell, Player, ProgressLabel};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let oracles = OracleRegistry::builder()
        .register("Rules", RuleOracle)
        .build()
        .unwrap();
    router(SessionStore::new(
        Arc::new(oracles),
        SessionSettings::new(Player::O, Some(21)),
    ))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).unwrap()
}

#[tokio::test]
async fn test_state_starts_empty() {
    let app = app();
    let (status, body) = send(&app, "GET", "/state", None).await;
    assert_eq!(status, StatusCode::OK);
    let snap: Snapshot = decode(&body);
    assert_eq!(snap.board, [Cell::Empty; 9]);
    assert_eq!(snap.ground_truth, None);
}

#[tokio::test]
async fn test_move_then_automated_move() {
    let app = app();
    let (status, body) = send(&app, "POST", "/move", Some(r#"{"index": 4}"#)).await;
    assert_eq!(status, StatusCode::OK);
    let snap: Snapshot = decode(&body);
    assert_eq!(snap.board[4], Cell::Occupied(Player::X));
    assert_eq!(snap.ground_truth, Some(ProgressLabel::Ongoing));

    let (status, body) = send(&app, "POST", "/automated_move", None).await;
    assert_eq!(status, StatusCode::OK);
    let snap: Snapshot = decode(&body);
    assert_eq!(snap.move_count, 2);
    assert_eq!(snap.current_turn, Player::X);

    let (_, body) = send(&app, "GET", "/state", None).await;
    assert_eq!(decode::<Snapshot>(&body).move_count, 2);
}

#[tokio::test]
async fn test_position_alias_accepted() {
    let app = app();
    let (status, _) = send(&app, "POST", "/move", Some(r#"{"position": 0}"#)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_illegal_moves_are_bad_requests() {
    let app = app();
    send(&app, "POST", "/move", Some(r#"{"index": 4}"#)).await;

    // Occupied, wrong turn, out of range, malformed.
    for body in [r#"{"index": 4}"#, r#"{"index": 0}"#, r#"{"index": 9}"#, r#"{"cell": "x"}"#] {
        let (status, bytes) = send(&app, "POST", "/move", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        let error: ErrorResponse = decode(&bytes);
        assert!(!error.error.is_empty());
    }

    let (_, body) = send(&app, "GET", "/state", None).await;
    assert_eq!(decode::<Snapshot>(&body).move_count, 1);
}

#[tokio::test]
async fn test_automated_move_out_of_turn() {
    let app = app();
    let (status, _) = send(&app, "POST", "/automated_move", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reset_returns_fresh_snapshot() {
    let app = app();
    let (_, fresh) = send(&app, "GET", "/state", None).await;
    send(&app, "POST", "/move", Some(r#"{"index": 2}"#)).await;

    let (status, body) = send(&app, "POST", "/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decode::<Snapshot>(&body), decode::<Snapshot>(&fresh));
}

#[tokio::test]
async fn test_keyed_session_lifecycle() {
    let app = app();

    let (status, body) = send(&app, "POST", "/sessions", Some(r#"{"id": "lab"}"#)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(decode::<Snapshot>(&body).session_id, "lab");

    let (status, _) = send(&app, "POST", "/sessions", Some(r#"{"id": "lab"}"#)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "POST", "/sessions/lab/move", Some(r#"{"index": 8}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decode::<Snapshot>(&body).board[8], Cell::Occupied(Player::X));

    let (status, _) = send(&app, "POST", "/sessions/lab/automated_move", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/sessions/lab/state", None).await;
    assert_eq!(decode::<Snapshot>(&body).move_count, 2);

    let (_, body) = send(&app, "GET", "/sessions", None).await;
    assert_eq!(decode::<Vec<String>>(&body), ["lab"]);

    // The default session is untouched.
    let (_, body) = send(&app, "GET", "/state", None).await;
    assert_eq!(decode::<Snapshot>(&body).move_count, 0);

    let (status, _) = send(&app, "POST", "/sessions/lab/reset", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", "/sessions/lab", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/sessions/lab", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_generated_session_id() {
    let app = app();
    let (status, body) = send(&app, "POST", "/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = decode::<Snapshot>(&body).session_id;
    assert!(id.starts_with("session-"));

    let (status, _) = send(&app, "GET", &format!("/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_session_routes_are_not_found() {
    let app = app();
    for (method, uri, body) in [
        ("GET", "/sessions/nope/state", None),
        ("POST", "/sessions/nope/move", Some(r#"{"index": 0}"#)),
        ("POST", "/sessions/nope/reset", None),
        ("POST", "/sessions/nope/automated_move", None),
        ("DELETE", "/sessions/nope", None),
    ] {
        let (status, _) = send(&app, method, uri, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn test_default_id_routes_reach_default_session() {
    let app = app();
    let (status, _) = send(&app, "POST", "/sessions/default/move", Some(r#"{"index": 6}"#)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/sessions/default", None).await;
    assert_eq!(status, StatusCode::OK);
    let keyed: Snapshot = decode(&body);
    let (_, body) = send(&app, "GET", "/state", None).await;
    assert_eq!(keyed, decode::<Snapshot>(&body));
    assert_eq!(keyed.board[6], Cell::Occupied(Player::X));

    let (status, _) = send(&app, "POST", "/sessions", Some(r#"{"id": "default"}"#)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&app, "DELETE", "/sessions/default", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}
