//! REST transport against an in-process tag server.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tagdeck_core::{Tag, TagId};
use tagdeck_test_utils::{numbered_tags, tag};
use tagdeck_tui::api_client::{TagClient, TagTransport, TransportError};
use tagdeck_tui::config::AuthConfig;
use tokio::time::Instant;

#[derive(Clone)]
struct ServerState {
    tags: Arc<Mutex<Vec<Tag>>>,
    next_id: Arc<Mutex<u64>>,
    api_key: Option<&'static str>,
}

fn authorized(state: &ServerState, headers: &HeaderMap) -> Result<(), StatusCode> {
    match state.api_key {
        Some(expected) if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some(expected) => {
            Err(StatusCode::UNAUTHORIZED)
        }
        _ => Ok(()),
    }
}

async fn list_tags(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Tag>>, StatusCode> {
    authorized(&state, &headers)?;
    Ok(Json(state.tags.lock().unwrap().clone()))
}

async fn create_tag(
    State(state): State<ServerState>,
    Json(mut tag): Json<Tag>,
) -> (StatusCode, Json<Tag>) {
    let id = {
        let mut next = state.next_id.lock().unwrap();
        *next += 1;
        *next
    };
    tag.id = Some(TagId::new(id.to_string()));
    state.tags.lock().unwrap().push(tag.clone());
    (StatusCode::CREATED, Json(tag))
}

async fn get_tag(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Tag>, (StatusCode, String)> {
    let id = TagId::new(id);
    state
        .tags
        .lock()
        .unwrap()
        .iter()
        .find(|t| t.has_id(&id))
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("\"tag {id} not found\"")))
}

async fn update_tag(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(tag): Json<Tag>,
) -> Result<Json<Tag>, StatusCode> {
    let id = TagId::new(id);
    let mut tags = state.tags.lock().unwrap();
    let slot = tags
        .iter_mut()
        .find(|t| t.has_id(&id))
        .ok_or(StatusCode::NOT_FOUND)?;
    *slot = Tag::draft(tag.name, tag.color).with_id(id);
    Ok(Json(slot.clone()))
}

async fn delete_tag(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Tag>, StatusCode> {
    let id = TagId::new(id);
    let mut tags = state.tags.lock().unwrap();
    let index = tags
        .iter()
        .position(|t| t.has_id(&id))
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(tags.remove(index)))
}

async fn delete_without_body(Path(_id): Path<String>) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn broken_list() -> &'static str {
    "[{\"name\": 1}]"
}

async fn spawn_server(tags: Vec<Tag>, api_key: Option<&'static str>) -> SocketAddr {
    let state = ServerState {
        tags: Arc::new(Mutex::new(tags)),
        next_id: Arc::new(Mutex::new(100)),
        api_key,
    };
    let app = Router::new()
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/:id", get(get_tag).put(update_tag).delete(delete_tag))
        .route("/bare/:id", delete(delete_without_body))
        .route("/broken", get(broken_list))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr, path: &str, latency: Duration) -> TagClient {
    client_with_auth(addr, path, latency, &AuthConfig::default())
}

fn client_with_auth(addr: SocketAddr, path: &str, latency: Duration, auth: &AuthConfig) -> TagClient {
    TagClient::with_options(
        &format!("http://{addr}/{path}"),
        Duration::from_secs(5),
        latency,
        auth,
    )
    .unwrap()
}

#[tokio::test]
async fn crud_round_trip() {
    let addr = spawn_server(numbered_tags(2), None).await;
    let client = client(addr, "tags", Duration::ZERO);

    assert_eq!(client.list_tags().await.unwrap(), numbered_tags(2));
    assert_eq!(
        client.get_tag(&TagId::new("2")).await.unwrap(),
        numbered_tags(2)[1]
    );

    let created = client.create_tag(&Tag::draft("new", "green")).await.unwrap();
    assert_eq!(created, tag("101", "new", "green"));

    let renamed = tag("101", "renamed", "green");
    assert_eq!(client.update_tag(&renamed).await.unwrap(), renamed);

    let deleted = client.delete_tag(&tag("1", "ignored", "x")).await.unwrap();
    assert_eq!(deleted, numbered_tags(1)[0]);

    let remaining = client.list_tags().await.unwrap();
    assert_eq!(remaining, vec![numbered_tags(2)[1].clone(), renamed]);
}

#[tokio::test]
async fn missing_tag_reports_status_and_body() {
    let addr = spawn_server(Vec::new(), None).await;
    let client = client(addr, "tags", Duration::ZERO);

    let err = client.get_tag(&TagId::new("404")).await.unwrap_err();
    match err {
        TransportError::Status { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("tag 404 not found"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn latency_applies_only_to_success() {
    let latency = Duration::from_millis(300);
    let addr = spawn_server(numbered_tags(1), None).await;
    let client = client(addr, "tags", latency);

    let started = Instant::now();
    client.list_tags().await.unwrap();
    assert!(started.elapsed() >= latency);

    let started = Instant::now();
    let err = client.get_tag(&TagId::new("missing")).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(started.elapsed() < latency);
}

#[tokio::test]
async fn api_key_header_is_sent() {
    let addr = spawn_server(numbered_tags(1), Some("secret")).await;

    let anonymous = client(addr, "tags", Duration::ZERO);
    let err = anonymous.list_tags().await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    let auth = AuthConfig {
        api_key: Some("secret".to_string()),
        jwt: None,
    };
    let keyed = client_with_auth(addr, "tags", Duration::ZERO, &auth);
    assert_eq!(keyed.list_tags().await.unwrap().len(), 1);
}

#[tokio::test]
async fn empty_delete_response_returns_requested_tag() {
    let addr = spawn_server(Vec::new(), None).await;
    let client = client(addr, "bare", Duration::ZERO);

    let doomed = tag("7", "gone", "red");
    assert_eq!(client.delete_tag(&doomed).await.unwrap(), doomed);
}

#[tokio::test]
async fn undecodable_body_is_a_serde_error() {
    let addr = spawn_server(Vec::new(), None).await;
    let client = client(addr, "broken", Duration::ZERO);

    let err = client.list_tags().await.unwrap_err();
    assert!(matches!(err, TransportError::Serde(_)));
}
