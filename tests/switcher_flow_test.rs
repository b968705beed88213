//! End-to-end tests for the switcher handshake through an Axum host

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use switchboard::{
    DisplayConfig, Identity, ImpersonationReader, ImpersonationSession, InMemoryDirectory,
    InMemorySessionStore, RequestSession, SessionConfig, SessionStore, SwitchAction,
    SwitcherFragment, SwitcherRenderer, UserId,
};
use tower::ServiceExt;

const SESSION_HEADER: &str = "x-session-id";

struct Host {
    directory: InMemoryDirectory,
    renderer: SwitcherRenderer,
    display: DisplayConfig,
    sessions: InMemorySessionStore,
    session_config: SessionConfig,
}

async fn page(
    State(host): State<Arc<Host>>,
    headers: HeaderMap,
    uri: Uri,
) -> switchboard::Result<Response> {
    let session_id = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let request_session =
        RequestSession::load(&host.sessions, session_id, host.session_config.default_ttl())
            .await?;
    let mut session = ImpersonationSession::new(request_session);

    if let Some(action) = SwitchAction::from_query(uri.query(), host.display.effective_param_name()) {
        action.apply(&mut session, &host.directory)?;
    }

    let html = host
        .renderer
        .render_directory(&host.directory, &session, &host.display);
    let new_id = session.into_handle().commit(&host.sessions).await?;

    let mut response = SwitcherFragment(html).into_response();
    response.headers_mut().insert(
        SESSION_HEADER,
        HeaderValue::from_str(&new_id).map_err(|e| switchboard::SwitcherError::internal(e.to_string()))?,
    );
    Ok(response)
}

fn host(identities: Vec<Identity>) -> Arc<Host> {
    Arc::new(Host {
        directory: InMemoryDirectory::from(identities),
        renderer: SwitcherRenderer::new().unwrap(),
        display: DisplayConfig::default(),
        sessions: InMemorySessionStore::new(),
        session_config: SessionConfig::default(),
    })
}

fn app(host: Arc<Host>) -> Router {
    Router::new().route("/", get(page)).with_state(host)
}

fn users() -> Vec<Identity> {
    vec![
        Identity::new(1, "Alice"),
        Identity::new(2, "Bob"),
        Identity::new("carol", "Carol"),
    ]
}

async fn send(app: &Router, uri: &str, session_id: Option<&str>) -> (StatusCode, String, String) {
    let mut request = Request::builder().uri(uri);
    if let Some(id) = session_id {
        request = request.header(SESSION_HEADER, id);
    }
    let response = app
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let session_id = response
        .headers()
        .get(SESSION_HEADER)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap(), session_id)
}

fn active_entry(html: &str) -> Option<&str> {
    html.split("<li class=\"sb-switcher-item sb-switcher-item-active\">")
        .nth(1)
        .and_then(|chunk| chunk.split("</li>").next())
}

#[tokio::test]
async fn test_switch_then_stop_round_trip() {
    let host = host(users());
    let app = app(host.clone());

    // Fresh visitor, not impersonating
    let (status, html, first_id) = send(&app, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Switch User"));
    assert!(!html.contains("Stop Impersonating"));

    // Pick Bob; the query value is text, the stored id stays an integer
    let (status, html, second_id) = send(&app, "/?_switch_user=2", Some(&first_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Stop Impersonating"));
    assert!(active_entry(&html).unwrap().contains("Bob"));
    assert_ne!(second_id, first_id);
    assert!(host.sessions.load(&first_id).await.unwrap().is_none());

    let stored = RequestSession::load(&host.sessions, &second_id, host.session_config.default_ttl())
        .await
        .unwrap();
    let session = ImpersonationSession::new(stored);
    assert_eq!(session.original_user_id().unwrap(), Some(UserId::Int(2)));

    // Plain reload keeps the state and the token
    let (_, html, third_id) = send(&app, "/", Some(&second_id)).await;
    assert_eq!(third_id, second_id);
    assert!(active_entry(&html).unwrap().contains("Bob"));

    // Stop
    let (status, html, fourth_id) = send(&app, "/?_switch_user=_stop", Some(&third_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Switch User"));
    assert!(!html.contains("Stop Impersonating"));
    assert!(active_entry(&html).is_none());
    assert_ne!(fourth_id, third_id);
    assert_eq!(host.sessions.len().await, 1);
}

#[tokio::test]
async fn test_switch_to_textual_identifier() {
    let app = app(host(users()));

    let (status, html, _) = send(&app, "/?page=3&_switch_user=carol", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(active_entry(&html).unwrap().contains("Carol"));
}

#[tokio::test]
async fn test_unknown_identity_is_not_found() {
    let host = host(users());
    let app = app(host.clone());

    let (status, body, _) = send(&app, "/?_switch_user=99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Unknown identity"));
    assert!(host.sessions.is_empty().await);
}

#[tokio::test]
async fn test_stop_without_impersonation_is_harmless() {
    let app = app(host(users()));

    let (status, html, _) = send(&app, "/?_switch_user=_stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Switch User"));
}

#[tokio::test]
async fn test_empty_directory_renders_nothing() {
    let app = app(host(Vec::new()));

    let (status, html, _) = send(&app, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.is_empty());
}
