use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppState;
use super::sessions::{session_cookie, session_id};
use crate::app::{AskOutcome, AskRequest, LoadRequest, UserSession, font_css};
use crate::config::{FONT_SIZE_MAX, FONT_SIZE_MIN};
use crate::context::ChatLog;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

#[derive(Debug, Serialize)]
pub struct Settings {
    pub api_key_locked: bool,
    pub model: String,
    pub font_size: u32,
    pub font_min: u32,
    pub font_max: u32,
}

#[derive(Debug, Deserialize)]
pub struct StyleQuery {
    pub size: Option<u32>,
}

/// The browser's slot, plus a `Set-Cookie` value when the browser is new
fn browser_slot(state: &AppState, headers: &HeaderMap) -> (Arc<tokio::sync::Mutex<UserSession>>, Option<String>) {
    match session_id(headers) {
        Some(id) => (state.sessions.slot(id), None),
        None => {
            let id = Uuid::new_v4();
            (state.sessions.slot(id), Some(session_cookie(id)))
        }
    }
}

fn with_cookie(cookie: Option<String>, body: impl IntoResponse) -> Response {
    let mut resp = body.into_response();
    if let Some(value) = cookie.and_then(|c| HeaderValue::from_str(&c).ok()) {
        resp.headers_mut().insert(header::SET_COOKIE, value);
    }
    resp
}

/// Issues the session cookie; the slot itself is created by the first load
pub async fn index(headers: HeaderMap) -> Response {
    let cookie = session_id(&headers).is_none().then(|| session_cookie(Uuid::new_v4()));
    with_cookie(cookie, Html(INDEX_HTML))
}

pub async fn settings(State(state): State<AppState>) -> Json<Settings> {
    let config = state.app.config();
    Json(Settings {
        api_key_locked: config.api_key_locked(),
        model: config.model.clone(),
        font_size: config.font_size,
        font_min: FONT_SIZE_MIN,
        font_max: FONT_SIZE_MAX,
    })
}

pub async fn load(State(state): State<AppState>, headers: HeaderMap, Json(req): Json<LoadRequest>) -> Response {
    let (slot, cookie) = browser_slot(&state, &headers);
    let mut slot = slot.lock().await;
    let outcome = state.app.load(&mut slot, req).await;
    with_cookie(cookie, Json(outcome))
}

/// A browser without a loaded video has nothing to ask, so no slot is created
pub async fn ask(State(state): State<AppState>, headers: HeaderMap, Json(req): Json<AskRequest>) -> Json<AskOutcome> {
    let Some(slot) = session_id(&headers).and_then(|id| state.sessions.existing(id)) else {
        return Json(AskOutcome { log: ChatLog::default() });
    };
    let mut slot = slot.lock().await;
    Json(state.app.ask(&mut slot, req).await)
}

pub async fn style(State(state): State<AppState>, Query(query): Query<StyleQuery>) -> impl IntoResponse {
    let size = query.size.unwrap_or(state.app.config().font_size);
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], font_css(size))
}

pub async fn not_found(uri: Uri) -> Response {
    let path = uri.path();
    if path == "/api" || path.starts_with("/api/") {
        let body = serde_json::json!({ "error": format!("endpoint not found: {path}") });
        return (StatusCode::NOT_FOUND, Json(body)).into_response();
    }
    (StatusCode::NOT_FOUND, "not found").into_response()
}
