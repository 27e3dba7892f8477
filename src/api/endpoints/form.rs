//! Form endpoints.
//!
//! - `GET /`: render the page for the caller's session
//! - `POST /simplify`: run one submission and re-render
//! - `POST /session/reset`: end the session and start a fresh one

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use super::page_response;
use crate::api::error::ApiError;
use crate::api::page::{Notice, PageView};
use crate::api::types::{session_cookie, session_id_from, AppState};

/// `GET /`
pub async fn show(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let (id, session) = state.sessions.get_or_create(session_id_from(&headers))?;
    let view = PageView::from_session(&*session.lock().await);
    page_response(id, &view)
}

#[derive(Deserialize)]
pub struct SimplifyForm {
    #[serde(default)]
    pub report: String,
}

/// `POST /simplify`
///
/// Holds the session lock for the whole submission, so a second request
/// from the same session waits instead of racing the usage cap.
pub async fn simplify(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SimplifyForm>,
) -> Result<Response, ApiError> {
    let (id, session) = state.sessions.get_or_create(session_id_from(&headers))?;
    let guard = session.lock_owned().await;
    let simplifier = state.simplifier.clone();
    let report = form.report;

    // Provider call is blocking HTTP
    let (guard, report, outcome) = tokio::task::spawn_blocking(move || {
        let mut guard = guard;
        let outcome = simplifier.simplify(&mut guard, &report);
        (guard, report, outcome)
    })
    .await?;

    let mut view = PageView::from_session(&guard);
    view.report_input = report;
    if let Err(e) = &outcome {
        view.submit_notices.push(Notice::from(e));
    }
    page_response(id, &view)
}

/// `POST /session/reset`: the "refresh or restart" escape hatch once capped.
pub async fn reset(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Some(old) = session_id_from(&headers) {
        state.sessions.end(&old)?;
    }
    let (id, _) = state.sessions.get_or_create(None)?;
    tracing::info!("Session restarted by user");
    Ok(([(SET_COOKIE, session_cookie(id))], Redirect::to("/")).into_response())
}
