pub mod download;
pub mod feedback;
pub mod form;
pub mod health;

use axum::http::header::SET_COOKIE;
use axum::response::{Html, IntoResponse, Response};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::page::{self, PageView};
use crate::api::types::session_cookie;

/// Rendered page plus the cookie binding the browser to its session.
pub(crate) fn page_response(session_id: Uuid, view: &PageView) -> Result<Response, ApiError> {
    let html = page::render(view)?;
    Ok(([(SET_COOKIE, session_cookie(session_id))], Html(html)).into_response())
}
