//! `GET /download`: the cached explanation as a plain-text file.

use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{session_id_from, AppState};
use crate::config;

/// Body is the completion text exactly as the provider returned it.
pub async fn explanation(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let (_, session) = state.sessions.get_or_create(session_id_from(&headers))?;
    let text = session
        .lock()
        .await
        .last_result()
        .map(str::to_string)
        .ok_or_else(|| ApiError::NotFound("No simplified explanation in this session".into()))?;

    let disposition = format!("attachment; filename=\"{}\"", config::DOWNLOAD_FILE_NAME);
    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        text,
    )
        .into_response())
}
