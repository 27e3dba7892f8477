//! `POST /feedback`: thumbs up / down with an optional comment.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Form;
use serde::Deserialize;

use super::page_response;
use crate::api::error::ApiError;
use crate::api::page::{feedback_notices, Notice, PageView};
use crate::api::types::{session_id_from, AppState};
use crate::feedback::{FeedbackRecord, Verdict};

#[derive(Deserialize)]
pub struct FeedbackForm {
    pub verdict: Verdict,
    #[serde(default)]
    pub comment: String,
}

/// Sends at most once; the record is dropped whatever the outcome.
pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<FeedbackForm>,
) -> Result<Response, ApiError> {
    let (id, session) = state.sessions.get_or_create(session_id_from(&headers))?;
    let mut view = PageView::from_session(&*session.lock().await);

    if view.result.is_none() {
        view.submit_notices
            .push(Notice::Warning("Please simplify a report first.".into()));
        return page_response(id, &view);
    }

    let record = FeedbackRecord::new(form.verdict, &form.comment);
    let reporter = state.feedback.clone();
    let outcome = tokio::task::spawn_blocking(move || reporter.submit(&record)).await?;

    match &outcome {
        Ok(()) => tracing::info!(verdict = ?form.verdict, "Feedback delivered"),
        Err(e) => tracing::warn!(error = %e, "Feedback not delivered"),
    }

    view.feedback_notices = feedback_notices(&outcome);
    page_response(id, &view)
}
