//! Axum route handlers for the prediction form.

use axum::{extract::State, response::Html, Form, Json};
use tracing::debug;

use crate::errors::AppError;
use crate::form::FormState;
use crate::state::AppState;
use crate::submission::SubmissionState;

/// GET /
pub async fn handle_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    page(&state)
}

/// POST /predict
///
/// Replaces the session form with the posted values and runs one submission.
/// A post that arrives while a prediction is in flight leaves the form alone
/// and still renders the page.
pub async fn handle_predict(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Html<String>, AppError> {
    let form = FormState::from_submission(&fields)?;

    if let Some(settled) = state.session.submit(form).await {
        debug!(phase = ?settled.phase(), "Predict post settled");
    }

    page(&state)
}

/// POST /reset
pub async fn handle_reset(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    state.session.reset();
    page(&state)
}

/// GET /api/v1/submission
pub async fn handle_submission_state(State(state): State<AppState>) -> Json<SubmissionState> {
    Json(state.session.submission())
}

fn page(state: &AppState) -> Result<Html<String>, AppError> {
    let html = state
        .renderer
        .render(&state.session.form(), &state.session.submission())?;
    Ok(Html(html))
}
