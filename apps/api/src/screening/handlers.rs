//! Axum route handlers for the screening page and the screening API.

use askama::Template;
use axum::{
    extract::{Multipart, State},
    response::Html,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::intake::{acquire, Acquisition};
use crate::llm_client::prompts::{
    prompt_for, FILTER_PROMPT, FIT_FOR_ROLE_PROMPT, PERCENTAGE_MATCH_PROMPT, SUMMARY_PROMPT,
};
use crate::models::screening::{Action, ScreeningReport};
use crate::screening::form::{InputMode, ScreenForm};
use crate::screening::view::ScreenPage;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ScreenResponse {
    pub notice: Option<String>,
    #[serde(flatten)]
    pub report: ScreeningReport,
}

#[derive(Debug, Serialize)]
pub struct PromptEntry {
    pub name: &'static str,
    pub used_by: Vec<Action>,
    pub text: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline shared by both surfaces
// ────────────────────────────────────────────────────────────────────────────

/// JD check → input acquisition → batch run. The acquisition notice is kept
/// even when the run is rejected so the page can still show it.
async fn screen(
    state: &AppState,
    form: &mut ScreenForm,
) -> (Option<String>, Result<ScreeningReport, AppError>) {
    let action = match form.action() {
        Ok(action) => action,
        Err(e) => return (None, Err(e)),
    };
    let request = form.request(action);
    if let Err(e) = request.check_job_description() {
        return (None, Err(e.into()));
    }

    let acquisition = acquire(
        form.take_source(),
        state.fetcher.as_ref(),
        state.config.scratch_dir.as_deref(),
    )
    .await;
    let Acquisition { documents, notice } = match acquisition {
        Ok(acquisition) => acquisition,
        Err(e) => return (None, Err(e.into())),
    };

    info!("Running {action} over {} document(s)", documents.len());
    let report = state
        .runner
        .run(&request, documents)
        .await
        .map_err(AppError::from);
    (notice, report)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
pub async fn handle_index() -> Result<Html<String>, AppError> {
    let page = ScreenPage::new(InputMode::Upload, "", "");
    Ok(Html(page.render()?))
}

/// POST /screen
///
/// Runs the clicked action and re-renders the page. Input problems are shown
/// on the page rather than as an error status.
pub async fn handle_screen_page(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let mut form = ScreenForm::from_multipart(multipart).await?;
    let (notice, outcome) = screen(&state, &mut form).await;

    let mut page = ScreenPage::new(form.mode, &form.location, &form.job_description);
    page.notice = notice;
    let page = match outcome {
        Ok(report) => page.with_report(report),
        Err(e) => {
            page.message = Some(e.user_message());
            page
        }
    };

    Ok(Html(page.render()?))
}

/// POST /api/v1/screen
///
/// Same multipart input as the page; returns the report as JSON.
pub async fn handle_screen_api(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ScreenResponse>, AppError> {
    let mut form = ScreenForm::from_multipart(multipart).await?;
    let (notice, outcome) = screen(&state, &mut form).await;
    Ok(Json(ScreenResponse {
        notice,
        report: outcome?,
    }))
}

/// GET /api/v1/prompts
///
/// The instruction prompts and which actions send them. The response parsers
/// depend on this wording.
pub async fn handle_prompts() -> Json<Vec<PromptEntry>> {
    let entry = |name: &'static str, text: &'static str| PromptEntry {
        name,
        used_by: Action::ALL
            .into_iter()
            .filter(|a| prompt_for(*a) == text)
            .collect(),
        text,
    };
    Json(vec![
        entry("summary", SUMMARY_PROMPT),
        entry("percentage_match", PERCENTAGE_MATCH_PROMPT),
        entry("fit_for_role", FIT_FOR_ROLE_PROMPT),
        entry("filter", FILTER_PROMPT),
    ])
}
