//! Axum route handlers for the assistant API.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::assist::email::{build_cold_email_prompt, Tone, COLD_EMAIL_FILENAME};
use crate::assist::upload::AssistForm;
use crate::assist::Action;
use crate::config::ResumeMode;
use crate::documents::ResumeDocument;
use crate::errors::AppError;
use crate::llm_client::{is_error_response, ResumeRepresentation};
use crate::matching::chart::render_pie_chart;
use crate::matching::MatchReport;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub action: Action,
    pub feedback: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub report: MatchReport,
    pub verdict_label: String,
    /// SVG pie chart; absent if rendering failed.
    pub chart_svg: Option<String>,
    /// Base64 PNG of the résumé's first page; absent if rendering was unavailable.
    pub resume_page_png: Option<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ColdEmailResponse {
    pub action: Action,
    pub email: String,
    pub tone: Tone,
    pub filename: &'static str,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct EmailDownloadRequest {
    pub email: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resume/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<FeedbackResponse>, AppError> {
    run_feedback(&state, multipart, Action::Analyze).await
}

/// POST /api/v1/resume/improve
pub async fn handle_improve(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<FeedbackResponse>, AppError> {
    run_feedback(&state, multipart, Action::Improve).await
}

/// POST /api/v1/resume/match
///
/// Asks for a labeled match percentage, interprets the reply, and returns the
/// report with a pie chart and a preview of the résumé's first page.
pub async fn handle_match(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<MatchResponse>, AppError> {
    let form = AssistForm::read(multipart).await?;
    let pdf = form.require_resume()?;
    let resume = load_resume(&state, pdf, true).await?;

    info!("Matching resume against job description");
    let response = state
        .assistant
        .send(
            Action::Match.instructions().unwrap_or_default(),
            &form.job_description,
            representation(&state, &resume),
        )
        .await;

    let report = MatchReport::from_response(response);
    info!(
        "Match interpreted: {}% ({:?}, source {:?})",
        report.percentage, report.verdict, report.source
    );

    let chart_svg = match render_pie_chart(&report.proportions) {
        Ok(svg) => Some(svg),
        Err(e) => {
            warn!("Pie chart unavailable: {e}");
            None
        }
    };

    Ok(Json(MatchResponse {
        verdict_label: format!("{} {}", report.verdict.label(), report.verdict.badge()),
        report,
        chart_svg,
        resume_page_png: resume.page_one.map(|p| p.encoded),
        generated_at: Utc::now(),
    }))
}

/// POST /api/v1/cold-email
///
/// Requires a résumé and a non-blank job description.
pub async fn handle_cold_email(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ColdEmailResponse>, AppError> {
    let form = AssistForm::read(multipart).await?;
    let pdf = form.require_resume()?;
    if form.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Please upload your resume and enter a job description!".to_string(),
        ));
    }
    let tone: Tone = form.tone.as_deref().unwrap_or_default().parse()?;

    let resume_text = state.documents.extract_text(pdf).await?;
    let prompt = build_cold_email_prompt(
        &resume_text,
        &form.job_description,
        form.linkedin.as_deref(),
        tone,
    );

    info!("Generating {tone} cold email");
    let email = state
        .assistant
        .send(
            &prompt,
            &form.job_description,
            ResumeRepresentation::Text(&resume_text),
        )
        .await;

    Ok(Json(ColdEmailResponse {
        action: Action::ColdEmail,
        email,
        tone,
        filename: COLD_EMAIL_FILENAME,
        generated_at: Utc::now(),
    }))
}

/// POST /api/v1/cold-email/download
///
/// Echoes a generated email back as a plain-text attachment.
pub async fn handle_email_download(
    Json(request): Json<EmailDownloadRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.email.trim().is_empty() {
        return Err(AppError::Validation("email cannot be empty".to_string()));
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{COLD_EMAIL_FILENAME}\""),
            ),
        ],
        request.email,
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Shared pipeline
// ────────────────────────────────────────────────────────────────────────────

async fn run_feedback(
    state: &AppState,
    multipart: Multipart,
    action: Action,
) -> Result<Json<FeedbackResponse>, AppError> {
    let form = AssistForm::read(multipart).await?;
    let pdf = form.require_resume()?;
    let resume = load_resume(state, pdf, false).await?;

    info!("Running {action} action");
    let feedback = state
        .assistant
        .send(
            action.instructions().unwrap_or_default(),
            &form.job_description,
            representation(state, &resume),
        )
        .await;

    if is_error_response(&feedback) {
        warn!("{action} action returned an assistant error");
    }

    Ok(Json(FeedbackResponse {
        action,
        feedback,
        generated_at: Utc::now(),
    }))
}

/// Extracts text and, when needed, renders page one.
///
/// In image mode the rendered page is what the assistant sees, so a render
/// failure fails the request. Otherwise the page is only a preview and a
/// failure is logged and skipped.
async fn load_resume(
    state: &AppState,
    pdf: Bytes,
    wants_preview: bool,
) -> Result<ResumeDocument, AppError> {
    let text = state.documents.extract_text(pdf.clone()).await?;

    let page_one = if state.config.resume_mode == ResumeMode::Image {
        Some(state.documents.render_first_page(pdf).await?)
    } else if wants_preview {
        match state.documents.render_first_page(pdf).await {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Resume preview unavailable: {e}");
                None
            }
        }
    } else {
        None
    };

    Ok(ResumeDocument { text, page_one })
}

fn representation<'a>(state: &AppState, resume: &'a ResumeDocument) -> ResumeRepresentation<'a> {
    match (&state.config.resume_mode, &resume.page_one) {
        (ResumeMode::Image, Some(image)) => ResumeRepresentation::Image(image),
        _ => ResumeRepresentation::Text(&resume.text),
    }
}
