//! Report export and email handlers
//!
//! The PDF bytes come from the `ReportRenderer` seam and delivery goes
//! through the `Mailer` seam; this module owns only the HTTP contract.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::reports::ReportKind;
use crate::AppState;
use lexhub_common::{
    auth::AuthContext,
    db::models::Role,
    db::Repository,
    errors::{AppError, Result},
    metrics,
};

#[derive(Debug, Deserialize, Validate)]
pub struct EmailReportRequest {
    #[validate(email)]
    pub to: String,
}

/// Email outcome envelope; delivery failures are part of the contract, not
/// an HTTP error
#[derive(Serialize)]
pub struct EmailReportResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn parse_kind(raw: &str) -> Result<ReportKind> {
    ReportKind::parse(raw).ok_or_else(|| AppError::Validation {
        message: format!("unknown report kind: {}", raw),
        field: Some("kind".to_string()),
    })
}

/// Download a report as a PDF attachment
pub async fn export_report(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse> {
    let kind = parse_kind(&kind)?;

    let repo = Repository::new(state.db.clone());
    auth.authorize(&repo, Role::Editor).await?;

    let words = repo.list_words_by_status(kind.status_filter()).await?;
    let pdf = state.renderer.render(kind, &words)?;

    metrics::record_report(kind.as_str());

    tracing::info!(
        kind = kind.as_str(),
        words = words.len(),
        bytes = pdf.len(),
        "Report rendered"
    );

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", kind.filename()),
        ),
    ];

    Ok((headers, pdf))
}

/// Render a report and mail it to the given recipient
pub async fn email_report(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(kind): Path<String>,
    Json(request): Json<EmailReportRequest>,
) -> Result<Json<EmailReportResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("to".to_string()),
    })?;

    let kind = parse_kind(&kind)?;

    let repo = Repository::new(state.db.clone());
    auth.authorize(&repo, Role::Editor).await?;

    let words = repo.list_words_by_status(kind.status_filter()).await?;
    let pdf = state.renderer.render(kind, &words)?;

    metrics::record_report(kind.as_str());

    match state
        .mailer
        .send_report(&request.to, kind.title(), kind.filename(), pdf)
        .await
    {
        Ok(()) => {
            tracing::info!(kind = kind.as_str(), to = %request.to, "Report mailed");
            Ok(Json(EmailReportResponse {
                success: true,
                email: Some(request.to),
                error: None,
            }))
        }
        Err(e) => {
            tracing::warn!(kind = kind.as_str(), to = %request.to, error = %e, "Report mail failed");
            Ok(Json(EmailReportResponse {
                success: false,
                email: None,
                error: Some(e.to_string()),
            }))
        }
    }
}
