//! Repository import handler

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::FailedCommit;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ImportParams {
    /// Repository as `owner/name`
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub repository: String,
    pub imported: usize,
    pub skipped: Vec<String>,
    pub failed: Vec<FailedCommit>,
    pub promotions: usize,
    pub collector_response: String,
}

fn parse_repository(params: ImportParams) -> Result<String, AppError> {
    let name = params
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing `name` query parameter".to_string()))?;

    match name.split_once('/') {
        Some((owner, repo))
            if !owner.is_empty()
                && !repo.is_empty()
                && !repo.contains('/')
                && !name.contains(char::is_whitespace) =>
        {
            Ok(name)
        }
        _ => Err(AppError::BadRequest(format!(
            "Repository must be `owner/name`, got `{}`",
            name
        ))),
    }
}

/// POST /import?name=owner/repo
///
/// Rebuild a repository's history from the commit host, run it through the
/// pipeline and submit the promotions in a single batch.
pub async fn import_repository(
    State(state): State<AppState>,
    Query(params): Query<ImportParams>,
) -> Result<Json<ImportResponse>, AppError> {
    let repository = parse_repository(params)?;
    tracing::info!(
        repo = %repository,
        policy = %state.importer.settings().failure_policy,
        "Import requested"
    );

    let report = state.importer.import(&repository, &state.shutdown).await?;
    let promotions = state.pipeline.analyze(&report.commits)?;

    let collector_response = if promotions.is_empty() {
        tracing::info!(repo = %repository, "Import produced no promotions");
        String::new()
    } else {
        tracing::info!(
            repo = %repository,
            count = promotions.len(),
            "Submitting imported promotions"
        );
        state.collector.submit(&promotions).await?
    };

    Ok(Json(ImportResponse {
        imported: report.succeeded().count(),
        repository: report.repository,
        skipped: report.skipped,
        failed: report.failed,
        promotions: promotions.len(),
        collector_response,
    }))
}
