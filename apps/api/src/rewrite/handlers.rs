use axum::{extract::State, Json};
use tracing::info;

use crate::errors::AppError;
use crate::models::ExtractedDocument;
use crate::rewrite::{rewrite, RewriteOutput};
use crate::state::AppState;

/// POST /api/v1/rewrite
pub async fn handle_rewrite(
    State(state): State<AppState>,
    Json(document): Json<ExtractedDocument>,
) -> Result<Json<RewriteOutput>, AppError> {
    if document.raw_text.is_empty() {
        return Err(AppError::Validation("raw_text must not be empty".into()));
    }

    let output = state
        .run_pipeline(move |ctx| rewrite(&document, ctx))
        .await?;

    info!(
        "Rewrite complete: {} edit(s) applied, {} skipped",
        output.plan.edits.len(),
        output.skipped.len()
    );
    Ok(Json(output))
}
