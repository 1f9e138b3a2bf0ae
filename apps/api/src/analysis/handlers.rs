use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::grammar::{FlaggedSpan, GrammarFlags};
use crate::analysis::normalizer::check_length;
use crate::analysis::pipeline::analyze;
use crate::errors::AppError;
use crate::feedback::{FeedbackBuilder, FeedbackReport};
use crate::grammar_client::collect_flags;
use crate::models::{AnalysisResult, StructuralUnit};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub raw_text: String,
    /// Accepted so one extraction payload fits both endpoints. Scoring does
    /// not depend on units.
    #[serde(default)]
    pub structural_units: Vec<StructuralUnit>,
    /// Pre-computed grammar flags. When absent the configured checker runs.
    #[serde(default)]
    pub grammar_flags: Option<Vec<FlaggedSpan>>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub result: AnalysisResult,
    pub feedback: FeedbackReport,
}

/// POST /api/v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    if req.raw_text.is_empty() {
        return Err(AppError::Validation("raw_text must not be empty".into()));
    }
    // Oversized documents never reach the grammar checker.
    check_length(&req.raw_text, state.config.analysis.max_document_length)?;

    let grammar = match req.grammar_flags {
        Some(spans) => GrammarFlags::Available(spans),
        None => collect_flags(state.grammar.as_ref(), &req.raw_text).await,
    };

    let raw_text = req.raw_text;
    let (result, feedback) = state
        .run_pipeline(move |ctx| {
            let analysis = analyze(&raw_text, &grammar, ctx)?;
            let feedback =
                FeedbackBuilder::new(ctx.config).build(&analysis.result, &analysis.document);
            Ok((analysis.result, feedback))
        })
        .await?;

    let analysis_id = Uuid::new_v4();
    info!(
        "Analysis {analysis_id} complete: overall {:.1}, {} issue(s)",
        result.overall_score,
        result.all_issues.len()
    );

    Ok(Json(AnalyzeResponse {
        analysis_id,
        analyzed_at: Utc::now(),
        result,
        feedback,
    }))
}
