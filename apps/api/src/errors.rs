use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::models::TextRange;

/// Two max-severity edits that target exactly the same span with different text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlapConflict {
    pub range: TextRange,
    pub original: String,
    pub replacements: Vec<String>,
}

/// Errors raised by the analysis / rewrite pipeline itself.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No readable text was found in the document")]
    ExtractionEmpty,

    #[error("Document is {length} characters long; the limit is {max}")]
    DocumentTooLarge { length: usize, max: usize },

    #[error("{} rewrite conflict(s) could not be resolved automatically", conflicts.len())]
    UnresolvableOverlap { conflicts: Vec<OverlapConflict> },

    #[error("Grammar-check service unavailable: {0}")]
    CollaboratorUnavailable(String),
}

impl AnalysisError {
    /// Stable machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::ExtractionEmpty => "extraction_empty",
            AnalysisError::DocumentTooLarge { .. } => "document_too_large",
            AnalysisError::UnresolvableOverlap { .. } => "unresolvable_overlap",
            AnalysisError::CollaboratorUnavailable(_) => "collaborator_unavailable",
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::Analysis(err) => {
                let status = match err {
                    AnalysisError::ExtractionEmpty => StatusCode::UNPROCESSABLE_ENTITY,
                    AnalysisError::DocumentTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                    AnalysisError::UnresolvableOverlap { .. } => StatusCode::CONFLICT,
                    AnalysisError::CollaboratorUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                };
                let details = match err {
                    AnalysisError::UnresolvableOverlap { conflicts } => {
                        Some(json!({ "conflicts": conflicts }))
                    }
                    AnalysisError::DocumentTooLarge { length, max } => {
                        Some(json!({ "length": length, "max": max }))
                    }
                    _ => None,
                };
                tracing::warn!("Analysis rejected ({}): {err}", err.kind());
                (status, analysis_code(err), err.to_string(), details)
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

fn analysis_code(err: &AnalysisError) -> &'static str {
    match err {
        AnalysisError::ExtractionEmpty => "EXTRACTION_EMPTY",
        AnalysisError::DocumentTooLarge { .. } => "DOCUMENT_TOO_LARGE",
        AnalysisError::UnresolvableOverlap { .. } => "UNRESOLVABLE_OVERLAP",
        AnalysisError::CollaboratorUnavailable(_) => "COLLABORATOR_UNAVAILABLE",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_stable() {
        assert_eq!(AnalysisError::ExtractionEmpty.kind(), "extraction_empty");
        assert_eq!(
            AnalysisError::DocumentTooLarge { length: 10, max: 5 }.kind(),
            "document_too_large"
        );
        assert_eq!(
            AnalysisError::UnresolvableOverlap { conflicts: vec![] }.kind(),
            "unresolvable_overlap"
        );
        assert_eq!(
            AnalysisError::CollaboratorUnavailable("timeout".into()).kind(),
            "collaborator_unavailable"
        );
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                AppError::from(AnalysisError::ExtractionEmpty),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::from(AnalysisError::DocumentTooLarge { length: 9, max: 1 }),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                AppError::from(AnalysisError::UnresolvableOverlap { conflicts: vec![] }),
                StatusCode::CONFLICT,
            ),
            (
                AppError::Validation("raw_text missing".into()),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_too_large_message_names_both_lengths() {
        let msg = AnalysisError::DocumentTooLarge {
            length: 60_000,
            max: 50_000,
        }
        .to_string();
        assert!(msg.contains("60000"));
        assert!(msg.contains("50000"));
    }
}
