use serde::Serialize;
use thiserror::Error;

/// Failures a conversational turn can surface to its caller.
///
/// Every variant carries a human-readable message; `kind` is the stable
/// machine-readable code the HTTP layer puts in its error body. Nothing
/// here is fatal to the process; each failure is scoped to one turn.
#[derive(Debug, Error)]
pub enum TurnError {
    /// Malformed or empty submission; the user should re-record. No
    /// remote service has been invoked.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The caller, or a referenced lesson, does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// A gateway call failed or returned a non-success status. The user
    /// can retry the turn; no progress was committed.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    /// The progress write failed (or lost a concurrent-update race) after
    /// a successful evaluation. Safe to retry.
    #[error("persistence error: {0}")]
    PersistenceError(String),
    /// Base-language content is absent for a step. A content defect, not
    /// user-correctable.
    #[error("content missing: {0}")]
    ContentMissing(String),
}

impl TurnError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            Self::PersistenceError(_) => "PERSISTENCE_ERROR",
            Self::ContentMissing(_) => "CONTENT_MISSING",
        }
    }

    /// Whether the user can simply re-record and resubmit the turn.
    pub fn user_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::UpstreamUnavailable(_) | Self::PersistenceError(_)
        )
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            error: self.to_string(),
            code: self.kind().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}
