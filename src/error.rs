//! Error handling

use thiserror::Error;

pub type DetectionResult<T> = Result<T, DetectionError>;

/// Failures surfaced by the detection client and the result normalizer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectionError {
    /// Precondition violated, rejected before any request was made
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No response obtained (connect failure, timeout)
    #[error("Upstream unreachable: {0}")]
    Unreachable(String),

    /// Non-success status; `message` is the upstream `detail` verbatim
    #[error("{message}")]
    UpstreamRejected { status: u16, message: String },

    /// Success status but the body is structurally invalid
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl DetectionError {
    /// Whether the end user should be offered a manual retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::UpstreamRejected { .. })
    }

    /// Short machine-readable name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::Unreachable(_) => "unreachable",
            Self::UpstreamRejected { .. } => "upstream_rejected",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }
}
