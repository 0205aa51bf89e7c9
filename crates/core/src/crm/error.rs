//! CRM error types.

use thiserror::Error;

use kontor_shared::AppError;

/// Errors that can occur during CRM operations.
#[derive(Debug, Error)]
pub enum CrmError {
    /// Lead already converted.
    #[error("Lead has already been converted")]
    LeadAlreadyConverted,

    /// Lost leads cannot be converted.
    #[error("Lost leads cannot be converted")]
    LeadLost,

    /// Manual status changes cannot touch `converted`.
    #[error("Lead status cannot be changed to or from converted")]
    InvalidLeadTransition,

    /// Stage probability outside 0-100.
    #[error("Stage probability must be between 0 and 100, got {0}")]
    InvalidProbability(i32),

    /// Pipeline without stages.
    #[error("Pipeline must have at least one stage")]
    NoStages,

    /// Stage flagged both won and lost.
    #[error("A stage cannot be both won and lost")]
    InvalidStageFlags,

    /// Stage belongs to another pipeline.
    #[error("Stage does not belong to the deal's pipeline")]
    StageNotInPipeline,

    /// Closed deals are final.
    #[error("Closed deals cannot change stage")]
    DealClosed,

    /// No pipeline to place a converted deal in.
    #[error("No pipeline available for the deal")]
    NoPipeline,

    /// Deal value below zero.
    #[error("Deal value cannot be negative")]
    NegativeValue,
}

impl CrmError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::LeadAlreadyConverted => "LEAD_ALREADY_CONVERTED",
            Self::LeadLost => "LEAD_LOST",
            Self::InvalidLeadTransition => "INVALID_LEAD_TRANSITION",
            Self::InvalidProbability(_) => "INVALID_PROBABILITY",
            Self::NoStages => "NO_STAGES",
            Self::InvalidStageFlags => "INVALID_STAGE_FLAGS",
            Self::StageNotInPipeline => "STAGE_NOT_IN_PIPELINE",
            Self::DealClosed => "DEAL_CLOSED",
            Self::NoPipeline => "NO_PIPELINE",
            Self::NegativeValue => "NEGATIVE_VALUE",
        }
    }
}

impl From<CrmError> for AppError {
    fn from(err: CrmError) -> Self {
        match err {
            CrmError::InvalidProbability(_)
            | CrmError::NoStages
            | CrmError::InvalidStageFlags
            | CrmError::NegativeValue => Self::Validation(err.to_string()),
            _ => Self::BusinessRule(err.to_string()),
        }
    }
}
