//! Error types for the console orchestration layer.

use thiserror::Error;

use greenlight_client::ClientError;
use greenlight_model::{DescriptionValidationError, NameValidationError};

use crate::orchestrator::WizardStage;

/// Console error types
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// The candidate workflow name failed validation
    #[error("Invalid workflow name: {0}")]
    InvalidName(#[from] NameValidationError),

    /// The workflow description failed validation
    #[error("Invalid workflow description: {0}")]
    InvalidDescription(#[from] DescriptionValidationError),

    /// One or more approval steps have neither roles nor users
    #[error("Approval steps without approvers at positions {0:?}")]
    InvalidSteps(Vec<usize>),

    /// A wizard form was submitted out of sequence
    #[error("The {attempted} form cannot be submitted while the wizard is at the {current} stage")]
    WizardOrder {
        current: WizardStage,
        attempted: WizardStage,
    },

    /// The wizard finished without all forms submitted
    #[error("The wizard cannot finish from the {0} stage")]
    WizardIncomplete(WizardStage),

    /// A just-written record never became readable
    #[error("{resource} was still not readable after {attempts} attempts")]
    NotYetConsistent { resource: String, attempts: u32 },

    /// Backend call failed
    #[error("Backend error: {0}")]
    Backend(#[from] ClientError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for console operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;

impl ConsoleError {
    /// Check if the error is a local validation failure
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            ConsoleError::InvalidName(_)
                | ConsoleError::InvalidDescription(_)
                | ConsoleError::InvalidSteps(_)
        )
    }

    /// Check if the error came from the backend
    pub fn is_backend_error(&self) -> bool {
        matches!(self, ConsoleError::Backend(_))
    }
}
