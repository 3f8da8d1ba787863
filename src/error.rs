//! Process-level error types

use crate::core::{ConfigValidationError, PipelineError};
use thiserror::Error;

/// Errors that end an installer run before or around the pipeline
#[derive(Debug, Error)]
pub enum InstallerError {
    /// Host does not satisfy a startup requirement
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// User interrupted or cancelled while answering prompts
    #[error("configuration collection aborted by user")]
    ConfigCollectionAborted,

    /// Collected configuration is unusable
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// Prompt could not be shown or read
    #[error("prompt error: {0}")]
    Prompt(String),

    /// Step list could not be assembled
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl InstallerError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl From<inquire::InquireError> for InstallerError {
    fn from(err: inquire::InquireError) -> Self {
        match err {
            inquire::InquireError::OperationCanceled
            | inquire::InquireError::OperationInterrupted => {
                InstallerError::ConfigCollectionAborted
            }
            other => InstallerError::Prompt(other.to_string()),
        }
    }
}
