use thiserror::Error;

use crate::state::ActionSlot;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("reference width and height are required")]
    MissingDimensions,
    #[error("reference dimensions must be positive numbers")]
    NonPositiveDimensions,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreconditionError {
    #[error("not calibrated")]
    NotCalibrated,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for TransportError {
    fn from(error: serde_json::Error) -> Self {
        TransportError::Malformed(error.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error("{0}")]
    Server(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{0:?} is already in progress")]
    Busy(ActionSlot),
    #[error("response arrived after the workflow state changed")]
    Stale,
}

impl CommandError {
    /// Errors that must never have reached the network.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            CommandError::Validation(_) | CommandError::Precondition(_) | CommandError::Busy(_)
        )
    }
}
