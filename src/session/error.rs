//! Auth errors

use thiserror::Error;

use super::storage::StorageError;
use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Non-success response carrying a server message
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Text shown in the auth form's error area
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Transport(_) => "Unable to reach the server. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}
