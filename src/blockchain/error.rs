//! Client errors for the lookup endpoints
//!
//! The write and status operations never fail; they report failure inside
//! their result records instead.

use thiserror::Error;

use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Chemical not found")]
    NotFound,

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ClientError {
    pub fn http(status: u16, message: Option<String>, fallback: &str) -> Self {
        ClientError::Http {
            status,
            message: message.unwrap_or_else(|| fallback.to_string()),
        }
    }
}
