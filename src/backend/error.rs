//! Backend client errors

use thiserror::Error;

use super::protocol::ProtocolError;

/// Errors talking to the hosted backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid backend URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Change feed connection failed: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Change feed protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl BackendError {
    /// Classify a transport error the way callers care about it
    pub fn from_request(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_connect() {
            BackendError::Unavailable
        } else {
            BackendError::Request(err)
        }
    }
}
