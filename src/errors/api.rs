//! Backend call errors
//!
//! Two classes matter to the panel: the request never produced a usable
//! answer (transport failure, malformed body), or the server answered with a
//! non-2xx status and a structured `error` message. Only the second carries
//! text that is safe to show the user verbatim.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Network unreachable, connection reset, TLS failure and the like
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered but the body could not be understood
    #[error("Malformed response from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },

    /// Non-2xx response carrying `{ "error": ... }`
    #[error("Server rejected request ({status}): {message}")]
    Application { status: u16, message: String },

    /// Client could not be built from its configuration
    #[error("Invalid API configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// True when the server answered with a structured error message
    pub fn is_application_error(&self) -> bool {
        matches!(self, ApiError::Application { .. })
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Application { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Application { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// Text to put in front of the user: the server's own message when there
    /// is one, otherwise the generic fallback.
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.server_message().unwrap_or(fallback)
    }
}
