use thiserror::Error;

/// Validation errors for the wire model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Project ids are positive integers
    #[error("Invalid project id: {0}")]
    InvalidProjectId(i64),

    /// Only `read` and `write` exist
    #[error("Invalid permission: {0}")]
    InvalidPermission(String),
}
