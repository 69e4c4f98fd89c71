//! Error types for collab-panel
//!
//! Each concern of the panel gets its own error enum so callers can tell
//! failures apart without string matching.
//!
//! # Error Categories
//!
//! - **ApiError**: backend calls, split into transport failures and
//!   application-level rejections carrying the server's message
//! - **RenderError**: template registration and rendering
//! - **ModelError**: invalid identifiers and permission strings
//!
//! # Examples
//!
//! ```rust
//! use collab_panel::errors::ApiError;
//!
//! let err = ApiError::Application {
//!     status: 400,
//!     message: "Collaboration does not exist".to_string(),
//! };
//!
//! assert!(err.is_application_error());
//! assert_eq!(err.user_message("Failed to remove collaborator"), "Collaboration does not exist");
//! ```

pub mod api;
pub mod model;
pub mod render;

pub use api::ApiError;
pub use model::ModelError;
pub use render::RenderError;

/// Result type alias for backend calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for template rendering
pub type RenderResult<T> = Result<T, RenderError>;

/// Result type alias for model validation
pub type ModelResult<T> = Result<T, ModelError>;
