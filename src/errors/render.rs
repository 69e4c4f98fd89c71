use thiserror::Error;

/// Template errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// A template failed to parse when it was registered
    #[error("Template registration failed: {0}")]
    Registration(#[from] handlebars::TemplateError),

    /// Rendering a registered template failed
    #[error("Template rendering failed: {0}")]
    Template(#[from] handlebars::RenderError),

    /// `display.timestamp_format` is not a valid chrono format string
    #[error("Invalid timestamp format: {0:?}")]
    TimestampFormat(String),
}
