use thiserror::Error;

/// Errors that can occur at the I/O boundaries of the linker.
///
/// The resolution passes themselves never fail; problems inside a fact model
/// are reported as diagnostics instead.
#[derive(Error, Debug)]
pub enum CodeLinkError {
    #[error("file error: {message} (path: {path})")]
    File { message: String, path: String },

    #[error("parse error: {message} (path: {path})")]
    Parse { message: String, path: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results using `CodeLinkError`.
pub type Result<T> = std::result::Result<T, CodeLinkError>;
