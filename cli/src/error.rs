//! Error types for the meridian shell.
//!
//! Every variant maps to one containment boundary in the session loop:
//! input and history errors are reported and the loop continues,
//! classification and dispatch errors discard the statement, and nothing
//! but an explicit exit ends the session.

use meridian_link::LinkError;
use std::fmt;

/// Result type for shell operations
pub type Result<T> = std::result::Result<T, ShellError>;

/// Errors that can occur in the shell
#[derive(Debug)]
pub enum ShellError {
    /// Error from the meridian-link client
    Link(LinkError),

    /// Line source failure
    Input(String),

    /// History file error (never fatal)
    History(String),

    /// Statement could not be split into fields
    Classification(String),

    /// Invoked target failed or does not exist
    Dispatch(String),

    /// Configuration file error
    Config(String),

    /// File I/O error
    File(String),
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::Link(e) => write!(f, "{}", e),
            ShellError::Input(msg) => write!(f, "input error: {}", msg),
            ShellError::History(msg) => write!(f, "history error: {}", msg),
            ShellError::Classification(msg) => write!(f, "parse error: {}", msg),
            ShellError::Dispatch(msg) => write!(f, "{}", msg),
            ShellError::Config(msg) => write!(f, "configuration error: {}", msg),
            ShellError::File(msg) => write!(f, "file error: {}", msg),
        }
    }
}

impl std::error::Error for ShellError {}

impl From<LinkError> for ShellError {
    fn from(err: LinkError) -> Self {
        ShellError::Link(err)
    }
}

impl From<rustyline::error::ReadlineError> for ShellError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        ShellError::Input(err.to_string())
    }
}

impl From<std::io::Error> for ShellError {
    fn from(err: std::io::Error) -> Self {
        ShellError::File(err.to_string())
    }
}

impl From<toml::de::Error> for ShellError {
    fn from(err: toml::de::Error) -> Self {
        ShellError::Config(format!("TOML parse error: {}", err))
    }
}
