//! Error types for the linter.
//!
//! `LintError` covers the failures callers may want to match on: unreadable
//! files, bad configuration, unknown rules and per-file timeouts. Application glue
//! (`run`, config loading) wraps these in `anyhow` with context.

use std::path::PathBuf;
use thiserror::Error;

pub type LintResult<T> = Result<T, LintError>;

#[derive(Debug, Error)]
pub enum LintError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unknown rule '{0}'")]
    UnknownRule(String),

    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("no lintable files found under the given paths")]
    NoInputs,

    #[error("linting {path:?} exceeded {timeout_ms}ms")]
    Timeout { path: PathBuf, timeout_ms: u64 },
}

impl LintError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LintError::Io {
            path: path.into(),
            source,
        }
    }

    /// Short machine-readable category, used in structured logs.
    pub fn category(&self) -> &'static str {
        match self {
            LintError::Io { .. } => "io_error",
            LintError::Config(_) | LintError::InvalidProfile(_) => "config_error",
            LintError::UnknownRule(_) => "not_found",
            LintError::Parse { .. } => "parse_error",
            LintError::NoInputs => "no_inputs",
            LintError::Timeout { .. } => "timeout",
        }
    }
}
