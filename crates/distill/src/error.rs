// ABOUTME: Error types for the distill engine including ErrorCode enum and DistillError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing the categories of failures the engine can report.
///
/// Malformed markup and degenerate extractions are never errors; only
/// configuration problems, bad base locations and I/O at the edges are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    Config,
    Io,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Config => "invalid configuration",
            ErrorCode::Io => "i/o error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for distill operations.
#[derive(Debug, thiserror::Error)]
pub struct DistillError {
    pub code: ErrorCode,
    pub target: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for DistillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "distill: {}", self.op)?;
        if !self.target.is_empty() {
            write!(f, " {}", self.target)?;
        }
        write!(f, ": {}", self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl DistillError {
    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::InvalidUrl,
            target: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create a Config error. `what` names the offending setting.
    pub fn config(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Config,
            target: what.into(),
            op: "build".to_string(),
            source: Some(anyhow::anyhow!(reason.into())),
        }
    }

    /// Create an Io error.
    pub fn io(
        path: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::Io,
            target: path.into(),
            op: op.into(),
            source,
        }
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    /// Returns true if this is a Config error.
    pub fn is_config(&self) -> bool {
        self.code == ErrorCode::Config
    }

    /// Returns true if this is an Io error.
    pub fn is_io(&self) -> bool {
        self.code == ErrorCode::Io
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, DistillError>;
