// ABOUTME: Error types for the carousel converters including ErrorCode enum and CarouselError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing the categories of converter failures.
///
/// Fitting content is not an error; see [`crate::dom::SkipReason`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Static misconfiguration: a breakpoint table without its zero-width entry,
    /// an invalid selector, or a control selector that matched nothing.
    Config,
    /// The external carousel engine could not be obtained.
    EngineUnavailable,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::Config => "configuration error",
            ErrorCode::EngineUnavailable => "engine unavailable",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for converter operations.
#[derive(Debug, thiserror::Error)]
pub struct CarouselError {
    pub code: ErrorCode,
    /// What the failing operation was applied to (a selector, a converter name, a table).
    pub target: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for CarouselError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "carousel: {} {}: {}", self.op, self.target, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl CarouselError {
    /// Create a Config error.
    pub fn config(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::Config,
            target: target.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an EngineUnavailable error.
    pub fn engine_unavailable(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::EngineUnavailable,
            target: target.into(),
            op: op.into(),
            source,
        }
    }

    /// Returns true if this is a Config error.
    pub fn is_config(&self) -> bool {
        self.code == ErrorCode::Config
    }

    /// Returns true if this is an EngineUnavailable error.
    pub fn is_engine_unavailable(&self) -> bool {
        self.code == ErrorCode::EngineUnavailable
    }
}

/// Convenient result alias for converter operations.
pub type Result<T> = std::result::Result<T, CarouselError>;
