//! Errors raised by report computations.
use chrono::NaiveDate;
use thiserror::Error;

use crate::config::ConfigError;

/// Broad classification of a [`ReportError`], for callers that only need to
/// decide how to surface the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Entity identifier absent or ambiguous in the reference table.
    NotFound,
    /// Zero-valued denominator in a ratio computation.
    Division,
    /// Input violating an ordering or sign precondition.
    MalformedInput,
    /// Invalid report configuration.
    Config,
}

/// Errors raised while resolving entities or computing derived views.
#[derive(Debug, Error, PartialEq)]
pub enum ReportError {
    #[error("concession {id:?} not found")]
    EntityNotFound { id: String },
    #[error("concession {id:?} is ambiguous ({matches} matching records)")]
    AmbiguousEntity { id: String, matches: usize },
    #[error("{quantity} has a zero denominator")]
    DivisionByZero { quantity: &'static str },
    #[error("indicator {name:?} has negative count {count}")]
    NegativeCount { name: String, count: i64 },
    #[error("{field} must be a finite non-negative number (got {value})")]
    InvalidQuantity { field: &'static str, value: f64 },
    #[error("series dates must be strictly ascending ({previous} is followed by {next})")]
    UnorderedSeries { previous: NaiveDate, next: NaiveDate },
    #[error("smoothing window must be between {min} and {max} (got {value})")]
    WindowOutOfRange { min: usize, max: usize, value: usize },
    #[error("weather variable {name:?} has no observations")]
    UnknownVariable { name: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ReportError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EntityNotFound { .. } | Self::AmbiguousEntity { .. } => ErrorKind::NotFound,
            Self::DivisionByZero { .. } => ErrorKind::Division,
            Self::NegativeCount { .. }
            | Self::InvalidQuantity { .. }
            | Self::UnorderedSeries { .. }
            | Self::WindowOutOfRange { .. }
            | Self::UnknownVariable { .. } => ErrorKind::MalformedInput,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}
