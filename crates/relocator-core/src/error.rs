//! Error types for the relocation engine

use std::time::Duration;

use thiserror::Error;

/// Main error type for relocation operations.
///
/// Every variant maps to an HTTP-style status code through
/// [`RelocationError::status_code`], so an endpoint layer can surface the
/// failure verbatim.
#[derive(Debug, Error)]
pub enum RelocationError {
    /// Missing or malformed input (dates, identifiers, single-unit listings).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A booking, room line or relocation target could not be located.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation is not permitted on the given record (closures).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The listing is already overbooked before any relocation is attempted.
    #[error("Overbooking detected: {0}")]
    Overbooked(String),

    /// Every combination was tried and none fits.
    #[error(
        "No suitable relocation found after {combinations} combinations ({solutions} fitting solutions)"
    )]
    Exhausted { combinations: u128, solutions: u64 },

    /// The search exceeded its wall-clock budget.
    #[error("Relocation search exceeded the maximum execution time of {} seconds", .limit.as_secs())]
    Timeout { limit: Duration },

    /// Failure in the underlying booking or occupancy storage.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelocationError {
    /// Returns the HTTP-style status code for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            RelocationError::InvalidArgument(_) => 400,
            RelocationError::Forbidden(_) => 403,
            RelocationError::NotFound(_) | RelocationError::Exhausted { .. } => 404,
            RelocationError::Overbooked(_) => 406,
            RelocationError::Timeout { .. } => 508,
            RelocationError::Storage(_) | RelocationError::Internal(_) => 500,
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        RelocationError::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        RelocationError::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        RelocationError::Internal(msg.into())
    }
}

/// Result type alias for relocation operations
pub type Result<T> = std::result::Result<T, RelocationError>;
