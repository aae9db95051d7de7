//! Engine error taxonomy
//!
//! Only two conditions surface to callers: rejected input and caller-initiated
//! cancellation. Routing-service outages are recovered internally via the
//! haversine fallback and never reach this enum; capacity shortfalls are data
//! (`Solution::unassigned`), not errors.

use thiserror::Error;

/// Errors returned by the engine's public API.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Request rejected before any network call or heavy computation:
    /// malformed coordinates, negative demand, duplicate stop ids, empty
    /// fleet, or a stop count above the matrix ceiling.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Caller cancelled the run. Observed at a phase boundary, so UIs can
    /// suppress error styling for this case.
    #[error("optimization cancelled")]
    Cancelled,
}

impl EngineError {
    /// Shorthand for an `InvalidInput` with a formatted message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_display_includes_message() {
        let err = EngineError::invalid("fleet is empty");
        assert_eq!(err.to_string(), "invalid input: fleet is empty");
    }

    #[test]
    fn test_cancelled_is_distinguishable() {
        let err = EngineError::Cancelled;
        assert!(matches!(err, EngineError::Cancelled));
        assert_eq!(err.to_string(), "optimization cancelled");
    }
}
