//! Domain Model: Error Types
//!
//! Only configuration and input problems are errors. Policy misses
//! (no victim) and rejected requests are ordinary outcomes and are
//! reported through result enums instead.

use thiserror::Error;

/// Errors raised while building or configuring a simulation
#[derive(Debug, Error)]
pub enum BankerError {
    /// Process or resource-type count outside `1..=max`
    #[error("invalid dimensions: {processes} processes (allowed 1..={max_processes}) x {resources} resource types (allowed 1..={max_resources})")]
    InvalidDimensions {
        /// Requested process count
        processes: usize,
        /// Requested resource-type count
        resources: usize,
        /// Upper bound on processes
        max_processes: usize,
        /// Upper bound on resource types
        max_resources: usize,
    },

    /// A matrix or vector does not match the declared dimensions
    #[error("{what} has wrong shape: expected {expected}, found {actual}")]
    ShapeMismatch {
        /// Which input was malformed (e.g. "allocation row 2")
        what: String,
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Simulation configuration value out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Scenario document could not be decoded
    #[error("invalid scenario: {0}")]
    Scenario(String),

    /// Scenario or config file could not be read
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl BankerError {
    /// Check if the error stems from caller-supplied configuration
    ///
    /// Configuration errors are fatal for the session: no state was built.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDimensions { .. } | Self::ShapeMismatch { .. } | Self::InvalidConfig(_)
        )
    }
}

/// Result alias for banker operations
pub type BankerResult<T> = Result<T, BankerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BankerError::InvalidDimensions {
            processes: 0,
            resources: 3,
            max_processes: 10,
            max_resources: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains("0 processes"));
        assert!(msg.contains("1..=10"));
        assert!(msg.contains("1..=8"));

        let err = BankerError::ShapeMismatch {
            what: "available".into(),
            expected: 3,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "available has wrong shape: expected 3, found 2"
        );
    }

    #[test]
    fn test_configuration_classification() {
        assert!(BankerError::InvalidConfig("x".into()).is_configuration_error());
        assert!(!BankerError::Scenario("x".into()).is_configuration_error());

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(!BankerError::from(io).is_configuration_error());
    }
}
