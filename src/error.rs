//! # Centralized Error Handling
//!
//! Unified error types for the entire crate using `thiserror`.
//!
//! Every computation in this crate is deterministic, so errors are never
//! retried: a failure for a given input reproduces on every run and is
//! surfaced to the caller as-is.

use thiserror::Error;

/// Main error type for Willans' formula evaluation
#[derive(Error, Debug)]
pub enum WillansError {
    /// Invalid caller input (prime index below 1 or too large, negative factorial index)
    #[error("Invalid argument: {message}")]
    Argument { message: String },

    /// Mathematically undefined operation (zero modulus, root of a negative value)
    #[error("Domain error: {message}")]
    Domain { message: String },

    /// The configured precision cannot decide a floor boundary reliably
    #[error("Precision exhausted at {bits} bits: {message}")]
    PrecisionExhausted { bits: u32, message: String },

    /// The computation was cancelled through its token
    #[error("Computation cancelled")]
    Cancelled,

    /// Configuration errors (invalid precision, thread count)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Worker pool construction failed
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Type alias for Results using WillansError
pub type Result<T> = std::result::Result<T, WillansError>;

impl WillansError {
    /// Create an argument error
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument {
            message: message.into(),
        }
    }

    /// Create a domain error
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain {
            message: message.into(),
        }
    }

    /// Create a precision-exhausted error for the given working precision
    pub fn precision_exhausted(bits: u32, message: impl Into<String>) -> Self {
        Self::PrecisionExhausted {
            bits,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True for errors caused by the caller's input rather than by the engine
    pub fn is_argument(&self) -> bool {
        matches!(self, Self::Argument { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = WillansError::argument("n must be >= 1, got 0");
        assert_eq!(err.to_string(), "Invalid argument: n must be >= 1, got 0");
        assert!(err.is_argument());

        let err = WillansError::precision_exhausted(64, "boundary hit at j = 97");
        assert_eq!(
            err.to_string(),
            "Precision exhausted at 64 bits: boundary hit at j = 97"
        );
        assert!(!err.is_argument());
    }
}
