//! # Pipeline Module
//!
//! High-level evaluation of Willans' formula.
//! Coordinates validation, the row sweep and the final reduction.
//!
//! - [`SequentialEngine`]: in-order sweep, cumulative by default
//! - [`ParallelEngine`]: rows on a rayon pool, always stateless
//! - [`PrimeEngine`]: either of the two behind one interface
//!
//! Both strategies return the same integer for every index.

pub mod parallel;
pub mod sequential;

pub use parallel::ParallelEngine;
pub use sequential::SequentialEngine;

use std::fmt;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::model::validate_index;
use crate::utils::cancel::CancelToken;
use crate::utils::telemetry::{Stage, TelemetryBlackboard};

/// Evaluation strategy for the outer sum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Sequential,
    Parallel,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Sequential => write!(f, "sequential"),
            Strategy::Parallel => write!(f, "parallel"),
        }
    }
}

/// Engine selected at runtime
pub enum PrimeEngine {
    Sequential(SequentialEngine),
    Parallel(ParallelEngine),
}

impl PrimeEngine {
    pub fn new(strategy: Strategy, config: EngineConfig) -> Result<Self> {
        Ok(match strategy {
            Strategy::Sequential => Self::Sequential(SequentialEngine::new(config)?),
            Strategy::Parallel => Self::Parallel(ParallelEngine::new(config)?),
        })
    }

    pub fn with_telemetry(self, telemetry: Arc<TelemetryBlackboard>) -> Self {
        match self {
            Self::Sequential(e) => Self::Sequential(e.with_telemetry(telemetry)),
            Self::Parallel(e) => Self::Parallel(e.with_telemetry(telemetry)),
        }
    }

    pub fn with_cancel(self, cancel: CancelToken) -> Self {
        match self {
            Self::Sequential(e) => Self::Sequential(e.with_cancel(cancel)),
            Self::Parallel(e) => Self::Parallel(e.with_cancel(cancel)),
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Self::Sequential(_) => Strategy::Sequential,
            Self::Parallel(_) => Strategy::Parallel,
        }
    }

    /// Whether rows carry state across the sweep
    pub fn is_cumulative(&self) -> bool {
        match self {
            Self::Sequential(e) => e.config().cumulative,
            Self::Parallel(_) => false,
        }
    }

    pub fn nth_prime(&self, n: i64) -> Result<u64> {
        match self {
            Self::Sequential(e) => e.nth_prime(n),
            Self::Parallel(e) => e.nth_prime(n),
        }
    }

    /// `[P(1), ..., P(n)]`, evaluated one index at a time
    pub fn first_primes(&self, n: i64) -> Result<Vec<u64>> {
        let n = validate_index(n)?;
        let telemetry = match self {
            Self::Sequential(e) => e.telemetry(),
            Self::Parallel(e) => e.telemetry(),
        };
        if let Some(t) = telemetry {
            t.set_total_indices(u64::from(n));
        }
        let primes = (1..=i64::from(n))
            .map(|k| self.nth_prime(k))
            .collect::<Result<Vec<_>>>()?;
        if let Some(t) = telemetry {
            t.set_stage(Stage::Complete);
        }
        Ok(primes)
    }
}

/// The n-th prime by the sequential strategy with default configuration
pub fn nth_prime_sequential(n: i64) -> Result<u64> {
    SequentialEngine::new(EngineConfig::default())?.nth_prime(n)
}

/// The n-th prime by the row-parallel strategy with default configuration
pub fn nth_prime_parallel(n: i64) -> Result<u64> {
    // Reject bad input before paying for a worker pool
    validate_index(n)?;
    ParallelEngine::new(EngineConfig::default())?.nth_prime(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_equivalence() {
        let sequential = PrimeEngine::new(Strategy::Sequential, EngineConfig::default()).unwrap();
        let parallel =
            PrimeEngine::new(Strategy::Parallel, EngineConfig::default().with_nthreads(4))
                .unwrap();
        for n in 1..=7 {
            assert_eq!(
                sequential.nth_prime(n).unwrap(),
                parallel.nth_prime(n).unwrap(),
                "n = {}",
                n
            );
        }
    }

    #[test]
    fn test_first_primes() {
        let engine = PrimeEngine::new(Strategy::Sequential, EngineConfig::default()).unwrap();
        assert_eq!(engine.first_primes(6).unwrap(), vec![2, 3, 5, 7, 11, 13]);
        assert!(engine.first_primes(0).unwrap_err().is_argument());
    }

    #[test]
    fn test_engine_reports_mode() {
        let parallel = PrimeEngine::new(Strategy::Parallel, EngineConfig::default()).unwrap();
        assert_eq!(parallel.strategy(), Strategy::Parallel);
        assert!(!parallel.is_cumulative());

        let sequential = PrimeEngine::new(Strategy::Sequential, EngineConfig::default()).unwrap();
        assert!(sequential.is_cumulative());
        assert_eq!(sequential.strategy().to_string(), "sequential");
    }

    #[test]
    fn test_default_entry_points() {
        assert_eq!(nth_prime_sequential(1).unwrap(), 2);
        assert_eq!(nth_prime_parallel(3).unwrap(), 5);
        assert!(nth_prime_sequential(0).unwrap_err().is_argument());
        assert!(nth_prime_parallel(-3).unwrap_err().is_argument());
    }
}
