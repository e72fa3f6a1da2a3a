//! # Row-Parallel Strategy
//!
//! ## Role
//! Fan the rows `i = 1..=2^n` out across a rayon pool, compute each
//! `R(i, n)` independently and fold the contributions back with a sum.
//!
//! ## Isolation
//! Every row builds a fresh stateless evaluator; the only thing shared between
//! workers is the read-only [`RealContext`] holding `π`. Cumulative evaluation
//! is therefore never used here, whatever the configuration says.
//!
//! ## Failure
//! `try_reduce` stops scheduling new rows after the first error and that error
//! is returned instead of a partial sum. The cancel token is polled before
//! every row and before every Wilson term inside a row, so a cancelled run
//! returns once each worker finishes the term it is on.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info_span, instrument};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::model::{row_contribution, validate_index};
use crate::numeric::RealContext;
use crate::utils::cancel::CancelToken;
use crate::utils::telemetry::{Stage, TelemetryBlackboard};
use crate::utils::threading::build_thread_pool;

/// Row-parallel evaluation on a dedicated worker pool
pub struct ParallelEngine {
    config: EngineConfig,
    context: RealContext,
    pool: rayon::ThreadPool,
    telemetry: Option<Arc<TelemetryBlackboard>>,
    cancel: CancelToken,
}

impl ParallelEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        if config.cumulative {
            debug!("cumulative evaluation is disabled for the parallel strategy");
        }
        let pool = build_thread_pool(config.nthreads())?;
        let context = RealContext::new(config.precision);
        Ok(Self {
            config,
            context,
            pool,
            telemetry: None,
            cancel: CancelToken::new(),
        })
    }

    pub fn with_telemetry(mut self, telemetry: Arc<TelemetryBlackboard>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn telemetry(&self) -> Option<&TelemetryBlackboard> {
        self.telemetry.as_deref()
    }

    pub fn nthreads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// The n-th prime by row-parallel decomposition
    #[instrument(name = "nth_prime_parallel", skip(self), fields(nthreads = self.nthreads()))]
    pub fn nth_prime(&self, n: i64) -> Result<u64> {
        let n = validate_index(n)?;
        self.config.precision.ensure_supports(n)?;
        self.cancel.check()?;

        let total_rows = 1u64 << n;
        if let Some(t) = &self.telemetry {
            t.set_stage(Stage::ParallelRows);
            t.begin_index(u64::from(n), total_rows);
        }

        let ctx = &self.context;
        let cancel = &self.cancel;
        let telemetry = self.telemetry.as_deref();
        let strict = self.config.strict_precision;

        let row_sum = info_span!("rows", total_rows).in_scope(|| {
            self.pool.install(|| {
                (1..=total_rows)
                    .into_par_iter()
                    .map(|i| -> Result<u64> {
                        cancel.check()?;
                        let contribution = row_contribution(ctx, i, n, strict, cancel)?;
                        if let Some(t) = telemetry {
                            t.row_done();
                        }
                        Ok(contribution)
                    })
                    .try_reduce(|| 0u64, |a, b| Ok(a + b))
            })
        })?;

        let result = 1 + row_sum;
        debug!(n, result, "parallel evaluation complete");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WillansError;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn test_known_values() {
        let engine = ParallelEngine::new(EngineConfig::default().with_nthreads(4)).unwrap();
        for (k, p) in [2u64, 3, 5, 7, 11, 13].into_iter().enumerate() {
            assert_eq!(engine.nth_prime(k as i64 + 1).unwrap(), p);
        }
    }

    #[test]
    fn test_single_worker() {
        let engine = ParallelEngine::new(EngineConfig::default().with_nthreads(1)).unwrap();
        assert_eq!(engine.nthreads(), 1);
        assert_eq!(engine.nth_prime(4).unwrap(), 7);
    }

    #[test]
    fn test_invalid_index() {
        let engine = ParallelEngine::new(EngineConfig::default().with_nthreads(2)).unwrap();
        assert!(engine.nth_prime(0).unwrap_err().is_argument());
        assert!(engine.nth_prime(-3).unwrap_err().is_argument());
    }

    #[test]
    fn test_zero_threads_rejected() {
        assert!(matches!(
            ParallelEngine::new(EngineConfig::default().with_nthreads(0)),
            Err(WillansError::Config { .. })
        ));
    }

    #[test]
    fn test_cancelled() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let engine = ParallelEngine::new(EngineConfig::default().with_nthreads(2))
            .unwrap()
            .with_cancel(cancel);
        assert!(matches!(engine.nth_prime(6), Err(WillansError::Cancelled)));
    }

    #[test]
    fn test_cancelled_while_rows_run() {
        let cancel = CancelToken::new();
        let engine = ParallelEngine::new(EngineConfig::default().with_nthreads(4))
            .unwrap()
            .with_cancel(cancel.clone());

        let trigger = {
            let cancel = cancel.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(100));
                cancel.cancel();
            })
        };
        let start = Instant::now();
        // 2^20 stateless rows; workers are deep inside large rows when the flag flips
        let result = engine.nth_prime(20);
        trigger.join().unwrap();

        assert!(matches!(result, Err(WillansError::Cancelled)));
        assert!(
            start.elapsed() < Duration::from_secs(30),
            "cancellation took {:?}",
            start.elapsed()
        );
    }

    #[test]
    fn test_telemetry_counts_rows() {
        let telemetry = TelemetryBlackboard::new();
        let engine = ParallelEngine::new(EngineConfig::default().with_nthreads(2))
            .unwrap()
            .with_telemetry(telemetry.clone());
        assert_eq!(engine.nth_prime(4).unwrap(), 7);
        assert_eq!(telemetry.rows_processed(), 16);
    }
}
