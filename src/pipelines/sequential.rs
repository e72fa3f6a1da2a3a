//! # Sequential Strategy
//!
//! ## Role
//! Walk the rows `i = 1..=2^n` in order on the calling thread and accumulate
//! `1 + Σ R(i, n)`.
//!
//! ## Cumulative mode
//! Rows are visited in increasing order, so the inner sum of row `i` extends
//! the one of row `i - 1` by a single Wilson term. With cumulative mode on
//! (the default) every `j` is evaluated once per call instead of once per
//! row. The floored root is memoised on the last inner sum as well: `S(i)` is
//! non-decreasing and changes only at primes.
//!
//! All carried state lives in locals of [`SequentialEngine::nth_prime`] and
//! is dropped when the call returns.

use std::sync::Arc;

use tracing::{debug, info_span, instrument};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::model::{
    floor_root, validate_index, CumulativeInnerSum, InnerSum, StatelessInnerSum,
};
use crate::numeric::RealContext;
use crate::utils::cancel::CancelToken;
use crate::utils::telemetry::{Stage, TelemetryBlackboard};

/// Row-by-row evaluation on the calling thread
pub struct SequentialEngine {
    config: EngineConfig,
    context: RealContext,
    telemetry: Option<Arc<TelemetryBlackboard>>,
    cancel: CancelToken,
}

impl SequentialEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let context = RealContext::new(config.precision);
        Ok(Self {
            config,
            context,
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

    /// The n-th prime by sequential accumulation
    #[instrument(name = "nth_prime_sequential", skip(self), fields(cumulative = self.config.cumulative))]
    pub fn nth_prime(&self, n: i64) -> Result<u64> {
        let n = validate_index(n)?;
        self.config.precision.ensure_supports(n)?;
        self.cancel.check()?;

        let total_rows = 1u64 << n;
        if let Some(t) = &self.telemetry {
            t.set_stage(Stage::SequentialRows);
            t.begin_index(u64::from(n), total_rows);
        }

        let strict = self.config.strict_precision;
        let cancel = self.cancel.clone();
        let mut evaluator: Box<dyn InnerSum + '_> = if self.config.cumulative {
            Box::new(CumulativeInnerSum::new(&self.context, strict).with_cancel(cancel))
        } else {
            Box::new(StatelessInnerSum::new(&self.context, strict).with_cancel(cancel))
        };

        let _rows = info_span!("rows", total_rows).entered();
        let mut outer_sum = 1u64;
        let mut last_root: Option<(u64, u64)> = None;
        for i in 1..=total_rows {
            self.cancel.check()?;

            let inner_sum = evaluator.inner_sum(i)?;
            let contribution = match last_root {
                Some((s, root)) if s == inner_sum => root,
                _ => {
                    let root = floor_root(&self.context, n, inner_sum)?;
                    last_root = Some((inner_sum, root));
                    root
                }
            };
            outer_sum += contribution;

            if let Some(t) = &self.telemetry {
                t.row_done();
            }
        }

        debug!(n, result = outer_sum, "sequential evaluation complete");
        Ok(outer_sum)
    }
}
