//! # Wilson Term and Inner Sum
//!
//! ## Role
//! Evaluate the row count `S(i) = Σ_{j=1}^{i} floor(cos²(π((j-1)! mod j + 1)/j))`.
//!
//! Each term is 1 when `(r + 1)/j` is an integer and 0 otherwise. That happens
//! for `j = 1` (where `r = 1`) and for every prime `j`, so `S(i) = π(i) + 1` for
//! `i >= 1`, with `π` the prime-counting function.
//!
//! ## Precision
//! The cosine runs at working precision; `cos²` is rounded to the result
//! precision before flooring. A rounded value strictly inside
//! `(1 - 2^-(bits - BOUNDARY_BITS), 1 + 2^-(bits - BOUNDARY_BITS))` but not
//! equal to 1 cannot be floored reliably: strict evaluation fails with
//! `PrecisionExhausted`, lenient evaluation warns and keeps going.
//!
//! ## Variants
//! - [`StatelessInnerSum`]: sums `j = 1..=i` on every call.
//! - [`CumulativeInnerSum`]: keeps `(last_i, partial_sum)` and only adds the
//!   new terms; a request below `last_i` starts over from zero.

use num_bigint::BigInt;
use num_traits::{One, ToPrimitive, Zero};
use tracing::{trace, warn};

use super::mod_factorial::{ModFactorial, StatelessModFactorial};
use crate::error::{Result, WillansError};
use crate::numeric::precision::BOUNDARY_BITS;
use crate::numeric::RealContext;
use crate::utils::cancel::CancelToken;

/// Evaluator for the inner sum `S(i)`
pub trait InnerSum {
    fn inner_sum(&mut self, i: u64) -> Result<u64>;
}

/// The floor-of-cos² indicator for a single `j`
#[derive(Debug, Clone, Copy)]
pub struct WilsonTerm<'a> {
    ctx: &'a RealContext,
    strict: bool,
}

impl<'a> WilsonTerm<'a> {
    pub fn new(ctx: &'a RealContext, strict: bool) -> Self {
        Self { ctx, strict }
    }

    /// `floor(cos²(π(residue + 1)/j))` where `residue = (j-1)! mod j`
    pub fn evaluate(&self, j: u64, residue: u64) -> Result<u64> {
        if j == 0 {
            return Err(WillansError::domain("Wilson term for j = 0"));
        }
        let bits = self.ctx.precision().bits();
        let x = self.ctx.pi_fraction(residue + 1, j);
        let cos_sq = self.ctx.cos(&x).square().round_to(bits);

        let gap = cos_sq.ulps_from_one();
        if !gap.is_zero() && gap < (BigInt::one() << BOUNDARY_BITS) {
            let message = format!(
                "cos² for j = {} lies within 2^-{} of the floor boundary",
                j,
                bits - BOUNDARY_BITS
            );
            if self.strict {
                return Err(WillansError::precision_exhausted(bits, message));
            }
            warn!(j, bits, "{}", message);
        }

        cos_sq
            .floor()
            .to_u64()
            .ok_or_else(|| WillansError::domain(format!("cos² out of range for j = {}", j)))
    }
}

/// Recomputes the whole sum on every call
#[derive(Debug, Clone)]
pub struct StatelessInnerSum<'a> {
    term: WilsonTerm<'a>,
    cancel: CancelToken,
}

impl<'a> StatelessInnerSum<'a> {
    pub fn new(ctx: &'a RealContext, strict: bool) -> Self {
        Self {
            term: WilsonTerm::new(ctx, strict),
            cancel: CancelToken::new(),
        }
    }

    /// Abort between terms once `cancel` fires
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl InnerSum for StatelessInnerSum<'_> {
    fn inner_sum(&mut self, i: u64) -> Result<u64> {
        let mut sum = 0u64;
        for j in 1..=i {
            self.cancel.check()?;
            let residue = StatelessModFactorial.mod_factorial(j - 1, j)?;
            sum += self.term.evaluate(j, residue)?;
        }
        Ok(sum)
    }
}

/// Extends the previous sum when called with non-decreasing `i`.
///
/// Consecutive terms use different moduli, so each residue is computed from
/// scratch; the saving is that every `j` is visited once across calls.
#[derive(Debug, Clone)]
pub struct CumulativeInnerSum<'a> {
    term: WilsonTerm<'a>,
    cancel: CancelToken,
    last_i: u64,
    partial: u64,
}

impl<'a> CumulativeInnerSum<'a> {
    pub fn new(ctx: &'a RealContext, strict: bool) -> Self {
        Self {
            term: WilsonTerm::new(ctx, strict),
            cancel: CancelToken::new(),
            last_i: 0,
            partial: 0,
        }
    }

    /// Abort between terms once `cancel` fires
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Drop the carried sum
    pub fn reset(&mut self) {
        self.last_i = 0;
        self.partial = 0;
    }
}

impl InnerSum for CumulativeInnerSum<'_> {
    fn inner_sum(&mut self, i: u64) -> Result<u64> {
        if i < self.last_i {
            trace!(last_i = self.last_i, i, "inner sum reset");
            self.reset();
        }
        for j in self.last_i + 1..=i {
            self.cancel.check()?;
            let residue = StatelessModFactorial.mod_factorial(j - 1, j)?;
            self.partial += self.term.evaluate(j, residue)?;
            self.last_i = j;
        }
        Ok(self.partial)
    }
}

/// Number of primes in `[1, i]`, read off the inner sum
pub fn prime_count(ctx: &RealContext, i: u64) -> Result<u64> {
    let sum = StatelessInnerSum::new(ctx, true).inner_sum(i)?;
    Ok(sum.saturating_sub(1))
}
