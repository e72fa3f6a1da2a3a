//! # Row Contribution
//!
//! `R(i, n) = floor((n / S(i))^(1/n))` for `S(i) != 0`, else 0.
//!
//! Since `1 <= S(i)` and `n/S(i) <= n < 2^n`, the root is below 2: a row
//! contributes 1 exactly while at most `n` values in `[1, i]` have been
//! counted, and summing rows over `1..=2^n` lands on the n-th prime minus one.

use num_traits::ToPrimitive;

use super::inner_sum::{InnerSum, StatelessInnerSum};
use crate::error::{Result, WillansError};
use crate::numeric::{Fixed, RealContext};
use crate::utils::cancel::CancelToken;

/// Floored `n`-th root of `n / inner_sum` at the context's result precision
pub fn floor_root(ctx: &RealContext, n: u32, inner_sum: u64) -> Result<u64> {
    if inner_sum == 0 {
        return Ok(0);
    }
    let ratio = Fixed::from_ratio(u64::from(n), inner_sum, ctx.precision().bits())?;
    ratio
        .nth_root(n)?
        .floor()
        .to_u64()
        .ok_or_else(|| WillansError::domain(format!("root out of range for S = {}", inner_sum)))
}

/// `R(i, n)` from scratch; depends on nothing but `(i, n)`.
///
/// `cancel` is polled before every Wilson term, so a cancelled row stops
/// after at most one term.
pub fn row_contribution(
    ctx: &RealContext,
    i: u64,
    n: u32,
    strict: bool,
    cancel: &CancelToken,
) -> Result<u64> {
    let inner_sum = StatelessInnerSum::new(ctx, strict)
        .with_cancel(cancel.clone())
        .inner_sum(i)?;
    floor_root(ctx, n, inner_sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::Precision;

    #[test]
    fn test_floor_root() {
        let ctx = RealContext::new(Precision::default());
        assert_eq!(floor_root(&ctx, 3, 0).unwrap(), 0);
        // n / S >= 1 contributes 1
        assert_eq!(floor_root(&ctx, 1, 1).unwrap(), 1);
        assert_eq!(floor_root(&ctx, 5, 1).unwrap(), 1);
        assert_eq!(floor_root(&ctx, 5, 5).unwrap(), 1);
        // n / S < 1 contributes 0
        assert_eq!(floor_root(&ctx, 5, 6).unwrap(), 0);
        assert_eq!(floor_root(&ctx, 1, 2).unwrap(), 0);
        assert_eq!(floor_root(&ctx, 40, 41).unwrap(), 0);
    }

    #[test]
    fn test_row_contribution_for_first_prime() {
        let ctx = RealContext::new(Precision::default());
        let cancel = CancelToken::new();
        // S(1) = 1, S(2) = 2: rows 1 and 2 of n = 1
        assert_eq!(row_contribution(&ctx, 1, 1, true, &cancel).unwrap(), 1);
        assert_eq!(row_contribution(&ctx, 2, 1, true, &cancel).unwrap(), 0);
    }

    #[test]
    fn test_row_contribution_switches_at_nth_prime() {
        let ctx = RealContext::new(Precision::default());
        let cancel = CancelToken::new();
        // n = 4: S(i) <= 4 while i < 7
        for i in 1..=6 {
            assert_eq!(row_contribution(&ctx, i, 4, true, &cancel).unwrap(), 1, "i = {}", i);
        }
        for i in 7..=16 {
            assert_eq!(row_contribution(&ctx, i, 4, true, &cancel).unwrap(), 0, "i = {}", i);
        }
    }
}
