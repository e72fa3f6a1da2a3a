//! # Precision Budget
//!
//! ## Role
//! Describe how many fractional bits the real arithmetic carries and decide
//! whether that is enough for a given prime index.
//!
//! ## Budget
//! For `j <= 2^n` the Wilson term `cos²(π(r+1)/j)` is either exactly 1 or at
//! least `sin²(π/j) ≈ π²·2^(-2n)` away from it. Floors stay exact as long as
//! that gap is visible above the boundary band of `2^-(bits - BOUNDARY_BITS)`,
//! so the engine requires `bits >= 2n + BOUNDARY_BITS + SLACK_BITS`.
//!
//! The default of 256 bits (~77 decimal digits) supports every index the
//! 64-bit row counter allows.

use crate::error::{Result, WillansError};

/// Default result precision in bits (~77 significant decimal digits)
pub const DEFAULT_PRECISION_BITS: u32 = 256;

/// Extra bits carried through transcendental evaluation before rounding
pub const GUARD_BITS: u32 = 32;

/// Width of the band below 1 inside which a floor is considered undecidable
pub const BOUNDARY_BITS: u32 = 32;

/// Slack on top of the boundary band when checking support for an index
const SLACK_BITS: u32 = 8;

pub const MIN_PRECISION_BITS: u32 = 64;
pub const MAX_PRECISION_BITS: u32 = 1 << 16;

/// Largest prime index whose `2^n` rows fit the 64-bit row counter
pub const MAX_PRIME_INDEX: u32 = 63;

/// Result precision of the real arithmetic, in bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Precision {
    bits: u32,
}

impl Precision {
    /// Precision with the given number of fractional bits
    pub fn from_bits(bits: u32) -> Result<Self> {
        if !(MIN_PRECISION_BITS..=MAX_PRECISION_BITS).contains(&bits) {
            return Err(WillansError::config(format!(
                "precision must be between {} and {} bits, got {}",
                MIN_PRECISION_BITS, MAX_PRECISION_BITS, bits
            )));
        }
        Ok(Self { bits })
    }

    /// Precision holding at least `digits` significant decimal digits.
    ///
    /// Uses `bits = ceil(digits * log2(10))` with log2(10) ~= 3.322.
    pub fn from_decimal_digits(digits: u32) -> Result<Self> {
        let bits = (u64::from(digits) * 3322).div_ceil(1000);
        let bits = u32::try_from(bits).map_err(|_| {
            WillansError::config(format!("{} decimal digits is out of range", digits))
        })?;
        Self::from_bits(bits)
    }

    #[inline]
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Decimal digits represented by this precision (rounded down)
    pub fn decimal_digits(&self) -> u32 {
        (u64::from(self.bits) * 301 / 1000) as u32
    }

    /// Bits used while evaluating transcendental functions
    #[inline]
    pub fn working_bits(&self) -> u32 {
        self.bits + GUARD_BITS
    }

    /// Largest prime index this precision can evaluate without boundary ambiguity
    pub fn max_supported_index(&self) -> u32 {
        let usable = self.bits.saturating_sub(BOUNDARY_BITS + SLACK_BITS) / 2;
        usable.min(MAX_PRIME_INDEX)
    }

    /// Fail with `PrecisionExhausted` when `n` needs more bits than configured
    pub fn ensure_supports(&self, n: u32) -> Result<()> {
        if n > self.max_supported_index() {
            let needed = 2 * n + BOUNDARY_BITS + SLACK_BITS;
            return Err(WillansError::precision_exhausted(
                self.bits,
                format!(
                    "index {} needs at least {} bits (largest supported index is {})",
                    n,
                    needed,
                    self.max_supported_index()
                ),
            ));
        }
        Ok(())
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            bits: DEFAULT_PRECISION_BITS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_77_digits() {
        let p = Precision::default();
        assert_eq!(p.bits(), 256);
        assert_eq!(p.decimal_digits(), 77);
        assert_eq!(Precision::from_decimal_digits(77).unwrap(), p);
    }

    #[test]
    fn test_digits_round_up() {
        // 30 digits need 99.66 bits
        assert_eq!(Precision::from_decimal_digits(30).unwrap().bits(), 100);
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(matches!(
            Precision::from_bits(32),
            Err(WillansError::Config { .. })
        ));
        assert!(Precision::from_bits(MAX_PRECISION_BITS + 1).is_err());
        assert!(Precision::from_decimal_digits(5).is_err());
    }

    #[test]
    fn test_supported_index() {
        assert_eq!(Precision::default().max_supported_index(), MAX_PRIME_INDEX);

        let low = Precision::from_bits(64).unwrap();
        assert_eq!(low.max_supported_index(), 12);
        assert!(low.ensure_supports(12).is_ok());
        assert!(matches!(
            low.ensure_supports(13),
            Err(WillansError::PrecisionExhausted { bits: 64, .. })
        ));
    }
}
