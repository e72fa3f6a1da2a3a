//! # Binary Fixed-Point Reals
//!
//! A value is `raw / 2^frac_bits` with `raw` an arbitrary-width `BigInt`.
//! Operands of a binary operation must share the same scale; every operation
//! truncates toward negative infinity unless it says otherwise.

use std::cmp::Ordering;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::error::{Result, WillansError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixed {
    raw: BigInt,
    frac_bits: u32,
}

impl Fixed {
    /// Wrap a raw mantissa already scaled by `2^frac_bits`
    pub fn from_raw(raw: BigInt, frac_bits: u32) -> Self {
        Self { raw, frac_bits }
    }

    pub fn zero(frac_bits: u32) -> Self {
        Self::from_raw(BigInt::zero(), frac_bits)
    }

    pub fn one(frac_bits: u32) -> Self {
        Self::from_integer(1u32, frac_bits)
    }

    /// Exact integer value
    pub fn from_integer(value: impl Into<BigInt>, frac_bits: u32) -> Self {
        Self::from_raw(value.into() << frac_bits, frac_bits)
    }

    /// `num / den`, floored to the scale
    pub fn from_ratio(num: u64, den: u64, frac_bits: u32) -> Result<Self> {
        if den == 0 {
            return Err(WillansError::domain("division by zero in fixed-point ratio"));
        }
        Ok(Self::from_integer(num, frac_bits).div_int(den))
    }

    #[inline]
    pub fn raw(&self) -> &BigInt {
        &self.raw
    }

    #[inline]
    pub fn frac_bits(&self) -> u32 {
        self.frac_bits
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    pub fn add(&self, other: &Self) -> Self {
        debug_assert_eq!(self.frac_bits, other.frac_bits);
        Self::from_raw(&self.raw + &other.raw, self.frac_bits)
    }

    pub fn sub(&self, other: &Self) -> Self {
        debug_assert_eq!(self.frac_bits, other.frac_bits);
        Self::from_raw(&self.raw - &other.raw, self.frac_bits)
    }

    pub fn neg(&self) -> Self {
        Self::from_raw(-&self.raw, self.frac_bits)
    }

    pub fn abs(&self) -> Self {
        Self::from_raw(self.raw.abs(), self.frac_bits)
    }

    pub fn mul(&self, other: &Self) -> Self {
        debug_assert_eq!(self.frac_bits, other.frac_bits);
        Self::from_raw((&self.raw * &other.raw) >> self.frac_bits, self.frac_bits)
    }

    pub fn square(&self) -> Self {
        self.mul(self)
    }

    /// Exact multiplication by an integer
    pub fn mul_int(&self, k: u64) -> Self {
        Self::from_raw(&self.raw * BigInt::from(k), self.frac_bits)
    }

    /// Floored division by a positive integer
    pub fn div_int(&self, d: u64) -> Self {
        debug_assert!(d != 0);
        Self::from_raw(self.raw.div_floor(&BigInt::from(d)), self.frac_bits)
    }

    /// Largest integer not above the value
    pub fn floor(&self) -> BigInt {
        &self.raw >> self.frac_bits
    }

    /// Re-express at a different scale, rounding half up when bits are dropped
    pub fn round_to(&self, frac_bits: u32) -> Self {
        match frac_bits.cmp(&self.frac_bits) {
            Ordering::Equal => self.clone(),
            Ordering::Greater => {
                Self::from_raw(&self.raw << (frac_bits - self.frac_bits), frac_bits)
            }
            Ordering::Less => {
                let shift = self.frac_bits - frac_bits;
                let half = BigInt::one() << (shift - 1);
                Self::from_raw((&self.raw + half) >> shift, frac_bits)
            }
        }
    }

    /// Floor of the exact `n`-th root of the represented value, at the same scale.
    ///
    /// With `x = raw / 2^f`, the scaled root is `floor((raw · 2^(f(n-1)))^(1/n))`,
    /// which is computed entirely in integers.
    pub fn nth_root(&self, n: u32) -> Result<Self> {
        if n == 0 {
            return Err(WillansError::domain("zeroth root is undefined"));
        }
        let radicand: BigUint = self.raw.to_biguint().ok_or_else(|| {
            WillansError::domain("root of a negative fixed-point value")
        })?;
        if n == 1 {
            return Ok(self.clone());
        }
        let scaled = radicand << (u64::from(self.frac_bits) * u64::from(n - 1));
        Ok(Self::from_raw(BigInt::from(scaled.nth_root(n)), self.frac_bits))
    }

    /// Absolute distance from 1, in units of the last place
    pub fn ulps_from_one(&self) -> BigInt {
        (&self.raw - (BigInt::one() << self.frac_bits)).abs()
    }

    /// Lossy conversion for comparisons against `f64` references
    #[cfg(test)]
    pub(crate) fn to_f64(&self) -> f64 {
        let shift = self.frac_bits.saturating_sub(60);
        let top = num_traits::ToPrimitive::to_f64(&(&self.raw >> shift)).unwrap_or(f64::NAN);
        top / 2f64.powi((self.frac_bits - shift) as i32)
    }
}

impl PartialOrd for Fixed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fixed {
    fn cmp(&self, other: &Self) -> Ordering {
        debug_assert_eq!(self.frac_bits, other.frac_bits);
        self.raw.cmp(&other.raw)
    }
}
