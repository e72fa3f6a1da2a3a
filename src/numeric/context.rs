//! # Real Arithmetic Context
//!
//! ## Role
//! Holds the constants every Wilson-term evaluation needs (`π`, `2π`, `π/2`)
//! at working precision, computed once per evaluator and shared read-only.
//!
//! ## Algorithms
//! - `π` by Machin's formula `π = 16·atan(1/5) − 4·atan(1/239)`, summed with
//!   extra bits and rounded to working precision.
//! - `cos(x)`: reduce `x` into `[-π, π)` with `k = floor((x + π) / 2π)`, fold by
//!   evenness and `cos(x) = -cos(π - x)` into `[0, π/2]`, then sum the Taylor
//!   series until the next term underflows.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};

use super::fixed::Fixed;
use super::precision::Precision;

/// Bits added on top of working precision while summing the arctangent series
const PI_EXTRA_BITS: u32 = 16;

#[derive(Debug, Clone)]
pub struct RealContext {
    precision: Precision,
    pi: Fixed,
    two_pi: Fixed,
    half_pi: Fixed,
}

impl RealContext {
    pub fn new(precision: Precision) -> Self {
        let bits = precision.working_bits();
        let pi = machin_pi(bits);
        let two_pi = pi.mul_int(2);
        let half_pi = Fixed::from_raw(pi.raw() >> 1u32, bits);
        Self {
            precision,
            pi,
            two_pi,
            half_pi,
        }
    }

    #[inline]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Fractional bits of every value produced by this context
    #[inline]
    pub fn working_bits(&self) -> u32 {
        self.precision.working_bits()
    }

    /// `π · num / den`, exactly `π` when `num == den`
    pub fn pi_fraction(&self, num: u64, den: u64) -> Fixed {
        debug_assert!(den != 0);
        self.pi.mul_int(num).div_int(den)
    }

    /// Cosine at working precision
    pub fn cos(&self, x: &Fixed) -> Fixed {
        let bits = self.working_bits();
        debug_assert_eq!(x.frac_bits(), bits);

        // k = floor((x + π) / 2π) puts r = x - 2πk in [-π, π)
        let k = (x.raw() + self.pi.raw()).div_floor(self.two_pi.raw());
        let r = if k.is_zero() {
            x.abs()
        } else {
            Fixed::from_raw(x.raw() - self.two_pi.raw() * k, bits).abs()
        };

        if r > self.half_pi {
            cos_taylor(&self.pi.sub(&r)).neg()
        } else {
            cos_taylor(&r)
        }
    }
}

/// Taylor series `1 - r²/2! + r⁴/4! - ...` for `0 <= r <= π/2`
fn cos_taylor(r: &Fixed) -> Fixed {
    let bits = r.frac_bits();
    let r2 = r.square();
    let mut term = Fixed::one(bits);
    let mut sum = term.clone();
    let mut k: u64 = 1;
    loop {
        term = term.mul(&r2).div_int((2 * k - 1) * (2 * k));
        if term.is_zero() {
            break;
        }
        sum = if k % 2 == 1 { sum.sub(&term) } else { sum.add(&term) };
        k += 1;
    }
    sum
}

/// π at `bits` fractional bits
pub fn machin_pi(bits: u32) -> Fixed {
    let wide = bits + PI_EXTRA_BITS;
    let raw = (atan_recip(5, wide) << 4u32) - (atan_recip(239, wide) << 2u32);
    Fixed::from_raw(raw, wide).round_to(bits)
}

/// `atan(1/k)` as a raw mantissa with `bits` fractional bits.
///
/// Alternating series `Σ (-1)^i / ((2i+1) k^(2i+1))`; each truncated division
/// loses at most one unit, well inside the extra bits.
fn atan_recip(k: u64, bits: u32) -> BigInt {
    let k2 = BigInt::from(k * k);
    let mut power = (BigInt::one() << bits) / BigInt::from(k);
    let mut sum = power.clone();
    let mut i: u64 = 1;
    loop {
        power /= &k2;
        if power.is_zero() {
            break;
        }
        let term = &power / BigInt::from(2 * i + 1);
        if i % 2 == 1 {
            sum -= term;
        } else {
            sum += term;
        }
        i += 1;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    const PI_DIGITS: &str = "31415926535897932384626433832795028841971693993751058209749445923078164062862";

    /// Decimal digits of `floor(x * 10^digits)`
    fn decimal_digits(x: &Fixed, digits: u32) -> String {
        let scaled = x.raw() * BigInt::from(10u32).pow(digits);
        (scaled >> x.frac_bits()).to_string()
    }

    #[test]
    fn test_machin_pi_digits() {
        let pi = machin_pi(Precision::default().bits());
        let digits = decimal_digits(&pi, 75);
        assert_eq!(&digits[..74], &PI_DIGITS[..74]);
    }

    #[test]
    fn test_cos_at_multiples_of_pi() {
        let ctx = RealContext::new(Precision::default());
        let bits = ctx.working_bits();

        assert_eq!(ctx.cos(&Fixed::zero(bits)), Fixed::one(bits));
        assert_eq!(ctx.cos(&ctx.pi_fraction(1, 1)), Fixed::one(bits).neg());
        assert_eq!(ctx.cos(&ctx.pi_fraction(2, 1)), Fixed::one(bits));
        assert_eq!(ctx.cos(&ctx.pi_fraction(13, 13)), Fixed::one(bits).neg());
    }

    #[test]
    fn test_cos_matches_f64() {
        let ctx = RealContext::new(Precision::default());
        for (num, den) in [(1u64, 3u64), (3, 4), (1, 97), (5, 6), (7, 4), (9, 2)] {
            let x = ctx.pi_fraction(num, den);
            let expected = (std::f64::consts::PI * num as f64 / den as f64).cos();
            let got = ctx.cos(&x).to_f64();
            assert!(
                (got - expected).abs() < 1e-14,
                "cos({}π/{}) = {} expected {}",
                num,
                den,
                got,
                expected
            );
        }
    }

    #[test]
    fn test_cos_squared_of_three_quarter_pi_is_half() {
        let ctx = RealContext::new(Precision::default());
        let bits = ctx.precision().bits();
        let sq = ctx.cos(&ctx.pi_fraction(3, 4)).square().round_to(bits);
        assert_eq!(sq, Fixed::from_ratio(1, 2, bits).unwrap());
    }
}
