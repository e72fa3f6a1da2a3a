//! # Modular Factorial
//!
//! ## Role
//! Compute `k! mod m` in exact integer arithmetic. Willans' formula calls it
//! as `(j-1)! mod j`, the Wilson's-theorem primality witness: for `j > 1` the
//! residue is `j - 1` exactly when `j` is prime.
//!
//! ## Algorithm
//! Start the accumulator at 1 and, for each `w` in `2..=k`, multiply and reduce
//! immediately, so every intermediate stays below `m`. The accumulator is never
//! reduced when the loop is empty: `0! mod 1` and `1! mod 1` both evaluate to 1.
//!
//! ## Variants
//! - [`StatelessModFactorial`]: recompute from scratch, O(k).
//! - [`CumulativeModFactorial`]: caller-owned `(k, m, r)` memory; repeating the
//!   last call is free and stepping `k` by one under the same modulus costs a
//!   single multiplication. Anything else resets.

use tracing::trace;

use crate::error::{Result, WillansError};

/// Evaluator for `k! mod modulus`
pub trait ModFactorial {
    fn mod_factorial(&mut self, k: u64, modulus: u64) -> Result<u64>;
}

/// `k! mod modulus` for caller-supplied signed input.
///
/// Negative `k` is an argument error; a zero modulus is a domain error.
pub fn mod_factorial(k: i64, modulus: u64) -> Result<u64> {
    let k = u64::try_from(k)
        .map_err(|_| WillansError::argument(format!("factorial index must be >= 0, got {}", k)))?;
    StatelessModFactorial.mod_factorial(k, modulus)
}

#[inline]
fn check_modulus(modulus: u64) -> Result<()> {
    if modulus == 0 {
        return Err(WillansError::domain("modular factorial with modulus 0"));
    }
    Ok(())
}

/// Multiply `acc` by every `w` in `from..=to` (skipping 0 and 1), reducing each step
#[inline]
fn extend(mut acc: u64, from: u64, to: u64, modulus: u64) -> u64 {
    let m = u128::from(modulus);
    for w in from.max(2)..=to {
        acc = (u128::from(acc) * u128::from(w) % m) as u64;
    }
    acc
}

/// Recomputes every call
#[derive(Debug, Clone, Copy, Default)]
pub struct StatelessModFactorial;

impl ModFactorial for StatelessModFactorial {
    fn mod_factorial(&mut self, k: u64, modulus: u64) -> Result<u64> {
        check_modulus(modulus)?;
        Ok(extend(1, 2, k, modulus))
    }
}

#[derive(Debug, Clone, Copy)]
struct FactorialState {
    k: u64,
    modulus: u64,
    residue: u64,
}

/// Carries the last `(k, modulus, residue)` across calls
#[derive(Debug, Clone, Default)]
pub struct CumulativeModFactorial {
    state: Option<FactorialState>,
}

impl CumulativeModFactorial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the carried residue
    pub fn reset(&mut self) {
        self.state = None;
    }
}

impl ModFactorial for CumulativeModFactorial {
    fn mod_factorial(&mut self, k: u64, modulus: u64) -> Result<u64> {
        check_modulus(modulus)?;

        let residue = match self.state {
            Some(s) if s.modulus == modulus && s.k == k => s.residue,
            Some(s) if s.modulus == modulus && s.k.checked_add(1) == Some(k) => {
                extend(s.residue, k, k, modulus)
            }
            previous => {
                if let Some(s) = previous {
                    trace!(last_k = s.k, last_modulus = s.modulus, k, modulus, "factorial reset");
                }
                extend(1, 2, k, modulus)
            }
        };

        self.state = Some(FactorialState {
            k,
            modulus,
            residue,
        });
        Ok(residue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIMES: [u64; 8] = [2, 3, 5, 7, 11, 13, 97, 101];
    const COMPOSITES: [u64; 8] = [4, 6, 8, 9, 15, 25, 91, 100];

    #[test]
    fn test_wilson_primes() {
        for p in PRIMES {
            assert_eq!(mod_factorial(p as i64 - 1, p).unwrap(), p - 1, "j = {}", p);
        }
        assert_eq!(mod_factorial(6, 7).unwrap(), 6);
    }

    #[test]
    fn test_wilson_composites() {
        for c in COMPOSITES {
            assert_ne!(mod_factorial(c as i64 - 1, c).unwrap(), c - 1, "j = {}", c);
        }
        assert_eq!(mod_factorial(7, 8).unwrap(), 0);
        assert_eq!(mod_factorial(3, 4).unwrap(), 2);
    }

    #[test]
    fn test_empty_product_is_unreduced_one() {
        assert_eq!(mod_factorial(0, 1).unwrap(), 1);
        assert_eq!(mod_factorial(1, 1).unwrap(), 1);
        assert_eq!(mod_factorial(2, 1).unwrap(), 0);
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(mod_factorial(5, 0), Err(WillansError::Domain { .. })));
        assert!(matches!(mod_factorial(-1, 7), Err(WillansError::Argument { .. })));
    }

    #[test]
    fn test_large_modulus_does_not_overflow() {
        let m = (1u64 << 61) - 1; // Mersenne prime
        let r = mod_factorial(40, m).unwrap();
        assert!(r < m);
        // 19! is below m, so no reduction happens
        assert_eq!(mod_factorial(19, m).unwrap(), 121_645_100_408_832_000);
    }

    #[test]
    fn test_cumulative_steps_under_fixed_modulus() {
        let mut cumulative = CumulativeModFactorial::new();
        let mut stateless = StatelessModFactorial;
        for k in 0..60 {
            assert_eq!(
                cumulative.mod_factorial(k, 1009).unwrap(),
                stateless.mod_factorial(k, 1009).unwrap()
            );
            assert_eq!(cumulative.state.map(|s| (s.k, s.modulus)), Some((k, 1009)));
        }
    }

    #[test]
    fn test_cumulative_resets_on_discontinuity() {
        let mut cumulative = CumulativeModFactorial::new();
        assert_eq!(cumulative.mod_factorial(5, 1000).unwrap(), 120);
        // Jump ahead, go backwards, change modulus
        assert_eq!(cumulative.mod_factorial(7, 1000).unwrap(), 40);
        assert_eq!(cumulative.mod_factorial(3, 1000).unwrap(), 6);
        assert_eq!(cumulative.mod_factorial(4, 7).unwrap(), 3);
        // Repeat is served from memory
        assert_eq!(cumulative.mod_factorial(4, 7).unwrap(), 3);

        cumulative.reset();
        assert!(cumulative.state.is_none());
    }

    #[test]
    fn test_cumulative_matches_wilson_sweep() {
        let mut cumulative = CumulativeModFactorial::new();
        for j in 1..200u64 {
            assert_eq!(
                cumulative.mod_factorial(j - 1, j).unwrap(),
                mod_factorial(j as i64 - 1, j).unwrap()
            );
        }
    }

    #[test]
    fn test_cumulative_empty_product_after_step() {
        let mut cumulative = CumulativeModFactorial::new();
        assert_eq!(cumulative.mod_factorial(0, 1).unwrap(), 1);
        assert_eq!(cumulative.mod_factorial(1, 1).unwrap(), 1);
        assert_eq!(cumulative.mod_factorial(2, 1).unwrap(), 0);
    }
}
