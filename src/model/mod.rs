//! # Model Module
//!
//! The three layers of Willans' formula, leaf first:
//!
//! ```text
//! mod_factorial   (j-1)! mod j                        exact integers
//!      │
//! inner_sum       S(i) = Σ floor(cos²(π(r+1)/j))     high-precision reals
//!      │
//! row             R(i, n) = floor((n/S(i))^(1/n))    high-precision reals
//! ```
//!
//! The pipelines sum `R(i, n)` over `i = 1..=2^n` and add one.

pub mod inner_sum;
pub mod mod_factorial;
pub mod row;

pub use inner_sum::{prime_count, CumulativeInnerSum, InnerSum, StatelessInnerSum, WilsonTerm};
pub use mod_factorial::{
    mod_factorial, CumulativeModFactorial, ModFactorial, StatelessModFactorial,
};
pub use row::{floor_root, row_contribution};

use crate::error::{Result, WillansError};
use crate::numeric::MAX_PRIME_INDEX;

/// Validate a caller-supplied prime index, returning it as the row exponent
pub fn validate_index(n: i64) -> Result<u32> {
    if n < 1 {
        return Err(WillansError::argument(format!(
            "prime index must be >= 1, got {}",
            n
        )));
    }
    if n > i64::from(MAX_PRIME_INDEX) {
        return Err(WillansError::argument(format!(
            "prime index must be <= {} so that 2^n rows fit in 64 bits, got {}",
            MAX_PRIME_INDEX, n
        )));
    }
    Ok(n as u32)
}
