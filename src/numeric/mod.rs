//! # Numeric Module
//!
//! Arbitrary-precision real arithmetic backing the Wilson term and the
//! floored root of Willans' formula.
//!
//! ## Sub-modules
//! - `precision`: precision budget and the support check per prime index
//! - `fixed`: binary fixed-point reals on `num-bigint`
//! - `context`: shared constants (`π`) and cosine at working precision
//!
//! ## Why fixed-point
//! Every real in the formula lies in a small known range (`|x| <= 2π`,
//! `0 <= cos² <= 1`, `0 < n/S <= n`), so a fixed scale loses nothing against a
//! floating exponent and keeps all rounding explicit.

pub mod context;
pub mod fixed;
pub mod precision;

pub use context::RealContext;
pub use fixed::Fixed;
pub use precision::{Precision, DEFAULT_PRECISION_BITS, MAX_PRIME_INDEX};
