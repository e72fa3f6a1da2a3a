//! # Willans Library
//!
//! High-precision evaluation of Willans' closed-form formula for the n-th prime:
//!
//! ```text
//! P(n) = 1 + Σ_{i=1}^{2^n} floor( (n / S(i))^(1/n) )
//! S(i) = Σ_{j=1}^{i} floor( cos²( π · ((j-1)! + 1) / j ) )
//! ```
//!
//! The formula is deliberately extravagant: `2^n` rows, each summing Wilson
//! terms that need arbitrary-precision cosines. It is a demonstration, not a
//! way to find primes quickly.
//!
//! ## Modules
//! - `config`: engine configuration and CLI argument parsing
//! - `error`: Error types and result aliases
//! - `numeric`: Arbitrary-precision fixed-point reals (`π`, cosine, roots)
//! - `model`: Modular factorial, inner sum and row contribution
//! - `pipelines`: Sequential and row-parallel evaluation strategies
//! - `utils`: Cancellation, telemetry, thread pool
//!
//! ## Example
//! ```
//! let p = willans::nth_prime_sequential(5)?;
//! assert_eq!(p, 11);
//! # Ok::<(), willans::WillansError>(())
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod numeric;
pub mod pipelines;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, EngineConfig};
pub use error::{Result, WillansError};
pub use model::{mod_factorial, CumulativeInnerSum, InnerSum, StatelessInnerSum};
pub use numeric::{Precision, RealContext};
pub use pipelines::{
    nth_prime_parallel, nth_prime_sequential, ParallelEngine, PrimeEngine, SequentialEngine,
    Strategy,
};
pub use utils::{CancelToken, TelemetryBlackboard};
