//! # Configuration Logic
//!
//! ## Role
//! - [`EngineConfig`]: what the evaluation core accepts from its host
//!   (precision, worker count, cumulative toggle, precision strictness).
//! - [`Config`]: CLI argument parsing and validation for the `willans` binary.
//!
//! ## Defaults
//! - precision: 256 bits (~77 decimal digits)
//! - nthreads: all available cores
//! - cumulative: on (the parallel strategy ignores it)
//! - strict precision: on
//!
//! ## Example CLI
//! ```bash
//! willans 8 --parallel --nthreads 8
//! willans 10 --all --digits 100
//! ```

use clap::Parser;

use crate::error::{Result, WillansError};
use crate::numeric::Precision;
use crate::utils::threading::available_threads;

/// Configuration accepted by the evaluation engines
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Result precision of the real arithmetic
    pub precision: Precision,

    /// Worker count for the parallel strategy (`None` = hardware concurrency)
    pub nthreads: Option<usize>,

    /// Carry inner-sum state across rows in the sequential strategy
    pub cumulative: bool,

    /// Fail instead of warning when a floor lands on its precision boundary
    pub strict_precision: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            precision: Precision::default(),
            nthreads: None,
            cumulative: true,
            strict_precision: true,
        }
    }
}

impl EngineConfig {
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_nthreads(mut self, nthreads: usize) -> Self {
        self.nthreads = Some(nthreads);
        self
    }

    pub fn with_cumulative(mut self, cumulative: bool) -> Self {
        self.cumulative = cumulative;
        self
    }

    pub fn with_strict_precision(mut self, strict: bool) -> Self {
        self.strict_precision = strict;
        self
    }

    /// Effective worker count
    pub fn nthreads(&self) -> usize {
        self.nthreads.unwrap_or_else(available_threads)
    }

    pub fn validate(&self) -> Result<()> {
        if self.nthreads == Some(0) {
            return Err(WillansError::config("nthreads must be at least 1"));
        }
        Ok(())
    }
}

/// Command-line configuration for the `willans` binary
#[derive(Parser, Debug, Clone)]
#[command(
    name = "willans",
    version,
    about = "Compute the n-th prime with Willans' formula"
)]
pub struct Config {
    /// Index of the prime to compute (1-based)
    #[arg(allow_negative_numbers = true)]
    pub n: i64,

    /// Evaluate rows in parallel on a worker pool
    #[arg(long)]
    pub parallel: bool,

    /// Recompute every row from scratch in the sequential strategy
    #[arg(long)]
    pub no_cumulative: bool,

    /// Precision in bits
    #[arg(long, conflicts_with = "digits")]
    pub bits: Option<u32>,

    /// Precision in significant decimal digits
    #[arg(long)]
    pub digits: Option<u32>,

    /// Number of worker threads (default: all cores)
    #[arg(long)]
    pub nthreads: Option<usize>,

    /// Print every prime from the first up to the n-th
    #[arg(long)]
    pub all: bool,

    /// Warn instead of failing when a floor lands on its precision boundary
    #[arg(long)]
    pub lenient_precision: bool,

    /// Print span timings
    #[arg(long)]
    pub profile: bool,

    /// Print progress every N seconds
    #[arg(long, value_name = "SECS")]
    pub heartbeat: Option<u64>,
}

impl Config {
    /// Parse arguments from the process command line and validate them
    pub fn parse_and_validate() -> Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Validate option combinations that clap cannot express
    pub fn validate(&self) -> Result<()> {
        if self.heartbeat == Some(0) {
            return Err(WillansError::config("heartbeat interval must be at least 1 second"));
        }
        self.engine_config()?.validate()
    }

    pub fn precision(&self) -> Result<Precision> {
        match (self.bits, self.digits) {
            (Some(bits), _) => Precision::from_bits(bits),
            (None, Some(digits)) => Precision::from_decimal_digits(digits),
            (None, None) => Ok(Precision::default()),
        }
    }

    /// Core configuration derived from the command line
    pub fn engine_config(&self) -> Result<EngineConfig> {
        Ok(EngineConfig {
            precision: self.precision()?,
            nthreads: self.nthreads,
            cumulative: !self.no_cumulative,
            strict_precision: !self.lenient_precision,
        })
    }

    pub fn nthreads(&self) -> usize {
        self.nthreads.unwrap_or_else(available_threads)
    }
}
