//! # Threading Configuration
//!
//! ## Role
//! Configure the rayon worker pool used by the row-parallel strategy.
//!
//! Rows are handed to the pool as a parallel range; each worker builds its
//! own stateless evaluator per row, so nothing mutable crosses threads.

use crate::error::{Result, WillansError};

/// Number of hardware threads, falling back to 4 when it cannot be queried
pub fn available_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Create a dedicated pool with named workers
pub fn build_thread_pool(n_threads: usize) -> Result<rayon::ThreadPool> {
    if n_threads == 0 {
        return Err(WillansError::config("thread count must be at least 1"));
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .thread_name(|i| format!("willans-worker-{}", i))
        .build()?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_threads() {
        assert!(available_threads() >= 1);
    }

    #[test]
    fn test_build_thread_pool() {
        let pool = build_thread_pool(2).unwrap();
        assert_eq!(pool.current_num_threads(), 2);
        let name = pool.install(|| std::thread::current().name().map(str::to_owned));
        assert_eq!(name.as_deref().map(|n| n.starts_with("willans-worker-")), Some(true));
        assert!(build_thread_pool(0).is_err());
    }
}
