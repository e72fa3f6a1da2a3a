//! # Cancellation
//!
//! A cloneable flag shared between the caller and every row worker. Rows
//! check it before starting work; once set, the engine returns
//! `WillansError::Cancelled` and no partial sum escapes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Result, WillansError};

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; visible to every clone
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` once cancellation was requested
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(WillansError::Cancelled)
        } else {
            Ok(())
        }
    }
}
