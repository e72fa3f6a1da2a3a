//! # Utilities Module
//!
//! ## Role
//! Cross-cutting helpers that don't belong in the numeric or model layers.
//!
//! ## Sub-modules
//! - `cancel`: shared cancellation flag checked by every row
//! - `telemetry`: atomic progress blackboard and heartbeat thread
//! - `threading`: rayon thread pool configuration

pub mod cancel;
pub mod telemetry;
pub mod threading;

pub use cancel::CancelToken;
pub use telemetry::{HeartbeatConfig, HeartbeatHandle, Stage, TelemetryBlackboard};
pub use threading::{available_threads, build_thread_pool};
