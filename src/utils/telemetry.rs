//! # Telemetry Blackboard
//!
//! Progress counters for long formula evaluations, written by row workers and
//! read by an optional heartbeat thread.
//!
//! Counters are relaxed atomics: a row bumps one counter and moves on, the
//! heartbeat reads a slightly stale [`Progress`] and renders it.
//!
//! ```text
//! stage    Initializing → Rows (sequential | parallel) → Complete
//! index    prime index being evaluated, out of the last index requested
//! rows     rows of the current index, out of 2^n
//! ```

use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Stage {
    Initializing = 0,
    SequentialRows = 1,
    ParallelRows = 2,
    Complete = 3,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Initializing => "Initializing",
            Stage::SequentialRows => "Rows (sequential)",
            Stage::ParallelRows => "Rows (parallel)",
            Stage::Complete => "Complete",
        }
    }
}

impl From<u8> for Stage {
    fn from(val: u8) -> Self {
        match val {
            0 => Stage::Initializing,
            1 => Stage::SequentialRows,
            2 => Stage::ParallelRows,
            _ => Stage::Complete,
        }
    }
}

pub struct TelemetryBlackboard {
    stage: AtomicU8,
    index: AtomicU64,
    total_indices: AtomicU64,
    rows_done: AtomicU64,
    total_rows: AtomicU64,
    started: Instant,
    // Nanoseconds since `started` at the last counter update
    last_touch: AtomicU64,
    shutdown: AtomicBool,
}

impl TelemetryBlackboard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[inline]
    pub fn set_stage(&self, stage: Stage) {
        self.stage.store(stage as u8, Ordering::Relaxed);
        self.touch();
    }

    #[inline]
    pub fn stage(&self) -> Stage {
        Stage::from(self.stage.load(Ordering::Relaxed))
    }

    /// Start prime index `index`, which has `total_rows` rows
    pub fn begin_index(&self, index: u64, total_rows: u64) {
        self.index.store(index, Ordering::Relaxed);
        self.rows_done.store(0, Ordering::Relaxed);
        self.total_rows.store(total_rows, Ordering::Relaxed);
        self.touch();
    }

    pub fn set_total_indices(&self, total: u64) {
        self.total_indices.store(total, Ordering::Relaxed);
    }

    #[inline]
    pub fn row_done(&self) {
        self.rows_done.fetch_add(1, Ordering::Relaxed);
        self.touch();
    }

    pub fn rows_processed(&self) -> u64 {
        self.rows_done.load(Ordering::Relaxed)
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    #[inline]
    fn touch(&self) {
        let nanos = self.started.elapsed().as_nanos() as u64;
        self.last_touch.store(nanos, Ordering::Relaxed);
    }

    fn progress(&self) -> Progress {
        let elapsed = self.started.elapsed();
        let last_touch = Duration::from_nanos(self.last_touch.load(Ordering::Relaxed));
        Progress {
            stage: self.stage(),
            index: self.index.load(Ordering::Relaxed),
            total_indices: self.total_indices.load(Ordering::Relaxed),
            rows_done: self.rows_done.load(Ordering::Relaxed),
            total_rows: self.total_rows.load(Ordering::Relaxed),
            elapsed,
            idle: elapsed.saturating_sub(last_touch),
        }
    }
}

impl Default for TelemetryBlackboard {
    fn default() -> Self {
        Self {
            stage: AtomicU8::new(Stage::Initializing as u8),
            index: AtomicU64::new(0),
            total_indices: AtomicU64::new(0),
            rows_done: AtomicU64::new(0),
            total_rows: AtomicU64::new(0),
            started: Instant::now(),
            last_touch: AtomicU64::new(0),
            shutdown: AtomicBool::new(false),
        }
    }
}

/// What the heartbeat reads off the blackboard
#[derive(Debug, Clone, Copy)]
struct Progress {
    stage: Stage,
    index: u64,
    total_indices: u64,
    rows_done: u64,
    total_rows: u64,
    elapsed: Duration,
    idle: Duration,
}

impl Progress {
    /// Completed share of the current index, in `[0, 1]`
    fn fraction(&self) -> f64 {
        if self.total_rows == 0 {
            return 0.0;
        }
        (self.rows_done as f64 / self.total_rows as f64).min(1.0)
    }

    fn index_label(&self) -> String {
        if self.total_indices > 1 {
            format!("n={}/{}", self.index, self.total_indices)
        } else {
            format!("n={}", self.index)
        }
    }

    fn eta(&self, rows_per_sec: f64) -> Option<Duration> {
        let remaining = self.total_rows.checked_sub(self.rows_done).filter(|&r| r > 0)?;
        (rows_per_sec > 0.0).then(|| Duration::from_secs_f64(remaining as f64 / rows_per_sec))
    }
}

pub struct HeartbeatConfig {
    /// Seconds between reports
    pub interval_secs: u64,
    /// Seconds without a counter update before a report is flagged as stalled
    pub stall_threshold_secs: u64,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            stall_threshold_secs: 300,
        }
    }
}

/// Owns the heartbeat thread; shut it down explicitly to join it
pub struct HeartbeatHandle {
    handle: Option<JoinHandle<()>>,
    blackboard: Arc<TelemetryBlackboard>,
}

impl HeartbeatHandle {
    pub fn spawn(blackboard: Arc<TelemetryBlackboard>, config: HeartbeatConfig) -> io::Result<Self> {
        let reporter = Reporter::new(config, io::stderr().is_terminal());
        let bb = blackboard.clone();
        let handle = thread::Builder::new()
            .name("heartbeat".to_string())
            .spawn(move || reporter.run(&bb))?;

        Ok(Self {
            handle: Some(handle),
            blackboard,
        })
    }

    pub fn shutdown(mut self) {
        self.blackboard.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for HeartbeatHandle {
    fn drop(&mut self) {
        // Signal only; joining here could block an unwinding caller
        self.blackboard.shutdown.store(true, Ordering::SeqCst);
    }
}

/// Heartbeat state carried between reports
struct Reporter {
    interval: Duration,
    stall_after: Duration,
    is_tty: bool,
    last_rows: u64,
    last_report: Instant,
}

impl Reporter {
    const TICK: Duration = Duration::from_millis(100);
    const BAR_WIDTH: usize = 20;

    fn new(config: HeartbeatConfig, is_tty: bool) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs.max(1)),
            stall_after: Duration::from_secs(config.stall_threshold_secs),
            is_tty,
            last_rows: 0,
            last_report: Instant::now(),
        }
    }

    fn run(mut self, bb: &TelemetryBlackboard) {
        let mut next = Instant::now() + self.interval;
        while !bb.shutdown.load(Ordering::SeqCst) {
            thread::sleep(Self::TICK);
            if Instant::now() >= next {
                next += self.interval;
                self.report(bb.progress());
            }
        }
        if self.is_tty {
            eprint!("\r\x1b[K");
            let _ = io::stderr().flush();
        }
    }

    fn report(&mut self, progress: Progress) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_report).as_secs_f64();
        // The row counter restarts at every index
        let delta = progress
            .rows_done
            .checked_sub(self.last_rows)
            .unwrap_or(progress.rows_done);
        let rate = if dt > 0.1 { delta as f64 / dt } else { 0.0 };
        self.last_rows = progress.rows_done;
        self.last_report = now;

        let stalled = progress.idle > self.stall_after;
        if self.is_tty {
            eprint!("\r{}\x1b[K", tty_line(&progress, rate, stalled));
            let _ = io::stderr().flush();
        } else {
            eprintln!("{}", log_line(&progress, rate, stalled));
        }
    }
}

fn tty_line(progress: &Progress, rate: f64, stalled: bool) -> String {
    let filled = (progress.fraction() * Reporter::BAR_WIDTH as f64) as usize;
    let filled = filled.min(Reporter::BAR_WIDTH);
    format!(
        "[{}{}] {:>5.1}% | {} {} | {:.0} rows/s | {} | ETA: {}{}",
        "=".repeat(filled),
        " ".repeat(Reporter::BAR_WIDTH - filled),
        progress.fraction() * 100.0,
        progress.stage.as_str(),
        progress.index_label(),
        rate,
        format_duration(progress.elapsed),
        progress.eta(rate).map_or_else(|| "unknown".to_string(), format_duration),
        if stalled { " [STALLED]" } else { "" }
    )
}

fn log_line(progress: &Progress, rate: f64, stalled: bool) -> String {
    format!(
        "[HEARTBEAT] stage=\"{}\" index={}/{} rows={}/{} rate={:.0}/s elapsed={:.0}s eta={} stalled={}",
        progress.stage.as_str(),
        progress.index,
        progress.total_indices,
        progress.rows_done,
        progress.total_rows,
        rate,
        progress.elapsed.as_secs_f64(),
        progress.eta(rate).map_or_else(|| "unknown".to_string(), format_duration),
        stalled
    )
}

/// `42s`, `3m07s` or `2h15m`
fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    match secs {
        0..=59 => format!("{}s", secs),
        60..=3599 => format!("{}m{:02}s", secs / 60, secs % 60),
        _ => format!("{}h{:02}m", secs / 3600, (secs % 3600) / 60),
    }
}
