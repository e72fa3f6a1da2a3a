//! # Willans: the n-th prime from a closed-form formula
//!
//! ## Usage
//! ```bash
//! # Sequential, cumulative (default)
//! willans 6
//!
//! # Row-parallel on 8 workers
//! willans 8 --parallel --nthreads 8
//!
//! # Every prime up to the 10th, recomputing rows from scratch
//! willans 10 --all --no-cumulative
//!
//! # With profiling output
//! willans 8 --profile
//! ```

use std::time::Instant;

use anyhow::Context;
use tracing::level_filters::LevelFilter;

use willans::config::Config;
use willans::pipelines::{PrimeEngine, Strategy};
use willans::utils::telemetry::{HeartbeatConfig, HeartbeatHandle, Stage, TelemetryBlackboard};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing subscriber: span timings when profiling, warnings otherwise
fn init_tracing(profile: bool) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

    if profile {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(false)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .with(LevelFilter::DEBUG)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(LevelFilter::WARN)
            .init();
    }
}

fn run() -> anyhow::Result<()> {
    let config = Config::parse_and_validate().context("invalid configuration")?;
    init_tracing(config.profile);
    if config.profile {
        eprintln!("=== Profiling enabled ===\n");
    }

    let engine_config = config.engine_config()?;
    let strategy = if config.parallel {
        Strategy::Parallel
    } else {
        Strategy::Sequential
    };

    eprintln!("Willans v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "Precision: {} bits (~{} decimal digits)",
        engine_config.precision.bits(),
        engine_config.precision.decimal_digits()
    );
    eprintln!("Strategy: {}", strategy);
    if config.parallel {
        eprintln!("Threads: {}", config.nthreads());
    }

    let telemetry = TelemetryBlackboard::new();
    let engine = PrimeEngine::new(strategy, engine_config)
        .context("failed to build evaluation engine")?
        .with_telemetry(telemetry.clone());
    eprintln!(
        "Accumulation: {}",
        if engine.is_cumulative() { "on" } else { "off" }
    );

    let heartbeat = config
        .heartbeat
        .map(|secs| {
            HeartbeatHandle::spawn(
                telemetry.clone(),
                HeartbeatConfig {
                    interval_secs: secs,
                    ..HeartbeatConfig::default()
                },
            )
        })
        .transpose()
        .context("failed to spawn heartbeat thread")?;

    let start = Instant::now();
    let primes = if config.all {
        engine
            .first_primes(config.n)
            .with_context(|| format!("computing the first {} primes", config.n))?
    } else {
        vec![engine
            .nth_prime(config.n)
            .with_context(|| format!("computing prime #{}", config.n))?]
    };
    let elapsed = start.elapsed();

    telemetry.set_stage(Stage::Complete);
    if let Some(heartbeat) = heartbeat {
        heartbeat.shutdown();
    }

    let line: Vec<String> = primes.iter().map(u64::to_string).collect();
    println!("{}", line.join(" "));
    eprintln!("Time: {:.10}ms", elapsed.as_secs_f64() * 1e3);

    Ok(())
}
