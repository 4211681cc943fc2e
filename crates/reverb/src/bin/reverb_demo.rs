//! # REVERB Demo
//!
//! Headless run of the level snapshot cache: one tick thread, several
//! listener threads tracing sound occlusion.
//!
//! Usage: `reverb_demo [config.toml]`
//!
//! Set `RUST_LOG=reverb_core=debug` to see every rebuild decision.

use std::process::ExitCode;

use reverb::{run, DemoSettings};
use reverb_core::CacheConfig;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => match CacheConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::error!(%err, "Failed to load level cache configuration");
                return ExitCode::FAILURE;
            }
        },
        None => CacheConfig::default(),
    };

    let summary = run(&DemoSettings::default(), &config);

    for report in &summary.listeners {
        tracing::info!(
            listener = report.listener,
            traces = report.traces,
            missing_proxy = report.missing_proxy,
            blocks_hit = report.blocks_hit,
            unavailable = report.unavailable,
            mean_occlusion = %format!("{:.3}", report.mean_occlusion()),
            "Listener finished"
        );
    }
    for profile in &summary.profiles {
        tracing::info!("{profile}");
    }
    tracing::info!(
        ticks = summary.ticks,
        rebuilds = summary.rebuilds,
        mutations = summary.mutations,
        elapsed_ms = u64::try_from(summary.elapsed.as_millis()).unwrap_or(u64::MAX),
        "Demo finished"
    );

    ExitCode::SUCCESS
}
