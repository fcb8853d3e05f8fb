// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;
use radarlock_engine::{
    resolve_config, spawn_stop_listener, Engine, KeyStopListener, SimulatedRadar,
    TimedStopListener,
};
use radarlock_observability::{init_logging, CrateDebugFlags};
use radarlock_state::{Clock, SystemClock};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// radarlock - closed-loop radar tracker (simulated backend)
#[derive(Parser, Debug)]
#[command(name = "radarlock", version, author, long_about = None)]
struct Args {
    /// Path to radarlock.toml (default: search RADARLOCK_CONFIG_PATH, ./ and parents)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Default log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Minimum window peak that locks the search
    #[arg(long)]
    wave_threshold: Option<f32>,

    /// Seconds without a healthy reading before tracking gives up
    #[arg(long)]
    signal_timeout: Option<f64>,

    /// Seconds to wait before grabbing the radar
    #[arg(long)]
    startup_delay: Option<f64>,

    /// Line to type on stdin to stop
    #[arg(long)]
    stop_key: Option<String>,

    /// Seed for the simulated target placement
    #[arg(long)]
    seed: Option<u64>,

    /// Stop automatically after this many seconds
    #[arg(long)]
    run_for: Option<f64>,

    /// Enable debug logging for crates (comma-separated, e.g. "radarlock-control")
    #[arg(long, value_delimiter = ',')]
    debug: Vec<String>,

    /// Enable debug logging for every radarlock crate
    #[arg(long, default_value_t = false)]
    debug_all: bool,
}

impl Args {
    fn config_overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(level) = &self.log_level {
            overrides.insert("log_level".to_string(), level.clone());
        }
        if let Some(threshold) = self.wave_threshold {
            overrides.insert("wave_threshold".to_string(), threshold.to_string());
        }
        if let Some(secs) = self.signal_timeout {
            overrides.insert("signal_timeout".to_string(), secs.to_string());
        }
        if let Some(secs) = self.startup_delay {
            overrides.insert("startup_delay".to_string(), secs.to_string());
        }
        if let Some(key) = &self.stop_key {
            overrides.insert("stop_key".to_string(), key.clone());
        }
        if let Some(seed) = self.seed {
            overrides.insert("seed".to_string(), seed.to_string());
        }
        overrides
    }

    /// `--debug` / `--debug-all` plus `RADARLOCK_DEBUG`
    fn debug_flags(&self) -> CrateDebugFlags {
        let mut flags =
            CrateDebugFlags::from_args(self.debug.iter().map(|name| format!("--debug-{}", name)));
        if self.debug_all {
            flags.enable_all();
        }
        if let Ok(value) = std::env::var("RADARLOCK_DEBUG") {
            flags.merge_env_value(&value);
        }
        flags
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let run_for = match args.run_for {
        Some(secs) if !(secs.is_finite() && secs >= 0.0) => {
            return Err(format!("--run-for must be a non-negative number of seconds, got {}", secs).into());
        }
        other => other.map(Duration::from_secs_f64),
    };

    let resolved = resolve_config(args.config.as_deref(), &args.config_overrides())?;
    let config = resolved.config;

    init_logging(&args.debug_flags(), &config.logging.level)?;
    print_banner();

    match &resolved.source {
        Some(path) => info!("[ENGINE] Configuration loaded from {}", path.display()),
        None => warn!("[ENGINE] ⚠️ No configuration file found, using built-in defaults"),
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let radar = SimulatedRadar::new(&config, Arc::clone(&clock));
    let engine = Engine::new(config.clone(), Arc::clone(&clock));
    let stop = engine.stop_token();

    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            info!("[ENGINE] Shutdown signal received...");
            stop.cancel();
        })?;
    }

    // Detached: blocked on stdin until a line arrives
    spawn_stop_listener(KeyStopListener::stdin(config.runtime.stop_key.clone()), stop.clone())?;
    if let Some(run_for) = run_for {
        spawn_stop_listener(TimedStopListener::new(Arc::clone(&clock), run_for), stop.clone())?;
    }

    println!(
        "Type '{}' and press Enter (or Ctrl+C) to stop.",
        config.runtime.stop_key
    );

    match engine.run(radar.screen(), radar.pointer()) {
        Ok(()) => {
            println!("Stopped by user. Targets collected: {}", radar.collected());
            Ok(())
        }
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            Err(e.into())
        }
    }
}

fn print_banner() {
    println!(
        r#"
╔═══════════════════════════════════════════════╗
║   radarlock v{:<33}║
║   closed-loop radar tracker (simulated radar) ║
╚═══════════════════════════════════════════════╝
"#,
        env!("CARGO_PKG_VERSION")
    );
}
