// # gdddcd - Google Domains Dynamic DNS Client
//
// Thin wiring layer: all update logic lives in gdddcd-core.
//
// The binary is responsible for:
// 1. Parsing the two path flags
// 2. Installing logging (level from `RUST_LOG`, default `info`)
// 3. Loading the config and the last persisted state
// 4. Building the HTTP IP source and the Google Domains provider
// 5. Running the engine until SIGINT/SIGTERM
//
// ## Example
//
// ```bash
// cat > gdddcd.config <<EOF
// {"hostname": "home.example.com", "username": "...", "password": "..."}
// EOF
// echo '{"ip": ""}' > gdddcd.state
//
// RUST_LOG=debug gdddcd --config_file gdddcd.config --state_file gdddcd.state
// ```

use anyhow::{Context, Result};
use clap::Parser;
use gdddcd_core::{Config, DdnsEngine, FileStateStore, State};
use gdddcd_ip_http::HttpIpSource;
use gdddcd_provider_google::GoogleDomainsProvider;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration, state or client construction failed
    StartupError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Keeps a Google Domains hostname pointed at this machine's public IP.
#[derive(Parser, Debug)]
#[command(name = "gdddcd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the JSON configuration file
    #[arg(long = "config_file", default_value = "gdddcd.config")]
    config_file: PathBuf,

    /// Path to the JSON state file holding the last persisted IP
    #[arg(long = "state_file", default_value = "gdddcd.state")]
    state_file: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_tracing() {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::StartupError.into();
    }

    let config = match load_config(&args.config_file) {
        Ok(config) => config,
        Err(code) => return code.into(),
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(config, args.state_file)).into()
}

fn init_tracing() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(())
}

/// Load the config file, mapping any failure to a startup exit code
fn load_config(path: &Path) -> std::result::Result<Config, DdnsExitCode> {
    Config::load(path).map_err(|e| {
        error!("Unable to load config from {}: {}", path.display(), e);
        DdnsExitCode::StartupError
    })
}

/// Run the daemon until a shutdown signal arrives
async fn run_daemon(config: Config, state_file: PathBuf) -> DdnsExitCode {
    let mut engine = match build_engine(&config, &state_file).await {
        Ok(engine) => engine,
        Err(e) => {
            error!("Startup failed: {:#}", e);
            return DdnsExitCode::StartupError;
        }
    };

    let shutdown = CancellationToken::new();
    let signals = tokio::spawn(wait_for_shutdown(shutdown.clone()));

    engine.run(shutdown).await;

    match signals.await {
        Ok(Ok(signal)) => {
            info!("Shut down after {}", signal);
            DdnsExitCode::CleanShutdown
        }
        Ok(Err(e)) => {
            error!("Shutdown error: {:#}", e);
            DdnsExitCode::RuntimeError
        }
        Err(e) => {
            error!("Signal handler task failed: {}", e);
            DdnsExitCode::RuntimeError
        }
    }
}

/// Load the persisted state and wire the engine's collaborators
async fn build_engine(config: &Config, state_file: &Path) -> Result<DdnsEngine> {
    let initial = State::load(state_file)
        .await
        .with_context(|| format!("unable to load state from {}", state_file.display()))?;
    info!("Loaded state: ip={:?}", initial.ip);

    let ip_source = HttpIpSource::from_config(config).context("unable to build IP source")?;
    let provider = GoogleDomainsProvider::new(config).context("unable to build DNS provider")?;
    let state_store = FileStateStore::new(state_file);

    let engine = DdnsEngine::new(
        Box::new(ip_source),
        Box::new(provider),
        Box::new(state_store),
        initial,
        config.update_interval(),
    )?;

    Ok(engine)
}

/// Wait for SIGTERM or SIGINT, then cancel `shutdown`
///
/// The token is cancelled on every path, so the engine never outlives a
/// broken signal handler.
#[cfg(unix)]
async fn wait_for_shutdown(shutdown: CancellationToken) -> Result<&'static str> {
    let result = async {
        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", name);
        Ok(name)
    }
    .await;

    shutdown.cancel();
    result
}

/// Wait for CTRL-C, then cancel `shutdown`
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown(shutdown: CancellationToken) -> Result<&'static str> {
    let result = tokio::signal::ctrl_c()
        .await
        .context("Failed to wait for CTRL-C")
        .map(|()| {
            info!("Received shutdown signal: SIGINT");
            "SIGINT"
        });

    shutdown.cancel();
    result
}
