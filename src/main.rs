//! Auction Gateway
//!
//! Process entry point. Decides whether the gateway was started from a
//! terminal or by a service manager and drives the matching lifecycle.
//!
//! # Architecture Overview
//!
//! ```text
//!   main ── mode detection ──┬── managed ──▶ ServiceController ──spawn──┐
//!                            │               (status ⇄ service host)    │
//!                            │                                          ▼
//!                            └── interactive ─────────────────▶ ServeOrchestrator
//!                                (Ctrl-C / SIGTERM → Shutdown)          │
//!                                                                       ▼
//!                         router build → cache init → CORS/no-cache → listen → drain
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use auction_gateway::error::GatewayError;
use auction_gateway::lifecycle::host::SystemHost;
use auction_gateway::lifecycle::{entry, mode, signals};
use auction_gateway::lifecycle::{GatewayComponents, ServeOrchestrator, Shutdown, SERVICE_NAME};
use auction_gateway::observability::{logging, LogFormat};
use auction_gateway::{RandomSource, Revision};

#[derive(Parser, Debug)]
#[command(name = "auction-gateway")]
#[command(about = "Auction gateway service", version)]
struct Args {
    /// Path to the TOML configuration file. Defaults to gateway.toml next to the executable.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init(args.verbose, args.log_format)?;

    // Seeded once; every consumer gets it passed down.
    let rng = RandomSource::from_entropy();
    let revision = Revision::from_build();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        revision = %revision,
        "{SERVICE_NAME} starting"
    );

    let config_path = entry::resolve_config_path(args.config)?;

    enter_executable_dir().inspect_err(|e| tracing::error!(error = %e, "Fatal"))?;

    let mode = mode::detect()
        .map_err(GatewayError::from)
        .inspect_err(|e| tracing::error!(error = %e, "Fatal"))?;

    let orchestrator = Arc::new(ServeOrchestrator::new(GatewayComponents::new(rng), revision));

    entry::dispatch(
        mode,
        || async {
            let host = SystemHost::register(SERVICE_NAME)?;
            entry::run_managed(config_path.clone(), orchestrator.clone(), host).await?;
            Ok(())
        },
        || async {
            let shutdown = Shutdown::new();
            let signals = signals::trigger_on_signal(shutdown.clone());
            let result = entry::run_interactive(&config_path, &orchestrator, &shutdown).await;
            signals.abort();
            result
        },
    )
    .await
    .inspect_err(|e| tracing::error!(error = %e, "Fatal"))?;

    Ok(())
}

/// Make the executable's directory the working directory.
fn enter_executable_dir() -> Result<(), GatewayError> {
    let exe = std::env::current_exe().map_err(GatewayError::WorkingDirectory)?;
    let dir = exe.parent().ok_or_else(|| {
        GatewayError::WorkingDirectory(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} has no parent directory", exe.display()),
        ))
    })?;

    tracing::info!(path = %dir.display(), "Executable directory");
    std::env::set_current_dir(dir).map_err(GatewayError::WorkingDirectory)
}
