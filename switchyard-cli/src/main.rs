use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use switchyard_gateway::ServiceRegistry;
use switchyard_http::{HttpConfig, ServeError, serve};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod services;

#[derive(Parser, Debug)]
#[command(name = "switchyard", version)]
#[command(about = "Switchyard - unified dispatch gateway for pluggable backend services")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP gateway with the built-in demonstration services
    Serve {
        /// Bind address (overrides SWITCHYARD_BIND)
        #[arg(long)]
        bind: Option<String>,
        /// Port (overrides SWITCHYARD_PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Health probe interval in seconds
        #[arg(long)]
        probe_interval_secs: Option<u64>,
        /// Attach internal error detail to failure envelopes (development only)
        #[arg(long)]
        debug_errors: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("switchyard=info,tower_http=warn")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Serve {
            bind,
            port,
            probe_interval_secs,
            debug_errors,
        } => run_serve(bind, port, probe_interval_secs, debug_errors).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "gateway exited with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run_serve(
    bind: Option<String>,
    port: Option<u16>,
    probe_interval_secs: Option<u64>,
    debug_errors: bool,
) -> Result<(), ServeError> {
    let mut config = HttpConfig::from_env()?;
    if let Some(bind) = bind {
        config.bind_addr = bind;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(secs) = probe_interval_secs {
        config.probe_interval = Duration::from_secs(secs);
    }
    if debug_errors {
        config.debug_errors = true;
    }
    config.validate()?;

    let registry = Arc::new(ServiceRegistry::new());
    let registered = services::register_builtin(&registry, config.balancing_policy).await;
    info!(
        services = ?registered.iter().map(|n| n.as_str()).collect::<Vec<_>>(),
        "registered built-in services"
    );

    serve(config, registry).await
}
