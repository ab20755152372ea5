//! crs-cli: operational checks for a CRS client deployment.
//!
//! ```text
//! crs-cli --config crs.toml check          validate config, build the transport
//! crs-cli --config crs.toml get <path>     GET through the configured transport
//! crs-cli fingerprint <cert>               print the SHA-256 pin of a certificate
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use crs_client::config::loader::{load_config, parse_config};
use crs_client::config::CrsConfig;
use crs_client::net::tls::{fingerprint, parse_certificate};
use crs_client::net::build_transport;
use crs_client::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "crs-cli")]
#[command(about = "Operational CLI for the CRS client", long_about = None)]
struct Cli {
    /// TOML configuration file. Without it, defaults plus CRS_* variables are used.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate configuration and build the transport
    Check,
    /// GET a path relative to the endpoint and print the body
    Get { path: String },
    /// Print the SHA-256 fingerprint of a PEM or DER certificate
    Fingerprint { cert: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::Fingerprint { cert } = &cli.command {
        let data = std::fs::read(cert)?;
        let cert = parse_certificate(&data)?;
        println!("{}", fingerprint(&cert));
        return Ok(());
    }

    let config = load(cli.config.as_deref())?;
    logging::init(&config.observability);

    tracing::info!(
        base_url = %config.transport.base_url,
        mtls = config.transport.mtls.is_some(),
        max_attempts = config.resilience.max_attempts,
        "Configuration loaded"
    );

    if let Some(address) = &config.observability.metrics_address {
        match address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(metrics_address = %address, "Failed to parse metrics address"),
        }
    }

    let transport = build_transport(&config.transport)?;

    match cli.command {
        Commands::Check => {
            println!("OK: transport ready for {}", transport.base_url());
        }
        Commands::Get { path } => {
            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_signal.cancel();
                }
            });
            let body = transport.get_string(&path, &cancel).await?;
            println!("{}", body);
        }
        Commands::Fingerprint { .. } => {}
    }

    Ok(())
}

fn load(path: Option<&std::path::Path>) -> Result<CrsConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => load_config(path)?,
        None => parse_config("", |key| std::env::var(key).ok())?,
    };
    Ok(config)
}
