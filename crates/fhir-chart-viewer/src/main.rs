//! FHIR Chart Viewer - Entry Point
//!
//! Serves the sign-in page and OAuth redirect target on localhost.

use std::net::{IpAddr, SocketAddr};

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use fhir_chart_viewer::{config::Config, server::ChartServer};

#[derive(Parser, Debug)]
#[command(name = "fhir-chart-viewer")]
#[command(about = "Sign in to a SMART on FHIR sandbox and view a patient chart")]
#[command(version)]
struct Cli {
    /// OAuth client id registered with the provider
    #[arg(long)]
    client_id: Option<String>,

    /// Redirect URI registered with the provider
    #[arg(long)]
    redirect_uri: Option<String>,

    /// FHIR R4 base URL (also sent as `aud`)
    #[arg(long)]
    fhir_base_url: Option<String>,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1", env = "HOST")]
    host: IpAddr,

    /// HTTP server port; must match the redirect URI
    #[arg(long, default_value = "3000", env = "PORT")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let mut config = Config::from_env()?;
    if let Some(client_id) = cli.client_id {
        config.client_id = client_id;
    }
    if let Some(redirect_uri) = cli.redirect_uri {
        config.redirect_uri = redirect_uri;
    }
    if let Some(fhir_base_url) = cli.fhir_base_url {
        config.fhir_base_url = fhir_base_url;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        fhir_base_url = %config.fhir_base_url,
        "Starting FHIR chart viewer"
    );

    let server = ChartServer::new(config)?;
    server.run(SocketAddr::new(cli.host, cli.port)).await
}
