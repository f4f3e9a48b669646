use clap::Parser;
use provisioner::cli::Cli;
use provisioner::config::Config;
use provisioner::prelude::{Proxmox, Result};
use provisioner::proxmox::client::ProxmoxClient;
use provisioner::services::{self, IsoState};
use provisioner::telemetry;
use std::sync::Arc;
use tracing::Level;

/// The main entry point for the provisioning utility.
///
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging.
    let subscriber = telemetry::get_subscriber(Level::INFO, std::io::stdout);
    telemetry::init_subscriber(subscriber)?;

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let proxmox_client: Arc<dyn Proxmox + Send + Sync> = Arc::new(ProxmoxClient::new(
        config.proxmox.url.clone(),
        config.proxmox.auth_header.clone(),
    )?);

    match services::ensure_iso(&proxmox_client, &cli.node, &cli.filename, &cli.url).await? {
        IsoState::Present { storage } => {
            tracing::info!(target: "provision", %storage, filename = %cli.filename, "ISO already available");
        }
        IsoState::Downloading { storage, upid } => {
            tracing::info!(target: "provision", %storage, ?upid, "Download task started");
        }
    }

    Ok(())
}
