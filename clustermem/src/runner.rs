//! Command execution: pick an inventory source, aggregate, render

use std::time::Duration;
use tracing::{info, warn};

use clustermem_core::{
    aggregate, render, ClusterMemError, ClusterMemResult, ConnectionConfig, InMemoryInventory,
};
use clustermem_vsphere::VsphereInventory;

use crate::cli::Cli;

/// Resolve connection settings: config file (or defaults), then CLI flags
pub fn connection_config(cli: &Cli) -> ClusterMemResult<ConnectionConfig> {
    let mut config = match &cli.config {
        Some(path) => ConnectionConfig::from_file(path)?,
        None => ConnectionConfig::default(),
    };

    if let Some(url) = &cli.url {
        config.url = url.clone();
    }
    if let Some(user) = &cli.user {
        config.user = user.clone();
    }
    if let Some(password) = &cli.password {
        config.password = Some(password.clone());
    }
    if cli.insecure {
        config.insecure = true;
    }
    if let Some(secs) = cli.timeout {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(release) = &cli.api_release {
        config.api_release = release.clone();
    }

    Ok(config)
}

/// Run the report and return the rendered output. Nothing is rendered unless
/// the whole aggregation succeeded.
pub async fn run(cli: &Cli) -> ClusterMemResult<String> {
    if cli.cluster.trim().is_empty() {
        return Err(ClusterMemError::invalid_input("cluster", "must not be empty"));
    }

    let result = match &cli.snapshot {
        Some(path) => {
            info!(snapshot = %path.display(), cluster = %cli.cluster, "Reading inventory snapshot");
            let inventory = InMemoryInventory::from_file(path)?;
            aggregate(&cli.cluster, &inventory).await?
        }
        None => {
            let config = connection_config(cli)?;
            info!(url = %config.url, user = %config.user, cluster = %cli.cluster, "Connecting");

            let inventory = VsphereInventory::connect(&config).await?;
            let outcome = aggregate(&cli.cluster, &inventory).await;

            if let Err(e) = inventory.logout().await {
                warn!("Failed to log out: {}", e);
            }
            outcome?
        }
    };

    render(&cli.cluster, &result, cli.format)
}
