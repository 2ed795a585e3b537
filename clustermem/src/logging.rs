use tracing_subscriber::EnvFilter;

use clustermem_core::{ClusterMemError, ClusterMemResult};

/// Default log level for the given number of `-v` flags
pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install the global subscriber. Logs go to stderr so stdout only ever
/// carries the report.
pub fn init_logging(verbose: u8) -> ClusterMemResult<()> {
    let filter = EnvFilter::from_default_env().add_directive(
        format!("clustermem={}", level_for(verbose))
            .parse()
            .map_err(|e| ClusterMemError::configuration(format!("Invalid log directive: {}", e)))?,
    );

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| ClusterMemError::configuration(format!("Failed to initialize logging: {}", e)))
}
