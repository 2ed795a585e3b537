pub mod cli;
pub mod logging;
pub mod runner;

pub use cli::Cli;
pub use logging::init_logging;
pub use runner::{connection_config, run};

// Re-export commonly used types
pub use clustermem_core::{
    aggregate, AggregationResult, ClusterMemError, ClusterMemResult, InventoryClient,
    MemoryAllocation, ReportFormat,
};
