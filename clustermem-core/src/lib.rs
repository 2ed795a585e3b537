//! Memory reservation and limit accounting for virtualization clusters
//!
//! The crate walks a datacenter → cluster → host → VM inventory through the
//! [`InventoryClient`] trait and totals the memory every VM on a cluster has
//! reserved or is capped at.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod inventory;
pub mod report;
pub mod types;

pub use aggregator::aggregate;
pub use config::ConnectionConfig;
pub use error::{ClusterMemError, ClusterMemResult};
pub use inventory::{InMemoryInventory, InventoryClient, InventorySnapshot};
pub use report::{render, report, ReportFormat};
pub use types::{AggregationResult, ClusterRecord, HostRef, MemoryAllocation, VmRef};
