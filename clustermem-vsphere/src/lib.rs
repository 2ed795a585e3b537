//! vSphere inventory client for clustermem
//!
//! Talks to vCenter or ESXi through the VI/JSON API
//! (`{sdk-url}/vim25/{release}/...`) and implements
//! [`clustermem_core::InventoryClient`] on top of it.

pub mod client;
pub mod inventory;
pub mod types;

pub use client::{VimClient, SESSION_HEADER};
pub use inventory::VsphereInventory;
pub use types::{ManagedObjectReference, ResourceAllocationInfo, VirtualMachineConfigInfo};

// Re-export core types for convenience
pub use clustermem_core::{ClusterMemError, ClusterMemResult, ConnectionConfig, InventoryClient};
