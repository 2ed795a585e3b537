//! Inventory retrieval interface
//!
//! The aggregator only sees the inventory through [`InventoryClient`], so it
//! can run against a live management endpoint or an in-memory snapshot.

pub mod memory;

use async_trait::async_trait;

use crate::error::ClusterMemResult;
use crate::types::{ClusterRecord, HostRef, MemoryAllocation, VmRef};

pub use memory::{ClusterSnapshot, HostSnapshot, InMemoryInventory, InventorySnapshot, VmSnapshot};

/// Read-only access to a datacenter → cluster → host → VM inventory
///
/// Every call returns a fresh retrieval. Implementations report any transport,
/// authentication or lookup failure as [`ClusterMemError::Retrieval`] and do
/// not retry.
///
/// [`ClusterMemError::Retrieval`]: crate::error::ClusterMemError::Retrieval
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// List every cluster with its member host references, in inventory order
    async fn list_clusters(&self) -> ClusterMemResult<Vec<ClusterRecord>>;

    /// List the VMs registered on a host
    async fn list_vms(&self, host: &HostRef) -> ClusterMemResult<Vec<VmRef>>;

    /// Fetch a VM's memory allocation. A VM without an allocation record
    /// yields `MemoryAllocation::default()`.
    async fn get_memory_allocation(&self, vm: &VmRef) -> ClusterMemResult<MemoryAllocation>;
}

#[async_trait]
impl<T: InventoryClient + ?Sized> InventoryClient for std::sync::Arc<T> {
    async fn list_clusters(&self) -> ClusterMemResult<Vec<ClusterRecord>> {
        (**self).list_clusters().await
    }

    async fn list_vms(&self, host: &HostRef) -> ClusterMemResult<Vec<VmRef>> {
        (**self).list_vms(host).await
    }

    async fn get_memory_allocation(&self, vm: &VmRef) -> ClusterMemResult<MemoryAllocation> {
        (**self).get_memory_allocation(vm).await
    }
}
