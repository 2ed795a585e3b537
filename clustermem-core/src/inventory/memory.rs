//! In-memory inventory built from a snapshot
//!
//! A snapshot is a nested cluster → host → VM document, loadable from JSON or
//! YAML. [`InMemoryInventory`] indexes it and serves the same three retrieval
//! operations as a live endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use super::InventoryClient;
use crate::error::{ClusterMemError, ClusterMemResult};
use crate::types::{ClusterRecord, HostRef, MemoryAllocation, VmRef};

/// Exported inventory: clusters with their hosts and VMs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    #[serde(default)]
    pub clusters: Vec<ClusterSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    pub name: String,
    #[serde(default)]
    pub hosts: Vec<HostSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub id: HostRef,
    #[serde(default)]
    pub vms: Vec<VmSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmSnapshot {
    pub id: VmRef,
    /// `None` when the VM has no allocation record at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_allocation: Option<MemoryAllocation>,
}

impl InventorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cluster(mut self, name: impl Into<String>, hosts: Vec<HostSnapshot>) -> Self {
        self.clusters.push(ClusterSnapshot {
            name: name.into(),
            hosts,
        });
        self
    }

    /// Load a snapshot file; `.yaml`/`.yml` is parsed as YAML, anything else as JSON
    pub fn from_file(path: impl AsRef<Path>) -> ClusterMemResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );

        if is_yaml {
            serde_yaml::from_str(&content).map_err(|e| {
                ClusterMemError::serialization(format!("parse YAML snapshot {}", path.display()), e)
            })
        } else {
            serde_json::from_str(&content).map_err(|e| {
                ClusterMemError::serialization(format!("parse JSON snapshot {}", path.display()), e)
            })
        }
    }
}

impl HostSnapshot {
    pub fn new(id: impl Into<String>, vms: Vec<VmSnapshot>) -> Self {
        Self {
            id: HostRef::new(id),
            vms,
        }
    }
}

impl VmSnapshot {
    pub fn new(id: impl Into<String>, memory_allocation: Option<MemoryAllocation>) -> Self {
        Self {
            id: VmRef::new(id),
            memory_allocation,
        }
    }

    pub fn with_allocation(
        id: impl Into<String>,
        reservation: Option<i64>,
        limit: Option<i64>,
    ) -> Self {
        Self::new(id, Some(MemoryAllocation::new(reservation, limit)))
    }
}

/// Inventory client answering from an indexed snapshot
#[derive(Debug, Clone)]
pub struct InMemoryInventory {
    clusters: Vec<ClusterRecord>,
    host_vms: HashMap<HostRef, Vec<VmRef>>,
    vm_allocations: HashMap<VmRef, Option<MemoryAllocation>>,
}

impl InMemoryInventory {
    /// Index a snapshot. Host and VM identities must be unique across the
    /// whole snapshot.
    pub fn new(snapshot: InventorySnapshot) -> ClusterMemResult<Self> {
        let mut clusters = Vec::with_capacity(snapshot.clusters.len());
        let mut host_vms = HashMap::new();
        let mut vm_allocations = HashMap::new();

        for cluster in snapshot.clusters {
            let mut hosts = Vec::with_capacity(cluster.hosts.len());

            for host in cluster.hosts {
                let mut vms = Vec::with_capacity(host.vms.len());
                for vm in host.vms {
                    if vm_allocations
                        .insert(vm.id.clone(), vm.memory_allocation)
                        .is_some()
                    {
                        return Err(ClusterMemError::invalid_input(
                            "snapshot",
                            format!("VM {} appears more than once", vm.id),
                        ));
                    }
                    vms.push(vm.id);
                }

                if host_vms.insert(host.id.clone(), vms).is_some() {
                    return Err(ClusterMemError::invalid_input(
                        "snapshot",
                        format!("host {} appears more than once", host.id),
                    ));
                }
                hosts.push(host.id);
            }

            clusters.push(ClusterRecord {
                name: cluster.name,
                hosts,
            });
        }

        debug!(
            clusters = clusters.len(),
            hosts = host_vms.len(),
            vms = vm_allocations.len(),
            "Indexed inventory snapshot"
        );

        Ok(Self {
            clusters,
            host_vms,
            vm_allocations,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> ClusterMemResult<Self> {
        Self::new(InventorySnapshot::from_file(path)?)
    }
}

#[async_trait]
impl InventoryClient for InMemoryInventory {
    async fn list_clusters(&self) -> ClusterMemResult<Vec<ClusterRecord>> {
        Ok(self.clusters.clone())
    }

    async fn list_vms(&self, host: &HostRef) -> ClusterMemResult<Vec<VmRef>> {
        self.host_vms.get(host).cloned().ok_or_else(|| {
            ClusterMemError::retrieval_message(
                format!("VMs of host {}", host),
                format!("host {} is not in the inventory", host),
            )
        })
    }

    async fn get_memory_allocation(&self, vm: &VmRef) -> ClusterMemResult<MemoryAllocation> {
        self.vm_allocations
            .get(vm)
            .map(|allocation| allocation.unwrap_or_default())
            .ok_or_else(|| {
                ClusterMemError::retrieval_message(
                    format!("memory allocation of VM {}", vm),
                    format!("VM {} is not in the inventory", vm),
                )
            })
    }
}
