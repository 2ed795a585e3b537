//! Shared fixtures for aggregation tests

#![allow(dead_code)]

use async_trait::async_trait;
use clustermem_core::inventory::{HostSnapshot, InventorySnapshot, VmSnapshot};
use clustermem_core::{
    ClusterMemError, ClusterMemResult, ClusterRecord, HostRef, InMemoryInventory, InventoryClient,
    MemoryAllocation, VmRef,
};
use std::sync::Mutex;

/// Cluster C1 with H1{A(1024, 2048), B(512, unlimited)} and H2{C(256, 512)}
pub fn reference_snapshot() -> InventorySnapshot {
    InventorySnapshot::new()
        .with_cluster(
            "C1",
            vec![
                HostSnapshot::new(
                    "H1",
                    vec![
                        VmSnapshot::with_allocation("A", Some(1024), Some(2048)),
                        VmSnapshot::with_allocation("B", Some(512), Some(-1)),
                    ],
                ),
                HostSnapshot::new(
                    "H2",
                    vec![VmSnapshot::with_allocation("C", Some(256), Some(512))],
                ),
            ],
        )
        .with_cluster(
            "C2",
            vec![HostSnapshot::new(
                "H3",
                vec![VmSnapshot::with_allocation("D", Some(8192), Some(8192))],
            )],
        )
}

/// Which retrieval step a [`FaultyInventory`] should fail
#[derive(Debug, Clone)]
pub enum Fault {
    ListClusters,
    ListVms(HostRef),
    Allocation(VmRef),
}

/// Wraps an in-memory inventory, records every call and fails one step
pub struct FaultyInventory {
    inner: InMemoryInventory,
    fault: Option<Fault>,
    calls: Mutex<Vec<String>>,
}

impl FaultyInventory {
    pub fn new(snapshot: InventorySnapshot, fault: Option<Fault>) -> Self {
        Self {
            inner: InMemoryInventory::new(snapshot).unwrap(),
            fault,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn injected(operation: &str) -> ClusterMemError {
        ClusterMemError::retrieval(
            operation,
            std::io::Error::new(std::io::ErrorKind::TimedOut, "injected fault"),
        )
    }
}

#[async_trait]
impl InventoryClient for FaultyInventory {
    async fn list_clusters(&self) -> ClusterMemResult<Vec<ClusterRecord>> {
        self.record("clusters".to_string());
        if matches!(self.fault, Some(Fault::ListClusters)) {
            return Err(Self::injected("list clusters"));
        }
        self.inner.list_clusters().await
    }

    async fn list_vms(&self, host: &HostRef) -> ClusterMemResult<Vec<VmRef>> {
        self.record(format!("vms:{}", host));
        if matches!(&self.fault, Some(Fault::ListVms(h)) if h == host) {
            return Err(Self::injected("list vms"));
        }
        self.inner.list_vms(host).await
    }

    async fn get_memory_allocation(&self, vm: &VmRef) -> ClusterMemResult<MemoryAllocation> {
        self.record(format!("allocation:{}", vm));
        if matches!(&self.fault, Some(Fault::Allocation(v)) if v == vm) {
            return Err(Self::injected("get allocation"));
        }
        self.inner.get_memory_allocation(vm).await
    }
}
