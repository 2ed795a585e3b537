// Cluster aggregation behaviour against in-memory inventories

use clustermem_core::inventory::{HostSnapshot, InventorySnapshot, VmSnapshot};
use clustermem_core::{
    aggregate, AggregationResult, ClusterMemError, HostRef, InMemoryInventory, VmRef,
};
use pretty_assertions::assert_eq;
use std::error::Error;
use std::sync::Arc;

mod common;

use common::{reference_snapshot, Fault, FaultyInventory};

fn totals(total_reservation: i64, total_limit: i64) -> AggregationResult {
    AggregationResult {
        total_reservation,
        total_limit,
    }
}

#[tokio::test]
async fn test_reference_cluster_totals() {
    let inventory = InMemoryInventory::new(reference_snapshot()).unwrap();

    let result = aggregate("C1", &inventory).await.unwrap();

    // B's limit is unlimited and stays out of the limit total
    assert_eq!(result, totals(1792, 2560));
}

#[tokio::test]
async fn test_only_selected_cluster_is_counted() {
    let inventory = InMemoryInventory::new(reference_snapshot()).unwrap();
    assert_eq!(aggregate("C2", &inventory).await.unwrap(), totals(8192, 8192));
}

#[tokio::test]
async fn test_cluster_without_hosts() {
    let snapshot = InventorySnapshot::new().with_cluster("empty", vec![]);
    let inventory = InMemoryInventory::new(snapshot).unwrap();

    assert_eq!(aggregate("empty", &inventory).await.unwrap(), totals(0, 0));
}

#[tokio::test]
async fn test_hosts_without_vms() {
    let snapshot = InventorySnapshot::new().with_cluster(
        "idle",
        vec![
            HostSnapshot::new("host-1", vec![]),
            HostSnapshot::new("host-2", vec![]),
        ],
    );
    let inventory = InMemoryInventory::new(snapshot).unwrap();

    assert_eq!(aggregate("idle", &inventory).await.unwrap(), totals(0, 0));
}

#[tokio::test]
async fn test_reservation_without_limit() {
    let snapshot = InventorySnapshot::new().with_cluster(
        "C1",
        vec![HostSnapshot::new(
            "host-1",
            vec![VmSnapshot::with_allocation("vm-1", Some(768), None)],
        )],
    );
    let inventory = InMemoryInventory::new(snapshot).unwrap();

    assert_eq!(aggregate("C1", &inventory).await.unwrap(), totals(768, 0));
}

#[tokio::test]
async fn test_any_negative_limit_is_unlimited() {
    let snapshot = InventorySnapshot::new().with_cluster(
        "C1",
        vec![HostSnapshot::new(
            "host-1",
            vec![
                VmSnapshot::with_allocation("vm-1", Some(100), Some(-1)),
                VmSnapshot::with_allocation("vm-2", Some(200), Some(-4096)),
            ],
        )],
    );
    let inventory = InMemoryInventory::new(snapshot).unwrap();

    assert_eq!(aggregate("C1", &inventory).await.unwrap(), totals(300, 0));
}

#[tokio::test]
async fn test_vm_without_allocation_record() {
    let snapshot = InventorySnapshot::new().with_cluster(
        "C1",
        vec![HostSnapshot::new(
            "host-1",
            vec![
                VmSnapshot::new("template-vm", None),
                VmSnapshot::with_allocation("vm-1", None, Some(1024)),
            ],
        )],
    );
    let inventory = InMemoryInventory::new(snapshot).unwrap();

    assert_eq!(aggregate("C1", &inventory).await.unwrap(), totals(0, 1024));
}

#[tokio::test]
async fn test_unknown_cluster() {
    let inventory = InMemoryInventory::new(reference_snapshot()).unwrap();

    let err = aggregate("c1", &inventory).await.unwrap_err();
    match err {
        ClusterMemError::ClusterNotFound { name } => assert_eq!(name, "c1"),
        other => panic!("Expected ClusterNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_duplicate_cluster_names_use_first_listed() {
    let snapshot = InventorySnapshot::new()
        .with_cluster(
            "shared",
            vec![HostSnapshot::new(
                "dc1-host",
                vec![VmSnapshot::with_allocation("dc1-vm", Some(10), Some(20))],
            )],
        )
        .with_cluster(
            "shared",
            vec![HostSnapshot::new(
                "dc2-host",
                vec![VmSnapshot::with_allocation("dc2-vm", Some(1000), Some(2000))],
            )],
        );
    let inventory = InMemoryInventory::new(snapshot).unwrap();

    assert_eq!(aggregate("shared", &inventory).await.unwrap(), totals(10, 20));
}

#[tokio::test]
async fn test_cluster_listing_failure() {
    let inventory = FaultyInventory::new(reference_snapshot(), Some(Fault::ListClusters));

    let err = aggregate("C1", &inventory).await.unwrap_err();
    assert!(err.is_retrieval());
    assert!(err.to_string().contains("cluster listing"));
    assert_eq!(inventory.calls(), vec!["clusters"]);
}

#[tokio::test]
async fn test_host_listing_failure_aborts() {
    let inventory = FaultyInventory::new(
        reference_snapshot(),
        Some(Fault::ListVms(HostRef::new("H2"))),
    );

    let err = aggregate("C1", &inventory).await.unwrap_err();
    assert!(err.is_retrieval());
    assert!(err.to_string().contains("VMs of host H2"));
    assert!(err.source().is_some());
}

#[tokio::test]
async fn test_single_vm_failure_aborts_whole_call() {
    let inventory = FaultyInventory::new(
        reference_snapshot(),
        Some(Fault::Allocation(VmRef::new("A"))),
    );

    let err = aggregate("C1", &inventory).await.unwrap_err();
    assert!(err.is_retrieval());
    assert!(err.to_string().contains("VM A on host H1"));
    assert!(err.chain_message().contains("injected fault"));

    // Traversal stops at the first failure
    assert_eq!(inventory.calls(), vec!["clusters", "vms:H1", "allocation:A"]);
}

#[tokio::test]
async fn test_traversal_is_sequential_in_listing_order() {
    let inventory = FaultyInventory::new(reference_snapshot(), None);

    aggregate("C1", &inventory).await.unwrap();

    assert_eq!(
        inventory.calls(),
        vec![
            "clusters",
            "vms:H1",
            "allocation:A",
            "allocation:B",
            "vms:H2",
            "allocation:C",
        ]
    );
}

#[tokio::test]
async fn test_concurrent_aggregations_are_independent() {
    let inventory = Arc::new(InMemoryInventory::new(reference_snapshot()).unwrap());

    let handles: Vec<_> = ["C1", "C2", "C1", "missing"]
        .into_iter()
        .map(|name| {
            let inventory = Arc::clone(&inventory);
            tokio::spawn(async move { aggregate(name, &inventory).await })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    assert_eq!(results[0].as_ref().unwrap(), &totals(1792, 2560));
    assert_eq!(results[1].as_ref().unwrap(), &totals(8192, 8192));
    assert_eq!(results[2].as_ref().unwrap(), &totals(1792, 2560));
    assert!(matches!(
        results[3],
        Err(ClusterMemError::ClusterNotFound { .. })
    ));
}
