//! Cluster memory aggregation
//!
//! Walks cluster → hosts → VMs through an [`InventoryClient`] and folds every
//! VM's memory allocation into an [`AggregationResult`]. The walk is strictly
//! sequential in listing order and all-or-nothing: the first failed retrieval
//! aborts the call and no partial totals are returned.

use tracing::{debug, info, instrument, warn};

use crate::error::{ClusterMemError, ClusterMemResult};
use crate::inventory::InventoryClient;
use crate::types::{AggregationResult, ClusterRecord, HostRef};

/// Total the memory reservations and finite limits of every VM on the named
/// cluster.
///
/// The cluster name must match exactly. When several clusters share the name
/// (e.g. in different datacenters) the first one listed is used.
///
/// # Errors
///
/// * [`ClusterMemError::ClusterNotFound`] when no listed cluster has the name
/// * [`ClusterMemError::Retrieval`] when any listing or allocation fetch fails,
///   naming the step that failed
#[instrument(skip(client))]
pub async fn aggregate<C>(cluster_name: &str, client: &C) -> ClusterMemResult<AggregationResult>
where
    C: InventoryClient + ?Sized,
{
    let clusters = client
        .list_clusters()
        .await
        .map_err(|e| ClusterMemError::retrieval("cluster listing", e))?;

    let cluster = select_cluster(cluster_name, clusters)?;
    debug!(
        cluster = %cluster.name,
        hosts = cluster.hosts.len(),
        "Selected cluster"
    );

    let mut result = AggregationResult::new();
    let mut vm_count = 0usize;

    for host in &cluster.hosts {
        let (host_total, host_vms) = aggregate_host(host, client).await?;
        debug!(
            host = %host,
            vms = host_vms,
            reservation_mb = host_total.total_reservation,
            limit_mb = host_total.total_limit,
            "Aggregated host"
        );
        result = result.merge(host_total);
        vm_count += host_vms;
    }

    info!(
        cluster = %cluster.name,
        hosts = cluster.hosts.len(),
        vms = vm_count,
        total_reservation_mb = result.total_reservation,
        total_limit_mb = result.total_limit,
        "Aggregated cluster memory allocation"
    );

    Ok(result)
}

/// Pick the first cluster whose name matches exactly
fn select_cluster(
    cluster_name: &str,
    clusters: Vec<ClusterRecord>,
) -> ClusterMemResult<ClusterRecord> {
    let mut matches = clusters
        .into_iter()
        .filter(|cluster| cluster.name == cluster_name);

    let selected = matches.next().ok_or_else(|| ClusterMemError::ClusterNotFound {
        name: cluster_name.to_string(),
    })?;

    let duplicates = matches.count();
    if duplicates > 0 {
        warn!(
            cluster = cluster_name,
            duplicates,
            "Cluster name is not unique in the inventory; using the first match"
        );
    }

    Ok(selected)
}

/// Fold every VM on one host, returning the host subtotal and VM count
async fn aggregate_host<C>(host: &HostRef, client: &C) -> ClusterMemResult<(AggregationResult, usize)>
where
    C: InventoryClient + ?Sized,
{
    let vms = client
        .list_vms(host)
        .await
        .map_err(|e| ClusterMemError::retrieval(format!("VMs of host {}", host), e))?;

    let mut subtotal = AggregationResult::new();
    for vm in &vms {
        let allocation = client.get_memory_allocation(vm).await.map_err(|e| {
            ClusterMemError::retrieval(
                format!("memory allocation of VM {} on host {}", vm, host),
                e,
            )
        })?;

        debug!(
            vm = %vm,
            reservation_mb = ?allocation.reservation,
            limit_mb = ?allocation.raw_limit(),
            unlimited = allocation.is_unlimited(),
            "Folding VM memory allocation"
        );
        subtotal.fold(&allocation);
    }

    Ok((subtotal, vms.len()))
}
