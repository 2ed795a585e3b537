//! Inventory records and the memory allocation model
//!
//! Cluster, host and VM records are transient: they are built from a single
//! retrieval and dropped once the VM's allocation has been folded into an
//! [`AggregationResult`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque inventory identity of a host (e.g. `host-12`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostRef(pub String);

/// Opaque inventory identity of a virtual machine (e.g. `vm-1043`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VmRef(pub String);

impl HostRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl VmRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for VmRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cluster as listed by the inventory: its name and member host references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub name: String,
    #[serde(default)]
    pub hosts: Vec<HostRef>,
}

/// Memory allocation policy of a single VM, in megabytes
///
/// Both fields mirror what the inventory stored. A negative `limit`
/// (conventionally `-1`) means the VM is unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryAllocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl MemoryAllocation {
    pub fn new(reservation: Option<i64>, limit: Option<i64>) -> Self {
        Self { reservation, limit }
    }

    /// Guaranteed memory, 0 when unset. Negative values are not valid
    /// reservations and count as 0.
    pub fn reservation(&self) -> i64 {
        self.reservation.unwrap_or(0).max(0)
    }

    /// Finite memory cap, `None` when unset or unlimited
    pub fn limit(&self) -> Option<i64> {
        self.limit.filter(|limit| *limit >= 0)
    }

    /// Limit exactly as stored, including the unlimited sentinel
    pub fn raw_limit(&self) -> Option<i64> {
        self.limit
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self.limit, Some(limit) if limit < 0)
    }
}

/// Running totals over every VM folded in so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub total_reservation: i64,
    pub total_limit: i64,
}

impl AggregationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one VM's allocation. Totals never decrease.
    pub fn fold(&mut self, allocation: &MemoryAllocation) {
        self.total_reservation = self
            .total_reservation
            .saturating_add(allocation.reservation());
        if let Some(limit) = allocation.limit() {
            self.total_limit = self.total_limit.saturating_add(limit);
        }
    }

    /// Combine two partial results
    pub fn merge(mut self, other: AggregationResult) -> Self {
        self.total_reservation = self.total_reservation.saturating_add(other.total_reservation);
        self.total_limit = self.total_limit.saturating_add(other.total_limit);
        self
    }
}

impl<'a> FromIterator<&'a MemoryAllocation> for AggregationResult {
    fn from_iter<I: IntoIterator<Item = &'a MemoryAllocation>>(iter: I) -> Self {
        let mut result = AggregationResult::new();
        for allocation in iter {
            result.fold(allocation);
        }
        result
    }
}
