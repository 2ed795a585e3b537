//! VI/JSON wire types
//!
//! Only the fields read by the inventory walk are modelled; everything else
//! in the endpoint's responses is ignored.

use serde::{Deserialize, Serialize};

use clustermem_core::MemoryAllocation;

fn managed_object_reference_type_name() -> String {
    "ManagedObjectReference".to_string()
}

/// Reference to a server-side managed object, e.g. `HostSystem:host-12`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedObjectReference {
    #[serde(rename = "_typeName", default = "managed_object_reference_type_name")]
    pub type_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl ManagedObjectReference {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            type_name: managed_object_reference_type_name(),
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// Subset of `ServiceInstance.content`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceContent {
    pub root_folder: ManagedObjectReference,
    pub session_manager: Option<ManagedObjectReference>,
    pub view_manager: Option<ManagedObjectReference>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub user_name: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CreateContainerViewRequest {
    pub container: ManagedObjectReference,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub recursive: bool,
}

/// Subset of `VirtualMachine.config`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineConfigInfo {
    #[serde(default)]
    pub memory_allocation: Option<ResourceAllocationInfo>,
}

/// `ResourceAllocationInfo`; memory values are in megabytes
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ResourceAllocationInfo {
    #[serde(default)]
    pub reservation: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl From<ResourceAllocationInfo> for MemoryAllocation {
    fn from(info: ResourceAllocationInfo) -> Self {
        MemoryAllocation::new(info.reservation, info.limit)
    }
}

impl VirtualMachineConfigInfo {
    pub fn memory_allocation(&self) -> MemoryAllocation {
        self.memory_allocation
            .map(MemoryAllocation::from)
            .unwrap_or_default()
    }
}
