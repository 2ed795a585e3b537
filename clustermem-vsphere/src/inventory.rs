use async_trait::async_trait;
use tracing::{debug, warn};

use clustermem_core::{
    ClusterMemError, ClusterMemResult, ClusterRecord, ConnectionConfig, HostRef, InventoryClient,
    MemoryAllocation, VmRef,
};

use crate::client::VimClient;
use crate::types::{CreateContainerViewRequest, ManagedObjectReference, VirtualMachineConfigInfo};

const CLUSTER_TYPE: &str = "ClusterComputeResource";

/// Live inventory backed by a vCenter or ESXi VI/JSON endpoint
pub struct VsphereInventory {
    client: VimClient,
}

impl VsphereInventory {
    pub fn new(client: VimClient) -> Self {
        Self { client }
    }

    /// Log in to the endpoint described by `config`
    pub async fn connect(config: &ConnectionConfig) -> ClusterMemResult<Self> {
        Ok(Self::new(VimClient::connect(config).await?))
    }

    pub fn client(&self) -> &VimClient {
        &self.client
    }

    /// End the session
    pub async fn logout(&self) -> ClusterMemResult<()> {
        self.client.logout().await
    }

    async fn create_cluster_view(&self) -> ClusterMemResult<ManagedObjectReference> {
        let content = self.client.service_content();
        let view_manager = content.view_manager.as_ref().ok_or_else(|| {
            ClusterMemError::retrieval_message("cluster listing", "endpoint exposes no view manager")
        })?;

        self.client
            .post_json(
                &format!("ViewManager/{}/CreateContainerView", view_manager.value),
                &CreateContainerViewRequest {
                    container: content.root_folder.clone(),
                    types: vec![CLUSTER_TYPE.to_string()],
                    recursive: true,
                },
            )
            .await
    }

    async fn read_cluster_view(
        &self,
        view: &ManagedObjectReference,
    ) -> ClusterMemResult<Vec<ClusterRecord>> {
        let members: Option<Vec<ManagedObjectReference>> = self
            .client
            .get_json(&format!("ContainerView/{}/view", view.value))
            .await?;

        let mut clusters = Vec::new();
        for member in members.unwrap_or_default() {
            if member.kind != CLUSTER_TYPE {
                continue;
            }

            let name: String = self
                .client
                .get_json(&format!("{}/{}/name", CLUSTER_TYPE, member.value))
                .await?;
            let hosts: Option<Vec<ManagedObjectReference>> = self
                .client
                .get_json(&format!("{}/{}/host", CLUSTER_TYPE, member.value))
                .await?;

            clusters.push(ClusterRecord {
                name,
                hosts: hosts
                    .unwrap_or_default()
                    .into_iter()
                    .map(|host| HostRef::new(host.value))
                    .collect(),
            });
        }

        Ok(clusters)
    }
}

#[async_trait]
impl InventoryClient for VsphereInventory {
    async fn list_clusters(&self) -> ClusterMemResult<Vec<ClusterRecord>> {
        let view = self.create_cluster_view().await?;
        let clusters = self.read_cluster_view(&view).await;

        // The view is server-side state and must go away on every path
        if let Err(e) = self
            .client
            .post_empty(&format!("ContainerView/{}/DestroyView", view.value))
            .await
        {
            warn!(view = %view.value, "Failed to destroy container view: {}", e);
        }

        let clusters = clusters?;
        debug!(
            url = %self.client.base_url(),
            clusters = clusters.len(),
            "Listed clusters"
        );
        Ok(clusters)
    }

    async fn list_vms(&self, host: &HostRef) -> ClusterMemResult<Vec<VmRef>> {
        let vms: Option<Vec<ManagedObjectReference>> = self
            .client
            .get_json(&format!("HostSystem/{}/vm", host))
            .await?;

        Ok(vms
            .unwrap_or_default()
            .into_iter()
            .map(|vm| VmRef::new(vm.value))
            .collect())
    }

    async fn get_memory_allocation(&self, vm: &VmRef) -> ClusterMemResult<MemoryAllocation> {
        let config: Option<VirtualMachineConfigInfo> = self
            .client
            .get_json(&format!("VirtualMachine/{}/config", vm))
            .await?;

        // Inaccessible or orphaned VMs have no config at all
        Ok(config
            .map(|config| config.memory_allocation())
            .unwrap_or_default())
    }
}
