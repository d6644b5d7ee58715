use k8s_openapi::api::networking::v1::{Ingress, NetworkPolicy};
use kube::{
    api::{Api, ListParams, PostParams, ResourceExt},
    Client,
};

/// Read/write access to the cluster objects the engine works on.
///
/// `Ok(None)` from the getters means the object does not exist; every other
/// API failure propagates to the caller for retry scheduling.
#[async_trait::async_trait]
pub trait Store: Send + Sync + 'static {
    /// Fetches a policy object from the configured policy namespace.
    async fn get_network_policy(&self, name: &str) -> Result<Option<NetworkPolicy>, kube::Error>;

    async fn get_ingress(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Ingress>, kube::Error>;

    async fn list_ingresses(&self) -> Result<Vec<Ingress>, kube::Error>;

    /// Replaces the Ingress. The object's `resourceVersion` rides along so a
    /// stale write is rejected by the API server with a conflict.
    async fn update_ingress(&self, ingress: &Ingress) -> Result<(), kube::Error>;
}

/// `Store` backed by the Kubernetes API server.
#[derive(Clone)]
pub struct ClusterStore {
    client: Client,
    policy_ns: String,
}

// === impl ClusterStore ===

impl ClusterStore {
    pub fn new(client: Client, policy_ns: String) -> Self {
        Self { client, policy_ns }
    }
}

#[async_trait::async_trait]
impl Store for ClusterStore {
    async fn get_network_policy(&self, name: &str) -> Result<Option<NetworkPolicy>, kube::Error> {
        Api::<NetworkPolicy>::namespaced(self.client.clone(), &self.policy_ns)
            .get_opt(name)
            .await
    }

    async fn get_ingress(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Ingress>, kube::Error> {
        Api::<Ingress>::namespaced(self.client.clone(), namespace)
            .get_opt(name)
            .await
    }

    async fn list_ingresses(&self) -> Result<Vec<Ingress>, kube::Error> {
        let list = Api::<Ingress>::all(self.client.clone())
            .list(&ListParams::default())
            .await?;
        Ok(list.items)
    }

    async fn update_ingress(&self, ingress: &Ingress) -> Result<(), kube::Error> {
        let namespace = ingress.namespace().unwrap_or_default();
        Api::<Ingress>::namespaced(self.client.clone(), &namespace)
            .replace(&ingress.name_unchecked(), &PostParams::default(), ingress)
            .await?;
        Ok(())
    }
}
