use std::fmt;

use k8s_poller::ControlPlane;
use k8s_poller_ext as k8s;
use kube::api;

use k8s::corev1;

/// Control-plane access through the Kubernetes API server.
pub struct KubeApi {
    client: kube::Client,
}

impl KubeApi {
    /// Create a KubeApi configured with a default Kubernetes client.
    ///
    /// The client is inferred from the environment: in-cluster service account
    /// credentials when running inside a pod, the local kubeconfig otherwise.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), kube::Error> {
    /// let api = k8s_poller_kubeapi::KubeApi::new().await?;
    /// // use `api`...
    /// # drop(api);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new() -> kube::Result<Self> {
        kube::Client::try_default().await.map(Self::with_client)
    }

    /// Create a KubeApi backed by the provided Kubernetes client.
    pub fn with_client(client: kube::Client) -> Self {
        Self { client }
    }

    /// Fetches a single ConfigMap.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the ConfigMap does not exist in `namespace`; the `Err`
    /// variant indicates a request or API error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example() -> kube::Result<()> {
    /// let api = k8s_poller_kubeapi::KubeApi::new().await?;
    /// if let Some(cm) = api.config_map("kube-root-ca.crt", "default").await? {
    ///     println!("{:?}", cm.data);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn config_map(
        &self,
        name: &str,
        namespace: &str,
    ) -> kube::Result<Option<corev1::ConfigMap>> {
        self.config_maps(namespace).get_opt(name).await
    }

    /// Returns an Api handle scoped to the ConfigMaps of `namespace`.
    fn config_maps(&self, namespace: &str) -> api::Api<corev1::ConfigMap> {
        api::Api::namespaced(self.client.clone(), namespace)
    }
}

impl ControlPlane for KubeApi {
    type Error = kube::Error;

    async fn get_config_map(
        &self,
        name: &str,
        namespace: &str,
    ) -> kube::Result<Option<corev1::ConfigMap>> {
        tracing::debug!(name, namespace, "Getting ConfigMap");
        self.config_map(name, namespace).await
    }
}

impl fmt::Debug for KubeApi {
    /// Formats the `KubeApi` for debugging while redacting the `client`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeApi")
            .field("client", &"<kube::Client>")
            .finish()
    }
}
