use super::*;

/// The control plane the poller reads ConfigMaps from.
pub trait ControlPlane: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches ConfigMap `name` from `namespace`.
    ///
    /// Returns `Ok(None)` when the object does not exist. Implementations are
    /// not required to apply their own timeout; the caller bounds every call.
    fn get_config_map(
        &self,
        name: &str,
        namespace: &str,
    ) -> impl Future<Output = Result<Option<corev1::ConfigMap>, Self::Error>> + Send;
}

/// Downstream consumer of poll results.
///
/// Called once per successfully fetched target and never for failures.
pub trait Sink: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn consume(&self, record: PollRecord) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
