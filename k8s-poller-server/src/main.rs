use std::sync::Arc;

use k8s_poller::PollerConfig;
use k8s_poller_kubeapi::KubeApi;
use k8s_poller_receiver::LogSink;
use k8s_poller_receiver::Receiver;

mod config;
mod signal;
mod status;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    tracing::info!("Starting k8s-poller-server");

    let env = config::Env::from_process();
    let config = PollerConfig::validate(env.raw_config())?;
    tracing::debug!(?config, "Configuration loaded");

    let kubeapi = KubeApi::new().await?;
    let receiver = Arc::new(Receiver::new(config, kubeapi, LogSink));
    let mut shutdown = Box::pin(signal::shutdown_requested());
    tokio::select! {
        biased;
        () = &mut shutdown => {
            tracing::info!("Shutdown requested during startup");
            receiver.shutdown().await?;
            return Ok(());
        }
        started = receiver.start() => started?,
    }

    let listener = tokio::net::TcpListener::bind(env.listen_addr()).await?;
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Listening on http://{addr}");
    }
    let app = status::router(Arc::clone(&receiver));
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    receiver.shutdown().await?;
    served?;

    Ok(())
}
