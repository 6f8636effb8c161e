//! OS signal handling.
//!
//! **Unix platforms:** `SIGINT`, `SIGTERM` (sent by Kubernetes on pod
//! termination) and `SIGQUIT`.
//!
//! **Other platforms:** Ctrl-C via [`tokio::signal::ctrl_c`].

/// Completes when the process is asked to terminate.
///
/// Failing to install the signal handlers is logged and treated as a
/// termination request.
pub(crate) async fn shutdown_requested() {
    match wait_for_shutdown_signal().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(err) => tracing::error!(%err, "Failed to listen for shutdown signals"),
    }
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::SignalKind;
    use tokio::signal::unix::signal;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
