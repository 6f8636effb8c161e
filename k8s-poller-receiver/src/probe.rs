use std::io;

use tokio::net::TcpStream;
use tokio::time::MissedTickBehavior;

use super::*;

/// Bounded-timeout TCP reachability check against a fixed endpoint.
#[derive(Clone, Debug)]
pub struct ConnectivityProbe {
    endpoint: String,
    timeout: Duration,
}

/// Result of one probe attempt.
#[derive(Debug)]
pub struct ProbeOutcome {
    pub reachable: bool,
    pub timestamp: OffsetDateTime,
    pub error: Option<ConnectivityError>,
}

impl ConnectivityProbe {
    pub fn new(endpoint: impl ToString, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &PollerConfig) -> Self {
        Self::new(config.probe_endpoint(), config.probe_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Opens and immediately closes one connection to the endpoint.
    pub async fn probe_once(&self) -> ProbeOutcome {
        self.check(TcpStream::connect(self.endpoint.as_str())).await
    }

    async fn check<T>(&self, connect: impl Future<Output = io::Result<T>>) -> ProbeOutcome {
        let timestamp = OffsetDateTime::now_utc();
        tracing::debug!(endpoint = %self.endpoint, "Checking connection");
        let error = match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(_stream)) => None,
            Ok(Err(source)) => Some(ConnectivityError::Connect {
                endpoint: self.endpoint.clone(),
                source,
            }),
            Err(_elapsed) => Some(ConnectivityError::Timeout {
                endpoint: self.endpoint.clone(),
                timeout: self.timeout,
            }),
        };
        ProbeOutcome {
            reachable: error.is_none(),
            timestamp,
            error,
        }
    }

    /// Probes every `interval` until `token` is cancelled, publishing each
    /// outcome on `health`. Failures are reported, never fatal.
    ///
    /// The first probe happens one full interval after the call, startup has
    /// already probed once by then.
    pub(crate) async fn run(
        self,
        interval: Duration,
        health: Arc<watch::Sender<Option<ProbeOutcome>>>,
        token: CancellationToken,
    ) {
        let start = tokio::time::Instant::now() + interval;
        let mut ticker = tokio::time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                () = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let outcome = tokio::select! {
                biased;
                () = token.cancelled() => break,
                outcome = self.probe_once() => outcome,
            };
            outcome.log(&self.endpoint);
            health.send_replace(Some(outcome));
        }

        tracing::debug!(endpoint = %self.endpoint, "Connectivity probe stopped");
    }
}

impl ProbeOutcome {
    pub(crate) fn log(&self, endpoint: &str) {
        match &self.error {
            None => tracing::info!(endpoint, "Port open"),
            Some(error) => tracing::warn!(endpoint, %error, "Port closed"),
        }
    }

    /// Splits off the failure, if any.
    pub fn into_result(self) -> Result<Self, ConnectivityError> {
        let Self {
            reachable,
            timestamp,
            error,
        } = self;
        match error {
            Some(error) => Err(error),
            None => Ok(Self {
                reachable,
                timestamp,
                error: None,
            }),
        }
    }
}
