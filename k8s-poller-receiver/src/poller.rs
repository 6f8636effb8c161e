use futures::future;
use k8s_poller_ext::ConfigMapExt as _;
use tokio::time::MissedTickBehavior;

use super::*;

/// Outcome for one target within one tick.
pub type PollResult = Result<PollRecord, PollFailure>;

/// Summary of one completed tick.
#[derive(Debug)]
pub struct TickReport {
    pub timestamp: OffsetDateTime,
    pub targets: usize,
    pub emitted: usize,
    pub failures: Vec<PollFailure>,
}

/// Re-fetches every target of a [`TargetMapping`] on each tick and forwards
/// the fetched ConfigMaps to a [`Sink`].
///
/// Nothing is cached between ticks. A target that fails is logged and
/// skipped; the remaining targets of the tick are still fetched.
#[derive(Debug)]
pub struct ResourcePoller<C, S> {
    control_plane: Arc<C>,
    sink: Arc<S>,
    mapping: Arc<TargetMapping>,
    fetch_timeout: Duration,
}

impl<C, S> ResourcePoller<C, S>
where
    C: ControlPlane,
    S: Sink,
{
    pub fn new(
        control_plane: Arc<C>,
        sink: Arc<S>,
        mapping: TargetMapping,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            control_plane,
            sink,
            mapping: Arc::new(mapping),
            fetch_timeout,
        }
    }

    pub fn mapping(&self) -> &TargetMapping {
        &self.mapping
    }

    /// Fetches every target once, concurrently.
    ///
    /// Yields one result per target, all stamped with the same tick
    /// timestamp. Cancelling `token` makes outstanding fetches fail with
    /// [`PollError::Cancelled`].
    pub async fn poll_once(&self, token: &CancellationToken) -> Vec<PollResult> {
        self.poll_at(OffsetDateTime::now_utc(), token).await
    }

    /// Runs one full tick: fetch, emit successes, then log failures.
    pub async fn tick(&self, token: &CancellationToken) -> TickReport {
        let timestamp = OffsetDateTime::now_utc();
        tracing::debug!(targets = self.mapping.len(), "Listing selected ConfigMaps");
        let results = self.poll_at(timestamp, token).await;

        let mut emitted = 0;
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(record) => {
                    let name = record.name.clone();
                    let namespace = record.namespace.clone();
                    // A record the sink takes at once is still emitted after cancellation.
                    let consumed = tokio::select! {
                        biased;
                        consumed = self.sink.consume(record) => consumed,
                        () = token.cancelled() => {
                            tracing::debug!(name, namespace, "ConfigMap emit cancelled");
                            continue;
                        }
                    };
                    match consumed {
                        Ok(()) => emitted += 1,
                        Err(err) => {
                            tracing::warn!(name, namespace, error = %err, "Failed to emit ConfigMap");
                        }
                    }
                }
                Err(failure) => failures.push(failure),
            }
        }

        for failure in &failures {
            let PollFailure {
                name,
                namespace,
                error,
                ..
            } = failure;
            if matches!(error, PollError::Cancelled) {
                tracing::debug!(name, namespace, "ConfigMap fetch cancelled");
            } else {
                tracing::warn!(name, namespace, %error, "Error getting ConfigMap");
            }
        }

        let report = TickReport {
            timestamp,
            targets: self.mapping.len(),
            emitted,
            failures,
        };
        tracing::info!(
            targets = report.targets,
            emitted = report.emitted,
            failed = report.failures.len(),
            "Poll tick completed"
        );
        report
    }

    /// Ticks every `interval` until `token` is cancelled.
    ///
    /// The first tick fires immediately. Ticks never overlap: a tick that
    /// outlasts the interval causes the missed ticks to be skipped.
    pub(crate) async fn run(self, interval: Duration, token: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                () = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            self.tick(&token).await;
        }

        tracing::debug!("Resource poller stopped");
    }

    async fn poll_at(&self, timestamp: OffsetDateTime, token: &CancellationToken) -> Vec<PollResult> {
        let fetches = self
            .mapping
            .iter()
            .map(|(name, namespace)| self.poll_target(TargetSpec::new(name, namespace), timestamp, token));
        future::join_all(fetches).await
    }

    async fn poll_target(
        &self,
        target: TargetSpec,
        timestamp: OffsetDateTime,
        token: &CancellationToken,
    ) -> PollResult {
        tracing::debug!(name = %target.name, namespace = %target.namespace, "Getting ConfigMap");
        let fetched = fetch_config_map(
            self.control_plane.as_ref(),
            &target,
            self.fetch_timeout,
            token,
        )
        .await;
        match fetched {
            Ok(cm) => Ok(cm.to_record(&target, timestamp)),
            Err(error) => Err(PollFailure::new(target, error, timestamp)),
        }
    }
}

/// One bounded, cancellable control-plane lookup.
pub(crate) async fn fetch_config_map<C>(
    control_plane: &C,
    target: &TargetSpec,
    timeout: Duration,
    token: &CancellationToken,
) -> Result<corev1::ConfigMap, PollError>
where
    C: ControlPlane,
{
    let get = control_plane.get_config_map(&target.name, &target.namespace);
    tokio::select! {
        biased;
        () = token.cancelled() => Err(PollError::Cancelled),
        fetched = tokio::time::timeout(timeout, get) => match fetched {
            Ok(Ok(Some(cm))) => Ok(cm),
            Ok(Ok(None)) => Err(PollError::NotFound),
            Ok(Err(err)) => Err(PollError::Fetch(Box::new(err))),
            Err(_elapsed) => Err(PollError::Timeout(timeout)),
        },
    }
}
