use std::fmt;

use k8s_poller_ext::ConfigMapExt as _;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::poller::fetch_config_map;
use super::*;

const PROBE_TASK: &str = "connectivity-probe";
const POLL_TASK: &str = "resource-poller";

type Tasks = Vec<(&'static str, JoinHandle<()>)>;

/// Lifecycle phase of a [`Receiver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Created,
    Probing,
    Resolving,
    Polling,
    ShuttingDown,
    Stopped,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Created => "created",
            Self::Probing => "probing",
            Self::Resolving => "resolving",
            Self::Polling => "polling",
            Self::ShuttingDown => "shutting down",
            Self::Stopped => "stopped",
        };
        f.write_str(text)
    }
}

/// Owns the connectivity probe loop and the resource poll loop.
///
/// [`start`](Self::start) gates on one connectivity probe, resolves the
/// target list and spawns both loops, which then run concurrently until
/// [`shutdown`](Self::shutdown). After startup, probe failures are only
/// reported through [`health`](Self::health); they never stop polling.
#[derive(Debug)]
pub struct Receiver<C, S> {
    config: PollerConfig,
    control_plane: Arc<C>,
    sink: Arc<S>,
    token: CancellationToken,
    state: watch::Sender<State>,
    health: Arc<watch::Sender<Option<ProbeOutcome>>>,
    tasks: Mutex<Tasks>,
}

impl<C, S> Receiver<C, S>
where
    C: ControlPlane,
    S: Sink,
{
    pub fn new(config: PollerConfig, control_plane: C, sink: S) -> Self {
        Self {
            config,
            control_plane: Arc::new(control_plane),
            sink: Arc::new(sink),
            token: CancellationToken::new(),
            state: watch::Sender::new(State::Created),
            health: Arc::new(watch::Sender::new(None)),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    pub fn control_plane(&self) -> &C {
        &self.control_plane
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn state(&self) -> State {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<State> {
        self.state.subscribe()
    }

    /// Latest connectivity probe outcome, `None` before the first probe.
    pub fn health(&self) -> watch::Receiver<Option<ProbeOutcome>> {
        self.health.subscribe()
    }

    /// Probes connectivity, resolves the target list and starts both loops.
    ///
    /// Returns once the loops are running. Any failure before that point
    /// leaves the receiver [`State::Stopped`] without having polled anything.
    /// A receiver starts at most once.
    pub async fn start(&self) -> Result<(), ReceiverError> {
        // Held for the whole startup; shutdown waits on it.
        let mut tasks = self.tasks.lock().await;
        let entered = self.state.send_if_modified(|state| {
            let created = *state == State::Created;
            if created {
                *state = State::Probing;
            }
            created
        });
        if !entered {
            return Err(ReceiverError::AlreadyStarted(self.state()));
        }

        tracing::info!(endpoint = self.config.probe_endpoint(), "Starting receiver");
        self.startup(&mut tasks).await.inspect_err(|err| {
            self.state.send_replace(State::Stopped);
            tracing::error!(%err, "Receiver failed to start");
        })
    }

    /// Cancels both loops and waits for them, including any in-flight tick
    /// and any startup still in progress.
    ///
    /// Safe to call any number of times, concurrently or not, and safe to
    /// abandon: a call dropped part way leaves the remaining tasks for the
    /// next one. Every completed call leaves the receiver [`State::Stopped`].
    pub async fn shutdown(&self) -> Result<(), ShutdownError> {
        self.token.cancel();

        let mut tasks = self.tasks.lock().await;
        if !tasks.is_empty() {
            tracing::info!("Shutting down receiver");
            self.state.send_replace(State::ShuttingDown);
        }

        let mut result = Ok(());
        while let Some((task, handle)) = tasks.first_mut() {
            let joined = handle.await;
            let task = *task;
            tasks.remove(0);
            if let Err(source) = joined {
                tracing::error!(task, error = %source, "Receiver task did not finish cleanly");
                result = result.and(Err(ShutdownError { task, source }));
            }
        }

        let stopped = self.state.send_if_modified(|state| {
            let running = *state != State::Stopped;
            if running {
                *state = State::Stopped;
            }
            running
        });
        if stopped {
            tracing::info!("Receiver stopped");
        }
        result
    }

    async fn startup(&self, tasks: &mut Tasks) -> Result<(), ReceiverError> {
        let probe = ConnectivityProbe::from_config(&self.config);
        let outcome = tokio::select! {
            biased;
            () = self.token.cancelled() => return Err(ReceiverError::Cancelled),
            outcome = probe.probe_once() => outcome,
        };
        outcome.log(probe.endpoint());
        let outcome = outcome.into_result()?;
        self.health.send_replace(Some(outcome));

        self.state.send_replace(State::Resolving);
        let mapping = self.resolve_targets().await?;
        tracing::info!(targets = mapping.len(), "Target list resolved");

        self.spawn_loops(tasks, probe, mapping)
    }

    async fn resolve_targets(&self) -> Result<TargetMapping, ReceiverError> {
        let mapping = match self.config.targets() {
            TargetSource::Inline(yaml) => TargetMapping::resolve(Some(yaml.as_str()))?,
            TargetSource::Missing => TargetMapping::resolve(None)?,
            TargetSource::ConfigMap {
                name,
                namespace,
                key,
            } => {
                tracing::info!(name, namespace, key, "Reading target list from ConfigMap");
                let source = TargetSpec::new(name, namespace);
                let cm = fetch_config_map(
                    self.control_plane.as_ref(),
                    &source,
                    self.config.fetch_timeout(),
                    &self.token,
                )
                .await
                .map_err(|err| match err {
                    PollError::Cancelled => ReceiverError::Cancelled,
                    err => ConfigError::TargetSourceUnavailable {
                        name: name.clone(),
                        namespace: namespace.clone(),
                        reason: err.to_string(),
                    }
                    .into(),
                })?;
                TargetMapping::resolve(cm.data_entry(key))?
            }
        };
        Ok(mapping)
    }

    fn spawn_loops(
        &self,
        tasks: &mut Tasks,
        probe: ConnectivityProbe,
        mapping: TargetMapping,
    ) -> Result<(), ReceiverError> {
        if self.token.is_cancelled() {
            return Err(ReceiverError::Cancelled);
        }

        let poller = ResourcePoller::new(
            Arc::clone(&self.control_plane),
            Arc::clone(&self.sink),
            mapping,
            self.config.fetch_timeout(),
        );
        let probe_interval = self.config.probe_interval();
        let poll_interval = self.config.poll_interval();
        tracing::info!(
            ?probe_interval,
            ?poll_interval,
            targets = poller.mapping().len(),
            "Starting probe and poll loops"
        );

        let probe = probe.run(probe_interval, Arc::clone(&self.health), self.token.clone());
        let poll = poller.run(poll_interval, self.token.clone());
        tasks.push((PROBE_TASK, tokio::spawn(probe)));
        tasks.push((POLL_TASK, tokio::spawn(poll)));

        self.state.send_replace(State::Polling);
        Ok(())
    }
}
