//! Dual-loop receiver: a recurring connectivity probe and a recurring
//! ConfigMap poller sharing one lifecycle and one cancellation signal.

use std::sync::Arc;
use std::time::Duration;

use k8s_poller::ConfigError;
use k8s_poller::ControlPlane;
use k8s_poller::PollRecord;
use k8s_poller::PollerConfig;
use k8s_poller::Sink;
use k8s_poller::TargetMapping;
use k8s_poller::TargetSource;
use k8s_poller::TargetSpec;
use k8s_poller_ext as k8s;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use k8s::corev1;

pub use error::ConnectivityError;
pub use error::PollError;
pub use error::PollFailure;
pub use error::ReceiverError;
pub use error::ShutdownError;
pub use lifecycle::Receiver;
pub use lifecycle::State;
pub use poller::PollResult;
pub use poller::ResourcePoller;
pub use poller::TickReport;
pub use probe::ConnectivityProbe;
pub use probe::ProbeOutcome;
pub use sink::LogSink;

mod error;
mod lifecycle;
mod poller;
mod probe;
mod sink;

#[cfg(test)]
mod mock;
