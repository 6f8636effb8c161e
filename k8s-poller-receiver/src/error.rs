use std::error::Error;
use std::io;

use tokio::task::JoinError;

use super::*;

/// The connectivity probe could not reach its endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ConnectivityError {
    #[error("connection to {endpoint} timed out after {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },
}

/// Why a single target could not be fetched during a tick.
///
/// Always recovered locally: logged, never propagated past the tick.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Fetch(Box<dyn Error + Send + Sync>),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("cancelled")]
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
#[error("failed to get ConfigMap {name} in namespace {namespace}: {error}")]
pub struct PollFailure {
    pub name: String,
    pub namespace: String,
    pub error: PollError,
    pub timestamp: OffsetDateTime,
}

impl PollFailure {
    pub(crate) fn new(target: TargetSpec, error: PollError, timestamp: OffsetDateTime) -> Self {
        let TargetSpec { name, namespace } = target;
        Self {
            name,
            namespace,
            error,
            timestamp,
        }
    }
}

/// Fatal startup failures reported by [`Receiver::start`].
#[derive(Debug, thiserror::Error)]
pub enum ReceiverError {
    #[error("invalid configuration: {0}")]
    Configuration(ConfigError),

    #[error("invalid target list: {0}")]
    TargetList(ConfigError),

    #[error("connectivity check failed: {0}")]
    Connectivity(#[from] ConnectivityError),

    #[error("receiver cannot start while {0}")]
    AlreadyStarted(State),

    #[error("receiver was shut down during startup")]
    Cancelled,
}

impl From<ConfigError> for ReceiverError {
    fn from(err: ConfigError) -> Self {
        if err.is_target_list() {
            Self::TargetList(err)
        } else {
            Self::Configuration(err)
        }
    }
}

/// A background loop ended abnormally while the receiver was draining.
#[derive(Debug, thiserror::Error)]
#[error("{task} task did not finish cleanly: {source}")]
pub struct ShutdownError {
    pub task: &'static str,
    pub source: JoinError,
}
