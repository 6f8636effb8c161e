use super::*;

/// Startup configuration failures. All of them are fatal and never retried.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse {field} {value:?}: {reason}")]
    InvalidDuration {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("{field} has to be set to at least 1 minute (1m), got {interval:?}")]
    IntervalTooShort {
        field: &'static str,
        interval: Duration,
    },

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("connectivity probe endpoint is not set")]
    EmptyEndpoint,

    #[error("target list is not set")]
    MissingTargets,

    #[error("target list is empty")]
    EmptyTargets,

    #[error("failed to decode target list: {0}")]
    MalformedTargets(#[from] serde_yaml::Error),

    #[error("target #{index} has an empty {field}")]
    IncompleteTarget { index: usize, field: &'static str },

    #[error("target list ConfigMap {namespace}/{name} is unavailable: {reason}")]
    TargetSourceUnavailable {
        name: String,
        namespace: String,
        reason: String,
    },
}

impl ConfigError {
    /// True when the target list itself (rather than the intervals or the
    /// probe settings) is at fault.
    pub fn is_target_list(&self) -> bool {
        matches!(
            self,
            Self::MissingTargets
                | Self::EmptyTargets
                | Self::MalformedTargets(_)
                | Self::IncompleteTarget { .. }
                | Self::TargetSourceUnavailable { .. }
        )
    }
}
