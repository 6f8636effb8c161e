//! Poller configuration surface and its one-time validation.

use constcat::concat;

use super::*;

pub const DEFAULT_POLL_INTERVAL: &str = "1m";
pub const DEFAULT_PROBE_INTERVAL: &str = "5m";
pub const DEFAULT_PROBE_HOST: &str = "www.google.com";
pub const DEFAULT_PROBE_PORT: &str = "80";
pub const DEFAULT_PROBE_ENDPOINT: &str = concat!(DEFAULT_PROBE_HOST, ":", DEFAULT_PROBE_PORT);
pub const DEFAULT_PROBE_TIMEOUT: &str = "3s";
pub const DEFAULT_FETCH_TIMEOUT: &str = "30s";
pub const DEFAULT_TARGETS_CONFIGMAP: &str = "nbcmr-cm";
pub const DEFAULT_TARGETS_NAMESPACE: &str = "default";
pub const DEFAULT_TARGETS_KEY: &str = "targets";

/// Shortest accepted poll or probe interval.
pub const MIN_INTERVAL: Duration = Duration::from_secs(60);

/// Where the declarative target list comes from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TargetSource {
    /// YAML sequence of `{name, namespace}` records.
    Inline(String),
    /// YAML sequence stored under `key` of a ConfigMap, read once at startup.
    ConfigMap {
        name: String,
        namespace: String,
        key: String,
    },
    #[default]
    Missing,
}

impl TargetSource {
    pub fn inline(yaml: impl ToString) -> Self {
        Self::Inline(yaml.to_string())
    }

    pub fn config_map(name: impl ToString) -> Self {
        Self::ConfigMap {
            name: name.to_string(),
            namespace: DEFAULT_TARGETS_NAMESPACE.to_string(),
            key: DEFAULT_TARGETS_KEY.to_string(),
        }
    }

    pub fn in_namespace(self, namespace: impl ToString) -> Self {
        match self {
            Self::ConfigMap { name, key, .. } => Self::ConfigMap {
                name,
                namespace: namespace.to_string(),
                key,
            },
            other => other,
        }
    }

    pub fn with_key(self, key: impl ToString) -> Self {
        match self {
            Self::ConfigMap {
                name, namespace, ..
            } => Self::ConfigMap {
                name,
                namespace,
                key: key.to_string(),
            },
            other => other,
        }
    }
}

/// Unvalidated, textual configuration as supplied by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawConfig {
    /// Poll interval, Go duration syntax.
    pub interval: String,
    /// Connectivity probe interval, Go duration syntax.
    pub http_interval: String,
    pub probe_endpoint: String,
    pub probe_timeout: String,
    pub fetch_timeout: String,
    pub targets: TargetSource,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL.to_string(),
            http_interval: DEFAULT_PROBE_INTERVAL.to_string(),
            probe_endpoint: DEFAULT_PROBE_ENDPOINT.to_string(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT.to_string(),
            targets: TargetSource::Missing,
        }
    }
}

impl RawConfig {
    pub fn with_targets(self, targets: TargetSource) -> Self {
        Self { targets, ..self }
    }
}

/// Validated poller configuration. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollerConfig {
    poll_interval: Duration,
    probe_interval: Duration,
    probe_endpoint: String,
    probe_timeout: Duration,
    fetch_timeout: Duration,
    targets: TargetSource,
}

impl PollerConfig {
    pub fn validate(raw: RawConfig) -> Result<Self, ConfigError> {
        Self::try_from(raw)
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn probe_interval(&self) -> Duration {
        self.probe_interval
    }

    pub fn probe_endpoint(&self) -> &str {
        &self.probe_endpoint
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    pub fn targets(&self) -> &TargetSource {
        &self.targets
    }
}

impl TryFrom<RawConfig> for PollerConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let poll_interval = interval("interval", &raw.interval)?;
        let probe_interval = interval("http_interval", &raw.http_interval)?;
        let probe_timeout = timeout("probe_timeout", &raw.probe_timeout)?;
        let fetch_timeout = timeout("fetch_timeout", &raw.fetch_timeout)?;

        let probe_endpoint = raw.probe_endpoint.trim().to_string();
        if probe_endpoint.is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }

        Ok(Self {
            poll_interval,
            probe_interval,
            probe_endpoint,
            probe_timeout,
            fetch_timeout,
            targets: raw.targets,
        })
    }
}

fn interval(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let interval = parse(field, value)?;
    if interval < MIN_INTERVAL {
        Err(ConfigError::IntervalTooShort { field, interval })
    } else {
        Ok(interval)
    }
}

fn timeout(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let timeout = parse(field, value)?;
    if timeout.is_zero() {
        Err(ConfigError::ZeroTimeout { field })
    } else {
        Ok(timeout)
    }
}

fn parse(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    duration::parse(value).map_err(|reason| ConfigError::InvalidDuration {
        field,
        value: value.to_string(),
        reason,
    })
}
