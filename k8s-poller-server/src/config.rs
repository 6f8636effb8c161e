//! Process environment, read once at startup.

use std::collections::HashMap;

use constcat::concat;
use k8s_poller::RawConfig;
use k8s_poller::TargetSource;
use k8s_poller::config::DEFAULT_TARGETS_CONFIGMAP;

const INTERVAL: &str = "INTERVAL";
const HTTP_INTERVAL: &str = "HTTP_INTERVAL";
const CONFIGMAP_LIST: &str = "CONFIGMAP_LIST";
const TARGETS_CONFIGMAP: &str = "TARGETS_CONFIGMAP";
const TARGETS_CONFIGMAP_NAMESPACE: &str = concat!(TARGETS_CONFIGMAP, "_NAMESPACE");
const TARGETS_CONFIGMAP_KEY: &str = concat!(TARGETS_CONFIGMAP, "_KEY");
const PROBE_ENDPOINT: &str = "PROBE_ENDPOINT";
const PROBE_TIMEOUT: &str = "PROBE_TIMEOUT";
const FETCH_TIMEOUT: &str = "FETCH_TIMEOUT";
const LISTEN_ADDR: &str = "LISTEN_ADDR";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Default)]
pub(crate) struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    /// Snapshot of the process environment. Variables that are not valid
    /// unicode are ignored.
    pub(crate) fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    /// Builds the poller configuration surface. Unset or blank variables
    /// fall back to the defaults.
    ///
    /// An inline `CONFIGMAP_LIST` takes precedence over a target list
    /// ConfigMap. Setting only `TARGETS_CONFIGMAP_NAMESPACE` selects the
    /// default ConfigMap name in that namespace.
    pub(crate) fn raw_config(&self) -> RawConfig {
        let defaults = RawConfig::default();
        let var = |name: &str, default: String| self.var(name).map_or(default, str::to_string);
        RawConfig {
            interval: var(INTERVAL, defaults.interval),
            http_interval: var(HTTP_INTERVAL, defaults.http_interval),
            probe_endpoint: var(PROBE_ENDPOINT, defaults.probe_endpoint),
            probe_timeout: var(PROBE_TIMEOUT, defaults.probe_timeout),
            fetch_timeout: var(FETCH_TIMEOUT, defaults.fetch_timeout),
            targets: self.targets(),
        }
    }

    pub(crate) fn listen_addr(&self) -> &str {
        self.var(LISTEN_ADDR).unwrap_or(DEFAULT_LISTEN_ADDR)
    }

    fn targets(&self) -> TargetSource {
        if let Some(yaml) = self.var(CONFIGMAP_LIST) {
            return TargetSource::inline(yaml);
        }

        let name = self.var(TARGETS_CONFIGMAP);
        let namespace = self.var(TARGETS_CONFIGMAP_NAMESPACE);
        if name.is_none() && namespace.is_none() {
            return TargetSource::Missing;
        }

        let mut source = TargetSource::config_map(name.unwrap_or(DEFAULT_TARGETS_CONFIGMAP));
        if let Some(namespace) = namespace {
            source = source.in_namespace(namespace);
        }
        if let Some(key) = self.var(TARGETS_CONFIGMAP_KEY) {
            source = source.with_key(key);
        }
        source
    }

    fn var(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

impl FromIterator<(String, String)> for Env {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let vars = iter.into_iter().collect();
        Self { vars }
    }
}

#[cfg(test)]
mod tests {
    use k8s_poller::PollerConfig;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Env {
        vars.iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let env = Env::default();
        assert_eq!(env.raw_config(), RawConfig::default());
        assert_eq!(env.listen_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn inline_target_list() {
        let env = env(&[
            (CONFIGMAP_LIST, "- {name: a, namespace: ns1}"),
            (TARGETS_CONFIGMAP, "ignored"),
            (INTERVAL, "2m"),
        ]);
        let raw = env.raw_config();
        assert_eq!(raw.targets, TargetSource::inline("- {name: a, namespace: ns1}"));
        assert_eq!(raw.interval, "2m");
    }

    #[test]
    fn target_list_config_map() {
        let env = env(&[
            (TARGETS_CONFIGMAP, "poll-targets"),
            ("TARGETS_CONFIGMAP_NAMESPACE", "observability"),
            ("TARGETS_CONFIGMAP_KEY", "list.yaml"),
        ]);
        assert_eq!(
            env.raw_config().targets,
            TargetSource::config_map("poll-targets")
                .in_namespace("observability")
                .with_key("list.yaml")
        );
    }

    #[test]
    fn namespace_alone_selects_default_config_map() {
        let env = env(&[(TARGETS_CONFIGMAP_NAMESPACE, "observability")]);
        assert_eq!(
            env.raw_config().targets,
            TargetSource::config_map("nbcmr-cm").in_namespace("observability")
        );
    }

    #[test]
    fn blank_variables_are_unset() {
        let env = env(&[(CONFIGMAP_LIST, "  "), (INTERVAL, ""), (LISTEN_ADDR, "")]);
        let raw = env.raw_config();
        assert_eq!(raw.targets, TargetSource::Missing);
        assert_eq!(raw.interval, "1m");
        assert_eq!(env.listen_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn short_interval_fails_validation() {
        let env = env(&[(INTERVAL, "30s")]);
        assert!(PollerConfig::validate(env.raw_config()).is_err());
    }
}
