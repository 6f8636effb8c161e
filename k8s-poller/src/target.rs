use super::*;

/// One entry of the declarative target list.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TargetSpec {
    /// ConfigMap name.
    pub name: String,
    /// Namespace the ConfigMap lives in.
    pub namespace: String,
}

impl TargetSpec {
    pub fn new(name: impl ToString, namespace: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
        }
    }

    /// Decodes a YAML sequence of `{name, namespace}` records, keeping source order.
    pub fn parse_list(yaml: &str) -> Result<Vec<Self>, ConfigError> {
        serde_yaml::from_str(yaml).map_err(ConfigError::from)
    }
}

/// Target name to namespace lookup, built once per start and read-only afterwards.
///
/// Names are unique keys. When the source list repeats a name, the entry that
/// comes later in source order replaces the earlier one (last write wins).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TargetMapping {
    targets: HashMap<String, String>,
}

impl TargetMapping {
    /// Resolves a serialized target list.
    ///
    /// An absent, blank or empty list is a configuration error: the poller
    /// has nothing to do without targets.
    pub fn resolve(source: Option<&str>) -> Result<Self, ConfigError> {
        let yaml = source
            .map(str::trim)
            .filter(|yaml| !yaml.is_empty())
            .ok_or(ConfigError::MissingTargets)?;
        let specs = TargetSpec::parse_list(yaml)?;
        Self::from_specs(specs)
    }

    pub fn from_specs(specs: impl IntoIterator<Item = TargetSpec>) -> Result<Self, ConfigError> {
        let mut targets = HashMap::new();
        for (index, TargetSpec { name, namespace }) in specs.into_iter().enumerate() {
            if name.trim().is_empty() {
                return Err(ConfigError::IncompleteTarget {
                    index,
                    field: "name",
                });
            }
            if namespace.trim().is_empty() {
                return Err(ConfigError::IncompleteTarget {
                    index,
                    field: "namespace",
                });
            }
            if let Some(previous) = targets.insert(name.clone(), namespace.clone()) {
                tracing::warn!(
                    name,
                    previous,
                    namespace,
                    "Duplicate target name, keeping the later entry"
                );
            }
        }

        if targets.is_empty() {
            Err(ConfigError::EmptyTargets)
        } else {
            Ok(Self { targets })
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn namespace(&self, name: &str) -> Option<&str> {
        self.targets.get(name).map(String::as_str)
    }

    /// `(name, namespace)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.targets
            .iter()
            .map(|(name, namespace)| (name.as_str(), namespace.as_str()))
    }
}

#[cfg(test)]
mod tests;
