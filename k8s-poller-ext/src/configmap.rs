use k8s_poller::TargetSpec;
use time::OffsetDateTime;

use super::*;

pub trait ConfigMapExt: Sized {
    fn new(name: impl ToString, namespace: impl ToString) -> Self;
    fn with_data<K, V>(self, data: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: ToString,
        V: ToString;
    fn data_entry(&self, key: &str) -> Option<&str>;
    /// Builds the downstream record for this ConfigMap, fetched as `target`.
    ///
    /// Identity comes from the object's own metadata, falling back to the
    /// target it was requested as.
    fn to_record(&self, target: &TargetSpec, timestamp: OffsetDateTime) -> PollRecord;
}

impl ConfigMapExt for corev1::ConfigMap {
    fn new(name: impl ToString, namespace: impl ToString) -> Self {
        let metadata = metav1::ObjectMeta::with_namespace(name, namespace);
        Self {
            metadata,
            ..default()
        }
    }

    fn with_data<K, V>(self, data: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: ToString,
        V: ToString,
    {
        let data = data
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<BTreeMap<_, _>>();
        Self {
            data: Some(data),
            ..self
        }
    }

    fn data_entry(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key).map(String::as_str)
    }

    fn to_record(&self, target: &TargetSpec, timestamp: OffsetDateTime) -> PollRecord {
        let name = self.metadata.name.as_deref().unwrap_or(&target.name);
        let namespace = self
            .metadata
            .namespace
            .as_deref()
            .unwrap_or(&target.namespace);
        let data = self.data.clone().unwrap_or_default();
        let binary_keys = self
            .binary_data
            .iter()
            .flat_map(|binary| binary.keys().cloned());
        PollRecord::new(name, namespace, data, timestamp).with_binary_keys(binary_keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_carries_object_identity_and_data() {
        let target = TargetSpec::new("a", "ns1");
        let cm = corev1::ConfigMap::new("a", "ns1").with_data([("x", "1")]);
        let timestamp = OffsetDateTime::UNIX_EPOCH;

        let record = cm.to_record(&target, timestamp);

        assert_eq!(record.name, "a");
        assert_eq!(record.namespace, "ns1");
        assert_eq!(record.data.get("x").map(String::as_str), Some("1"));
        assert!(record.binary_keys.is_empty());
        assert_eq!(record.timestamp, timestamp);
    }

    #[test]
    fn record_falls_back_to_target_identity() {
        let target = TargetSpec::new("a", "ns1");
        let cm = corev1::ConfigMap::default();

        let record = cm.to_record(&target, OffsetDateTime::UNIX_EPOCH);

        assert_eq!(record.name, "a");
        assert_eq!(record.namespace, "ns1");
        assert!(record.data.is_empty());
    }

    #[test]
    fn binary_data_is_reported_by_key_only() {
        let target = TargetSpec::new("certs", "ns1");
        let mut binary = BTreeMap::new();
        binary.insert("ca.der".to_string(), openapi::ByteString(vec![0, 1, 2]));
        let cm = corev1::ConfigMap {
            binary_data: Some(binary),
            ..corev1::ConfigMap::new("certs", "ns1")
        };

        let record = cm.to_record(&target, OffsetDateTime::UNIX_EPOCH);

        assert_eq!(record.binary_keys, ["ca.der"]);
    }

    #[test]
    fn data_entry_lookup() {
        let cm = corev1::ConfigMap::new("nbcmr-cm", "default").with_data([("targets", "[]")]);
        assert_eq!(cm.data_entry("targets"), Some("[]"));
        assert_eq!(cm.data_entry("other"), None);
        assert_eq!(corev1::ConfigMap::default().data_entry("targets"), None);
    }
}
