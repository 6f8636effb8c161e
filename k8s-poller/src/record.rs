use super::*;

/// One successfully fetched target, as handed to the downstream [`Sink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollRecord {
    pub name: String,
    pub namespace: String,
    pub data: BTreeMap<String, String>,
    /// Keys of `binaryData` entries. Their contents are not forwarded.
    pub binary_keys: Vec<String>,
    /// Start of the tick that produced this record.
    pub timestamp: OffsetDateTime,
}

impl PollRecord {
    pub fn new(
        name: impl ToString,
        namespace: impl ToString,
        data: BTreeMap<String, String>,
        timestamp: OffsetDateTime,
    ) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            data,
            binary_keys: Vec::new(),
            timestamp,
        }
    }

    pub fn with_binary_keys(self, binary_keys: impl IntoIterator<Item = String>) -> Self {
        Self {
            binary_keys: binary_keys.into_iter().collect(),
            ..self
        }
    }
}
