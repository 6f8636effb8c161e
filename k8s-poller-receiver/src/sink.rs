use std::convert::Infallible;
use std::future;

use super::*;

/// Sink writing every record to the log, one `info` event per ConfigMap.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl Sink for LogSink {
    type Error = Infallible;

    fn consume(&self, record: PollRecord) -> impl Future<Output = Result<(), Self::Error>> + Send {
        tracing::info!(
            namespace = %record.namespace,
            name = %record.name,
            timestamp = %record.timestamp,
            data = ?record.data,
            binary_keys = ?record.binary_keys,
            "ConfigMap"
        );
        future::ready(Ok(()))
    }
}
