use std::collections::BTreeMap;
use std::collections::HashMap;
use std::io;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use k8s_poller_ext::ConfigMapExt as _;
use tokio::net::TcpListener;
use tokio::net::TcpSocket;
use tokio::net::TcpStream;
use tokio::sync::Notify;

use super::*;

#[derive(Debug)]
enum Reply {
    Found(BTreeMap<String, String>),
    Fail(&'static str),
    Hang,
}

/// Control plane answering from a fixed table; unknown targets are not found.
#[derive(Debug, Default)]
pub(crate) struct MockControlPlane {
    replies: HashMap<(String, String), Reply>,
    calls: AtomicUsize,
    hanging: Notify,
}

impl MockControlPlane {
    pub(crate) fn found(mut self, name: &str, namespace: &str, data: &[(&str, &str)]) -> Self {
        let data = data
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        self.replies.insert(key(name, namespace), Reply::Found(data));
        self
    }

    pub(crate) fn failing(mut self, name: &str, namespace: &str, message: &'static str) -> Self {
        self.replies.insert(key(name, namespace), Reply::Fail(message));
        self
    }

    pub(crate) fn hanging(mut self, name: &str, namespace: &str) -> Self {
        self.replies.insert(key(name, namespace), Reply::Hang);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Resolves once some fetch is stuck on a hanging target.
    pub(crate) async fn hung(&self) {
        self.hanging.notified().await;
    }
}

impl ControlPlane for MockControlPlane {
    type Error = io::Error;

    async fn get_config_map(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<Option<corev1::ConfigMap>, Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.get(&key(name, namespace)) {
            None => Ok(None),
            Some(Reply::Found(data)) => {
                Ok(Some(corev1::ConfigMap::new(name, namespace).with_data(data.clone())))
            }
            Some(Reply::Fail(message)) => Err(io::Error::other(*message)),
            Some(Reply::Hang) => {
                self.hanging.notify_one();
                std::future::pending().await
            }
        }
    }
}

fn key(name: &str, namespace: &str) -> (String, String) {
    (name.to_string(), namespace.to_string())
}

/// Sink collecting every record it is handed.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    records: Mutex<Vec<PollRecord>>,
    arrived: Notify,
}

impl RecordingSink {
    pub(crate) fn records(&self) -> Vec<PollRecord> {
        self.records.lock().unwrap().clone()
    }

    pub(crate) async fn arrived(&self) {
        self.arrived.notified().await;
    }
}

impl Sink for RecordingSink {
    type Error = io::Error;

    async fn consume(&self, record: PollRecord) -> Result<(), Self::Error> {
        self.records.lock().unwrap().push(record);
        self.arrived.notify_one();
        Ok(())
    }
}

/// Sink refusing every record.
#[derive(Debug, Default)]
pub(crate) struct RejectingSink;

impl Sink for RejectingSink {
    type Error = io::Error;

    async fn consume(&self, _record: PollRecord) -> Result<(), Self::Error> {
        Err(io::Error::other("downstream unavailable"))
    }
}

/// Sink that never finishes taking a record.
#[derive(Debug, Default)]
pub(crate) struct HangingSink {
    hanging: Notify,
}

impl HangingSink {
    /// Resolves once some record is stuck in the sink.
    pub(crate) async fn hung(&self) {
        self.hanging.notified().await;
    }
}

impl Sink for HangingSink {
    type Error = io::Error;

    async fn consume(&self, _record: PollRecord) -> Result<(), Self::Error> {
        self.hanging.notify_one();
        std::future::pending().await
    }
}

/// Listener whose accept queue is full, so further connects never complete.
///
/// The returned streams keep the queue occupied and must outlive the test.
pub(crate) async fn saturated_listener() -> (TcpListener, Vec<TcpStream>) {
    let socket = TcpSocket::new_v4().unwrap();
    socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let listener = socket.listen(0).unwrap();
    let endpoint = listener.local_addr().unwrap();

    let mut queued = Vec::new();
    for _ in 0..16 {
        let connect = TcpStream::connect(endpoint);
        match tokio::time::timeout(Duration::from_millis(500), connect).await {
            Ok(stream) => queued.push(stream.unwrap()),
            Err(_elapsed) => return (listener, queued),
        }
    }
    panic!("accept queue of {endpoint} never filled");
}
