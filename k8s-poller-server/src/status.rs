use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use k8s_poller::ControlPlane;
use k8s_poller::Sink;
use k8s_poller_receiver::Receiver;
use serde::Serialize;

use k8s_poller_receiver::State as Phase;

/// Receiver status as reported by `/status`.
#[derive(Debug, Serialize)]
struct Status {
    state: String,
    reachable: Option<bool>,
    last_probe: Option<String>,
    error: Option<String>,
}

pub(crate) fn router<C, S>(receiver: Arc<Receiver<C, S>>) -> Router
where
    C: ControlPlane,
    S: Sink,
{
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz::<C, S>))
        .route("/status", get(status::<C, S>))
        .with_state(receiver)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Ready while polling with the endpoint reachable at the last probe.
async fn readyz<C, S>(State(receiver): State<Arc<Receiver<C, S>>>) -> (StatusCode, &'static str)
where
    C: ControlPlane,
    S: Sink,
{
    let polling = receiver.state() == Phase::Polling;
    let reachable = receiver
        .health()
        .borrow()
        .as_ref()
        .is_some_and(|outcome| outcome.reachable);
    if polling && reachable {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready")
    }
}

async fn status<C, S>(State(receiver): State<Arc<Receiver<C, S>>>) -> Json<Status>
where
    C: ControlPlane,
    S: Sink,
{
    let state = receiver.state().to_string();
    let health = receiver.health();
    let outcome = health.borrow();
    let status = Status {
        state,
        reachable: outcome.as_ref().map(|outcome| outcome.reachable),
        last_probe: outcome.as_ref().map(|outcome| outcome.timestamp.to_string()),
        error: outcome
            .as_ref()
            .and_then(|outcome| outcome.error.as_ref())
            .map(ToString::to_string),
    };
    Json(status)
}
