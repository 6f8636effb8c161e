//! Configuration, target list and boundary definitions for the ConfigMap poller.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::time::Duration;

use k8s_openapi::api::core::v1 as corev1;
use serde::Deserialize;
use time::OffsetDateTime;

pub use boundary::ControlPlane;
pub use boundary::Sink;
pub use config::PollerConfig;
pub use config::RawConfig;
pub use config::TargetSource;
pub use error::ConfigError;
pub use record::PollRecord;
pub use target::TargetMapping;
pub use target::TargetSpec;

pub mod config;

mod boundary;
mod duration;
mod error;
mod record;
mod target;
