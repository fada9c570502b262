//! Controller configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::local::DEFAULT_STORAGE_KEY;

/// Cart controller settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Key the anonymous cart is stored under.
    pub storage_key: String,

    /// Bound on every server cart call, in milliseconds.
    pub server_timeout_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            server_timeout_ms: 10_000,
        }
    }
}

impl ControllerConfig {
    /// Bound on every server cart call.
    pub fn server_timeout(&self) -> Duration {
        Duration::from_millis(self.server_timeout_ms)
    }
}
