use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::domain::{ProxyError, Result};

pub const APP_NAME: &str = "burrow";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Address the proxy listens on
    pub bind: String,
    /// Upper bound for connecting to a destination
    pub dial_timeout_secs: u64,
    /// How long to wait for open HTTP connections once shutdown starts
    pub drain_timeout_secs: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8889".into(),
            dial_timeout_secs: 10,
            drain_timeout_secs: 30,
        }
    }
}

impl ProxyConfig {
    /// Loads the configuration file, creating it with defaults when missing.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let loaded = match path {
            Some(path) => confy::load_path(path),
            None => confy::load(APP_NAME, None),
        };
        loaded.map_err(|e| ProxyError::Config(e.to_string()))
    }

    pub fn dial_timeout(&self) -> Duration {
        Duration::from_secs(self.dial_timeout_secs)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }
}
