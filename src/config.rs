// Caller-side configuration. The library client never reads the
// environment; the binary uses `NodeConfig::from_env` to decide where to
// connect.

use crate::api::{Client, DEFAULT_LOCAL_URL, DEFAULT_TIMEOUT_SECS};
use crate::error::Result;

pub const ENV_API_URL: &str = "IPFS_API_URL";
pub const ENV_API_TIMEOUT: &str = "IPFS_API_TIMEOUT";

/// Where the node lives and how long a single exchange may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            api_url: DEFAULT_LOCAL_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl NodeConfig {
    /// Read `IPFS_API_URL` and `IPFS_API_TIMEOUT`, falling back to the local
    /// node defaults. A timeout of `0` disables the deadline.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = NodeConfig::default();
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            config.api_url = url;
        }
        if let Some(raw) = lookup(ENV_API_TIMEOUT) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.timeout_secs = secs,
                _ => tracing::warn!(
                    value = %raw,
                    default = DEFAULT_TIMEOUT_SECS,
                    "ignoring invalid {}",
                    ENV_API_TIMEOUT
                ),
            }
        }
        config
    }

    /// Build a client for the configured node.
    pub fn connect(&self) -> Result<Client> {
        Client::new(&self.api_url, self.timeout_secs)
    }
}
