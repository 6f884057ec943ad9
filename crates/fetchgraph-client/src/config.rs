//! Client configuration.

use std::time::Duration;

use crate::error::Error;

/// Default TCP address of a fetchgraph data service.
pub const DEFAULT_ADDRESS: &str = "tcp://127.0.0.1:9400";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default maximum message size (64 MB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Environment variable overriding the address.
pub const ADDRESS_ENV: &str = "FETCHGRAPH_ADDRESS";

/// Environment variable overriding the timeout, in milliseconds.
pub const TIMEOUT_ENV: &str = "FETCHGRAPH_TIMEOUT_MS";

/// Client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Server address (e.g., "tcp://127.0.0.1:9400" or "ipc:///tmp/fetchgraph.sock").
    pub address: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Maximum message size in bytes.
    pub max_message_size: usize,

    /// Client identifier for server-side tracking.
    pub client_id: String,

    /// Identity requests run as, if not the service default.
    pub caller_id: Option<[u8; 16]>,
}

impl ClientConfig {
    /// Create a new client configuration with the specified address.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            timeout: DEFAULT_TIMEOUT,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            client_id: generate_client_id(),
            caller_id: None,
        }
    }

    /// Create a configuration for connecting to localhost on the default port.
    pub fn localhost() -> Self {
        Self::new(DEFAULT_ADDRESS)
    }

    /// Defaults overridden by `FETCHGRAPH_ADDRESS` and `FETCHGRAPH_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the environment keys.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = match lookup(ADDRESS_ENV) {
            Some(address) => Self::new(address),
            None => Self::localhost(),
        };
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let millis: u64 = raw
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("{TIMEOUT_ENV}={raw:?}: {e}")))?;
            config.timeout = Duration::from_millis(millis);
        }
        Ok(config)
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum message size.
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Set the client identifier.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Run requests as `caller_id`.
    pub fn with_caller_id(mut self, caller_id: [u8; 16]) -> Self {
        self.caller_id = Some(caller_id);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::localhost()
    }
}

/// Generate a unique client identifier.
fn generate_client_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();

    format!("client-{:x}", timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.address, DEFAULT_ADDRESS);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
        assert_eq!(config.caller_id, None);
        assert!(config.client_id.starts_with("client-"));
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new("tcp://10.0.0.7:9400")
            .with_timeout(Duration::from_secs(5))
            .with_max_message_size(1024 * 1024)
            .with_client_id("plugin-host")
            .with_caller_id([3; 16]);

        assert_eq!(config.address, "tcp://10.0.0.7:9400");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_message_size, 1024 * 1024);
        assert_eq!(config.client_id, "plugin-host");
        assert_eq!(config.caller_id, Some([3; 16]));
    }

    #[test]
    fn test_environment_overrides() {
        let config = ClientConfig::from_vars(|key| match key {
            ADDRESS_ENV => Some("ipc:///tmp/fetchgraph.sock".to_string()),
            TIMEOUT_ENV => Some("1500".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.address, "ipc:///tmp/fetchgraph.sock");
        assert_eq!(config.timeout, Duration::from_millis(1500));

        let config = ClientConfig::from_vars(|_| None).unwrap();
        assert_eq!(config.address, DEFAULT_ADDRESS);
    }

    #[test]
    fn test_invalid_timeout() {
        let err = ClientConfig::from_vars(|key| (key == TIMEOUT_ENV).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
