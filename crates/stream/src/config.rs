//! Configuration types for the live view client

use serde::{Deserialize, Serialize};

/// Default ceiling for monitor-triggered reconnection attempts per session
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default bound on the WHEP HTTP round trip (milliseconds)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

const DEFAULT_STUN_URL: &str = "stun:stun.l.google.com:19302";

/// ICE server entry for NAT traversal
///
/// Only STUN is used by this client; there is no TURN relay in the design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    /// Server URLs (e.g., "stun:stun.l.google.com:19302")
    pub urls: Vec<String>,

    /// Optional username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Optional credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServerConfig {
    /// Create an entry for a single STUN server URL
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

/// Configuration for a live view client
///
/// # Example
///
/// ```
/// use camsight_stream::config::LiveViewConfig;
///
/// let config = LiveViewConfig::default().with_max_retries(3);
/// assert_eq!(config.max_retries, 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveViewConfig {
    /// ICE servers used during negotiation
    #[serde(default = "default_ice_servers")]
    pub ice_servers: Vec<IceServerConfig>,

    /// Maximum monitor-triggered reconnection attempts per session.
    ///
    /// Once the counter reaches this ceiling no further attempts are made;
    /// only a new session (reconfigure) resets the budget.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Timeout for the WHEP HTTP exchange (milliseconds)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for LiveViewConfig {
    fn default() -> Self {
        Self {
            ice_servers: default_ice_servers(),
            max_retries: DEFAULT_MAX_RETRIES,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl LiveViewConfig {
    /// Set the ICE server list
    pub fn with_ice_servers(mut self, ice_servers: Vec<IceServerConfig>) -> Self {
        self.ice_servers = ice_servers;
        self
    }

    /// Set the reconnection ceiling
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the WHEP request timeout in milliseconds
    pub fn with_request_timeout_ms(mut self, request_timeout_ms: u64) -> Self {
        self.request_timeout_ms = request_timeout_ms;
        self
    }
}

fn default_ice_servers() -> Vec<IceServerConfig> {
    vec![IceServerConfig::stun(DEFAULT_STUN_URL)]
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LiveViewConfig::default();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.request_timeout_ms, 10_000);
        assert_eq!(config.ice_servers.len(), 1);
        assert_eq!(config.ice_servers[0].urls, vec![DEFAULT_STUN_URL]);
    }

    #[test]
    fn builders() {
        let config = LiveViewConfig::default()
            .with_max_retries(5)
            .with_request_timeout_ms(2_000)
            .with_ice_servers(vec![IceServerConfig::stun("stun:stun.example.org:3478")]);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.request_timeout_ms, 2_000);
        assert_eq!(config.ice_servers[0].urls[0], "stun:stun.example.org:3478");
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let config: LiveViewConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert!(!config.ice_servers.is_empty());

        let config: LiveViewConfig =
            serde_json::from_str(r#"{"max_retries": 0, "ice_servers": []}"#).unwrap();
        assert_eq!(config.max_retries, 0);
        assert!(config.ice_servers.is_empty());
    }
}
