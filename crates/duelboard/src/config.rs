//! Server configuration.

use std::time::Duration;

use duelboard_room::RegistryConfig;
use serde::{Deserialize, Serialize};

/// Settings for a [`DuelboardServer`](crate::DuelboardServer).
///
/// Usually filled in through the builder rather than by hand. Missing
/// fields take their defaults when deserialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// A connection that sends nothing (heartbeats included) for this
    /// long is dropped. `None` waits forever.
    pub idle_timeout: Option<Duration>,

    /// Room registry policy and default room settings.
    pub registry: RegistryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            idle_timeout: Some(Duration::from_secs(300)),
            registry: RegistryConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(300)));
        assert!(config.registry.create_on_join);
    }

    #[test]
    fn test_server_config_partial_json() {
        let config: ServerConfig =
            serde_json::from_str(r#"{"bind_addr": "0.0.0.0:8080", "idle_timeout": null}"#)
                .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.idle_timeout, None);
        assert!(config.registry.create_on_join);
    }
}
