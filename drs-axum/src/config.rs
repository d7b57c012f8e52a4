//! Listener settings for the daterange REST API.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

/// Where the `/daterange` endpoints are served.
///
/// Defaults to port 8080 on every interface.
///
/// ```
/// use drs_axum::config::AxumConfig;
///
/// let local_only = AxumConfig {
///     bind_address: "127.0.0.1:3000".parse().unwrap(),
/// };
/// assert_eq!(local_only.bind_address.port(), 3000);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AxumConfig {
    /// Socket address the daterange API listens on.
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

impl Default for AxumConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_bind_address_uses_default() {
        let config: AxumConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.bind_address, AxumConfig::default().bind_address);
        assert_eq!(config.bind_address.port(), 8080);
    }
}
