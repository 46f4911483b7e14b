//! Client configuration

/// Configuration for connecting to a sync-server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the HTTP API, e.g. "http://localhost:3000"
    pub base_url: String,
    /// Bus TCP address, e.g. "localhost:8081"
    pub bus_addr: String,
    /// Request timeout in seconds
    pub timeout: u64,
    /// Bearer token, set after login
    pub token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            bus_addr: "localhost:8081".to_string(),
            timeout: 30,
            token: None,
        }
    }
}
