use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_address")]
    pub address: String,

    /// Enables the `p` handler.
    #[serde(default = "default_true")]
    pub proxy_enabled: bool,

    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            proxy_enabled: true,
            cache_size: default_cache_size(),
        }
    }
}

fn default_address() -> String {
    "77.88.8.8:53".to_string()
}

fn default_true() -> bool {
    true
}

fn default_cache_size() -> usize {
    10_000
}
