use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Bind address of the HTTP surface, only started when enabled.
    #[serde(default = "default_web_bind")]
    pub web_bind: String,

    /// Events kept per channel for late subscribers.
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    #[serde(default = "default_max_channels")]
    pub max_channels: usize,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            web_bind: default_web_bind(),
            history_size: default_history_size(),
            max_channels: default_max_channels(),
        }
    }
}

fn default_web_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_history_size() -> usize {
    100
}

fn default_max_channels() -> usize {
    1024
}
