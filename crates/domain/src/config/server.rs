use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Address shared by the UDP and TCP listeners.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Optional path of a Unix stream socket speaking length-prefixed DNS.
    #[serde(default)]
    pub unix_socket: Option<String>,

    /// Accept (but do not require) a PROXY protocol header on TCP connections.
    #[serde(default = "default_true")]
    pub proxy_protocol: bool,

    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            unix_socket: None,
            proxy_protocol: true,
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:53".to_string()
}

fn default_true() -> bool {
    true
}

fn default_shutdown_timeout() -> u64 {
    5
}
