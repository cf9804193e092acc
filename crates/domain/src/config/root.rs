use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use super::dns::DnsConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::notify::NotifyConfig;
use super::server::ServerConfig;
use super::upstream::UpstreamConfig;

/// Main configuration structure for labelns
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Zones, default answers and pipeline caching
    #[serde(default)]
    pub dns: DnsConfig,

    /// Upstream resolver used by the proxy handler
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Notification hub and its HTTP surface
    #[serde(default)]
    pub notify: NotifyConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. labelns.toml in current directory
    /// 3. /etc/labelns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("labelns.toml").exists() {
            Self::from_file("labelns.toml")?
        } else if std::path::Path::new("/etc/labelns/config.toml").exists() {
            Self::from_file("/etc/labelns/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        config.normalize_zones();
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(listen) = overrides.listen {
            self.server.listen = listen;
        }
        if let Some(socket) = overrides.unix_socket {
            self.server.unix_socket = Some(socket);
        }
        if !overrides.zones.is_empty() {
            self.dns.zones = overrides.zones;
        }
        if let Some(ip) = overrides.ipv4 {
            self.dns.ipv4 = ip;
        }
        if let Some(ip) = overrides.ipv6 {
            self.dns.ipv6 = ip;
        }
        if let Some(ttl) = overrides.ttl {
            self.dns.ttl = ttl;
        }
        if let Some(sticky) = overrides.sticky_ttl_secs {
            self.dns.sticky_ttl_secs = sticky;
        }
        if let Some(use_default) = overrides.use_default {
            self.dns.use_default = use_default;
        }
        if let Some(upstream) = overrides.upstream {
            self.upstream.address = upstream;
        }
        if overrides.no_proxy {
            self.upstream.proxy_enabled = false;
        }
        if overrides.notify {
            self.notify.enabled = true;
        }
        if let Some(bind) = overrides.web_bind {
            self.notify.web_bind = bind;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Lowercases zones and gives each a trailing dot.
    fn normalize_zones(&mut self) {
        for zone in &mut self.dns.zones {
            let mut normalized = zone.trim().to_ascii_lowercase();
            if !normalized.ends_with('.') {
                normalized.push('.');
            }
            *zone = normalized;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dns.zones.is_empty() {
            return Err(ConfigError::Validation(
                "empty zone list, provide at least one zone".to_string(),
            ));
        }

        if self.dns.zones.iter().any(|z| z.trim_end_matches('.').contains("..")) {
            return Err(ConfigError::Validation(
                "zone names cannot contain empty labels".to_string(),
            ));
        }

        if self.dns.cache_size == 0 {
            return Err(ConfigError::Validation(
                "pipeline cache size cannot be 0".to_string(),
            ));
        }

        if self.upstream.cache_size == 0 {
            return Err(ConfigError::Validation(
                "upstream cache size cannot be 0".to_string(),
            ));
        }

        parse_socket_addr("server.listen", &self.server.listen)?;

        if self.upstream.proxy_enabled {
            parse_socket_addr("upstream.address", &self.upstream.address)?;
        }

        if self.notify.enabled {
            parse_socket_addr("notify.web_bind", &self.notify.web_bind)?;
            if self.notify.history_size == 0 {
                return Err(ConfigError::Validation(
                    "notify history size cannot be 0".to_string(),
                ));
            }
        }

        Ok(())
    }
}

pub fn parse_socket_addr(field: &str, value: &str) -> Result<SocketAddr, ConfigError> {
    value.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!("{} '{}' is not a socket address: {}", field, value, e))
    })
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub listen: Option<String>,
    pub unix_socket: Option<String>,
    pub zones: Vec<String>,
    pub ipv4: Option<Ipv4Addr>,
    pub ipv6: Option<Ipv6Addr>,
    pub ttl: Option<u32>,
    pub sticky_ttl_secs: Option<u64>,
    pub use_default: Option<bool>,
    pub upstream: Option<String>,
    pub no_proxy: bool,
    pub notify: bool,
    pub web_bind: Option<String>,
    pub log_level: Option<String>,
}
