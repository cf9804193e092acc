pub mod dns;
pub mod errors;
pub mod logging;
pub mod notify;
pub mod root;
pub mod server;
pub mod upstream;

pub use dns::DnsConfig;
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use notify::NotifyConfig;
pub use root::{parse_socket_addr, CliOverrides, Config};
pub use server::ServerConfig;
pub use upstream::UpstreamConfig;
