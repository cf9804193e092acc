pub mod forwarding;
pub mod proxy_protocol;
pub mod resolver;
pub mod server;
pub mod transport;

pub use proxy_protocol::{read_proxy_header, ProxyHeader, ProxyProtocolError};
pub use resolver::{CachedResolver, CoreResolver};
pub use server::DnsServerHandler;
pub use transport::{DnsTransport, TcpTransport};
