mod notification_hub;
mod upstream_resolver;

pub use notification_hub::NotificationHub;
pub use upstream_resolver::{UpstreamResolution, UpstreamResolver};

// Re-export for convenience
pub use labelns_domain::DnsQuery;
