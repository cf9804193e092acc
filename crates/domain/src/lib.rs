//! labelns domain layer
pub mod address_literal;
pub mod config;
pub mod dns_query;
pub mod dns_record;
pub mod errors;
pub mod notify_event;
pub mod peer;
pub mod zone;

pub use config::{CliOverrides, Config, ConfigError, DnsConfig};
pub use dns_query::DnsQuery;
pub use dns_record::{DnsRecord, RecordType};
pub use errors::DomainError;
pub use notify_event::NotifyEvent;
pub use peer::{PeerEndpoint, TransportKind};
pub use zone::{ZoneMatch, ZoneSet};
