use super::{PeerEndpoint, RecordType};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct DnsQuery {
    /// Lowercase, fully qualified (trailing dot).
    pub name: Arc<str>,
    pub record_type: RecordType,
    pub peer: PeerEndpoint,
}

impl DnsQuery {
    pub fn new(name: &str, record_type: RecordType, peer: PeerEndpoint) -> Self {
        Self {
            name: canonical_name(name).into(),
            record_type,
            peer,
        }
    }
}

/// Lowercases a name and makes it fully qualified.
pub fn canonical_name(name: &str) -> String {
    let mut canonical = name.trim().to_ascii_lowercase();
    if !canonical.ends_with('.') {
        canonical.push('.');
    }
    canonical
}
