use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::{DnsQuery, DnsRecord, PeerEndpoint, RecordType};

/// Placeholder published when a wrapped handler answered nothing.
pub const EMPTY_ANSWER: &str = "<empty>";

const MAX_CHANNEL_LEN: usize = 63;

/// One observation published to a notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyEvent {
    pub time: DateTime<Utc>,
    pub remote_ip: Option<IpAddr>,
    pub remote_port: Option<u16>,
    pub remote_network: String,
    pub name: String,
    pub qtype: String,
    pub rr: String,
    pub ok: bool,
}

impl NotifyEvent {
    pub fn answered(query: &DnsQuery, record: &DnsRecord) -> Self {
        Self::new(
            &query.name,
            Some(query.record_type),
            &query.peer,
            record.data_text(),
            true,
        )
    }

    pub fn empty(query: &DnsQuery) -> Self {
        Self::new(
            &query.name,
            Some(query.record_type),
            &query.peer,
            EMPTY_ANSWER.to_string(),
            true,
        )
    }

    pub fn failed(
        name: &str,
        record_type: Option<RecordType>,
        peer: &PeerEndpoint,
        error: impl Into<String>,
    ) -> Self {
        Self::new(name, record_type, peer, error.into(), false)
    }

    fn new(
        name: &str,
        record_type: Option<RecordType>,
        peer: &PeerEndpoint,
        rr: String,
        ok: bool,
    ) -> Self {
        Self {
            time: Utc::now(),
            remote_ip: peer.ip(),
            remote_port: peer.port(),
            remote_network: peer.transport.as_str().to_string(),
            name: name.to_string(),
            qtype: record_type
                .map(|t| t.as_str().to_string())
                .unwrap_or_else(|| "n/a".to_string()),
            rr,
            ok,
        }
    }
}

/// Channel identifiers are single DNS labels.
pub fn is_valid_channel(channel: &str) -> bool {
    !channel.is_empty()
        && channel.len() <= MAX_CHANNEL_LEN
        && channel
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
