use crate::dns::forwarding::{MessageBuilder, RecordTypeMapper};
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA};
use hickory_proto::rr::{RData, Record};
use labelns_application::use_cases::ResolveQueryUseCase;
use labelns_domain::{DnsQuery, DnsRecord, DomainError, PeerEndpoint, TransportKind};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Largest response sent over UDP without EDNS; anything bigger is truncated.
pub const MAX_UDP_RESPONSE_SIZE: usize = 512;

const DNS_HEADER_LEN: usize = 12;

/// Turns wire-format requests into wire-format responses.
#[derive(Clone)]
pub struct DnsServerHandler {
    use_case: Arc<ResolveQueryUseCase>,
}

impl DnsServerHandler {
    pub fn new(use_case: Arc<ResolveQueryUseCase>) -> Self {
        Self { use_case }
    }

    /// Handles one request. `None` means nothing should be sent back: the
    /// packet was not a request or was too short to carry a header.
    pub async fn handle_raw(&self, request_bytes: &[u8], peer: PeerEndpoint) -> Option<Vec<u8>> {
        let request = match Message::from_vec(request_bytes) {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, peer = %peer, len = request_bytes.len(), "Unparsable request");
                return format_error_response(request_bytes);
            }
        };

        if request.message_type() != MessageType::Query {
            debug!(peer = %peer, "Ignoring DNS response sent to server");
            return None;
        }

        let response = self.handle_message(&request, peer).await;
        let bytes = match MessageBuilder::serialize_message(&response) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(error = %e, "Failed to serialize response");
                let fallback = empty_response(&request, ResponseCode::ServFail);
                MessageBuilder::serialize_message(&fallback).ok()?
            }
        };

        if peer.transport == TransportKind::Udp && bytes.len() > MAX_UDP_RESPONSE_SIZE {
            debug!(size = bytes.len(), peer = %peer, "Response truncated for UDP");
            let mut truncated = empty_response(&request, response.response_code());
            truncated.set_truncated(true);
            return MessageBuilder::serialize_message(&truncated).ok();
        }

        Some(bytes)
    }

    pub async fn handle_message(&self, request: &Message, peer: PeerEndpoint) -> Message {
        if request.op_code() != OpCode::Query {
            debug!(op_code = ?request.op_code(), "Unsupported opcode");
            return empty_response(request, ResponseCode::NotImp);
        }

        let Some(question) = request.queries().first() else {
            return empty_response(request, ResponseCode::FormErr);
        };

        let name = question.name().to_utf8();
        let Some(record_type) = RecordTypeMapper::from_hickory(question.query_type()) else {
            let rcode = if self.use_case.is_authoritative(&name) {
                ResponseCode::NoError
            } else {
                ResponseCode::NXDomain
            };
            debug!(
                name = %name,
                record_type = ?question.query_type(),
                rcode = ?rcode,
                "Record type not served"
            );
            return empty_response(request, rcode);
        };

        let query = DnsQuery::new(&name, record_type, peer);

        match self.use_case.execute(&query).await {
            Ok(records) => {
                let mut response = empty_response(request, ResponseCode::NoError);
                for record in &records {
                    response.add_answer(to_wire_record(question, record));
                }
                response
            }
            Err(DomainError::NotAuthoritative(name)) => {
                debug!(name = %name, "Name outside served zones");
                empty_response(request, ResponseCode::NXDomain)
            }
            Err(e) => {
                warn!(
                    name = %query.name,
                    record_type = %query.record_type,
                    peer = %peer,
                    error = %e,
                    "Query failed"
                );
                empty_response(request, ResponseCode::ServFail)
            }
        }
    }
}

/// Authoritative response skeleton echoing the request's id, opcode, RD bit
/// and question.
fn empty_response(request: &Message, code: ResponseCode) -> Message {
    let mut response = Message::new(request.id(), MessageType::Response, request.op_code());
    response.set_authoritative(true);
    response.set_recursion_desired(request.recursion_desired());
    response.set_response_code(code);
    if let Some(question) = request.queries().first() {
        response.add_query(question.clone());
    }
    response
}

/// FORMERR for requests whose header can still be read.
fn format_error_response(request_bytes: &[u8]) -> Option<Vec<u8>> {
    if request_bytes.len() < DNS_HEADER_LEN {
        return None;
    }
    // QR set means the packet is a response; never answer those.
    if request_bytes[2] & 0x80 != 0 {
        return None;
    }

    let id = u16::from_be_bytes([request_bytes[0], request_bytes[1]]);
    let mut response = Message::new(id, MessageType::Response, OpCode::Query);
    response.set_recursion_desired(request_bytes[2] & 0x01 != 0);
    response.set_response_code(ResponseCode::FormErr);
    MessageBuilder::serialize_message(&response).ok()
}

fn to_wire_record(question: &Query, record: &DnsRecord) -> Record {
    let rdata = match record.address {
        IpAddr::V4(ipv4) => RData::A(A(ipv4)),
        IpAddr::V6(ipv6) => RData::AAAA(AAAA(ipv6)),
    };
    Record::from_rdata(question.name().clone(), record.ttl, rdata)
}
