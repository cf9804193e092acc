#![allow(dead_code)]

pub mod dns_server_mock;

use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{Name, RecordType};
use labelns_application::pipeline::{HandlerContext, HandlerRegistry};
use labelns_application::ports::UpstreamResolver;
use labelns_application::use_cases::ResolveQueryUseCase;
use labelns_domain::{DnsConfig, PeerEndpoint};
use labelns_infrastructure::dns::forwarding::MessageBuilder;
use labelns_infrastructure::dns::DnsServerHandler;
use std::str::FromStr;
use std::sync::Arc;

pub const PEER: &str = "203.0.113.9:5353";

pub fn udp_peer() -> PeerEndpoint {
    PeerEndpoint::udp(PEER.parse().unwrap())
}

pub fn tcp_peer() -> PeerEndpoint {
    PeerEndpoint::tcp(PEER.parse().unwrap())
}

pub fn dns_config(zones: &[&str]) -> DnsConfig {
    DnsConfig {
        zones: zones.iter().map(|z| z.to_string()).collect(),
        ttl: 60,
        ..DnsConfig::default()
    }
}

pub fn server_handler(config: DnsConfig) -> DnsServerHandler {
    server_handler_with(config, None)
}

pub fn server_handler_with(
    config: DnsConfig,
    upstream: Option<Arc<dyn UpstreamResolver>>,
) -> DnsServerHandler {
    let dns = Arc::new(config);
    let mut context = HandlerContext::new(Arc::clone(&dns));
    if let Some(upstream) = upstream {
        context = context.with_upstream(upstream);
    }
    let registry = Arc::new(HandlerRegistry::with_builtin_handlers(&context));
    DnsServerHandler::new(Arc::new(ResolveQueryUseCase::new(dns, registry)))
}

pub fn request_bytes(id: u16, name: &str, record_type: RecordType) -> Vec<u8> {
    let mut query = Query::new();
    query.set_name(Name::from_str(name).unwrap());
    query.set_query_type(record_type);

    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);
    MessageBuilder::serialize_message(&message).unwrap()
}

pub fn parse_response(bytes: &[u8]) -> Message {
    Message::from_vec(bytes).expect("response parses")
}
