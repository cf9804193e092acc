#![allow(dead_code)]

mod mocks;

pub use mocks::{MockUpstreamResolver, RecordingHub};

use labelns_application::pipeline::{HandlerContext, HandlerRegistry};
use labelns_application::use_cases::ResolveQueryUseCase;
use labelns_domain::{DnsConfig, DnsQuery, PeerEndpoint, RecordType};
use std::sync::Arc;

pub const PEER: &str = "203.0.113.9:5353";

pub fn dns_config(zones: &[&str]) -> DnsConfig {
    DnsConfig {
        zones: zones.iter().map(|z| z.to_string()).collect(),
        ttl: 60,
        ..DnsConfig::default()
    }
}

pub fn udp_query(name: &str, record_type: RecordType) -> DnsQuery {
    DnsQuery::new(name, record_type, PeerEndpoint::udp(PEER.parse().unwrap()))
}

pub fn registry(context: &HandlerContext) -> Arc<HandlerRegistry> {
    Arc::new(HandlerRegistry::with_builtin_handlers(context))
}

pub fn use_case(config: DnsConfig) -> ResolveQueryUseCase {
    let dns = Arc::new(config);
    let context = HandlerContext::new(Arc::clone(&dns));
    ResolveQueryUseCase::new(dns, registry(&context))
}

pub fn use_case_with(
    config: DnsConfig,
    upstream: Option<Arc<MockUpstreamResolver>>,
    hub: Option<Arc<RecordingHub>>,
) -> ResolveQueryUseCase {
    let dns = Arc::new(config);
    let mut context = HandlerContext::new(Arc::clone(&dns));
    if let Some(upstream) = upstream {
        context = context.with_upstream(upstream);
    }
    if let Some(hub) = hub {
        context = context.with_hub(hub);
    }
    ResolveQueryUseCase::new(dns, registry(&context))
}
