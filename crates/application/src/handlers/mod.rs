//! Built-in handlers and their label tags.
mod default;
mod fixed_address;
mod group;
mod notify;
mod peer_echo;
mod proxy;

pub use default::DefaultHandler;
pub use fixed_address::{AddressFamily, FixedAddressHandler};
pub use group::{GroupHandler, GroupMode};
pub use notify::NotifyHandler;
pub use peer_echo::PeerEchoHandler;
pub use proxy::ProxyHandler;

use std::sync::Arc;

use crate::pipeline::{HandlerContext, HandlerRegistry};

pub const DEFAULT_TAG: &str = "d";

pub fn register_builtin(registry: &mut HandlerRegistry, context: &HandlerContext) {
    let ttl = context.dns.ttl;

    registry.register(&["4", "v4"], move |limiter| {
        Box::new(FixedAddressHandler::new(AddressFamily::V4, ttl, limiter))
    });
    registry.register(&["6", "v6"], move |limiter| {
        Box::new(FixedAddressHandler::new(AddressFamily::V6, ttl, limiter))
    });
    registry.register(&["lo", "loopback"], move |_| Box::new(PeerEchoHandler::new(ttl)));

    let dns = Arc::clone(&context.dns);
    registry.register(&[DEFAULT_TAG, "default"], move |_| {
        Box::new(DefaultHandler::new(Arc::clone(&dns)))
    });

    let hub = context.hub.clone();
    registry.register(&["n", "notify"], move |limiter| {
        Box::new(NotifyHandler::new(hub.clone(), limiter))
    });

    let upstream = context.upstream.clone();
    registry.register(&["p", "proxy"], move |limiter| {
        Box::new(ProxyHandler::new(upstream.clone(), limiter))
    });

    registry.register(&["l", "loop"], |_| Box::new(GroupHandler::new(GroupMode::RoundRobin)));
    registry.register(&["m", "multi"], |_| Box::new(GroupHandler::new(GroupMode::FanOut)));
}
