pub mod dns;
pub mod group;
pub mod web;

pub use dns::start_dns_listeners;
pub use group::ServerGroup;
pub use web::start_web_server;
