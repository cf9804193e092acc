//! Adapters for labelns: DNS wire handling, upstream transport and the
//! in-memory notification hub.
pub mod dns;
pub mod notify;
