//! labelns application layer: the label pipeline and the use case driving it.
pub mod cache;
pub mod handlers;
pub mod pipeline;
pub mod ports;
pub mod use_cases;
