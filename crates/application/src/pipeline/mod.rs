//! Turning the labels of a query name into a chain of handlers, and running
//! that chain.
mod builder;
mod cache;
mod handler;
mod limiter;
mod registry;
mod runner;
mod token_stream;

pub use builder::PipelineBuilder;
pub use cache::PipelineCache;
pub use handler::{Contribution, Handler};
pub use limiter::{SharedLimiter, Unlimited, UsageLimiter, UseBudget};
pub use registry::{HandlerContext, HandlerRegistry};
pub use runner::Pipeline;
pub use token_stream::TokenStream;
