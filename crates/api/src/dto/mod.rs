pub mod events;
pub mod stats;

pub use events::ChannelEventsResponse;
pub use stats::StatsResponse;
