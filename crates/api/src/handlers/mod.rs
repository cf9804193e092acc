pub mod events;
pub mod health;
pub mod stats;

pub use events::{get_channel_events, stream_channel_events};
pub use health::health_check;
pub use stats::get_stats;
