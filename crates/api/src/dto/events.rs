use labelns_domain::NotifyEvent;
use serde::Serialize;

#[derive(Serialize, Debug, Clone)]
pub struct ChannelEventsResponse {
    pub channel: String,
    pub count: usize,
    /// Oldest first.
    pub events: Vec<NotifyEvent>,
}
