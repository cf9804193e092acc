use labelns_domain::NotifyEvent;
use tokio::sync::broadcast;

/// Fan-out point for events produced by notify handlers.
pub trait NotificationHub: Send + Sync {
    /// Publishing never blocks and never fails; events for channels nobody
    /// listens to are only kept in the history.
    fn publish(&self, channel: &str, event: NotifyEvent);

    /// Recent events of a channel, oldest first.
    fn recent(&self, channel: &str) -> Vec<NotifyEvent>;

    /// `None` when the channel cannot be created.
    fn subscribe(&self, channel: &str) -> Option<broadcast::Receiver<NotifyEvent>>;

    fn channel_count(&self) -> usize;
}
