use dashmap::DashMap;
use labelns_application::ports::NotificationHub;
use labelns_domain::NotifyEvent;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, warn};

const MIN_BROADCAST_CAPACITY: usize = 16;

struct Channel {
    sender: broadcast::Sender<NotifyEvent>,
    history: Mutex<VecDeque<NotifyEvent>>,
}

/// Per-channel event history plus live fan-out to subscribers.
///
/// Slow subscribers lag and lose events; publishers never wait.
pub struct InMemoryNotificationHub {
    channels: DashMap<String, Arc<Channel>>,
    history_size: usize,
    max_channels: usize,
}

impl InMemoryNotificationHub {
    pub fn new(history_size: usize, max_channels: usize) -> Self {
        Self {
            channels: DashMap::new(),
            history_size,
            max_channels,
        }
    }

    fn channel(&self, name: &str) -> Option<Arc<Channel>> {
        if let Some(channel) = self.channels.get(name) {
            return Some(Arc::clone(channel.value()));
        }

        if self.channels.len() >= self.max_channels {
            warn!(
                channel = %name,
                max_channels = self.max_channels,
                "Notification channel limit reached"
            );
            return None;
        }

        let channel = self
            .channels
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(channel = %name, "Notification channel created");
                let (sender, _) =
                    broadcast::channel(self.history_size.max(MIN_BROADCAST_CAPACITY));
                Arc::new(Channel {
                    sender,
                    history: Mutex::new(VecDeque::with_capacity(self.history_size)),
                })
            });
        Some(Arc::clone(channel.value()))
    }
}

impl NotificationHub for InMemoryNotificationHub {
    fn publish(&self, channel: &str, event: NotifyEvent) {
        let Some(target) = self.channel(channel) else {
            return;
        };

        if self.history_size > 0 {
            let mut history = target
                .history
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            while history.len() >= self.history_size {
                history.pop_front();
            }
            history.push_back(event.clone());
        }

        // No subscribers is the common case.
        let _ = target.sender.send(event);
    }

    fn recent(&self, channel: &str) -> Vec<NotifyEvent> {
        self.channels
            .get(channel)
            .map(|target| {
                target
                    .history
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .iter()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn subscribe(&self, channel: &str) -> Option<broadcast::Receiver<NotifyEvent>> {
        self.channel(channel).map(|target| target.sender.subscribe())
    }

    fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
