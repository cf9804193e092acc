use async_trait::async_trait;
use labelns_application::ports::{NotificationHub, UpstreamResolution, UpstreamResolver};
use labelns_domain::{DomainError, NotifyEvent, RecordType};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::broadcast;

pub struct MockUpstreamResolver {
    responses: Mutex<HashMap<(RecordType, String), (Vec<IpAddr>, u32)>>,
    should_fail: Mutex<bool>,
    call_count: AtomicUsize,
}

impl MockUpstreamResolver {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            should_fail: Mutex::new(false),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn set_response(&self, record_type: RecordType, name: &str, addresses: &[&str], ttl: u32) {
        let addresses = addresses.iter().map(|a| a.parse().unwrap()).collect();
        self.responses
            .lock()
            .unwrap()
            .insert((record_type, name.to_string()), (addresses, ttl));
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl Default for MockUpstreamResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpstreamResolver for MockUpstreamResolver {
    async fn resolve(
        &self,
        record_type: RecordType,
        name: &str,
    ) -> Result<UpstreamResolution, DomainError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::UpstreamTimeout);
        }

        self.responses
            .lock()
            .unwrap()
            .get(&(record_type, name.to_string()))
            .map(|(addresses, ttl)| UpstreamResolution::new(addresses.clone(), *ttl, false))
            .ok_or_else(|| DomainError::EmptyUpstreamAnswer(name.to_string()))
    }
}

/// Hub that only remembers what was published.
#[derive(Default)]
pub struct RecordingHub {
    events: Mutex<Vec<(String, NotifyEvent)>>,
}

impl RecordingHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, NotifyEvent)> {
        self.events.lock().unwrap().clone()
    }
}

impl NotificationHub for RecordingHub {
    fn publish(&self, channel: &str, event: NotifyEvent) {
        self.events
            .lock()
            .unwrap()
            .push((channel.to_string(), event));
    }

    fn recent(&self, channel: &str) -> Vec<NotifyEvent> {
        self.events()
            .into_iter()
            .filter(|(c, _)| c == channel)
            .map(|(_, e)| e)
            .collect()
    }

    fn subscribe(&self, _channel: &str) -> Option<broadcast::Receiver<NotifyEvent>> {
        None
    }

    fn channel_count(&self) -> usize {
        0
    }
}
