use labelns_application::ports::NotificationHub;
use labelns_application::use_cases::ResolveQueryUseCase;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<dyn NotificationHub>,
    pub resolve_query: Arc<ResolveQueryUseCase>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(hub: Arc<dyn NotificationHub>, resolve_query: Arc<ResolveQueryUseCase>) -> Self {
        Self {
            hub,
            resolve_query,
            started_at: Instant::now(),
        }
    }
}
