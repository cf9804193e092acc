use serde::Serialize;

#[derive(Serialize, Debug, Clone)]
pub struct StatsResponse {
    pub uptime_secs: u64,
    pub zones: Vec<String>,
    pub cached_pipelines: usize,
    pub notification_channels: usize,
}
