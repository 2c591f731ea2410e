use crate::config::Config;
use crate::engine::pipeline::CheckEngine;
use crate::providers::ProviderRegistry;
use crate::services::CheckAggregator;
use std::sync::Arc;
use std::time::SystemTime;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<ProviderRegistry>,
    pub engine: Arc<CheckEngine>,
    pub aggregator: Arc<CheckAggregator>,
    pub start_time: SystemTime,
}
