use crate::config::settings::AppConfig;
use crate::infrastructure::engine::TranscodeEngine;
use crate::modules::jobs::repository::JobRegistry;
use crate::workers::transcoder::TranscodeSupervisor;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub registry: Arc<dyn JobRegistry>,
    pub supervisor: TranscodeSupervisor,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        registry: Arc<dyn JobRegistry>,
        engine: Arc<dyn TranscodeEngine>,
    ) -> Self {
        let supervisor = TranscodeSupervisor::new(registry.clone(), engine);
        Self {
            config,
            registry,
            supervisor,
        }
    }
}
