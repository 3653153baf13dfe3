use std::sync::Arc;

use reqwest::Client;

use crate::config::AppConfig;
use crate::services::fetcher::Fetcher;
use crate::services::storage::{self, Storage};

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub fetcher: Fetcher,
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let client = Client::new();
        let storage = storage::from_config(&config.storage, client.clone());
        Self::with_storage(config, client, storage)
    }

    pub fn with_storage(config: AppConfig, client: Client, storage: Arc<dyn Storage>) -> Self {
        let fetcher = Fetcher::new(client, config.ffmpeg_path.clone());
        Self {
            config,
            fetcher,
            storage,
        }
    }
}
