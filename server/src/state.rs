use std::{sync::Arc, time::Duration};

use places::PlacesClient;

use super::{config::Config, session::SessionStore};

pub struct AppState {
    pub config: Config,
    pub places: PlacesClient,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new() -> Arc<Self> {
        Self::with_config(Config::load())
    }

    pub fn with_config(config: Config) -> Arc<Self> {
        let places = PlacesClient::new(config.places_url.clone(), config.google_key.clone())
            .with_delays(
                Duration::from_millis(config.token_settle_ms),
                Duration::from_millis(config.token_retry_ms),
            );

        Arc::new(Self {
            config,
            places,
            sessions: SessionStore::default(),
        })
    }
}
