use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    http: reqwest::Client,
    last_address: Arc<Mutex<Option<String>>>,
    encode_slots: Arc<Semaphore>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.lookup_timeout)
            .build()?;
        Ok(Self::with_http_client(config, http))
    }

    pub fn with_http_client(config: Config, http: reqwest::Client) -> Self {
        let encode_slots = Arc::new(Semaphore::new(config.max_concurrent_encodes.max(1)));

        Self {
            config: Arc::new(config),
            http,
            last_address: Arc::new(Mutex::new(None)),
            encode_slots,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn encode_slots(&self) -> Arc<Semaphore> {
        Arc::clone(&self.encode_slots)
    }

    /// Stores `address` as the most recently served one and reports whether it
    /// differs from the previous value.
    pub fn record_address(&self, address: &str) -> bool {
        let mut slot = self
            .last_address
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if slot.as_deref() == Some(address) {
            return false;
        }
        *slot = Some(address.to_string());
        true
    }
}
