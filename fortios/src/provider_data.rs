//! Provider data handed to every resource

use crate::api::Client;
use crate::config::ProviderConfig;
use std::sync::Arc;

#[derive(Clone)]
pub struct FortiosProviderData {
    pub client: Arc<Client>,
    pub config: Arc<ProviderConfig>,
}

impl FortiosProviderData {
    pub fn new(client: Client, config: ProviderConfig) -> Self {
        Self {
            client: Arc::new(client),
            config: Arc::new(config),
        }
    }
}
