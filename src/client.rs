//! Composition root: one configured client owning the token manager
//! and the tracking client that depends on it.

use std::sync::Arc;

use reqwest::Client;

use crate::cache::token::CachedToken;
use crate::cache::token_cache::{TokenCache, TokenStore};
use crate::config::settings::ClientConfig;
use crate::errors::{Error, Result};
use crate::sources::oauth2::TokenManager;
use crate::sources::tracking::{TrackingClient, TrackingOptions, TrackingResult};
use crate::sources::RequestOptions;

#[derive(Debug, Clone)]
pub struct UpsClient {
    config: Arc<ClientConfig>,
    tokens: TokenManager,
    tracking: TrackingClient,
}

impl UpsClient {
    /// Client backed by the process-wide [`TokenCache::shared`] cache.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: ClientConfig) -> UpsClientBuilder {
        UpsClientBuilder { config, http_client: None, store: None }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn token_manager(&self) -> &TokenManager {
        &self.tokens
    }

    /// OAuth bearer token for this client's credentials, cached for half its lifetime.
    pub async fn get_access_token(&self, options: &RequestOptions) -> Result<CachedToken> {
        self.tokens.get_access_token(options).await
    }

    /// Current status and activity of the shipment(s) behind `inquiry_number`.
    pub async fn get_tracking(&self, inquiry_number: &str, options: &TrackingOptions) -> Result<TrackingResult> {
        self.tracking.get_tracking(inquiry_number, options).await
    }
}

pub struct UpsClientBuilder {
    config: ClientConfig,
    http_client: Option<Client>,
    store: Option<Arc<dyn TokenStore>>,
}

impl UpsClientBuilder {
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<UpsClient> {
        let client = match self.http_client {
            Some(client) => client,
            None => Client::builder().build().map_err(Error::HttpClient)?,
        };
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(TokenCache::shared()) as Arc<dyn TokenStore>);
        let config = Arc::new(self.config);

        let tokens = TokenManager::new(config.clone(), client.clone(), store);
        let tracking = TrackingClient::new(config.clone(), client, tokens.clone());
        Ok(UpsClient { config, tokens, tracking })
    }
}
