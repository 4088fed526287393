use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::cache::inflight::KeyedGuards;
use crate::cache::token::CachedToken;
use crate::cache::token_cache::TokenStore;
use crate::config::settings::ClientConfig;
use crate::errors::{Error, Result};
use crate::helpers::time::get_instant;
use crate::observability::metrics::{get_metrics, outcome_label};
use crate::sources::{read_success_body, with_deadline, RequestOptions};
use crate::utils::constants::{GRANT_TYPE_CLIENT_CREDENTIALS, OAUTH_TOKEN_PATH};

/// OAuth client-credentials token acquisition backed by a [`TokenStore`].
#[derive(Debug, Clone)]
pub struct TokenManager {
    config: Arc<ClientConfig>,
    client: Client,
    store: Arc<dyn TokenStore>,
    guards: KeyedGuards,
}

impl TokenManager {
    pub fn new(config: Arc<ClientConfig>, client: Client, store: Arc<dyn TokenStore>) -> Self {
        Self { config, client, store, guards: KeyedGuards::new() }
    }

    /// `{environment_url}/security/v1/oauth/token`, joined as plain text.
    pub fn token_endpoint(&self) -> String {
        format!("{}{}", self.config.environment_url, OAUTH_TOKEN_PATH)
    }

    /// Cache slot for this environment + client id pair.
    pub fn cache_key(&self) -> String {
        format!("{}?client_id={}", self.token_endpoint(), self.config.client_id)
    }

    /// Cached token for this client, or a fresh one from the token endpoint.
    ///
    /// The timeout bounds everything after the cache miss: waiting on a
    /// concurrent exchange for the same key, and this caller's own exchange.
    pub async fn get_access_token(&self, options: &RequestOptions) -> Result<CachedToken> {
        let endpoint = self.token_endpoint();
        let url = Url::parse(&endpoint).map_err(|e| Error::url(&endpoint, e))?;
        let key = self.cache_key();
        let timeout = options.timeout_or(self.config.default_timeout());
        let metrics = get_metrics().await;

        if let Some(token) = self.store.get(&key).await {
            metrics.token_lookups.with_label_values(&["hit"]).inc();
            debug!("token cache hit for client '{}'", self.config.client_id);
            return Ok(token);
        }
        metrics.token_lookups.with_label_values(&["miss"]).inc();

        with_deadline(&endpoint, timeout, async {
            if !self.config.coalesce_token_requests {
                return self.exchange_and_store(url, &key).await;
            }

            let _inflight = self.guards.acquire(&key).await;
            // another caller may have filled the slot while we waited
            if let Some(token) = self.store.get(&key).await {
                debug!("token for client '{}' fetched by a concurrent caller", self.config.client_id);
                return Ok(token);
            }
            self.exchange_and_store(url, &key).await
        })
        .await
    }

    async fn exchange_and_store(&self, url: Url, key: &str) -> Result<CachedToken> {
        let metrics = get_metrics().await;
        let start = get_instant();

        info!("requesting access token for client '{}'", self.config.client_id);
        let result = self.exchange(url).await;

        let outcome = outcome_label(&result);
        metrics.token_exchanges.with_label_values(&[outcome]).inc();
        metrics
            .token_exchange_duration
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());

        let token = result?;
        let ttl = Duration::from_millis(token.cache_ttl_millis());
        self.store.put(key, token.clone(), ttl).await;
        info!(
            "access token for client '{}' fetched in {} ms, cached for {} ms",
            self.config.client_id,
            start.elapsed().as_millis(),
            ttl.as_millis()
        );
        Ok(token)
    }

    async fn exchange(&self, url: Url) -> Result<CachedToken> {
        let endpoint = url.to_string();
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", GRANT_TYPE_CLIENT_CREDENTIALS),
        ];

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, basic_authorization(&self.config.client_id, &self.config.client_secret))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&form[..])
            .send()
            .await
            .map_err(|e| Error::transport(&endpoint, e))?;
        let body = read_success_body(&endpoint, response).await?;

        CachedToken::from_json(&body).map_err(|e| Error::decode(&endpoint, e))
    }
}

pub fn basic_authorization(client_id: &str, client_secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", client_id, client_secret)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cache::token_cache::TokenCache;

    fn manager(environment_url: &str, client_id: &str) -> TokenManager {
        let config = ClientConfig::new(client_id, "secret").with_environment_url(environment_url);
        TokenManager::new(Arc::new(config), Client::new(), Arc::new(TokenCache::new()))
    }

    #[test]
    fn cache_key_combines_endpoint_and_client_id() {
        let m = manager("https://wwwcie.ups.com", "abc");
        assert_eq!(m.token_endpoint(), "https://wwwcie.ups.com/security/v1/oauth/token");
        assert_eq!(m.cache_key(), "https://wwwcie.ups.com/security/v1/oauth/token?client_id=abc");
        assert_ne!(m.cache_key(), manager("https://onlinetools.ups.com", "abc").cache_key());
        assert_ne!(m.cache_key(), manager("https://wwwcie.ups.com", "abd").cache_key());
    }

    #[test]
    fn basic_authorization_encodes_id_and_secret() {
        assert_eq!(basic_authorization("user", "pass"), "Basic dXNlcjpwYXNz");
    }
}
