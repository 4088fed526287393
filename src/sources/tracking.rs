use std::sync::Arc;
use std::time::Duration;

use http::header::AUTHORIZATION;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::config::settings::ClientConfig;
use crate::errors::{Error, Result};
use crate::helpers::time::get_instant;
use crate::observability::metrics::{get_metrics, outcome_label};
use crate::sources::oauth2::TokenManager;
use crate::sources::{read_success_body, with_deadline, RequestOptions};
use crate::utils::constants::{TRACK_DETAILS_PATH, TRANSACTION_SRC, TRANSACTION_SRC_HEADER, TRANS_ID_HEADER};

/// Options for a tracking lookup: timeout plus query parameters forwarded verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingOptions {
    pub timeout: Option<Duration>,
    pub query: Vec<(String, String)>,
}

impl TrackingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Response language, e.g. `en_US`.
    pub fn locale(self, locale: impl Into<String>) -> Self {
        self.param("locale", locale)
    }

    pub fn return_signature(self, enabled: bool) -> Self {
        self.param("returnSignature", enabled.to_string())
    }

    pub fn return_milestones(self, enabled: bool) -> Self {
        self.param("returnMilestones", enabled.to_string())
    }

    /// Include proof of delivery.
    pub fn return_pod(self, enabled: bool) -> Self {
        self.param("returnPOD", enabled.to_string())
    }

    fn request_options(&self) -> RequestOptions {
        RequestOptions { timeout: self.timeout }
    }
}

/// Body of a successful tracking lookup. Unknown fields are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackingResult {
    #[serde(rename = "trackResponse", default, skip_serializing_if = "Option::is_none")]
    pub track_response: Option<TrackResponse>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackResponse {
    #[serde(default)]
    pub shipment: Vec<Shipment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inquiry_number: Option<String>,
    #[serde(default)]
    pub package: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TrackingResult {
    pub fn shipments(&self) -> &[Shipment] {
        self.track_response
            .as_ref()
            .map(|response| response.shipment.as_slice())
            .unwrap_or_default()
    }
}

/// Shipment tracking lookups, authorized with tokens from a [`TokenManager`].
#[derive(Debug, Clone)]
pub struct TrackingClient {
    config: Arc<ClientConfig>,
    client: Client,
    tokens: TokenManager,
}

impl TrackingClient {
    pub fn new(config: Arc<ClientConfig>, client: Client, tokens: TokenManager) -> Self {
        Self { config, client, tokens }
    }

    /// `{environment_url}/api/track/v1/details/{inquiry_number}?{query}`.
    /// The inquiry number is not validated; the endpoint decides.
    pub fn tracking_url(&self, inquiry_number: &str, query: &[(String, String)]) -> Result<Url> {
        let raw = format!("{}{}{}", self.config.environment_url, TRACK_DETAILS_PATH, inquiry_number);
        let mut url = Url::parse(&raw).map_err(|e| Error::url(&raw, e))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    pub async fn get_tracking(&self, inquiry_number: &str, options: &TrackingOptions) -> Result<TrackingResult> {
        let token = self.tokens.get_access_token(&options.request_options()).await?;
        let url = self.tracking_url(inquiry_number, &options.query)?;
        let metrics = get_metrics().await;
        let start = get_instant();

        let result = self.lookup(url, &token.authorization_header(), options).await;

        let outcome = outcome_label(&result);
        metrics.tracking_requests.with_label_values(&[outcome]).inc();
        metrics
            .tracking_duration
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());
        if result.is_ok() {
            info!("tracking lookup for '{}' succeeded", inquiry_number);
        }
        result
    }

    async fn lookup(&self, url: Url, authorization: &str, options: &TrackingOptions) -> Result<TrackingResult> {
        let endpoint = url.to_string();
        let timeout = options.request_options().timeout_or(self.config.default_timeout());
        let trans_id = Uuid::new_v4().to_string();
        debug!("tracking request {} transId={}", endpoint, trans_id);

        let request = self
            .client
            .get(url)
            .header(AUTHORIZATION, authorization)
            .header(TRANS_ID_HEADER, trans_id)
            .header(TRANSACTION_SRC_HEADER, TRANSACTION_SRC);

        let body = with_deadline(&endpoint, timeout, async {
            let response = request.send().await.map_err(|e| Error::transport(&endpoint, e))?;
            read_success_body(&endpoint, response).await
        })
        .await?;

        serde_json::from_str(&body).map_err(|e| Error::decode(&endpoint, e))
    }
}
