// tests/common/mod.rs
pub use httpmock::Method::{GET, POST};
pub use httpmock::MockServer;
pub use serde_json::json;

use httpmock::Mock;
use serde_json::Value;
use std::sync::Arc;

use crate::cache::token_cache::TokenCache;
use crate::client::UpsClient;
use crate::config::settings::ClientConfig;
use crate::sources::oauth2::basic_authorization;
use crate::utils::constants::{OAUTH_TOKEN_PATH, TRACK_DETAILS_PATH};

pub const CLIENT_ID: &str = "test-client-id";
pub const CLIENT_SECRET: &str = "test-client-secret";
pub const TEST_INQUIRY_NUMBER: &str = "1Z5338FF0107231059";

/// Token body shaped like the UPS sandbox response (`expires_in` is a string).
pub fn token_body(access_token: &str, expires_in: u64) -> Value {
    json!({
        "token_type": "Bearer",
        "issued_at": "1700000000000",
        "client_id": CLIENT_ID,
        "access_token": access_token,
        "expires_in": expires_in.to_string(),
        "status": "approved"
    })
}

pub fn tracking_body(inquiry_number: &str) -> Value {
    json!({
        "trackResponse": {
            "shipment": [{
                "inquiryNumber": inquiry_number,
                "package": [{
                    "trackingNumber": inquiry_number,
                    "currentStatus": { "description": "Delivered", "code": "011" }
                }],
                "userRelation": []
            }]
        }
    })
}

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(CLIENT_ID, CLIENT_SECRET).with_environment_url(server.base_url())
}

/// Client with its own cache, isolated from other tests.
pub fn client_with_cache(config: ClientConfig, cache: TokenCache) -> UpsClient {
    UpsClient::builder(config)
        .token_store(Arc::new(cache))
        .build()
        .expect("ups client")
}

pub fn isolated_client(server: &MockServer) -> UpsClient {
    client_with_cache(config_for(server), TokenCache::new())
}

/// Token endpoint that checks the full client-credentials request shape.
pub async fn mock_token_endpoint<'a>(server: &'a MockServer, body: &Value) -> Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(OAUTH_TOKEN_PATH)
                .header("authorization", basic_authorization(CLIENT_ID, CLIENT_SECRET))
                .header("content-type", "application/x-www-form-urlencoded")
                .form_urlencoded_tuple("client_id", CLIENT_ID)
                .form_urlencoded_tuple("client_secret", CLIENT_SECRET)
                .form_urlencoded_tuple("grant_type", "client_credentials");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(body.clone());
        })
        .await
}

pub async fn mock_tracking_endpoint<'a>(server: &'a MockServer, access_token: &str, inquiry_number: &str) -> Mock<'a> {
    let path = format!("{}{}", TRACK_DETAILS_PATH, inquiry_number);
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(path.as_str())
                .header("authorization", format!("Bearer {}", access_token))
                .header_exists("transid")
                .header("transactionsrc", "ups");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(tracking_body(inquiry_number));
        })
        .await
}
