use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Access token returned by the UPS OAuth client-credentials endpoint.
///
/// `raw` keeps the complete response object (`issued_at`, `status`,
/// `refresh_count`, ...) next to the fields the client relies on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64, // seconds, as reported by the server
    pub client_id: String,
    pub raw: Value,
}

#[derive(Debug, Deserialize)]
struct TokenFields {
    access_token: String,
    token_type: String,
    #[serde(deserialize_with = "seconds_from_str_or_number")]
    expires_in: u64,
    #[serde(default)]
    client_id: String,
}

impl CachedToken {
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        let raw: Value = serde_json::from_str(body)?;
        let fields = TokenFields::deserialize(&raw)?;
        Ok(Self {
            access_token: fields.access_token,
            token_type: fields.token_type,
            expires_in: fields.expires_in,
            client_id: fields.client_id,
            raw,
        })
    }

    /// Value for the `Authorization` header of subsequent API calls.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// Cache lifetime: half of the server-reported validity, in milliseconds.
    pub fn cache_ttl_millis(&self) -> u64 {
        self.expires_in.saturating_mul(1000) / 2
    }
}

// UPS sends `"expires_in": "14399"`; fractional seconds are floored
fn seconds_from_str_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Whole(u64),
        Fractional(f64),
        Text(String),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::Whole(n) => Ok(n),
        Seconds::Fractional(f) => whole_seconds(f).map_err(serde::de::Error::custom),
        Seconds::Text(s) => {
            let s = s.trim();
            match s.parse::<u64>() {
                Ok(n) => Ok(n),
                Err(_) => s
                    .parse::<f64>()
                    .map_err(serde::de::Error::custom)
                    .and_then(|f| whole_seconds(f).map_err(serde::de::Error::custom)),
            }
        }
    }
}

fn whole_seconds(value: f64) -> Result<u64, String> {
    if value.is_finite() && value >= 0.0 {
        Ok(value.floor() as u64)
    } else {
        Err(format!("invalid expires_in: {}", value))
    }
}
