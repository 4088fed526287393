//! Shared constants and invariants

/// UPS Customer Integration Environment (sandbox).
pub const SANDBOX_URL: &str = "https://wwwcie.ups.com";
pub const PRODUCTION_URL: &str = "https://onlinetools.ups.com";

pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;

// Endpoint paths, appended verbatim to the environment url
pub const OAUTH_TOKEN_PATH: &str = "/security/v1/oauth/token";
pub const TRACK_DETAILS_PATH: &str = "/api/track/v1/details/";

pub const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";

// Tracking request headers
pub const TRANS_ID_HEADER: &str = "transId";
pub const TRANSACTION_SRC_HEADER: &str = "transactionSrc";
pub const TRANSACTION_SRC: &str = "ups";
