//! Configuration types for the Payload provider.

use std::env;
use std::time::Duration;

/// Default Payload server URL.
const DEFAULT_PAYLOAD_URL: &str = "http://localhost:3000";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default page size for `find`; large enough to read a portfolio-sized collection in one page.
const DEFAULT_FIND_LIMIT: u32 = 10_000;

/// Collection that owns the API keys.
const DEFAULT_AUTH_COLLECTION: &str = "users";

/// Credentials used to authenticate against the REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadAuth {
    /// No authorization header; only works against open-access collections.
    Anonymous,
    /// `Authorization: {collection} API-Key {key}`
    ApiKey { collection: String, key: String },
    /// Log in through `POST /api/{collection}/login` and send the returned JWT.
    Login {
        collection: String,
        email: String,
        password: String,
    },
}

/// Configuration for the Payload REST provider.
#[derive(Debug, Clone)]
pub struct PayloadConfig {
    /// Base URL of the Payload server, without the `/api` suffix.
    pub url: String,
    pub auth: PayloadAuth,
    pub timeout: Duration,
    /// Page size used by `find`.
    pub find_limit: u32,
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PAYLOAD_URL.to_string(),
            auth: PayloadAuth::Anonymous,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            find_limit: DEFAULT_FIND_LIMIT,
        }
    }
}

impl PayloadConfig {
    /// Read the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `PAYLOAD_URL`: server URL (default: http://localhost:3000)
    /// - `PAYLOAD_API_KEY`: API key; takes precedence over email/password
    /// - `PAYLOAD_AUTH_COLLECTION`: collection owning the credentials (default: users)
    /// - `PAYLOAD_EMAIL` / `PAYLOAD_PASSWORD`: login credentials
    /// - `PAYLOAD_TIMEOUT_SECS`: request timeout (default: 30)
    /// - `PAYLOAD_FIND_LIMIT`: page size for reads (default: 10000)
    pub fn from_env() -> Self {
        let url = env::var("PAYLOAD_URL").unwrap_or_else(|_| DEFAULT_PAYLOAD_URL.to_string());
        let collection = env::var("PAYLOAD_AUTH_COLLECTION")
            .unwrap_or_else(|_| DEFAULT_AUTH_COLLECTION.to_string());

        let auth = match (
            env::var("PAYLOAD_API_KEY").ok(),
            env::var("PAYLOAD_EMAIL").ok(),
            env::var("PAYLOAD_PASSWORD").ok(),
        ) {
            (Some(key), _, _) if !key.is_empty() => PayloadAuth::ApiKey { collection, key },
            (_, Some(email), Some(password)) => PayloadAuth::Login {
                collection,
                email,
                password,
            },
            _ => PayloadAuth::Anonymous,
        };

        let timeout = env::var("PAYLOAD_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let find_limit = env::var("PAYLOAD_FIND_LIMIT")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_FIND_LIMIT);

        Self {
            url,
            auth,
            timeout: Duration::from_secs(timeout),
            find_limit,
        }
    }

    /// Create a config for the given URL with default settings.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}
