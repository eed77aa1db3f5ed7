use std::time::Duration;

/// Base URL of the Pwned Passwords range API. The 5-character prefix is appended.
pub const DEFAULT_ENDPOINT: &str = "https://api.pwnedpasswords.com/range/";

/// Environment variable overriding the range endpoint.
pub const ENDPOINT_ENV: &str = "HIBP_RANGE_ENDPOINT";

/// Environment variable overriding the retry cap.
pub const MAX_RETRIES_ENV: &str = "HIBP_RANGE_MAX_RETRIES";

/// Maximum number of rate-limited retries per lookup
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for a [`BreachLookup`](crate::BreachLookup).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    /// Endpoint template; the digest prefix is appended verbatim.
    pub endpoint: String,
    /// How many times a rate-limited request is retried before giving up.
    pub max_retries: u32,
    pub timeout: Duration,
    pub user_agent: String,
    /// Ask the service to pad responses with zero-count decoy records.
    pub add_padding: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: concat!("hibp-range-client/", env!("CARGO_PKG_VERSION")).to_string(),
            add_padding: false,
        }
    }
}

impl LookupConfig {
    /// Default config with the endpoint and retry cap taken from
    /// `HIBP_RANGE_ENDPOINT` and `HIBP_RANGE_MAX_RETRIES` when set.
    /// Unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(endpoint) = get(ENDPOINT_ENV).filter(|s| !s.is_empty()) {
            config.endpoint = endpoint;
        }
        if let Some(retries) = get(MAX_RETRIES_ENV).and_then(|s| s.trim().parse().ok()) {
            config.max_retries = retries;
        }
        config
    }
}
