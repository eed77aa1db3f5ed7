use crate::config::LookupConfig;
use crate::error::Error;
use crate::hash::Hash;
use crate::retry::{RetryPolicy, Sleeper, ThreadSleeper};
use crate::scanner;
use crate::transport::{HttpTransport, RangeTransport};

/// Checks digests against the range API.
///
/// Each check runs sequentially on the calling thread: one range request,
/// retried only on hinted 429s, then a line scan of the response.
#[derive(Debug)]
pub struct BreachLookup<T = HttpTransport, S = ThreadSleeper> {
    config: LookupConfig,
    policy: RetryPolicy,
    transport: T,
    sleeper: S,
}

impl BreachLookup {
    /// Creates a lookup using the blocking HTTP transport and thread sleeps.
    pub fn new(config: LookupConfig) -> Result<Self, Error> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_collaborators(config, transport, ThreadSleeper))
    }
}

impl<T: RangeTransport, S: Sleeper> BreachLookup<T, S> {
    pub fn with_collaborators(config: LookupConfig, transport: T, sleeper: S) -> Self {
        let policy = RetryPolicy::new(config.max_retries);
        Self { config, policy, transport, sleeper }
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Validates `raw_digest` and looks it up.
    ///
    /// An invalid digest fails before anything is sent.
    pub fn check(&self, raw_digest: &str) -> Result<Hash, Error> {
        let hash = Hash::with_endpoint(self.config.endpoint.as_str(), raw_digest)?;
        self.search(hash)
    }

    /// Hashes `password` locally and looks up the digest.
    pub fn check_password(&self, password: &str) -> Result<Hash, Error> {
        let hash = Hash::from_password(self.config.endpoint.as_str(), password)?;
        self.search(hash)
    }

    /// Looks up an already validated hash, filling in its pwned status.
    pub fn search(&self, mut hash: Hash) -> Result<Hash, Error> {
        let url = hash.range_url();
        let prefix = hash.prefix();

        let response = self.policy.run(&self.transport, &self.sleeper, &url, prefix)?;
        // The scanner owns the body from here and drops it on every return.
        let found = scanner::scan(response.body, hash.suffix())?;
        tracing::trace!(prefix, "range response released");

        match found {
            Some(line) if self.config.add_padding && line.count == 0 => {
                tracing::debug!(prefix, "matched padding record");
            }
            Some(line) => {
                tracing::debug!(prefix, count = line.count, "digest found in range");
                hash.mark_pwned(line.count);
            }
            None => tracing::debug!(prefix, "digest not found in range"),
        }

        Ok(hash)
    }
}
