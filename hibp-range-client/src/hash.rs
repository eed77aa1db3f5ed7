use sha1::{Digest, Sha1};

use crate::config::DEFAULT_ENDPOINT;
use crate::error::Error;
use crate::{DIGEST_LEN, PREFIX_LEN};

/// Hex lookup table for digest encoding.
const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";

/// Validates a raw SHA-1 digest and returns it upper-cased.
///
/// Only strings of exactly 40 hex characters are accepted. Letter case is not
/// significant; length and alphabet are.
pub fn validate(raw: &str) -> Result<String, Error> {
    let bytes = raw.as_bytes();
    if bytes.len() == DIGEST_LEN && bytes.iter().all(u8::is_ascii_hexdigit) {
        return Ok(raw.to_ascii_uppercase());
    }

    Err(Error::InvalidDigest { digest: raw.to_string() })
}

/// Encodes raw digest bytes as upper-case hex.
fn encode_upper(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(HEX_CHARS[(b >> 4) as usize] as char);
        out.push(HEX_CHARS[(b & 0x0f) as usize] as char);
    }
    out
}

/// A SHA-1 password digest and the outcome of looking it up.
///
/// Construction validates the digest, so every `Hash` holds 40 upper-case hex
/// characters. The pwned status is filled in once by
/// [`BreachLookup`](crate::BreachLookup).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hash {
    endpoint: String,
    digest: String,
    pwned: bool,
    count: u64,
}

impl Hash {
    /// Creates a hash against the production range endpoint.
    pub fn new(raw: &str) -> Result<Self, Error> {
        Self::with_endpoint(DEFAULT_ENDPOINT, raw)
    }

    /// Creates a hash whose range URL is built from `endpoint`.
    ///
    /// The endpoint is used as a template: the 5-character prefix is appended
    /// to it verbatim, so it normally ends in `/`.
    pub fn with_endpoint(endpoint: impl Into<String>, raw: &str) -> Result<Self, Error> {
        Ok(Self { endpoint: endpoint.into(), digest: validate(raw)?, pwned: false, count: 0 })
    }

    /// Hashes `password` locally and wraps the digest.
    pub fn from_password(endpoint: impl Into<String>, password: &str) -> Result<Self, Error> {
        let digest: [u8; 20] = Sha1::digest(password.as_bytes()).into();
        Self::with_endpoint(endpoint, &encode_upper(&digest))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// The first 5 characters, the only part sent over the network.
    pub fn prefix(&self) -> &str {
        &self.digest[..PREFIX_LEN]
    }

    /// The remaining 35 characters, compared locally against the range response.
    pub fn suffix(&self) -> &str {
        &self.digest[PREFIX_LEN..]
    }

    /// The range URL for this digest: endpoint followed by the prefix.
    pub fn range_url(&self) -> String {
        format!("{}{}", self.endpoint, self.prefix())
    }

    pub fn is_pwned(&self) -> bool {
        self.pwned
    }

    /// Number of times the digest appears in the corpus. Zero unless pwned.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub(crate) fn mark_pwned(&mut self, count: u64) {
        self.pwned = true;
        self.count = count;
    }
}
