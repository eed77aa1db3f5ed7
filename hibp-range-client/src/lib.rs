//! Checks a password's SHA-1 digest against the Have I Been Pwned
//! [Pwned Passwords range API](https://haveibeenpwned.com/API/v3#PwnedPasswords)
//! without disclosing the digest.
//!
//! Only the first 5 hex characters of the digest leave the process. The service
//! answers with every known suffix sharing that prefix, one `SUFFIX:COUNT` record
//! per line, and the remaining 35 characters are matched locally. The service can
//! narrow a lookup to a bucket of several hundred candidates but never learn
//! which one was asked about.
//!
//! # Usage
//!
//! ```no_run
//! use hibp_range_client::{BreachLookup, LookupConfig};
//!
//! let lookup = BreachLookup::new(LookupConfig::from_env())?;
//! let hash = lookup.check("CBFDAC6008F9CAB4083784CBD1874F76618D2A97")?;
//! if hash.is_pwned() {
//!     println!("seen {} times", hash.count());
//! }
//! # Ok::<(), hibp_range_client::Error>(())
//! ```
//!
//! # Rate limiting
//!
//! A `429` response is retried only when it carries a `Retry-After` hint, and
//! at most [`LookupConfig::max_retries`] times. A `429` without a hint, and every
//! other non-`200` status, fails the lookup immediately.

pub mod config;
pub mod error;
pub mod hash;
pub mod lookup;
pub mod retry;
pub mod scanner;
pub mod transport;

#[cfg(test)]
mod testing;

pub use config::{DEFAULT_ENDPOINT, LookupConfig};
pub use error::Error;
pub use hash::{Hash, validate};
pub use lookup::BreachLookup;
pub use retry::{
    RetryPolicy, RetryState, Sleeper, StatusClass, ThreadSleeper, classify_status, sleep,
};
pub use scanner::{RangeLine, scan};
pub use transport::{HttpTransport, RangeResponse, RangeTransport};

/// Length of a hex-encoded SHA-1 digest.
pub const DIGEST_LEN: usize = 40;

/// Number of leading hex characters sent to the range API.
pub const PREFIX_LEN: usize = 5;

/// Number of trailing hex characters matched locally.
pub const SUFFIX_LEN: usize = DIGEST_LEN - PREFIX_LEN;
