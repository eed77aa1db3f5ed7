//! Status classification and the rate-limit retry loop around a [`RangeTransport`].
//!
//! A lookup moves through `Requesting -> (Backoff -> Requesting)* -> Succeeded | Failed`.
//! Only a 429 that carries a `Retry-After` hint is retried; without a hint
//! there is no safe interval to wait, so it fails like any other non-200.

use std::time::Duration;

use crate::config::DEFAULT_MAX_RETRIES;
use crate::error::Error;
use crate::transport::{RangeResponse, RangeTransport};

/// Blocks the calling thread for a backoff interval.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps on the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Parses a backoff hint given in (possibly fractional) seconds.
///
/// Non-numeric, negative and `NaN`/`inf` literals are [`Error::MalformedBackoff`].
/// Numeric literals that cannot be represented, either as an `f64` or as a
/// [`Duration`], are [`Error::ParseOverflow`].
pub fn parse_backoff(secs: &str) -> Result<Duration, Error> {
    let trimmed = secs.trim();
    let malformed = || Error::MalformedBackoff { value: secs.to_string() };
    let overflow = || Error::ParseOverflow { value: secs.to_string() };

    let value: f64 = trimmed.parse().map_err(|_| malformed())?;
    if value.is_nan() || value < 0.0 {
        return Err(malformed());
    }
    if value.is_infinite() {
        // Rust parses "inf"/"infinity" as valid floats; only a spelled-out
        // infinity is malformed, an overflowing exponent is not.
        return Err(if trimmed.bytes().any(|b| b.eq_ignore_ascii_case(&b'i')) {
            malformed()
        } else {
            overflow()
        });
    }

    Duration::try_from_secs_f64(value).map_err(|_| overflow())
}

/// Parses `secs` and sleeps on the current thread for that long.
///
/// Nothing is suspended when parsing fails.
pub fn sleep(secs: &str) -> Result<(), Error> {
    sleep_with(&ThreadSleeper, secs)
}

pub fn sleep_with(sleeper: &impl Sleeper, secs: &str) -> Result<(), Error> {
    let duration = parse_backoff(secs)?;
    sleeper.sleep(duration);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    RateLimited,
    Fatal,
}

/// Classifies a range response status. Anything other than 200 and 429 is fatal.
pub fn classify_status(status: u16) -> StatusClass {
    match status {
        200 => StatusClass::Success,
        429 => StatusClass::RateLimited,
        _ => StatusClass::Fatal,
    }
}

/// One step of the retry loop. `attempt` counts retries already made.
#[derive(Debug)]
pub enum RetryState {
    Requesting { attempt: u32 },
    Backoff { attempt: u32, delay: Duration },
    Succeeded(RangeResponse),
    Failed(Error),
}

impl RetryState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RetryState::Succeeded(_) | RetryState::Failed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: DEFAULT_MAX_RETRIES }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Decides the next state from a response received on `attempt`.
    ///
    /// Responses that do not lead to `Succeeded` are dropped here, which
    /// releases their body.
    pub fn on_response(&self, attempt: u32, response: RangeResponse, prefix: &str) -> RetryState {
        match classify_status(response.status) {
            StatusClass::Success => RetryState::Succeeded(response),
            StatusClass::Fatal => RetryState::Failed(Error::UnretryableStatus {
                prefix: prefix.to_string(),
                status: response.status,
            }),
            StatusClass::RateLimited => {
                let rate_limited =
                    || Error::RateLimited { prefix: prefix.to_string(), attempts: attempt + 1 };

                let Some(hint) = response.retry_after.as_deref() else {
                    return RetryState::Failed(rate_limited());
                };
                match parse_backoff(hint) {
                    // An unusable hint is the same as no hint.
                    Err(Error::MalformedBackoff { .. }) => RetryState::Failed(rate_limited()),
                    Err(e) => RetryState::Failed(e),
                    Ok(_) if attempt >= self.max_retries => RetryState::Failed(rate_limited()),
                    Ok(delay) => RetryState::Backoff { attempt, delay },
                }
            }
        }
    }

    /// Advances `state` by one transition. Terminal states are returned as is.
    pub fn step(
        &self,
        state: RetryState,
        transport: &impl RangeTransport,
        sleeper: &impl Sleeper,
        url: &str,
        prefix: &str,
    ) -> RetryState {
        match state {
            RetryState::Requesting { attempt } => {
                tracing::debug!(prefix, attempt, "requesting range");
                match transport.fetch(url) {
                    Ok(response) => self.on_response(attempt, response, prefix),
                    Err(e) => RetryState::Failed(e),
                }
            }
            RetryState::Backoff { attempt, delay } => {
                tracing::warn!(prefix, attempt, ?delay, "rate limited, backing off");
                sleeper.sleep(delay);
                RetryState::Requesting { attempt: attempt + 1 }
            }
            terminal => terminal,
        }
    }

    /// Drives the state machine until it succeeds or fails.
    pub fn run(
        &self,
        transport: &impl RangeTransport,
        sleeper: &impl Sleeper,
        url: &str,
        prefix: &str,
    ) -> Result<RangeResponse, Error> {
        let mut state = RetryState::Requesting { attempt: 0 };
        loop {
            state = match self.step(state, transport, sleeper, url, prefix) {
                RetryState::Succeeded(response) => return Ok(response),
                RetryState::Failed(e) => return Err(e),
                next => next,
            };
        }
    }
}
