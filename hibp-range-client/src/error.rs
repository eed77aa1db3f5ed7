use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("'{digest}' is not a valid SHA-1 hash")]
    InvalidDigest { digest: String },

    #[error("range request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed reading range response: {0}")]
    ResponseRead(#[source] io::Error),

    #[error("rate limited for prefix {prefix} after {attempts} attempt(s)")]
    RateLimited { prefix: String, attempts: u32 },

    #[error("HTTP {status} for prefix {prefix}")]
    UnretryableStatus { prefix: String, status: u16 },

    #[error("malformed password data on line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("'{value}' is not a valid backoff interval")]
    MalformedBackoff { value: String },

    #[error("backoff interval '{value}' is out of range")]
    ParseOverflow { value: String },
}

impl Error {
    /// True for connection-level failures: the request never produced a
    /// status, or the body stream broke while being read.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::ResponseRead(_))
    }
}
