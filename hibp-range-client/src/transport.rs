use std::fmt;
use std::io::Read;

use reqwest::blocking::Client;
use reqwest::header::RETRY_AFTER;

use crate::config::LookupConfig;
use crate::error::Error;

/// Request header asking the service to pad the response with decoy records.
pub const ADD_PADDING_HEADER: &str = "Add-Padding";

/// A range response that has not been classified yet.
///
/// The body is read lazily; dropping the response releases the connection.
pub struct RangeResponse {
    pub status: u16,
    /// Raw `Retry-After` header value, if the service sent one.
    pub retry_after: Option<String>,
    pub body: Box<dyn Read + Send>,
}

impl fmt::Debug for RangeResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeResponse")
            .field("status", &self.status)
            .field("retry_after", &self.retry_after)
            .finish_non_exhaustive()
    }
}

/// Issues a single range GET. Implementations never retry.
pub trait RangeTransport {
    fn fetch(&self, url: &str) -> Result<RangeResponse, Error>;
}

/// Blocking HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    add_padding: bool,
}

impl HttpTransport {
    pub fn new(config: &LookupConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|source| Error::Transport { url: config.endpoint.clone(), source })?;

        Ok(Self { client, add_padding: config.add_padding })
    }
}

impl RangeTransport for HttpTransport {
    fn fetch(&self, url: &str) -> Result<RangeResponse, Error> {
        let mut request = self.client.get(url);
        if self.add_padding {
            request = request.header(ADD_PADDING_HEADER, "true");
        }

        // An unparsable URL fails here as a builder error, before any I/O.
        let response =
            request.send().map_err(|source| Error::Transport { url: url.to_string(), source })?;

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_string());

        Ok(RangeResponse {
            status: response.status().as_u16(),
            retry_after,
            body: Box::new(response),
        })
    }
}
