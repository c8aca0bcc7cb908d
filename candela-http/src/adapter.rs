#[cfg(feature = "test-adapters")]
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use candela_core::CandelaError;
use url::Url;

/// A raw HTTP answer: status code and body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code.
    pub status: u16,
    /// Response body, undecoded.
    pub body: Vec<u8>,
}

impl HttpReply {
    /// Returns true for a 2xx status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport abstraction (so we can inject mocks in tests).
#[async_trait]
pub trait CandleTransport: Send + Sync {
    /// Issue a `GET` for `url` and return whatever the server answered.
    ///
    /// Only transport failures are errors here; a non-2xx status is a reply.
    async fn get(&self, url: Url) -> Result<HttpReply, CandelaError>;
}

/// Production transport backed by `reqwest`.
///
/// `reqwest::Client` is `Clone + Send + Sync`, so no external locking is needed.
#[derive(Debug, Clone)]
pub struct RealAdapter {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl RealAdapter {
    /// Build a default client.
    ///
    /// # Errors
    /// Returns `CandelaError::Source` if the TLS backend or system configuration
    /// prevents building a client.
    pub fn new_default() -> Result<Self, CandelaError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("candela-http/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CandelaError::source(crate::NAME, e.to_string()))?;
        Ok(Self::new(client))
    }

    /// Wrap an existing `reqwest::Client`.
    #[must_use]
    pub const fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Apply a per-request timeout on top of the client's own settings.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

fn map_reqwest_err(e: reqwest::Error) -> CandelaError {
    if e.is_timeout() {
        CandelaError::source_timeout(crate::NAME)
    } else {
        // The URL repeats the whole query; keep it out of the message.
        CandelaError::source(crate::NAME, e.without_url().to_string())
    }
}

#[async_trait]
impl CandleTransport for RealAdapter {
    async fn get(&self, url: Url) -> Result<HttpReply, CandelaError> {
        let mut request = self.client.get(url);
        if let Some(t) = self.timeout {
            request = request.timeout(t);
        }
        let resp = request.send().await.map_err(map_reqwest_err)?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(map_reqwest_err)?;
        Ok(HttpReply {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(feature = "test-adapters")]
impl dyn CandleTransport {
    /// Build a transport from a closure over the request URL.
    pub fn from_fn<F>(f: F) -> Arc<dyn CandleTransport>
    where
        F: Send + Sync + 'static + Fn(Url) -> Result<HttpReply, CandelaError>,
    {
        struct FnTransport<F>(F);
        #[async_trait]
        impl<F> CandleTransport for FnTransport<F>
        where
            F: Send + Sync + 'static + Fn(Url) -> Result<HttpReply, CandelaError>,
        {
            async fn get(&self, url: Url) -> Result<HttpReply, CandelaError> {
                (self.0)(url)
            }
        }
        Arc::new(FnTransport(f))
    }
}
