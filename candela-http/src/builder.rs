use std::sync::Arc;
use std::time::Duration;

use candela_core::CandelaError;
use url::Url;

use crate::adapter::RealAdapter;
use crate::{DEFAULT_PATH, HttpCandleSource};

/// Per-request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder for [`HttpCandleSource`].
#[derive(Debug, Clone)]
pub struct HttpCandleSourceBuilder {
    base_url: String,
    path: String,
    timeout: Option<Duration>,
    client: Option<reqwest::Client>,
}

impl HttpCandleSourceBuilder {
    /// Start from a base URL such as `http://localhost:5002`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path: DEFAULT_PATH.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            client: None,
        }
    }

    /// Endpoint path appended to the base URL. Defaults to `/api/iq/candles`.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Per-request timeout; `None` leaves only the client's own limits.
    #[must_use]
    pub const fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a preconfigured `reqwest::Client` (proxies, TLS, pooling).
    #[must_use]
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Resolve the endpoint and build the source.
    ///
    /// # Errors
    /// - `InvalidArg` if the base URL does not parse or is not `http`/`https`.
    /// - `Source` if no client was supplied and building the default one fails.
    pub fn build(self) -> Result<HttpCandleSource, CandelaError> {
        let endpoint = resolve_endpoint(&self.base_url, &self.path)?;
        let adapter = match self.client {
            Some(c) => RealAdapter::new(c),
            None => RealAdapter::new_default()?,
        }
        .with_timeout(self.timeout);
        Ok(HttpCandleSource {
            transport: Arc::new(adapter),
            endpoint,
        })
    }
}

fn resolve_endpoint(base_url: &str, path: &str) -> Result<Url, CandelaError> {
    let mut url = Url::parse(base_url.trim())
        .map_err(|e| CandelaError::InvalidArg(format!("invalid base url {base_url:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CandelaError::InvalidArg(format!(
            "base url must be http or https, got {:?}",
            url.scheme()
        )));
    }
    // Keep any prefix the base URL carries (e.g. behind a reverse proxy).
    let joined = format!(
        "{}/{}",
        url.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&joined);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
