//! candela-http
//!
//! A `CandleSource` that polls a candle endpoint over HTTP:
//! `GET {base_url}{path}?symbol=..&timeframe=..&limit=..`, answering with a
//! JSON array of candle records or a `{"candles": [..]}` envelope.
//!
//! Status and transport failures are normalized into `CandelaError`:
//! - 404, or an error body that reads like "not found" -> `NotFound`
//! - any other non-2xx status -> `Http { status }`
//! - connection failures -> `Source`, request timeouts -> `SourceTimeout`
//! - a 2xx body that is not a candle payload -> `InvalidBatch`
#![warn(missing_docs)]

/// Transport definitions and the production adapter backed by `reqwest`.
pub mod adapter;
mod builder;

use std::sync::Arc;

use adapter::{CandleTransport, HttpReply};
use async_trait::async_trait;
use candela_core::{CandelaError, CandleRequest, CandleSource, RawCandle, parse_batch};
use url::Url;

pub use builder::HttpCandleSourceBuilder;

/// Source name used in error tagging.
pub const NAME: &str = "candela-http";

/// Path of the candle endpoint when none is configured.
pub const DEFAULT_PATH: &str = "/api/iq/candles";

/// HTTP-backed candle source. Construct with [`HttpCandleSource::builder`].
#[derive(Clone)]
pub struct HttpCandleSource {
    transport: Arc<dyn CandleTransport>,
    endpoint: Url,
}

impl std::fmt::Debug for HttpCandleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCandleSource")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpCandleSource {
    /// Start configuring a source that talks to `base_url`.
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> HttpCandleSourceBuilder {
        HttpCandleSourceBuilder::new(base_url)
    }

    /// Build from an injected transport and a fully resolved endpoint.
    #[cfg(feature = "test-adapters")]
    #[must_use]
    pub fn from_transport(transport: Arc<dyn CandleTransport>, endpoint: Url) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    /// The endpoint URL, without query.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The full URL fetched for `req`.
    #[must_use]
    pub fn request_url(&self, req: &CandleRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("symbol", req.symbol())
            .append_pair("timeframe", req.timeframe().as_str())
            .append_pair("limit", &req.limit().to_string());
        url
    }

    fn looks_like_not_found(msg: &str) -> bool {
        let m = msg.to_ascii_lowercase();
        m.contains("not found") || m.contains("no data") || m.contains("unknown symbol")
    }

    /// `{"error": "..."}` bodies carry a message worth surfacing.
    fn error_message(body: &[u8]) -> Option<String> {
        let v: serde_json::Value = serde_json::from_slice(body).ok()?;
        v.get("error")?.as_str().map(str::to_string)
    }

    fn normalize_reply(
        reply: &HttpReply,
        req: &CandleRequest,
    ) -> Result<Vec<RawCandle>, CandelaError> {
        let what = || format!("candles for {} {}", req.symbol(), req.timeframe());
        if reply.status == 404 {
            return Err(CandelaError::not_found(what()));
        }
        if !reply.is_success() {
            return Err(CandelaError::Http {
                provider: NAME.to_string(),
                status: reply.status,
            });
        }
        parse_batch(&reply.body).map_err(|e| match Self::error_message(&reply.body) {
            Some(msg) if Self::looks_like_not_found(&msg) => CandelaError::not_found(what()),
            Some(msg) => CandelaError::source(NAME, msg),
            None => e,
        })
    }
}

#[async_trait]
impl CandleSource for HttpCandleSource {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn fetch(&self, req: &CandleRequest) -> Result<Vec<RawCandle>, CandelaError> {
        let url = self.request_url(req);
        #[cfg(feature = "tracing")]
        tracing::debug!(url = %url, "fetching candles");
        let reply = self.transport.get(url).await?;
        let records = Self::normalize_reply(&reply, req)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(status = reply.status, records = records.len(), "candles fetched");
        Ok(records)
    }
}
