use async_trait::async_trait;

use crate::{CandelaError, CandleRequest, RawCandle};

/// A producer of raw candle batches, typically an HTTP endpoint.
///
/// Sources return records undecoded beyond their JSON shape: numeric coercion,
/// unit normalization and de-duplication are the reconciler's job.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Stable source name used in error tagging and logs.
    fn name(&self) -> &'static str;

    /// Fetch the most recent candles for the request.
    ///
    /// # Errors
    /// Returns `CandelaError::InvalidBatch` when the payload is not record-shaped,
    /// and a transport-flavoured variant (`Source`, `Http`, `NotFound`,
    /// `SourceTimeout`) when the source could not deliver a batch at all.
    async fn fetch(&self, req: &CandleRequest) -> Result<Vec<RawCandle>, CandelaError>;
}
