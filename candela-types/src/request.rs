use serde::{Deserialize, Serialize};

use crate::{CandelaError, Timeframe};

/// What to ask a candle source for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandleRequest {
    symbol: String,
    timeframe: Timeframe,
    limit: u32,
}

impl CandleRequest {
    /// Build a validated request.
    ///
    /// # Errors
    /// Returns `CandelaError::InvalidArg` if `symbol` is blank or `limit` is zero.
    pub fn new(
        symbol: impl Into<String>,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<Self, CandelaError> {
        let symbol = symbol.into().trim().to_string();
        if symbol.is_empty() {
            return Err(CandelaError::InvalidArg("symbol must not be blank".into()));
        }
        if limit == 0 {
            return Err(CandelaError::InvalidArg("limit must be positive".into()));
        }
        Ok(Self {
            symbol,
            timeframe,
            limit,
        })
    }

    /// Instrument symbol, e.g. `"EURUSD-OTC"`.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Candle width.
    #[must_use]
    pub const fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Maximum number of candles to return.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }
}
