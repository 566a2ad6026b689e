use async_trait::async_trait;
use luatrader_core::{Candle, CandleInterval, SecurityInfo};

use crate::error::Result;

/// Port for the terminal's bar feed
#[async_trait]
pub trait MarketDataService: Send + Sync {
    /// Recent completed bars, oldest first
    async fn last_candles(
        &self,
        security: &SecurityInfo,
        interval: CandleInterval,
    ) -> Result<Vec<Candle>>;

    /// Ask the terminal to push new bars for the security.
    /// Subscribing twice is a no-op.
    async fn subscribe_candles(&self, security: &SecurityInfo, interval: CandleInterval)
    -> Result<()>;
}
