use log::info;
use luatrader_core::{Candle, SecurityInfo, Timestamp};
use luatrader_ports::AdvisorConfig;

use crate::error::Result;
use crate::signal::{SignalDeps, SignalService};

/// Follows a security and its advice without ever trading it.
///
/// Shares initialization and subscription with `SignalService`; only logs
/// when the advised position changes.
pub struct QuietStrategy {
    signal: SignalService,
}

impl QuietStrategy {
    pub async fn init(
        config: &AdvisorConfig,
        deps: &SignalDeps<'_>,
        forward_after: Timestamp,
    ) -> Result<Self> {
        let signal = SignalService::init(config, deps, forward_after).await?;
        Ok(Self { signal })
    }

    pub async fn subscribe(&mut self) -> Result<()> {
        self.signal.subscribe().await
    }

    pub fn on_candle(&mut self, candle: &Candle) {
        let previous = self.signal.last_advice().map(|a| a.position);
        let Some(advice) = self.signal.advise(candle) else {
            return;
        };
        if previous != Some(advice.position) {
            info!("[{}] New advice {}", self.signal.security().name, advice);
        }
    }

    pub fn show_info(&self) {
        self.signal.show_info();
    }

    pub fn security(&self) -> &SecurityInfo {
        self.signal.security()
    }

    pub fn signal(&self) -> &SignalService {
        &self.signal
    }
}
