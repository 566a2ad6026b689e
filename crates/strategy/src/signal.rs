//! Signal Service
//!
//! Per strategy: resolves the security, builds the decorated advisor, warms
//! it up on stored and recent history, subscribes to live bars and then
//! turns each live candle of its security into advice.

use chrono::Utc;
use log::{debug, info, warn};
use luatrader_core::{Advice, Candle, CandleInterval, SecurityInfo, Timestamp};
use luatrader_ports::{
    Advisor, AdvisorConfig, AdvisorFactory, CandleStorage, MarketDataService, SecurityInformator,
};
use std::sync::Arc;

use crate::decorators::decorate;
use crate::error::{Error, Result};

/// Collaborators needed to initialize a signal
#[derive(Clone)]
pub struct SignalDeps<'a> {
    pub informator: &'a dyn SecurityInformator,
    pub factory: &'a dyn AdvisorFactory,
    pub storage: Option<&'a dyn CandleStorage>,
    pub market_data: Arc<dyn MarketDataService>,
}

pub struct SignalService {
    security: SecurityInfo,
    interval: CandleInterval,
    advisor: Box<dyn Advisor>,
    market_data: Arc<dyn MarketDataService>,
    last_advice: Option<Advice>,
    subscribed: bool,
    /// Advice stamped at or before this instant is never forwarded
    forward_after: Timestamp,
}

impl SignalService {
    /// Build and warm up the advisor. Live dispatch starts after `subscribe`.
    pub async fn init(
        config: &AdvisorConfig,
        deps: &SignalDeps<'_>,
        forward_after: Timestamp,
    ) -> Result<Self> {
        let security = deps
            .informator
            .get_security_info(&config.security)
            .map_err(|source| Error::Security {
                name: config.security.clone(),
                source,
            })?;
        let base = deps.factory.create(config).map_err(Error::Advisor)?;

        let mut signal = Self {
            security,
            interval: CandleInterval::Minutes5,
            advisor: decorate(base, config),
            market_data: deps.market_data.clone(),
            last_advice: None,
            subscribed: false,
            forward_after,
        };

        if let Some(storage) = deps.storage {
            for candle in storage.candles(&signal.security.name) {
                let candle = candle.map_err(Error::Storage)?;
                signal.warm_up(&candle);
            }
            debug!(
                "[{}] Init advice from storage: {}",
                signal.security.name,
                signal.describe_last_advice()
            );
        }

        let last_candles = signal
            .market_data
            .last_candles(&signal.security, signal.interval)
            .await
            .map_err(Error::MarketData)?;
        match (last_candles.first(), last_candles.last()) {
            (Some(first), Some(last)) => debug!(
                "[{}] Ready candles: first {} last {} size {}",
                signal.security.name,
                first,
                last,
                last_candles.len()
            ),
            _ => warn!("[{}] Ready candles empty", signal.security.name),
        }
        for candle in &last_candles {
            signal.warm_up(candle);
        }
        info!(
            "[{}] Init advice {}",
            signal.security.name,
            signal.describe_last_advice()
        );

        Ok(signal)
    }

    /// Subscribe to live bars. Advice is forwarded only after this succeeds.
    pub async fn subscribe(&mut self) -> Result<()> {
        self.market_data
            .subscribe_candles(&self.security, self.interval)
            .await
            .map_err(Error::MarketData)?;
        self.subscribed = true;
        Ok(())
    }

    /// Feed a live candle; returns the advice to act on, if any
    pub fn on_candle(&mut self, candle: &Candle) -> Option<Advice> {
        let advice = self.advise(candle)?;
        if !self.subscribed {
            return None;
        }
        if advice.date_time.with_timezone(&Utc) <= self.forward_after {
            return None;
        }
        debug!("[{}] New advice {}", self.security.name, advice);
        Some(advice)
    }

    /// Run the advisor on a candle of this security and remember the result
    pub(crate) fn advise(&mut self, candle: &Candle) -> Option<Advice> {
        if candle.security_code != self.security.code {
            return None;
        }
        let advice = self.advisor.advise(candle)?;
        self.last_advice = Some(advice.clone());
        Some(advice)
    }

    fn warm_up(&mut self, candle: &Candle) {
        if let Some(advice) = self.advisor.advise(candle) {
            self.last_advice = Some(advice);
        }
    }

    /// Log the latest advice (operator `status` command)
    pub fn show_info(&self) {
        info!(
            "[{}] Last advice {}",
            self.security.name,
            self.describe_last_advice()
        );
    }

    fn describe_last_advice(&self) -> String {
        self.last_advice
            .as_ref()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "none".to_string())
    }

    pub fn last_advice(&self) -> Option<&Advice> {
        self.last_advice.as_ref()
    }

    pub fn security(&self) -> &SecurityInfo {
        &self.security
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}
