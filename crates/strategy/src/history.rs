use luatrader_core::Candle;
use luatrader_ports::{CandleStorage, Result};
use std::collections::HashMap;

/// Candle storage held in memory, keyed by security name
#[derive(Debug, Default, Clone)]
pub struct MemoryCandleStorage {
    candles: HashMap<String, Vec<Candle>>,
}

impl MemoryCandleStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add history for a security (kept in the given order)
    pub fn with_candles(mut self, security_name: impl Into<String>, candles: Vec<Candle>) -> Self {
        self.candles.insert(security_name.into(), candles);
        self
    }
}

impl CandleStorage for MemoryCandleStorage {
    fn candles<'a>(
        &'a self,
        security_name: &str,
    ) -> Box<dyn Iterator<Item = Result<Candle>> + Send + 'a> {
        match self.candles.get(security_name) {
            Some(candles) => Box::new(candles.iter().cloned().map(Ok)),
            None => Box::new(std::iter::empty()),
        }
    }
}
