use luatrader_core::{Candle, SecurityInfo};

use crate::error::Result;

/// Resolves a configured security name into reference data
pub trait SecurityInformator: Send + Sync {
    fn get_security_info(&self, security_name: &str) -> Result<SecurityInfo>;
}

/// Read-only access to stored history, oldest candle first
pub trait CandleStorage: Send + Sync {
    fn candles<'a>(
        &'a self,
        security_name: &str,
    ) -> Box<dyn Iterator<Item = Result<Candle>> + Send + 'a>;
}
