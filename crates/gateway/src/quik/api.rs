//! Typed bridge operations
//!
//! Each method maps to one Lua function of the bridge. Arguments are packed
//! the way the bridge expects them: a `|`-separated string, or a flat object
//! for transactions.

use luatrader_core::calendar::terminal_time;
use luatrader_core::{Candle, Price};
use luatrader_ports::{Result, TraderError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::QuikService;

/// Payload of `getPortfolioInfoEx` (only the fields the client reads)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioInfoEx {
    /// Open positions limit; the bridge sends it as a string
    pub start_limit_open_pos: Value,
}

/// Payload of `getFuturesHolding`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuturesHolding {
    pub totalnet: f64,
}

/// `sendTransaction` argument. Field names are the terminal's.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Transaction {
    pub trans_id: String,
    pub action: String,
    pub account: String,
    pub classcode: String,
    pub seccode: String,
    pub quantity: String,
    pub operation: String,
    pub price: String,
    pub client_code: String,
}

/// Bar time as the bridge sends it, terminal-local
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuikDateTime {
    #[serde(default)]
    pub ms: u32,
    pub sec: u32,
    pub min: u32,
    pub hour: u32,
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

/// Bar as the bridge sends it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuikCandle {
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Decimal,
    pub datetime: QuikDateTime,
    pub sec: String,
    pub class: String,
    pub interval: u32,
}

impl QuikCandle {
    /// Convert to a domain candle stamped in terminal time (milliseconds dropped)
    pub fn to_candle(&self) -> Result<Candle> {
        let d = &self.datetime;
        let date_time = terminal_time(d.year, d.month, d.day, d.hour, d.min, d.sec)
            .ok_or_else(|| TraderError::Decode(format!("bad bar time {:?}", d)))?;
        Ok(Candle::new(
            self.sec.clone(),
            date_time,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
        ))
    }
}

impl QuikService {
    pub async fn is_connected(&self) -> Result<bool> {
        let state: Option<i64> = self.execute_query("isConnected", "").await?;
        Ok(state == Some(1))
    }

    /// Show a message in the terminal
    pub async fn message(&self, text: &str) -> Result<()> {
        self.execute_query_dynamic("message", text).await?;
        Ok(())
    }

    pub async fn get_portfolio_info_ex(
        &self,
        firm: &str,
        client_code: &str,
        limit_kind: i32,
    ) -> Result<Option<PortfolioInfoEx>> {
        self.execute_query(
            "getPortfolioInfoEx",
            format!("{}|{}|{}", firm, client_code, limit_kind),
        )
        .await
    }

    pub async fn get_futures_holding(
        &self,
        firm: &str,
        account: &str,
        security_code: &str,
        pos_type: i32,
    ) -> Result<Option<FuturesHolding>> {
        self.execute_query(
            "getFuturesHolding",
            format!("{}|{}|{}|{}", firm, account, security_code, pos_type),
        )
        .await
    }

    /// Submit a transaction. Assigns `TRANS_ID` and `CLIENT_CODE` from a
    /// fresh transaction id and returns that id.
    pub async fn send_transaction(&self, mut transaction: Transaction) -> Result<i64> {
        let trans_id = self.next_trans_id();
        transaction.trans_id = trans_id.to_string();
        transaction.client_code = transaction.trans_id.clone();
        self.execute_query_dynamic("sendTransaction", transaction)
            .await?;
        Ok(trans_id)
    }

    pub async fn get_last_candles(
        &self,
        class_code: &str,
        security_code: &str,
        interval: u32,
        count: usize,
    ) -> Result<Vec<QuikCandle>> {
        let candles: Option<Vec<QuikCandle>> = self
            .execute_query(
                "get_candles_from_data_source",
                format!("{}|{}|{}|{}", class_code, security_code, interval, count),
            )
            .await?;
        Ok(candles.unwrap_or_default())
    }

    pub async fn is_candle_subscribed(
        &self,
        class_code: &str,
        security_code: &str,
        interval: u32,
    ) -> Result<bool> {
        let subscribed: Option<bool> = self
            .execute_query(
                "is_subscribed",
                format!("{}|{}|{}", class_code, security_code, interval),
            )
            .await?;
        Ok(subscribed.unwrap_or(false))
    }

    pub async fn subscribe_candles(
        &self,
        class_code: &str,
        security_code: &str,
        interval: u32,
    ) -> Result<()> {
        self.execute_query_dynamic(
            "subscribe_to_candles",
            format!("{}|{}|{}", class_code, security_code, interval),
        )
        .await?;
        Ok(())
    }

    /// Current value of a trading parameter (`LAST`, `BID`, ...)
    pub async fn get_param_ex(
        &self,
        class_code: &str,
        security_code: &str,
        param: &str,
    ) -> Result<Option<Value>> {
        self.execute_query_dynamic(
            "getParamEx",
            format!("{}|{}|{}", class_code, security_code, param),
        )
        .await
    }

    pub async fn get_security_info(
        &self,
        class_code: &str,
        security_code: &str,
    ) -> Result<Option<Value>> {
        self.execute_query_dynamic(
            "getSecurityInfo",
            format!("{}|{}", class_code, security_code),
        )
        .await
    }
}
