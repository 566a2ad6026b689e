use async_trait::async_trait;
use luatrader_core::{Order, PortfolioInfo, SecurityInfo};
use rust_decimal::Decimal;

use crate::error::Result;

/// Port for the broker side of the terminal
#[async_trait]
pub trait Trader: Send + Sync {
    async fn is_connected(&self) -> Result<bool>;

    /// Funds available for opening positions
    async fn incoming_amount(&self, portfolio: &PortfolioInfo) -> Result<Decimal>;

    /// Net position in lots, signed
    async fn get_position(&self, portfolio: &PortfolioInfo, security: &SecurityInfo)
    -> Result<i64>;

    /// Submit a limit order. Success means the terminal accepted the
    /// transaction, not that it was filled.
    async fn register_order(&self, order: &Order) -> Result<()>;
}
