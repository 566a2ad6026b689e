use serde::{Deserialize, Serialize};

use super::{PortfolioInfo, Side};
use crate::instruments::SecurityInfo;
use crate::values::Price;

/// Limit order to submit. Transient: lives only for one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub portfolio: PortfolioInfo,
    pub security: SecurityInfo,
    /// Signed lots: positive buys, negative sells
    pub volume: i64,
    pub price: Price,
}

impl Order {
    pub fn new(portfolio: PortfolioInfo, security: SecurityInfo, volume: i64, price: Price) -> Self {
        Self {
            portfolio,
            security,
            volume,
            price,
        }
    }

    /// Side of the order (`None` for a zero volume)
    pub fn side(&self) -> Option<Side> {
        Side::from_volume(self.volume)
    }

    /// Unsigned lot count
    pub fn quantity(&self) -> u64 {
        self.volume.unsigned_abs()
    }
}
