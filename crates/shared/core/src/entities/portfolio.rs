use serde::{Deserialize, Serialize};

/// Account identity at the broker
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortfolioInfo {
    pub firm: String,
    pub portfolio: String,
}

impl PortfolioInfo {
    pub fn new(firm: impl Into<String>, portfolio: impl Into<String>) -> Self {
        Self {
            firm: firm.into(),
            portfolio: portfolio.into(),
        }
    }
}
