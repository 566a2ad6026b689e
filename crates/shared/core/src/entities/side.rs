use serde::{Deserialize, Serialize};

/// Order side (Buy or Sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Side implied by a signed lot volume. Zero has no side.
    pub fn from_volume(volume: i64) -> Option<Self> {
        match volume {
            v if v > 0 => Some(Side::Buy),
            v if v < 0 => Some(Side::Sell),
            _ => None,
        }
    }

    /// Terminal operation code
    pub fn operation(&self) -> &'static str {
        match self {
            Side::Buy => "B",
            Side::Sell => "S",
        }
    }

    /// Returns the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_from_volume() {
        assert_eq!(Side::from_volume(3), Some(Side::Buy));
        assert_eq!(Side::from_volume(-1), Some(Side::Sell));
        assert_eq!(Side::from_volume(0), None);
        assert_eq!(Side::Buy.opposite().operation(), "S");
    }
}
