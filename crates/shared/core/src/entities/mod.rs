mod advice;
mod candle;
mod order;
mod portfolio;
mod side;

pub use advice::Advice;
pub use candle::{Candle, CandleInterval};
pub use order::Order;
pub use portfolio::PortfolioInfo;
pub use side::Side;
