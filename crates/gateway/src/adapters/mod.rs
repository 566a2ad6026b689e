//! Collaborator adapters
//!
//! Reference data and a terminal stand-in for dry runs.

mod forts;
mod mock;

pub use forts::FortsSecurityInformator;
pub use mock::MockTrader;
