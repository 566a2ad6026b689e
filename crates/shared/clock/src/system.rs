use chrono::Utc;
use luatrader_core::Timestamp;
use luatrader_ports::Clock;

/// Wall clock of the host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }

    fn name(&self) -> &str {
        "system"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_terminal_now_is_moscow_time() {
        let clock = SystemClock::new();
        let utc = clock.now();
        let local = clock.terminal_now();

        assert_eq!(local.offset().local_minus_utc(), 3 * 3600);
        assert!((local.naive_utc() - utc.naive_utc()).abs() < Duration::seconds(1));
    }
}
