//! Integration test: SignalService / QuietStrategy <-> terminal simulator
//!
//! Warm-up from terminal history, subscription and live dispatch through a
//! real QuikConnector.

use chrono::{Duration, TimeZone, Utc};
use luatrader_core::Candle;
use luatrader_core::calendar::terminal_time;
use luatrader_gateway::{FortsSecurityInformator, QuikConnector};
use luatrader_ports::AdvisorConfig;
use luatrader_strategy::{BuiltinAdvisorFactory, QuietStrategy, SignalDeps, SignalService};
use luatrader_terminal_sim::TerminalSim;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn candle(day: u32, hour: u32, min: u32, close: Decimal) -> Candle {
    Candle::new(
        "CRH5",
        terminal_time(2025, 1, day, hour, min, 0).unwrap(),
        close,
        close,
        close,
        close,
        dec!(100),
    )
}

#[tokio::test]
async fn test_signal_warms_up_and_subscribes() {
    let _ = env_logger::try_init();
    let sim = TerminalSim::start().await.unwrap();
    sim.state().set_history(
        "CRH5",
        &[candle(17, 10, 0, dec!(13.40)), candle(17, 10, 5, dec!(13.45))],
        5,
    );

    let (connector, _router) = QuikConnector::connect("127.0.0.1", sim.port())
        .await
        .unwrap();
    let deps = SignalDeps {
        informator: &FortsSecurityInformator,
        factory: &BuiltinAdvisorFactory,
        storage: None,
        market_data: Arc::new(connector),
    };
    let config = AdvisorConfig::new("hold", "CNY-3.25")
        .with_lever(dec!(0.5), dec!(1));
    let session_start = Utc.with_ymd_and_hms(2025, 1, 20, 7, 0, 0).unwrap();

    let mut signal = SignalService::init(&config, &deps, session_start - Duration::minutes(10))
        .await
        .unwrap();
    assert_eq!(signal.last_advice().unwrap().price, dec!(13.45));
    assert_eq!(signal.last_advice().unwrap().position, dec!(0.5));
    assert!(!sim.state().is_subscribed("SPBFUT", "CRH5", 5));

    signal.subscribe().await.unwrap();
    assert!(sim.state().is_subscribed("SPBFUT", "CRH5", 5));

    let advice = signal.on_candle(&candle(20, 10, 5, dec!(13.55))).unwrap();
    assert_eq!(advice.security_code, "CRH5");
    assert_eq!(advice.position, dec!(0.5));
}

#[tokio::test]
async fn test_quiet_strategy_shares_subscription_path() {
    let _ = env_logger::try_init();
    let sim = TerminalSim::start().await.unwrap();
    let (connector, _router) = QuikConnector::connect("127.0.0.1", sim.port())
        .await
        .unwrap();
    let deps = SignalDeps {
        informator: &FortsSecurityInformator,
        factory: &BuiltinAdvisorFactory,
        storage: None,
        market_data: Arc::new(connector),
    };

    let mut quiet = QuietStrategy::init(&AdvisorConfig::new("sample", "CNY-3.25"), &deps, Utc::now())
        .await
        .unwrap();
    quiet.subscribe().await.unwrap();
    assert!(sim.state().is_subscribed("SPBFUT", "CRH5", 5));

    quiet.on_candle(&candle(20, 10, 5, dec!(13.55)));
    assert_eq!(quiet.signal().last_advice().unwrap().position, dec!(0));
    assert!(sim.state().transactions().is_empty());
}
