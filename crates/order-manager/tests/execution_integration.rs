//! Integration test: StrategyExecutor -> QuikConnector -> terminal simulator

use chrono::{Duration, TimeZone, Utc};
use luatrader_clock::ManualClock;
use luatrader_core::calendar::terminal_time;
use luatrader_core::instruments::forts_security_info;
use luatrader_core::{Advice, PortfolioInfo};
use luatrader_gateway::QuikConnector;
use luatrader_order_manager::{
    AmountLimits, ExecutionConfig, ExecutionOutcome, PositionCheck, StrategyExecutor,
    calc_available_amount,
};
use luatrader_ports::Trader;
use luatrader_terminal_sim::TerminalSim;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn advice(min: u32, price: Decimal, position: Decimal) -> Advice {
    Advice::new("CRH5", terminal_time(2025, 1, 20, 10, min, 0).unwrap(), price, position)
}

async fn setup(sim: &TerminalSim) -> (Arc<QuikConnector>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 1, 20, 7, 10, 0).unwrap(),
    ));
    let (connector, _router) = QuikConnector::connect("127.0.0.1", sim.port())
        .await
        .expect("Failed to connect to simulator");
    (Arc::new(connector.with_clock(clock.clone())), clock)
}

async fn executor(connector: Arc<QuikConnector>, clock: Arc<ManualClock>) -> StrategyExecutor {
    let portfolio = PortfolioInfo::new("SPBFUT", "A1");
    let start = connector.incoming_amount(&portfolio).await.unwrap();
    let amount = calc_available_amount(
        start,
        &AmountLimits {
            weight: dec!(0.5),
            ..Default::default()
        },
    );
    StrategyExecutor::init(
        connector,
        portfolio,
        forts_security_info("CNY-3.25").unwrap(),
        amount,
        clock,
        ExecutionConfig::default(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_advice_becomes_transaction() {
    let _ = env_logger::try_init();
    let sim = TerminalSim::start().await.unwrap();
    sim.state().set_incoming_amount("A1", "2000000");
    let (connector, clock) = setup(&sim).await;
    let mut executor = executor(connector, clock).await;
    assert_eq!(executor.position(), 0);

    // 1,000,000 / (13.5 × 1000) × 0.5 = 37.03 → 37 lots
    let outcome = executor.on_advice(&advice(5, dec!(13.5), dec!(0.5))).await.unwrap();
    assert_eq!(
        outcome,
        ExecutionOutcome::Registered {
            volume: 37,
            price: dec!(13.5135)
        }
    );
    assert_eq!(sim.state().position("CRH5"), 37);

    let transactions = sim.state().transactions();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["OPERATION"], "B");
    assert_eq!(transactions[0]["QUANTITY"], "37");
    assert_eq!(transactions[0]["PRICE"], "13.514");

    assert_eq!(executor.check_position().await.unwrap(), PositionCheck::Match(37));

    // Same target again: nothing sent
    let again = executor.on_advice(&advice(6, dec!(13.6), dec!(0.5))).await.unwrap();
    assert_eq!(again, ExecutionOutcome::NoChange);
    assert_eq!(sim.state().transactions().len(), 1);

    // Flip to short: sell 37 + 18
    let flip = executor.on_advice(&advice(7, dec!(13.4), dec!(-0.25))).await.unwrap();
    assert!(matches!(flip, ExecutionOutcome::Registered { volume: -55, .. }));
    let transactions = sim.state().transactions();
    assert_eq!(transactions[1]["OPERATION"], "S");
    assert_eq!(transactions[1]["QUANTITY"], "55");
    assert_eq!(sim.state().position("CRH5"), -18);
}

#[tokio::test]
async fn test_unfilled_order_blocks_next_advice() {
    let _ = env_logger::try_init();
    let sim = TerminalSim::start().await.unwrap();
    sim.state().set_incoming_amount("A1", "2000000");
    sim.state().set_fill_orders(false);
    let (connector, clock) = setup(&sim).await;
    let mut executor = executor(connector, clock).await;

    let first = executor.on_advice(&advice(5, dec!(13.5), dec!(0.5))).await.unwrap();
    assert!(matches!(first, ExecutionOutcome::Registered { volume: 37, .. }));
    assert_eq!(executor.position(), 37);

    // Terminal still flat: the next change is held back
    let second = executor.on_advice(&advice(6, dec!(13.5), dec!(1))).await.unwrap();
    assert_eq!(second, ExecutionOutcome::Blocked);
    assert_eq!(sim.state().transactions().len(), 1);
}

#[tokio::test]
async fn test_rejected_transaction_and_stale_advice() {
    let _ = env_logger::try_init();
    let sim = TerminalSim::start().await.unwrap();
    sim.state().set_incoming_amount("A1", "2000000");
    let (connector, clock) = setup(&sim).await;
    let mut executor = executor(connector, clock.clone()).await;

    sim.state().fail_next("sendTransaction", "wrong price");
    let err = executor
        .on_advice(&advice(5, dec!(13.5), dec!(0.5)))
        .await
        .unwrap_err();
    assert!(!err.is_fatal());
    assert_eq!(executor.position(), 0);
    assert_eq!(sim.state().position("CRH5"), 0);

    clock.advance(Duration::minutes(10));
    let stale = executor.on_advice(&advice(6, dec!(13.5), dec!(0.5))).await.unwrap();
    assert_eq!(stale, ExecutionOutcome::Stale);
}
