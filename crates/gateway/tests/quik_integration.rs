//! Integration test: QuikConnector <-> terminal simulator
//!
//! Runs the connector and the callback router against the bridge protocol
//! served over real TCP sockets.

use chrono::TimeZone;
use luatrader_clock::ManualClock;
use luatrader_core::calendar::terminal_time;
use luatrader_core::instruments::forts_security_info;
use luatrader_core::{Candle, CandleInterval, Order, PortfolioInfo, SecurityInfo};
use luatrader_gateway::{CallbackRouter, QuikConnector};
use luatrader_ports::{MarketDataService, Trader, TraderError};
use luatrader_terminal_sim::TerminalSim;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn portfolio() -> PortfolioInfo {
    PortfolioInfo::new("SPBFUT", "A1")
}

fn cny() -> SecurityInfo {
    forts_security_info("CNY-3.25").unwrap()
}

fn candle(code: &str, day: u32, hour: u32, min: u32, close: Decimal) -> Candle {
    Candle::new(
        code,
        terminal_time(2025, 1, day, hour, min, 0).unwrap(),
        close,
        close,
        close,
        close,
        dec!(10),
    )
}

async fn connect(sim: &TerminalSim) -> (QuikConnector, CallbackRouter) {
    let (connector, router) = QuikConnector::connect("127.0.0.1", sim.port())
        .await
        .expect("Failed to connect to simulator");
    sim.wait_for_event_clients(1).await;
    (connector, router)
}

#[tokio::test]
async fn test_portfolio_and_position_queries() {
    let _ = env_logger::try_init();
    let sim = TerminalSim::start().await.unwrap();
    sim.state().set_incoming_amount("A1", "1000000.00");
    sim.state().set_position("CRH5", -4);
    let (connector, _router) = connect(&sim).await;

    assert!(connector.is_connected().await.unwrap());
    assert_eq!(
        connector.incoming_amount(&portfolio()).await.unwrap(),
        dec!(1000000)
    );
    assert_eq!(connector.get_position(&portfolio(), &cny()).await.unwrap(), -4);

    // No holding row is a flat position
    let si = forts_security_info("Si-3.25").unwrap();
    assert_eq!(connector.get_position(&portfolio(), &si).await.unwrap(), 0);

    let unknown = PortfolioInfo::new("SPBFUT", "B2");
    assert_eq!(
        connector.incoming_amount(&unknown).await,
        Err(TraderError::NotFound("portfolio".into()))
    );

    let mut stock = cny();
    stock.class_code = "TQBR".into();
    assert!(matches!(
        connector.get_position(&portfolio(), &stock).await,
        Err(TraderError::NotSupported(_))
    ));
}

#[tokio::test]
async fn test_register_order_transactions() {
    let _ = env_logger::try_init();
    let sim = TerminalSim::start().await.unwrap();
    let (connector, _router) = connect(&sim).await;

    let buy = Order::new(portfolio(), cny(), 5, dec!(13.5135135));
    let sell = Order::new(portfolio(), cny(), -2, dec!(13.4865));
    connector.register_order(&buy).await.unwrap();
    connector.register_order(&sell).await.unwrap();

    let transactions = sim.state().transactions();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0]["ACTION"], "NEW_ORDER");
    assert_eq!(transactions[0]["OPERATION"], "B");
    assert_eq!(transactions[0]["QUANTITY"], "5");
    assert_eq!(transactions[0]["PRICE"], "13.514");
    assert_eq!(transactions[0]["SECCODE"], "CRH5");
    assert_eq!(transactions[0]["CLASSCODE"], "SPBFUT");
    assert_eq!(transactions[0]["ACCOUNT"], "A1");
    assert_eq!(transactions[1]["OPERATION"], "S");
    assert_eq!(transactions[1]["QUANTITY"], "2");

    let ids: Vec<i64> = transactions
        .iter()
        .map(|t| t["TRANS_ID"].as_str().unwrap().parse().unwrap())
        .collect();
    assert!(ids[1] > ids[0]);
    assert_eq!(transactions[0]["CLIENT_CODE"], transactions[0]["TRANS_ID"]);
    assert_eq!(sim.state().position("CRH5"), 3);

    // Request ids start at 1 and increase by one per command
    let request_ids: Vec<i64> = sim.state().requests().iter().map(|r| r.id).collect();
    assert_eq!(request_ids, vec![1, 2]);
}

#[tokio::test]
async fn test_last_candles_drop_todays_bar() {
    let _ = env_logger::try_init();
    let sim = TerminalSim::start().await.unwrap();
    sim.state().set_history(
        "CRH5",
        &[
            candle("CRH5", 19, 23, 45, dec!(13.40)),
            candle("CRH5", 20, 10, 0, dec!(13.50)),
            candle("CRH5", 20, 10, 5, dec!(13.55)),
        ],
        5,
    );
    let (connector, _router) = connect(&sim).await;

    // 2025-01-20 10:07 in terminal time
    let now = chrono::Utc.with_ymd_and_hms(2025, 1, 20, 7, 7, 0).unwrap();
    let connector = connector.with_clock(Arc::new(ManualClock::new(now)));

    let candles = connector
        .last_candles(&cny(), CandleInterval::Minutes5)
        .await
        .unwrap();
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[1].close, dec!(13.50));

    let request = &sim.state().requests_for("get_candles_from_data_source")[0];
    assert_eq!(request.data, "SPBFUT|CRH5|5|5000");
}

#[tokio::test]
async fn test_subscription_is_deduplicated() {
    let _ = env_logger::try_init();
    let sim = TerminalSim::start().await.unwrap();
    let (connector, _router) = connect(&sim).await;

    connector
        .subscribe_candles(&cny(), CandleInterval::Minutes5)
        .await
        .unwrap();
    connector
        .subscribe_candles(&cny(), CandleInterval::Minutes5)
        .await
        .unwrap();

    assert!(sim.state().is_subscribed("SPBFUT", "CRH5", 5));
    assert_eq!(sim.state().requests_for("subscribe_to_candles").len(), 1);
    assert_eq!(sim.state().requests_for("is_subscribed").len(), 1);
}

#[tokio::test]
async fn test_lua_error_surfaces_while_router_continues() {
    let _ = env_logger::try_init();
    let sim = TerminalSim::start().await.unwrap();
    let (connector, router) = connect(&sim).await;

    let (tx, mut rx) = mpsc::channel(16);
    let cancel = CancellationToken::new();
    let router_handle = tokio::spawn(router.run(cancel.clone(), tx));

    sim.state().fail_next("sendTransaction", "not connected");
    let result = connector
        .register_order(&Order::new(portfolio(), cny(), 1, dec!(13.5)))
        .await;
    assert_eq!(
        result,
        Err(TraderError::Remote {
            cmd: "sendTransaction".into(),
            message: "not connected".into()
        })
    );

    sim.push_error("NewCandle", "bad bar");
    sim.push_candle(&candle("CRH5", 20, 10, 5, dec!(13.55)), 5);
    sim.push_candle(&candle("SiH5", 20, 10, 5, dec!(101000)), 5);

    let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    let second = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.security_code, "CRH5");
    assert_eq!(first.close, dec!(13.55));
    assert_eq!(second.security_code, "SiH5");

    // The command channel is still usable after a remote error
    assert!(connector.is_connected().await.unwrap());

    cancel.cancel();
    assert!(router_handle.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_event_connection_close_ends_router() {
    let _ = env_logger::try_init();
    let sim = TerminalSim::start().await.unwrap();
    let (_connector, router) = connect(&sim).await;

    let (tx, _rx) = mpsc::channel(16);
    let handle = tokio::spawn(router.run(CancellationToken::new(), tx));
    sim.close_events();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_err());
}

#[tokio::test]
async fn test_last_price() {
    let _ = env_logger::try_init();
    let sim = TerminalSim::start().await.unwrap();
    sim.state().set_last_price("CRH5", "13.512");
    let (connector, _router) = connect(&sim).await;

    assert_eq!(connector.last_price(&cny()).await.unwrap(), dec!(13.512));
    let si = forts_security_info("Si-3.25").unwrap();
    assert!(matches!(
        connector.last_price(&si).await,
        Err(TraderError::NotFound(_))
    ));
}
