//! Protocol-level tests: raw TCP clients against the simulator

use luatrader_core::Candle;
use luatrader_core::calendar::terminal_time;
use luatrader_terminal_sim::TerminalSim;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

async fn request(stream: &mut BufReader<TcpStream>, id: i64, cmd: &str, data: Value) -> Value {
    let line = json!({ "id": id, "cmd": cmd, "t": 0, "data": data }).to_string();
    stream
        .get_mut()
        .write_all(format!("{}\r\n", line).as_bytes())
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_line(&mut response).await.unwrap();
    serde_json::from_str(&response).unwrap()
}

#[tokio::test]
async fn test_commands_round_trip() {
    let _ = env_logger::try_init();
    let sim = TerminalSim::start().await.unwrap();
    sim.state().set_incoming_amount("A1", "1000000");
    sim.state().set_position("SiH7", 2);

    let stream = TcpStream::connect(("127.0.0.1", sim.port())).await.unwrap();
    let mut stream = BufReader::new(stream);

    let response = request(&mut stream, 1, "isConnected", json!("")).await;
    assert_eq!(response["id"], 1);
    assert_eq!(response["data"], 1);

    let response = request(&mut stream, 2, "getPortfolioInfoEx", json!("SPBFUT|A1|0")).await;
    assert_eq!(response["data"]["start_limit_open_pos"], "1000000");

    let response = request(&mut stream, 3, "getFuturesHolding", json!("SPBFUT|A1|SiH7|0")).await;
    assert_eq!(response["data"]["totalnet"], 2.0);

    let response = request(&mut stream, 4, "noSuchFunction", json!("")).await;
    assert!(response["lua_error"].as_str().unwrap().contains("unknown command"));

    let ids: Vec<i64> = sim.state().requests().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_events_are_pushed_then_closed() {
    let _ = env_logger::try_init();
    let sim = TerminalSim::start().await.unwrap();

    let stream = TcpStream::connect(("127.0.0.1", sim.port() + 1)).await.unwrap();
    let mut events = BufReader::new(stream);
    sim.wait_for_event_clients(1).await;

    let candle = Candle::new(
        "SiH7",
        terminal_time(2017, 1, 10, 10, 5, 0).unwrap(),
        dec!(60000),
        dec!(60100),
        dec!(59900),
        dec!(60050),
        dec!(1200),
    );
    sim.push_candle(&candle, 5);
    sim.close_events();

    let mut line = String::new();
    events.read_line(&mut line).await.unwrap();
    let event: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(event["cmd"], "NewCandle");
    assert_eq!(event["data"]["sec"], "SiH7");
    assert_eq!(event["data"]["datetime"]["min"], 5);
    assert_eq!(event["data"]["close"], 60050.0);

    line.clear();
    assert_eq!(events.read_line(&mut line).await.unwrap(), 0);
}
