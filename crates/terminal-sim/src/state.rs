use dashmap::{DashMap, DashSet};
use log::{debug, info};
use luatrader_core::Candle;
use serde_json::{Value, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::wire::bar_json;

/// One command as the simulator received it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub id: i64,
    pub cmd: String,
    pub data: Value,
}

/// Terminal-side state shared by all connections
pub struct TerminalState {
    connected: AtomicBool,
    /// Orders change positions immediately when set
    fill_orders: AtomicBool,
    /// client code → `start_limit_open_pos` text
    incoming_amounts: DashMap<String, String>,
    /// security code → net position
    positions: DashMap<String, i64>,
    /// security code → last price text
    last_prices: DashMap<String, String>,
    /// security code → bars, oldest first
    history: DashMap<String, Vec<Value>>,
    /// `class|sec|interval`
    subscriptions: DashSet<String>,
    /// command → one-shot `lua_error`
    failures: DashMap<String, String>,
    /// commands executed but never answered
    stalled: DashSet<String>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl Default for TerminalState {
    fn default() -> Self {
        Self {
            connected: AtomicBool::new(true),
            fill_orders: AtomicBool::new(true),
            incoming_amounts: DashMap::new(),
            positions: DashMap::new(),
            last_prices: DashMap::new(),
            history: DashMap::new(),
            subscriptions: DashSet::new(),
            failures: DashMap::new(),
            stalled: DashSet::new(),
            requests: Mutex::new(Vec::new()),
        }
    }
}

fn args(data: &Value) -> Vec<String> {
    data.as_str()
        .unwrap_or_default()
        .split('|')
        .map(str::to_string)
        .collect()
}

fn arg(args: &[String], index: usize) -> &str {
    args.get(index).map(String::as_str).unwrap_or_default()
}

impl TerminalState {
    pub fn new() -> Self {
        Self::default()
    }

    // ============ Seeding ============

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn set_fill_orders(&self, fill: bool) {
        self.fill_orders.store(fill, Ordering::SeqCst);
    }

    pub fn set_incoming_amount(&self, client_code: &str, amount: &str) {
        self.incoming_amounts
            .insert(client_code.to_string(), amount.to_string());
    }

    /// Set the terminal's position, as if changed outside the client
    pub fn set_position(&self, security_code: &str, position: i64) {
        self.positions.insert(security_code.to_string(), position);
    }

    pub fn set_last_price(&self, security_code: &str, price: &str) {
        self.last_prices
            .insert(security_code.to_string(), price.to_string());
    }

    pub fn set_history(&self, security_code: &str, candles: &[Candle], interval: u32) {
        let bars = candles.iter().map(|c| bar_json(c, interval)).collect();
        self.history.insert(security_code.to_string(), bars);
    }

    /// Answer the next `cmd` with a `lua_error`
    pub fn fail_next(&self, cmd: &str, message: &str) {
        self.failures.insert(cmd.to_string(), message.to_string());
    }

    /// Execute every later `cmd` but never send its reply
    pub fn stall(&self, cmd: &str) {
        self.stalled.insert(cmd.to_string());
    }

    // ============ Inspection ============

    pub fn position(&self, security_code: &str) -> i64 {
        self.positions.get(security_code).map(|p| *p).unwrap_or(0)
    }

    pub fn is_subscribed(&self, class_code: &str, security_code: &str, interval: u32) -> bool {
        self.subscriptions
            .contains(&format!("{}|{}|{}", class_code, security_code, interval))
    }

    pub fn is_stalled(&self, cmd: &str) -> bool {
        self.stalled.contains(cmd)
    }

    /// Every command received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn requests_for(&self, cmd: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.cmd == cmd)
            .collect()
    }

    /// Transactions received through `sendTransaction`
    pub fn transactions(&self) -> Vec<Value> {
        self.requests_for("sendTransaction")
            .into_iter()
            .map(|r| r.data)
            .collect()
    }

    // ============ Command handling ============

    /// Execute one command: `Ok(data)` or `Err(lua_error)`
    pub fn handle(&self, id: i64, cmd: &str, data: Value) -> Result<Value, String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                id,
                cmd: cmd.to_string(),
                data: data.clone(),
            });
        }
        if let Some((_, message)) = self.failures.remove(cmd) {
            debug!("[terminal-sim] Injected failure for {}: {}", cmd, message);
            return Err(message);
        }

        match cmd {
            "isConnected" => Ok(json!(if self.connected.load(Ordering::SeqCst) { 1 } else { 0 })),
            "message" => {
                info!("[terminal-sim] Message: {}", data.as_str().unwrap_or_default());
                Ok(json!(true))
            }
            "getPortfolioInfoEx" => {
                let args = args(&data);
                Ok(self
                    .incoming_amounts
                    .get(arg(&args, 1))
                    .map(|amount| json!({ "start_limit_open_pos": amount.value() }))
                    .unwrap_or(Value::Null))
            }
            "getFuturesHolding" => {
                let args = args(&data);
                Ok(self
                    .positions
                    .get(arg(&args, 2))
                    .map(|position| json!({ "totalnet": *position as f64 }))
                    .unwrap_or(Value::Null))
            }
            "sendTransaction" => self.send_transaction(&data),
            "get_candles_from_data_source" => {
                let args = args(&data);
                let count: usize = arg(&args, 3).parse().unwrap_or(usize::MAX);
                let bars = self
                    .history
                    .get(arg(&args, 1))
                    .map(|bars| {
                        let skip = bars.len().saturating_sub(count);
                        bars[skip..].to_vec()
                    })
                    .unwrap_or_default();
                Ok(Value::Array(bars))
            }
            "is_subscribed" => Ok(json!(
                self.subscriptions
                    .contains(data.as_str().unwrap_or_default())
            )),
            "subscribe_to_candles" => {
                self.subscriptions
                    .insert(data.as_str().unwrap_or_default().to_string());
                Ok(json!(true))
            }
            "getParamEx" => {
                let args = args(&data);
                if arg(&args, 2) != "LAST" {
                    return Ok(Value::Null);
                }
                Ok(self
                    .last_prices
                    .get(arg(&args, 1))
                    .map(|price| {
                        json!({ "param_type": "1", "param_value": price.value(), "result": "1" })
                    })
                    .unwrap_or(Value::Null))
            }
            "getSecurityInfo" => {
                let args = args(&data);
                Ok(json!({ "class_code": arg(&args, 0), "code": arg(&args, 1) }))
            }
            other => Err(format!("unknown command {}", other)),
        }
    }

    fn send_transaction(&self, data: &Value) -> Result<Value, String> {
        let field = |name: &str| data.get(name).and_then(Value::as_str).unwrap_or_default();
        if field("ACTION") != "NEW_ORDER" {
            return Err(format!("unsupported action {}", field("ACTION")));
        }
        let quantity: i64 = field("QUANTITY")
            .parse()
            .map_err(|_| format!("bad quantity {}", field("QUANTITY")))?;
        let signed = match field("OPERATION") {
            "B" => quantity,
            "S" => -quantity,
            other => return Err(format!("bad operation {}", other)),
        };
        info!(
            "[terminal-sim] Transaction {} {} {} {} @ {}",
            field("TRANS_ID"),
            field("SECCODE"),
            field("OPERATION"),
            quantity,
            field("PRICE")
        );
        if self.fill_orders.load(Ordering::SeqCst) {
            *self
                .positions
                .entry(field("SECCODE").to_string())
                .or_insert(0) += signed;
        }
        Ok(json!(true))
    }
}
