use log::{debug, error, info, warn};
use luatrader_core::Candle;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::error::{Result, SimError};
use crate::state::TerminalState;
use crate::wire::{bar_json, read_line, write_line};

const PORT_PAIR_ATTEMPTS: usize = 32;
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
enum EventFrame {
    Line(String),
    Close,
}

/// Running simulator bound to `127.0.0.1:{port}` and `{port + 1}`
pub struct TerminalSim {
    port: u16,
    state: Arc<TerminalState>,
    events_tx: broadcast::Sender<EventFrame>,
    tasks: Vec<JoinHandle<()>>,
}

impl TerminalSim {
    /// Bind a free port pair and start serving
    pub async fn start() -> Result<Self> {
        let (commands, events) = bind_port_pair().await?;
        let port = commands.local_addr()?.port();
        let state = Arc::new(TerminalState::new());
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let command_task = tokio::spawn(accept_commands(commands, state.clone()));
        let event_task = tokio::spawn(accept_events(events, events_tx.clone()));
        info!("[terminal-sim] Listening on {} and {}", port, port + 1);

        Ok(Self {
            port,
            state,
            events_tx,
            tasks: vec![command_task, event_task],
        })
    }

    /// Command port; events are served on `port() + 1`
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> &TerminalState {
        &self.state
    }

    /// Wait until `count` event connections are attached
    pub async fn wait_for_event_clients(&self, count: usize) {
        while self.events_tx.receiver_count() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Push a raw event envelope to every event connection
    pub fn push_event(&self, event: Value) {
        self.push_line(event.to_string());
    }

    /// Push a raw line (not necessarily valid JSON)
    pub fn push_line(&self, line: String) {
        if self.events_tx.send(EventFrame::Line(line)).is_err() {
            warn!("[terminal-sim] No event connection attached");
        }
    }

    /// Push a `NewCandle` event
    pub fn push_candle(&self, candle: &Candle, interval: u32) {
        self.push_event(json!({
            "cmd": "NewCandle",
            "t": chrono::Utc::now().timestamp_millis(),
            "data": bar_json(candle, interval),
        }));
    }

    /// Push an event that carries a terminal-side error
    pub fn push_error(&self, cmd: &str, message: &str) {
        self.push_event(json!({ "cmd": cmd, "t": 0, "lua_error": message }));
    }

    /// Close every event connection
    pub fn close_events(&self) {
        let _ = self.events_tx.send(EventFrame::Close);
    }
}

impl Drop for TerminalSim {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn bind_port_pair() -> Result<(TcpListener, TcpListener)> {
    for _ in 0..PORT_PAIR_ATTEMPTS {
        let commands = TcpListener::bind("127.0.0.1:0").await?;
        let port = commands.local_addr()?.port();
        if port == u16::MAX {
            continue;
        }
        if let Ok(events) = TcpListener::bind(("127.0.0.1", port + 1)).await {
            return Ok((commands, events));
        }
    }
    Err(SimError::NoPortPair(PORT_PAIR_ATTEMPTS))
}

async fn accept_commands(listener: TcpListener, state: Arc<TerminalState>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!("[terminal-sim] Command connection from {}", peer);
                let state = state.clone();
                tokio::spawn(async move {
                    if let Err(e) = serve_commands(stream, state).await {
                        error!("[terminal-sim] Command connection failed: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("[terminal-sim] Accept failed: {}", e);
                return;
            }
        }
    }
}

async fn serve_commands(stream: TcpStream, state: Arc<TerminalState>) -> Result<()> {
    let (read, mut write) = stream.into_split();
    let mut reader = BufReader::new(read);
    let mut buf = Vec::new();

    while let Some(line) = read_line(&mut reader, &mut buf).await? {
        let request: Value = serde_json::from_str(&line)?;
        let id = request["id"].as_i64().unwrap_or_default();
        let cmd = request["cmd"].as_str().unwrap_or_default().to_string();
        let data = request.get("data").cloned().unwrap_or(Value::Null);

        let outcome = state.handle(id, &cmd, data);
        if state.is_stalled(&cmd) {
            debug!("[terminal-sim] Holding the reply to {} #{}", cmd, id);
            std::future::pending::<()>().await;
        }
        let response = match outcome {
            Ok(data) => json!({ "id": id, "cmd": cmd, "t": 0, "data": data }),
            Err(message) => {
                json!({ "id": id, "cmd": cmd, "t": 0, "data": null, "lua_error": message })
            }
        };
        write_line(&mut write, &response.to_string()).await?;
    }
    debug!("[terminal-sim] Command connection closed");
    Ok(())
}

async fn accept_events(listener: TcpListener, events_tx: broadcast::Sender<EventFrame>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!("[terminal-sim] Event connection from {}", peer);
                let rx = events_tx.subscribe();
                tokio::spawn(async move {
                    if let Err(e) = serve_events(stream, rx).await {
                        error!("[terminal-sim] Event connection failed: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("[terminal-sim] Accept failed: {}", e);
                return;
            }
        }
    }
}

async fn serve_events(mut stream: TcpStream, mut rx: broadcast::Receiver<EventFrame>) -> Result<()> {
    loop {
        match rx.recv().await {
            Ok(EventFrame::Line(line)) => write_line(&mut stream, &line).await?,
            Ok(EventFrame::Close) | Err(broadcast::error::RecvError::Closed) => {
                debug!("[terminal-sim] Closing event connection");
                return Ok(());
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("[terminal-sim] Event connection lagged by {}", skipped);
            }
        }
    }
}
