use chrono::{Local, NaiveTime, Timelike};
use log::{debug, error, warn};
use luatrader_ports::{Result, TraderError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::codec::{LineReader, LineWriter, RequestEnvelope, ResponseEnvelope};
use crate::error::GatewayError;

type BoxedRead = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWrite = Box<dyn AsyncWrite + Send + Unpin>;

/// Request/response client for the command connection.
///
/// The connection is guarded by an async mutex so only one command is ever
/// in flight. After a transport failure, or a round trip abandoned before
/// its reply arrived, the connection is marked broken and every later call
/// fails with `TraderError::Transport`.
pub struct QuikService {
    channel: Mutex<CommandChannel>,
    trans_id: AtomicI64,
    cancel: CancellationToken,
}

struct CommandChannel {
    reader: LineReader<BoxedRead>,
    writer: LineWriter<BoxedWrite>,
    next_id: i64,
    broken: bool,
}

impl CommandChannel {
    async fn round_trip(&mut self, request: &RequestEnvelope) -> std::result::Result<ResponseEnvelope, GatewayError> {
        self.writer.write_json(request).await?;
        self.reader.read_json().await
    }
}

/// Seconds since local midnight, the first transaction id of a session
pub fn trans_id_seed(time: NaiveTime) -> i64 {
    60 * (60 * time.hour() as i64 + time.minute() as i64) + time.second() as i64
}

impl QuikService {
    pub fn new<S>(stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read, write): (ReadHalf<S>, WriteHalf<S>) = tokio::io::split(stream);
        Self::from_parts(Box::new(read), Box::new(write))
    }

    pub fn from_parts(read: BoxedRead, write: BoxedWrite) -> Self {
        Self {
            channel: Mutex::new(CommandChannel {
                reader: LineReader::new(read),
                writer: LineWriter::new(write),
                next_id: 1,
                broken: false,
            }),
            trans_id: AtomicI64::new(trans_id_seed(Local::now().time())),
            cancel: CancellationToken::new(),
        }
    }

    /// Builder: abandon a pending reply when `cancel` fires
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Builder: start transaction ids from a fixed value
    pub fn with_trans_id_seed(self, seed: i64) -> Self {
        self.trans_id.store(seed, Ordering::SeqCst);
        self
    }

    /// Fresh transaction id (pre-incremented)
    pub fn next_trans_id(&self) -> i64 {
        self.trans_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Send a command and decode the response payload.
    ///
    /// `Ok(None)` means the terminal answered without data.
    pub async fn execute_query<T: DeserializeOwned>(
        &self,
        cmd: &str,
        request: impl Serialize + Send,
    ) -> Result<Option<T>> {
        match self.execute_query_dynamic(cmd, request).await? {
            Some(data) => serde_json::from_value(data)
                .map(Some)
                .map_err(|e| TraderError::Decode(format!("{}: {}", cmd, e))),
            None => Ok(None),
        }
    }

    /// Send a command and return the raw response payload
    pub async fn execute_query_dynamic(
        &self,
        cmd: &str,
        request: impl Serialize + Send,
    ) -> Result<Option<Value>> {
        let data = serde_json::to_value(request)
            .map_err(|e| TraderError::Decode(format!("{}: {}", cmd, e)))?;

        let mut channel = self.channel.lock().await;
        if channel.broken {
            return Err(TraderError::Transport("command connection is broken".into()));
        }
        let id = channel.next_id;
        channel.next_id += 1;
        let request = RequestEnvelope::new(id, cmd, data);
        debug!("[quik] -> {} #{}", cmd, id);

        // Cleared once the reply is read; a dropped or cancelled call leaves
        // the request unanswered on the wire.
        channel.broken = true;
        let response = tokio::select! {
            _ = self.cancel.cancelled() => {
                warn!("[quik] {} #{} abandoned on shutdown", cmd, id);
                return Err(TraderError::Transport(format!("{} cancelled", cmd)));
            }
            response = channel.round_trip(&request) => response,
        };
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                error!("[quik] {} #{} failed: {}", cmd, id, e);
                return Err(e.into());
            }
        };
        channel.broken = false;
        drop(channel);

        if let Some(message) = response.error() {
            return Err(TraderError::Remote {
                cmd: cmd.to_string(),
                message: message.to_string(),
            });
        }
        Ok(response.into_data())
    }
}
