//! Callback Router - the single reader of the event connection
//!
//! Decodes pushed events and forwards new bars as `Candle`s. Terminal-side
//! errors are logged and skipped; a broken or undecodable stream ends the
//! router with an error.

use log::{debug, error, info};
use luatrader_core::Candle;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::codec::{CallbackEnvelope, LineReader};
use crate::error::GatewayError;
use crate::quik::{EVENT_NEW_CANDLE, QuikCandle};

type BoxedRead = Box<dyn AsyncRead + Send + Unpin>;

pub struct CallbackRouter {
    reader: LineReader<BoxedRead>,
}

impl CallbackRouter {
    pub fn new<R>(events: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            reader: LineReader::new(Box::new(events)),
        }
    }

    /// Read events until cancelled or the connection fails.
    ///
    /// Returns `Ok(())` on cancellation or when the candle receiver is gone.
    pub async fn run(
        mut self,
        cancel: CancellationToken,
        candles: mpsc::Sender<Candle>,
    ) -> Result<(), GatewayError> {
        loop {
            let line = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("[callbacks] Cancelled");
                    return Ok(());
                }
                line = self.reader.read_line() => line?,
            };
            let event: CallbackEnvelope = serde_json::from_str(&line)?;

            if let Some(message) = event.error() {
                error!("[callbacks] {} failed in terminal: {}", event.cmd, message);
                continue;
            }
            if event.cmd != EVENT_NEW_CANDLE {
                debug!("[callbacks] Ignored event {}", event.cmd);
                continue;
            }
            let Some(data) = event.data else {
                continue;
            };
            let bar: QuikCandle = serde_json::from_value(data)?;
            let candle = bar
                .to_candle()
                .map_err(|e| GatewayError::Conversion(e.to_string()))?;

            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                sent = candles.send(candle) => {
                    if sent.is_err() {
                        info!("[callbacks] Candle receiver closed");
                        return Ok(());
                    }
                }
            }
        }
    }
}
