//! Operator commands read from the console

use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    /// Show every signal and check every position
    Status,
    Quit,
}

impl OperatorCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "status" => Some(OperatorCommand::Status),
            "quit" | "exit" => Some(OperatorCommand::Quit),
            _ => None,
        }
    }
}

/// Read commands line by line until cancelled or the input ends.
///
/// `quit` cancels the session; other commands go to the main cycle.
pub async fn read_commands<R>(
    input: R,
    cancel: CancellationToken,
    commands: mpsc::Sender<OperatorCommand>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            info!("[commands] Input closed");
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }
        match OperatorCommand::parse(&line) {
            Some(OperatorCommand::Quit) => {
                info!("[commands] Quit");
                cancel.cancel();
                return Ok(());
            }
            Some(command) => {
                if commands.send(command).await.is_err() {
                    return Ok(());
                }
            }
            None => warn!("[commands] Unknown command {:?}", line.trim()),
        }
    }
}
