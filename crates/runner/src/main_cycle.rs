//! Main cycle
//!
//! Owns every strategy of the session and drives them from one task:
//! live candles, operator commands and position checks.

use log::{debug, error, info};
use luatrader_core::Candle;
use luatrader_order_manager::{ExecutionOutcome, StrategyExecutor};
use luatrader_strategy::{QuietStrategy, SignalService};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::commands::OperatorCommand;
use crate::error::Result;

/// A strategy as the main cycle drives it
pub enum StrategySlot {
    /// Signal paired with its executor
    Trading {
        signal: SignalService,
        executor: StrategyExecutor,
    },
    /// Logs advice, never trades
    Quiet(QuietStrategy),
}

impl StrategySlot {
    pub fn name(&self) -> &str {
        match self {
            StrategySlot::Trading { signal, .. } => &signal.security().name,
            StrategySlot::Quiet(quiet) => &quiet.security().name,
        }
    }
}

enum Step {
    Candle(Candle),
    CheckPositions,
    Status,
    Idle,
}

pub struct MainCycle {
    strategies: Vec<StrategySlot>,
    reconcile_delay: Duration,
    reconcile_interval: Option<Duration>,
}

impl MainCycle {
    pub fn new(strategies: Vec<StrategySlot>, reconcile_delay: Duration) -> Self {
        Self {
            strategies,
            reconcile_delay,
            reconcile_interval: None,
        }
    }

    /// Builder: also check positions on a fixed period
    pub fn with_reconcile_interval(mut self, interval: Option<Duration>) -> Self {
        self.reconcile_interval = interval;
        self
    }

    pub fn strategies(&self) -> &[StrategySlot] {
        &self.strategies
    }

    /// Run until cancelled. Only fatal errors end the cycle with `Err`.
    ///
    /// Cancellation is also observed while a step waits on the terminal.
    pub async fn run(
        mut self,
        cancel: CancellationToken,
        mut candles: mpsc::Receiver<Candle>,
        mut commands: mpsc::Receiver<OperatorCommand>,
    ) -> Result<()> {
        info!("[main] Started with {} strategies", self.strategies.len());
        let mut reconcile_at: Option<Instant> = None;
        let mut ticker = self.reconcile_interval.map(|period| {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        let mut candles_open = true;

        loop {
            let step = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("[main] Cancelled");
                    return Ok(());
                }
                _ = sleep_until(reconcile_at) => {
                    reconcile_at = None;
                    Step::CheckPositions
                }
                _ = tick(&mut ticker) => Step::CheckPositions,
                Some(command) = commands.recv() => match command {
                    OperatorCommand::Status => Step::Status,
                    OperatorCommand::Quit => {
                        cancel.cancel();
                        return Ok(());
                    }
                },
                candle = candles.recv(), if candles_open => match candle {
                    Some(candle) => Step::Candle(candle),
                    None => {
                        info!("[main] Candle stream closed");
                        candles_open = false;
                        Step::Idle
                    }
                },
            };

            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("[main] Cancelled while waiting on the terminal");
                    return Ok(());
                }
                result = self.execute(&step) => result,
            };
            match result {
                Ok(registered) => {
                    if registered && reconcile_at.is_none() {
                        debug!("[main] Position check in {:?}", self.reconcile_delay);
                        reconcile_at = Some(Instant::now() + self.reconcile_delay);
                    }
                }
                // a call abandoned on shutdown reports a transport error
                Err(_) if cancel.is_cancelled() => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    /// One unit of work; true when an order was registered
    async fn execute(&mut self, step: &Step) -> Result<bool> {
        match step {
            Step::Candle(candle) => self.on_candle(candle).await,
            Step::CheckPositions => self.check_positions().await.map(|_| false),
            Step::Status => self.show_status().await.map(|_| false),
            Step::Idle => Ok(false),
        }
    }

    /// Fan a candle out to every strategy; true when an order was registered
    pub async fn on_candle(&mut self, candle: &Candle) -> Result<bool> {
        let mut registered = false;
        for slot in &mut self.strategies {
            match slot {
                StrategySlot::Quiet(quiet) => quiet.on_candle(candle),
                StrategySlot::Trading { signal, executor } => {
                    let Some(advice) = signal.on_candle(candle) else {
                        continue;
                    };
                    match executor.on_advice(&advice).await {
                        Ok(ExecutionOutcome::Registered { .. }) => registered = true,
                        Ok(ExecutionOutcome::Stale) => {
                            debug!("[{}] Stale advice {}", signal.security().name, advice)
                        }
                        Ok(_) => {}
                        Err(e) if e.is_fatal() => return Err(e.into()),
                        Err(e) => error!("[{}] {}", signal.security().name, e),
                    }
                }
            }
        }
        Ok(registered)
    }

    /// Compare every believed position with the terminal
    pub async fn check_positions(&mut self) -> Result<()> {
        for slot in &mut self.strategies {
            if let StrategySlot::Trading { executor, .. } = slot {
                match executor.check_position().await {
                    Ok(_) => {}
                    Err(e) if e.is_fatal() => return Err(e.into()),
                    Err(e) => error!("[{}] {}", executor.security().name, e),
                }
            }
        }
        Ok(())
    }

    async fn show_status(&mut self) -> Result<()> {
        for slot in &self.strategies {
            match slot {
                StrategySlot::Trading { signal, .. } => signal.show_info(),
                StrategySlot::Quiet(quiet) => quiet.show_info(),
            }
        }
        self.check_positions().await
    }
}

async fn sleep_until(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
