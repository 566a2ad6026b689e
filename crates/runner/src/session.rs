//! Session
//!
//! Connects one client, initializes its strategies and runs the task group
//! until the operator quits, Ctrl-C arrives or a task fails.

use log::{error, info, warn};
use luatrader_clock::SystemClock;
use luatrader_core::{PortfolioInfo, Timestamp};
use luatrader_gateway::{CallbackRouter, FortsSecurityInformator, MockTrader, QuikConnector};
use luatrader_order_manager::{StrategyExecutor, calc_available_amount};
use luatrader_ports::{AdvisorConfig, CandleStorage, Clock, MarketDataService, Trader};
use luatrader_strategy::{BuiltinAdvisorFactory, QuietStrategy, SignalDeps, SignalService};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::io::AsyncBufRead;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::commands::read_commands;
use crate::config::{CLIENT_QUIK, ClientConfig, ConfigError, Settings};
use crate::error::{Result, RunError};
use crate::group::TaskGroup;
use crate::main_cycle::{MainCycle, StrategySlot};

pub const CANDLE_CHANNEL_CAPACITY: usize = 16;
const COMMAND_CHANNEL_CAPACITY: usize = 4;
/// Exit status of a run stopped by a second Ctrl-C
const FORCED_EXIT_CODE: i32 = 130;

/// Terminal side of a client
struct Terminal {
    trader: Arc<dyn Trader>,
    market_data: Arc<dyn MarketDataService>,
    router: Option<CallbackRouter>,
}

pub struct Session {
    settings: Settings,
    client_key: Option<String>,
    quiet: bool,
    clock: Arc<dyn Clock>,
    storage: Option<Arc<dyn CandleStorage>>,
    cancel: CancellationToken,
    watch_interrupt: bool,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            client_key: None,
            quiet: false,
            clock: Arc::new(SystemClock::new()),
            storage: None,
            cancel: CancellationToken::new(),
            watch_interrupt: true,
        }
    }

    /// Builder: client to run (may be omitted with a single client)
    pub fn with_client(mut self, key: Option<String>) -> Self {
        self.client_key = key;
        self
    }

    /// Builder: follow advice without trading
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builder: stored history fed to advisors before the terminal's bars
    pub fn with_storage(mut self, storage: Arc<dyn CandleStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Builder: external shutdown token instead of Ctrl-C
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self.watch_interrupt = false;
        self
    }

    /// Run the session, reading operator commands from `input`
    pub async fn run<R>(self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let client = self.settings.client(self.client_key.as_deref())?.clone();
        let timing = self.settings.timing.clone();
        info!("[{}] Starting session ({})", client.key, client.kind);

        let Terminal {
            trader,
            market_data,
            router,
        } = self.connect(&client).await?;

        // Events are read from the moment the bridge is connected; candles
        // wait in the bounded channel until the main cycle starts.
        let mut group = TaskGroup::new(self.cancel.clone());
        let (candle_tx, candle_rx) = mpsc::channel(CANDLE_CHANNEL_CAPACITY);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        if self.watch_interrupt {
            group.spawn("interrupt", watch_interrupt(group.token()));
        }
        match router {
            Some(router) => {
                let cancel = group.token();
                group.spawn("callbacks", async move {
                    router.run(cancel, candle_tx).await.map_err(RunError::from)
                });
            }
            None => info!("[{}] No live candles for this client", client.key),
        }

        let strategies = match self.prepare(&client, &trader, market_data).await {
            Ok(strategies) => strategies,
            Err(e) => {
                self.cancel.cancel();
                // a failed router explains a failed init better
                return Err(group.wait().await.err().unwrap_or(e));
            }
        };

        group.spawn("commands", read_commands(input, group.token(), command_tx));
        let cycle = MainCycle::new(strategies, timing.reconcile_delay())
            .with_reconcile_interval(timing.reconcile_interval());
        group.spawn("main", cycle.run(group.token(), candle_rx, command_rx));

        let result = group.wait().await;
        info!("[{}] Session finished", client.key);
        result
    }

    async fn connect(&self, client: &ClientConfig) -> Result<Terminal> {
        if client.kind != CLIENT_QUIK {
            let mock = Arc::new(MockTrader::new());
            return Ok(Terminal {
                trader: mock.clone(),
                market_data: mock,
                router: None,
            });
        }

        let (connector, router) = QuikConnector::connect(&client.host, client.port).await?;
        let connector = Arc::new(
            connector
                .with_clock(self.clock.clone())
                .with_cancel(self.cancel.clone())
                .with_last_candles_count(self.settings.timing.last_candles_count),
        );
        Ok(Terminal {
            trader: connector.clone(),
            market_data: connector,
            router: Some(router),
        })
    }

    /// Size the client and initialize its strategies
    async fn prepare(
        &self,
        client: &ClientConfig,
        trader: &Arc<dyn Trader>,
        market_data: Arc<dyn MarketDataService>,
    ) -> Result<Vec<StrategySlot>> {
        if !trader.is_connected().await? {
            warn!("[{}] Terminal is not connected to the exchange", client.key);
        }
        let portfolio = PortfolioInfo::new(client.firm.clone(), client.portfolio.clone());
        let start_amount = trader.incoming_amount(&portfolio).await?;
        let amount = calc_available_amount(start_amount, &client.limits());
        info!(
            "[{}] Available amount {} of {}",
            client.key, amount, start_amount
        );
        if amount <= Decimal::ZERO {
            return Err(ConfigError::Invalid(format!("no available amount for {}", client.key)).into());
        }

        let strategies = self
            .init_strategies(trader, market_data, &portfolio, amount)
            .await?;
        if strategies.is_empty() {
            return Err(RunError::Init("no strategy could be initialized".into()));
        }
        Ok(strategies)
    }

    /// Strategies that fail with a recoverable error are skipped
    async fn init_strategies(
        &self,
        trader: &Arc<dyn Trader>,
        market_data: Arc<dyn MarketDataService>,
        portfolio: &PortfolioInfo,
        amount: Decimal,
    ) -> Result<Vec<StrategySlot>> {
        let informator = FortsSecurityInformator::new();
        let factory = BuiltinAdvisorFactory::new();
        let deps = SignalDeps {
            informator: &informator,
            factory: &factory,
            storage: self.storage.as_deref(),
            market_data,
        };
        let forward_after = self.clock.now() - self.settings.timing.signal_lookback();

        let mut strategies = Vec::with_capacity(self.settings.strategies.len());
        for config in &self.settings.strategies {
            let slot = self
                .init_strategy(config, &deps, trader, portfolio, amount, forward_after)
                .await;
            match slot {
                Ok(slot) => strategies.push(slot),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => error!("[{}] Strategy skipped: {}", config.security, e),
            }
        }
        Ok(strategies)
    }

    async fn init_strategy(
        &self,
        config: &AdvisorConfig,
        deps: &SignalDeps<'_>,
        trader: &Arc<dyn Trader>,
        portfolio: &PortfolioInfo,
        amount: Decimal,
        forward_after: Timestamp,
    ) -> Result<StrategySlot> {
        if self.quiet {
            let mut quiet = QuietStrategy::init(config, deps, forward_after).await?;
            quiet.subscribe().await?;
            return Ok(StrategySlot::Quiet(quiet));
        }

        let mut signal = SignalService::init(config, deps, forward_after).await?;
        let executor = StrategyExecutor::init(
            trader.clone(),
            portfolio.clone(),
            signal.security().clone(),
            amount,
            self.clock.clone(),
            self.settings.timing.execution(),
        )
        .await?;
        signal.subscribe().await?;
        Ok(StrategySlot::Trading { signal, executor })
    }
}

/// First Ctrl-C cancels the session; a second one exits at once
async fn watch_interrupt(cancel: CancellationToken) -> Result<()> {
    tokio::select! {
        _ = cancel.cancelled() => Ok(()),
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("[interrupt] Ctrl-C, shutting down");
            cancel.cancel();
            tokio::spawn(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("[interrupt] Second Ctrl-C, exiting");
                    std::process::exit(FORCED_EXIT_CODE);
                }
            });
            Ok(())
        }
    }
}
