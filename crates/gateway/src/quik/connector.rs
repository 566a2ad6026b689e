use async_trait::async_trait;
use log::{debug, info};
use luatrader_clock::SystemClock;
use luatrader_core::calendar::is_same_day;
use luatrader_core::{
    Candle, CandleInterval, FUTURES_CLASS_CODE, Order, PortfolioInfo, Price, SecurityInfo,
};
use luatrader_ports::{Clock, MarketDataService, Result, Trader, TraderError};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use super::api::Transaction;
use super::service::QuikService;
use crate::callbacks::CallbackRouter;
use crate::dynamic;
use crate::error::GatewayError;

/// Bars requested per history call; unbounded requests can return more
/// than the bridge serializes comfortably.
const DEFAULT_LAST_CANDLES_COUNT: usize = 5_000;

type SubscriptionKey = (String, String, u32);

/// Typed access to one terminal: command connection on port `P`,
/// events on `P + 1` (handed out as a `CallbackRouter`).
pub struct QuikConnector {
    service: QuikService,
    clock: Arc<dyn Clock>,
    subscriptions: Mutex<HashSet<SubscriptionKey>>,
    last_candles_count: usize,
}

impl QuikConnector {
    /// Open both connections to the bridge
    pub async fn connect(host: &str, port: u16) -> std::result::Result<(Self, CallbackRouter), GatewayError> {
        let commands = TcpStream::connect((host, port))
            .await
            .map_err(|e| GatewayError::Connection(format!("{}:{}: {}", host, port, e)))?;
        let events = TcpStream::connect((host, port + 1))
            .await
            .map_err(|e| GatewayError::Connection(format!("{}:{}: {}", host, port + 1, e)))?;
        info!("[quik] Connected to {}:{} (events on {})", host, port, port + 1);
        Ok(Self::from_streams(commands, events))
    }

    /// Build from already open streams
    pub fn from_streams<C, E>(commands: C, events: E) -> (Self, CallbackRouter)
    where
        C: AsyncRead + AsyncWrite + Send + 'static,
        E: AsyncRead + Send + Unpin + 'static,
    {
        let connector = Self {
            service: QuikService::new(commands),
            clock: Arc::new(SystemClock::new()),
            subscriptions: Mutex::new(HashSet::new()),
            last_candles_count: DEFAULT_LAST_CANDLES_COUNT,
        };
        (connector, CallbackRouter::new(events))
    }

    /// Builder: clock used to detect today's unfinished bar
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builder: give up on a pending command reply when `cancel` fires
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.service = self.service.with_cancel(cancel);
        self
    }

    pub fn with_last_candles_count(mut self, count: usize) -> Self {
        self.last_candles_count = count;
        self
    }

    pub fn service(&self) -> &QuikService {
        &self.service
    }

    /// Show a message in the terminal
    pub async fn message(&self, text: &str) -> Result<()> {
        self.service.message(text).await
    }

    /// Last traded price
    pub async fn last_price(&self, security: &SecurityInfo) -> Result<Price> {
        let param = self
            .service
            .get_param_ex(&security.class_code, &security.code, "LAST")
            .await?
            .ok_or_else(|| TraderError::NotFound(format!("LAST for {}", security.code)))?;
        dynamic::as_decimal(dynamic::field(&param, "param_value")?)
    }
}

#[async_trait]
impl Trader for QuikConnector {
    async fn is_connected(&self) -> Result<bool> {
        self.service.is_connected().await
    }

    async fn incoming_amount(&self, portfolio: &PortfolioInfo) -> Result<Decimal> {
        let info = self
            .service
            .get_portfolio_info_ex(&portfolio.firm, &portfolio.portfolio, 0)
            .await?
            .ok_or_else(|| TraderError::NotFound("portfolio".into()))?;
        dynamic::as_decimal(&info.start_limit_open_pos)
    }

    async fn get_position(&self, portfolio: &PortfolioInfo, security: &SecurityInfo) -> Result<i64> {
        if security.class_code != FUTURES_CLASS_CODE {
            return Err(TraderError::NotSupported(format!(
                "positions for class {}",
                security.class_code
            )));
        }
        let holding = self
            .service
            .get_futures_holding(&portfolio.firm, &portfolio.portfolio, &security.code, 0)
            .await?;
        // No holding row means a flat position
        Ok(holding.map(|h| h.totalnet.round() as i64).unwrap_or(0))
    }

    async fn register_order(&self, order: &Order) -> Result<()> {
        let side = order
            .side()
            .ok_or_else(|| TraderError::NotSupported("order with zero volume".into()))?;
        let price = order.security.format_price(order.price);
        let transaction = Transaction {
            action: "NEW_ORDER".into(),
            account: order.portfolio.portfolio.clone(),
            classcode: order.security.class_code.clone(),
            seccode: order.security.code.clone(),
            quantity: order.quantity().to_string(),
            operation: side.operation().into(),
            price: price.clone(),
            ..Default::default()
        };
        let trans_id = self.service.send_transaction(transaction).await?;
        info!(
            "[{}] Register order {} {} @ {} (trans {})",
            order.security.code,
            side.operation(),
            order.quantity(),
            price,
            trans_id
        );
        Ok(())
    }
}

#[async_trait]
impl MarketDataService for QuikConnector {
    async fn last_candles(&self, security: &SecurityInfo, interval: CandleInterval) -> Result<Vec<Candle>> {
        let bars = self
            .service
            .get_last_candles(
                &security.class_code,
                &security.code,
                interval.minutes(),
                self.last_candles_count,
            )
            .await?;
        let mut candles = bars
            .iter()
            .map(|bar| bar.to_candle())
            .collect::<Result<Vec<_>>>()?;

        // Today's last bar may still be forming
        let today = self.clock.terminal_now();
        if candles
            .last()
            .is_some_and(|last| is_same_day(&last.date_time, &today))
        {
            candles.pop();
        }
        Ok(candles)
    }

    async fn subscribe_candles(&self, security: &SecurityInfo, interval: CandleInterval) -> Result<()> {
        let key = (
            security.class_code.clone(),
            security.code.clone(),
            interval.minutes(),
        );
        let mut subscriptions = self.subscriptions.lock().await;
        if subscriptions.contains(&key) {
            return Ok(());
        }
        let subscribed = self
            .service
            .is_candle_subscribed(&security.class_code, &security.code, interval.minutes())
            .await?;
        if !subscribed {
            self.service
                .subscribe_candles(&security.class_code, &security.code, interval.minutes())
                .await?;
            info!("[{}] Subscribed to {} candles", security.code, interval);
        } else {
            debug!("[{}] Already subscribed to {} candles", security.code, interval);
        }
        subscriptions.insert(key);
        Ok(())
    }
}
