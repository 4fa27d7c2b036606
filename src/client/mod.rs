use std::sync::Arc;

use metrics::counter;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::book::{Market, OrderBookSnapshot, SnapshotError};
use crate::matching::{match_order, FillSink, PriceLimit};
use crate::models::{
    EcSignature, FeeQuote, OrderRequest, OrderStyle, RawOrderBook, Side, SignedOrder,
};
use crate::request::{build_order_request, OrderParams, RequestError};
use crate::units::{self, BaseUnits};

/// Order-book retrieval seam; blocking network work lives behind it and
/// completes before the matcher runs.
#[async_trait::async_trait]
pub trait BookProvider: Send + Sync {
    async fn fetch_order_book(&self, market: &Market) -> anyhow::Result<RawOrderBook>;
}

#[async_trait::async_trait]
pub trait FeeProvider: Send + Sync {
    async fn fetch_fees(&self, order: &OrderRequest) -> anyhow::Result<FeeQuote>;
}

/// Hashes the fee-merged order and signs the hash. Returns the order hash
/// alongside the signature so the caller can track the posted order.
#[async_trait::async_trait]
pub trait OrderSigner: Send + Sync {
    async fn sign(
        &self,
        order: &OrderRequest,
        fees: &FeeQuote,
    ) -> anyhow::Result<(String, EcSignature)>;
}

#[async_trait::async_trait]
pub trait OrderSubmitter: Send + Sync {
    async fn submit(&self, order: &SignedOrder) -> anyhow::Result<serde_json::Value>;
}

pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Nonce source for order salts.
pub trait SaltSource: Send + Sync {
    fn next_salt(&self) -> String;
}

#[derive(Debug, Default)]
pub struct RandomSalt;

impl SaltSource for RandomSalt {
    fn next_salt(&self) -> String {
        rand::random::<u128>().to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid order: {0}")]
    InvalidOrder(&'static str),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("order book fetch failed: {0}")]
    BookFetch(#[source] anyhow::Error),
    #[error("fee quote failed: {0}")]
    Fees(#[source] anyhow::Error),
    #[error("signing failed: {0}")]
    Sign(#[source] anyhow::Error),
    #[error("submission failed: {0}")]
    Submit(#[source] anyhow::Error),
    #[error("fill hook failed: {0}")]
    Fill(#[source] anyhow::Error),
}

/// Result of a `create_order` call: which resting counter-orders were
/// consumed, what remained, and the posted residual order if one was
/// submitted.
#[derive(Debug)]
pub struct PlacedOrder {
    pub pending: Vec<String>,
    pub leftover: BaseUnits,
    pub order_hash: Option<String>,
    pub response: Option<serde_json::Value>,
}

/// Client-side connector tying the pure matching core to the external
/// relay collaborators. The owning wallet address is an explicit argument
/// to each operation rather than connector state.
pub struct Connector {
    books: Arc<dyn BookProvider>,
    fees: Arc<dyn FeeProvider>,
    signer: Arc<dyn OrderSigner>,
    submitter: Arc<dyn OrderSubmitter>,
    clock: Arc<dyn Clock>,
    salts: Arc<dyn SaltSource>,
    exchange_contract_address: String,
}

impl Connector {
    pub fn new(
        books: Arc<dyn BookProvider>,
        fees: Arc<dyn FeeProvider>,
        signer: Arc<dyn OrderSigner>,
        submitter: Arc<dyn OrderSubmitter>,
        clock: Arc<dyn Clock>,
        salts: Arc<dyn SaltSource>,
        exchange_contract_address: String,
    ) -> Self {
        Self {
            books,
            fees,
            signer,
            submitter,
            clock,
            salts,
            exchange_contract_address,
        }
    }

    /// Fetch and validate the current book snapshot for `market`.
    pub async fn fetch_book(&self, market: &Market) -> Result<OrderBookSnapshot, ClientError> {
        let raw = self
            .books
            .fetch_order_book(market)
            .await
            .map_err(ClientError::BookFetch)?;
        Ok(OrderBookSnapshot::from_raw(raw, market, self.clock.now_ms())?)
    }

    /// Match `amount` (human units of the base token) against the current
    /// book, then post any limit-order remainder to the relay: build the
    /// request, merge the fee quote, sign, submit.
    ///
    /// Market orders never post a remainder; whatever the book cannot fill
    /// comes back in `leftover`.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_order(
        &self,
        market: &Market,
        style: OrderStyle,
        side: Side,
        amount: Decimal,
        price: Option<Decimal>,
        expires_in_min: Option<u64>,
        maker: &str,
        sink: &mut dyn FillSink,
    ) -> Result<PlacedOrder, ClientError> {
        if amount <= Decimal::ZERO {
            return Err(ClientError::InvalidOrder("amount must be positive"));
        }
        if maker.is_empty() {
            return Err(ClientError::InvalidOrder("maker address must be provided"));
        }
        let limit = match style {
            OrderStyle::Limit => {
                let price = price
                    .ok_or(ClientError::InvalidOrder("price must be specified in limit order"))?;
                if price <= Decimal::ZERO {
                    return Err(ClientError::InvalidOrder("limit price must be positive"));
                }
                if expires_in_min.is_none() {
                    return Err(ClientError::InvalidOrder(
                        "time to expiration must be specified for limit orders",
                    ));
                }
                PriceLimit::At(price)
            }
            OrderStyle::Market => PriceLimit::Marketable,
        };
        let quantity = units::to_base_units(amount, market.base.precision)
            .ok_or(ClientError::InvalidOrder("amount out of range"))?;

        let book = self.fetch_book(market).await?;
        let fill = match_order(&book, market, side, limit, quantity, sink)
            .map_err(ClientError::Fill)?;
        counter!("relay_orders_total").increment(1);
        counter!("relay_counter_orders_consumed_total").increment(fill.pending.len() as u64);
        info!(
            %side,
            consumed = fill.pending.len(),
            leftover = %fill.leftover,
            book_ts = book.timestamp_ms,
            "matched against snapshot"
        );

        if fill.leftover == 0 {
            return Ok(PlacedOrder {
                pending: fill.pending,
                leftover: 0,
                order_hash: None,
                response: None,
            });
        }

        if style == OrderStyle::Market {
            warn!(leftover = %fill.leftover, "market order not fully filled; remainder dropped");
            return Ok(PlacedOrder {
                pending: fill.pending,
                leftover: fill.leftover,
                order_hash: None,
                response: None,
            });
        }

        let price = match limit {
            PriceLimit::At(price) => price,
            PriceLimit::Marketable => unreachable!("limit orders always carry a price"),
        };
        let request = build_order_request(OrderParams {
            side,
            market,
            residual: fill.leftover,
            price,
            expires_in_min: expires_in_min.unwrap_or(0),
            maker,
            now_ms: self.clock.now_ms(),
            salt: self.salts.next_salt(),
            exchange_contract_address: self.exchange_contract_address.clone(),
        })?;

        let fees = self
            .fees
            .fetch_fees(&request)
            .await
            .map_err(ClientError::Fees)?;
        let (order_hash, signature) = self
            .signer
            .sign(&request, &fees)
            .await
            .map_err(ClientError::Sign)?;
        let signed = SignedOrder {
            order: request,
            fees,
            ec_signature: signature,
        };
        let response = self
            .submitter
            .submit(&signed)
            .await
            .map_err(ClientError::Submit)?;
        info!(order_hash = %order_hash, leftover = %fill.leftover, "posted residual order");

        Ok(PlacedOrder {
            pending: fill.pending,
            leftover: fill.leftover,
            order_hash: Some(order_hash),
            response: Some(response),
        })
    }

    pub async fn create_limit_buy_order(
        &self,
        market: &Market,
        amount: Decimal,
        price: Decimal,
        expires_in_min: u64,
        maker: &str,
        sink: &mut dyn FillSink,
    ) -> Result<PlacedOrder, ClientError> {
        self.create_order(
            market,
            OrderStyle::Limit,
            Side::Buy,
            amount,
            Some(price),
            Some(expires_in_min),
            maker,
            sink,
        )
        .await
    }

    pub async fn create_limit_sell_order(
        &self,
        market: &Market,
        amount: Decimal,
        price: Decimal,
        expires_in_min: u64,
        maker: &str,
        sink: &mut dyn FillSink,
    ) -> Result<PlacedOrder, ClientError> {
        self.create_order(
            market,
            OrderStyle::Limit,
            Side::Sell,
            amount,
            Some(price),
            Some(expires_in_min),
            maker,
            sink,
        )
        .await
    }
}
