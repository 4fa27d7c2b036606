use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rust_decimal_macros::dec;

use relay_connector::client::{
    BookProvider, Clock, FeeProvider, OrderSigner, OrderSubmitter, SaltSource,
};
use relay_connector::models::{
    EcSignature, FeeQuote, OrderRequest, OrderStyle, RawBookEntry, RawOrderBook, Side, SignedOrder,
    TokenInfo, TokenPair, ZERO_ADDRESS,
};
use relay_connector::{ClientError, Connector, Market, RecordingSink};

const BASE: u128 = 1_000_000_000_000_000_000;
const MAKER: &str = "0x9e56625509c2f60af937f23b7b532600390e8c8b";
const EXCHANGE: &str = "0x12459c951127e0c374ff9105dda097662a027093";
const ORDER_HASH: &str = "0x8f8221afbb33998d8584a2b05749ba73c37a938a";

fn market() -> Market {
    Market::from_pair(TokenPair {
        token_a: TokenInfo {
            address: "0x2956356cd2a2bf3202f771f50d3d14a367b48070".into(),
            precision: 18,
            min_amount: None,
            max_amount: None,
        },
        token_b: TokenInfo {
            address: "0x8f8221afbb33998d8584a2b05749ba73c37a938a".into(),
            precision: 18,
            min_amount: None,
            max_amount: None,
        },
    })
}

fn ask(base_amount: u128, price_micro: u128, reference: &str) -> RawBookEntry {
    RawBookEntry {
        maker_token_amount: (base_amount * BASE).to_string(),
        taker_token_amount: (base_amount * price_micro * (BASE / 1_000_000)).to_string(),
        exchange_contract_address: reference.into(),
    }
}

fn bid(base_amount: u128, price_micro: u128, reference: &str) -> RawBookEntry {
    RawBookEntry {
        maker_token_amount: (base_amount * price_micro * (BASE / 1_000_000)).to_string(),
        taker_token_amount: (base_amount * BASE).to_string(),
        exchange_contract_address: reference.into(),
    }
}

/// Relay double that serves a fixed book and records what gets submitted.
struct StubRelay {
    book: RawOrderBook,
    submitted: AtomicBool,
    last_order: Mutex<Option<SignedOrder>>,
}

impl StubRelay {
    fn with_book(book: RawOrderBook) -> Arc<Self> {
        Arc::new(Self {
            book,
            submitted: AtomicBool::new(false),
            last_order: Mutex::new(None),
        })
    }
}

#[async_trait::async_trait]
impl BookProvider for StubRelay {
    async fn fetch_order_book(&self, _market: &Market) -> anyhow::Result<RawOrderBook> {
        Ok(self.book.clone())
    }
}

#[async_trait::async_trait]
impl FeeProvider for StubRelay {
    async fn fetch_fees(&self, _order: &OrderRequest) -> anyhow::Result<FeeQuote> {
        Ok(FeeQuote {
            fee_recipient: "0xa258b39954cef5cb142fd567a46cddb31a670124".into(),
            maker_fee: "100000000000000".into(),
            taker_fee: "200000000000000".into(),
        })
    }
}

#[async_trait::async_trait]
impl OrderSigner for StubRelay {
    async fn sign(
        &self,
        _order: &OrderRequest,
        _fees: &FeeQuote,
    ) -> anyhow::Result<(String, EcSignature)> {
        Ok((
            ORDER_HASH.into(),
            EcSignature {
                v: 27,
                r: "0x61a3ed31b43c8780e905a260a35faefcc527be7516aa11c0256729b5b351bc33".into(),
                s: "0x40349190569279751135161d22529dc25add4f6069af05be04cacbda2ace2254".into(),
            },
        ))
    }
}

#[async_trait::async_trait]
impl OrderSubmitter for StubRelay {
    async fn submit(&self, order: &SignedOrder) -> anyhow::Result<serde_json::Value> {
        self.submitted.store(true, Ordering::SeqCst);
        *self.last_order.lock().unwrap() = Some(order.clone());
        Ok(serde_json::json!({ "accepted": true }))
    }
}

struct FixedClock(u64);

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.0
    }
}

struct FixedSalt;

impl SaltSource for FixedSalt {
    fn next_salt(&self) -> String {
        "12345".into()
    }
}

fn connector(relay: Arc<StubRelay>) -> Connector {
    Connector::new(
        relay.clone(),
        relay.clone(),
        relay.clone(),
        relay,
        Arc::new(FixedClock(42_000)),
        Arc::new(FixedSalt),
        EXCHANGE.into(),
    )
}

#[tokio::test]
async fn fully_matched_sell_posts_nothing() {
    let relay = StubRelay::with_book(RawOrderBook {
        asks: vec![],
        bids: vec![bid(1500, 129, "A"), bid(500, 129, "B")],
    });
    let connector = connector(relay.clone());

    let mut sink = RecordingSink::default();
    let placed = connector
        .create_limit_sell_order(&market(), dec!(2000), dec!(0.000129), 1, MAKER, &mut sink)
        .await
        .unwrap();

    assert_eq!(placed.pending, vec!["B".to_string(), "A".to_string()]);
    assert_eq!(placed.leftover, 0);
    assert_eq!(placed.order_hash, None);
    assert!(!relay.submitted.load(Ordering::SeqCst));
}

#[tokio::test]
async fn unfillable_sell_posts_a_signed_resting_order() {
    // best bid 0.000129 is below the 0.00015 limit
    let relay = StubRelay::with_book(RawOrderBook {
        asks: vec![],
        bids: vec![bid(2000, 129, "A")],
    });
    let connector = connector(relay.clone());

    let mut sink = RecordingSink::default();
    let placed = connector
        .create_limit_sell_order(&market(), dec!(2000), dec!(0.00015), 1, MAKER, &mut sink)
        .await
        .unwrap();

    assert!(placed.pending.is_empty());
    assert_eq!(placed.leftover, 2000 * BASE);
    assert_eq!(placed.order_hash.as_deref(), Some(ORDER_HASH));
    assert!(relay.submitted.load(Ordering::SeqCst));

    let submitted = relay.last_order.lock().unwrap().clone().unwrap();
    assert_eq!(submitted.order.maker, MAKER);
    assert_eq!(submitted.order.taker, ZERO_ADDRESS);
    assert_eq!(submitted.order.salt, "12345");
    assert_eq!(submitted.order.exchange_contract_address, EXCHANGE);
    // 42s clock + 1 minute
    assert_eq!(submitted.order.expiration_unix_timestamp_sec, "102");
    assert_eq!(submitted.fees.fee_recipient, "0xa258b39954cef5cb142fd567a46cddb31a670124");
    assert_eq!(submitted.ec_signature.v, 27);
}

#[tokio::test]
async fn partially_filled_buy_posts_the_remainder_only() {
    let relay = StubRelay::with_book(RawOrderBook {
        asks: vec![ask(10000, 176, "A")],
        bids: vec![],
    });
    let connector = connector(relay.clone());

    let mut sink = RecordingSink::default();
    let placed = connector
        .create_limit_buy_order(&market(), dec!(15000), dec!(0.000176), 1, MAKER, &mut sink)
        .await
        .unwrap();

    assert_eq!(placed.pending, vec!["A".to_string()]);
    assert_eq!(placed.leftover, 5000 * BASE);
    assert!(placed.order_hash.is_some());

    let submitted = relay.last_order.lock().unwrap().clone().unwrap();
    assert_eq!(submitted.order.taker_token_amount, (5000 * BASE).to_string());
    // 5000 * 0.000176 = 0.88 quote tokens
    assert_eq!(submitted.order.maker_token_amount, "880000000000000000");
}

#[tokio::test]
async fn market_order_never_posts_a_remainder() {
    let relay = StubRelay::with_book(RawOrderBook {
        asks: vec![ask(1000, 129, "A")],
        bids: vec![],
    });
    let connector = connector(relay.clone());

    let mut sink = RecordingSink::default();
    let placed = connector
        .create_order(
            &market(),
            OrderStyle::Market,
            Side::Buy,
            dec!(5000),
            None,
            None,
            MAKER,
            &mut sink,
        )
        .await
        .unwrap();

    assert_eq!(placed.pending, vec!["A".to_string()]);
    assert_eq!(placed.leftover, 4000 * BASE);
    assert_eq!(placed.order_hash, None);
    assert!(!relay.submitted.load(Ordering::SeqCst));
}

#[tokio::test]
async fn limit_orders_require_price_and_expiration() {
    let relay = StubRelay::with_book(RawOrderBook { asks: vec![], bids: vec![] });
    let connector = connector(relay);
    let mut sink = RecordingSink::default();

    let missing_price = connector
        .create_order(
            &market(),
            OrderStyle::Limit,
            Side::Buy,
            dec!(1000),
            None,
            Some(1),
            MAKER,
            &mut sink,
        )
        .await
        .unwrap_err();
    assert!(matches!(missing_price, ClientError::InvalidOrder(_)));

    let missing_expiry = connector
        .create_order(
            &market(),
            OrderStyle::Limit,
            Side::Buy,
            dec!(1000),
            Some(dec!(0.000129)),
            None,
            MAKER,
            &mut sink,
        )
        .await
        .unwrap_err();
    assert!(matches!(missing_expiry, ClientError::InvalidOrder(_)));
}

#[tokio::test]
async fn missing_maker_address_fails_fast() {
    let relay = StubRelay::with_book(RawOrderBook { asks: vec![], bids: vec![] });
    let connector = connector(relay);
    let mut sink = RecordingSink::default();

    let err = connector
        .create_limit_buy_order(&market(), dec!(1000), dec!(0.000129), 1, "", &mut sink)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidOrder(_)));
}

#[tokio::test]
async fn malformed_snapshot_surfaces_as_a_validation_error() {
    let relay = StubRelay::with_book(RawOrderBook {
        asks: vec![RawBookEntry {
            maker_token_amount: "garbage".into(),
            taker_token_amount: "1".into(),
            exchange_contract_address: "A".into(),
        }],
        bids: vec![],
    });
    let connector = connector(relay);
    let mut sink = RecordingSink::default();

    let err = connector
        .create_limit_buy_order(&market(), dec!(1000), dec!(0.000129), 1, MAKER, &mut sink)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Snapshot(_)));
}
