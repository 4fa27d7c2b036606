use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use relay_connector::client::{
    BookProvider, FeeProvider, OrderSigner, OrderSubmitter, RandomSalt, SystemClock,
};
use relay_connector::config::Settings;
use relay_connector::metrics::install_recorder;
use relay_connector::models::{
    EcSignature, FeeQuote, OrderRequest, OrderStyle, RawBookEntry, RawOrderBook, Side, SignedOrder,
    TokenInfo, TokenPair,
};
use relay_connector::{Connector, Market, RecordingSink};

#[derive(Parser, Debug)]
#[command(name = "relay-connector")]
struct Args {
    #[arg(long, default_value = "config/example.yaml")]
    config: String,
}

/// Canned relay responses so the full create-order flow can be exercised
/// without network access.
struct StubRelay;

#[async_trait::async_trait]
impl BookProvider for StubRelay {
    async fn fetch_order_book(&self, _market: &Market) -> anyhow::Result<RawOrderBook> {
        Ok(RawOrderBook {
            // worst-first, as the relay fetch supplies them
            asks: vec![
                RawBookEntry {
                    maker_token_amount: "5000000000000000000000".into(),
                    taker_token_amount: "880000000000000000".into(), // 0.000176
                    exchange_contract_address:
                        "0x12459c951127e0c374ff9105dda097662a027093".into(),
                },
                RawBookEntry {
                    maker_token_amount: "10000000000000000000000".into(),
                    taker_token_amount: "1290000000000000000".into(), // 0.000129
                    exchange_contract_address:
                        "0x12459c951127e0c374ff9105dda097662a027094".into(),
                },
            ],
            bids: vec![],
        })
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
            "0x12459c951127e0c374ff9105dda097662a027093".into(),
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
        Ok(serde_json::to_value(order)?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();
    let _prom = install_recorder()?;

    let args = Args::parse();
    let settings = Settings::load(&args.config)?;

    let market = Market::from_pair(TokenPair {
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
    });

    let relay = Arc::new(StubRelay);
    let connector = Connector::new(
        relay.clone(),
        relay.clone(),
        relay.clone(),
        relay,
        Arc::new(SystemClock),
        Arc::new(RandomSalt),
        settings.relay.exchange_contract_address.clone(),
    );

    let mut sink = RecordingSink::default();
    let placed = connector
        .create_order(
            &market,
            OrderStyle::Limit,
            Side::Buy,
            "15000".parse()?,
            Some("0.000129".parse()?),
            Some(settings.order.expires_in_minutes),
            "0x9e56625509c2f60af937f23b7b532600390e8c8b",
            &mut sink,
        )
        .await?;

    println!("consumed: {:?}", placed.pending);
    println!("fills: {:?}", sink.fills);
    println!("leftover (base units): {}", placed.leftover);
    println!("posted: {:?}", placed.order_hash);
    Ok(())
}
