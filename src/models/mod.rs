use std::fmt;

use serde::{Deserialize, Serialize};

/// Open-taker sentinel used by the relay: any counterparty may fill.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStyle {
    Limit,
    Market,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// One resting order as the relay serializes it. Amounts are decimal strings
/// in base units; `exchangeContractAddress` stands in for the counter-order's
/// settlement reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBookEntry {
    pub maker_token_amount: String,
    pub taker_token_amount: String,
    pub exchange_contract_address: String,
}

/// Unparsed order-book payload from the relay's orderbook endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOrderBook {
    pub bids: Vec<RawBookEntry>,
    pub asks: Vec<RawBookEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub address: String,
    pub precision: u32,
    #[serde(default)]
    pub min_amount: Option<String>,
    #[serde(default)]
    pub max_amount: Option<String>,
}

/// One entry of the relay's token-pair listing. By relay convention
/// `tokenA` is the quote token and `tokenB` the base token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub token_a: TokenInfo,
    pub token_b: TokenInfo,
}

/// Fully built but unsigned order payload, serialized camelCase to the
/// relay's JSON schema. Amounts are base-unit decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub exchange_contract_address: String,
    pub maker: String,
    pub taker: String,
    pub maker_token_address: String,
    pub taker_token_address: String,
    pub maker_token_amount: String,
    pub taker_token_amount: String,
    pub expiration_unix_timestamp_sec: String,
    pub salt: String,
}

/// Fee terms quoted by the relay for a prospective order; treated as opaque
/// values and merged into the payload before signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeQuote {
    pub fee_recipient: String,
    pub maker_fee: String,
    pub taker_fee: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcSignature {
    pub v: u8,
    pub r: String,
    pub s: String,
}

/// Order request with fees merged and signature attached, ready for
/// submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOrder {
    #[serde(flatten)]
    pub order: OrderRequest,
    #[serde(flatten)]
    pub fees: FeeQuote,
    pub ec_signature: EcSignature,
}

/// An order as returned by the relay's orders endpoint, reduced to the
/// fields needed for open/closed classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub maker: String,
    pub taker: String,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

impl OrderRecord {
    /// An order with a zero maker or taker has not been (fully) taken.
    pub fn is_open(&self) -> bool {
        self.maker == ZERO_ADDRESS || self.taker == ZERO_ADDRESS
    }

    /// An order is closed from `wallet`'s perspective when the opposite side
    /// is occupied by a concrete counterparty.
    pub fn is_closed_for(&self, wallet: &str) -> bool {
        (self.maker != ZERO_ADDRESS && self.taker == wallet)
            || (self.taker != ZERO_ADDRESS && self.maker == wallet)
    }
}
