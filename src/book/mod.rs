use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{RawBookEntry, RawOrderBook, Side, TokenPair};
use crate::units::{self, BaseUnits, Precision, MAX_BASE_UNITS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub address: String,
    pub precision: Precision,
}

/// Min/max order amounts published with the pair listing; carried along as
/// opaque relay metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AmountLimits {
    pub min: Option<String>,
    pub max: Option<String>,
}

/// A trading pair with per-token precision scaling. Built once from the
/// relay's token-pair listing, read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub base: Token,
    pub quote: Token,
    pub limits: AmountLimits,
}

impl Market {
    /// Relay listing convention: `tokenA` is the quote token, `tokenB` the
    /// base token.
    pub fn from_pair(pair: TokenPair) -> Self {
        Self {
            base: Token {
                address: pair.token_b.address,
                precision: Precision(pair.token_b.precision),
            },
            quote: Token {
                address: pair.token_a.address,
                precision: Precision(pair.token_a.precision),
            },
            limits: AmountLimits {
                min: pair.token_a.min_amount,
                max: pair.token_b.max_amount,
            },
        }
    }

    /// Implied price of an ask: the maker offers base, wants quote.
    pub fn ask_price(&self, entry: &BookEntry) -> Decimal {
        units::price_from_amounts(
            entry.taker_token_amount,
            self.quote.precision,
            entry.maker_token_amount,
            self.base.precision,
        )
    }

    /// Implied price of a bid: the maker offers quote, wants base.
    pub fn bid_price(&self, entry: &BookEntry) -> Decimal {
        units::price_from_amounts(
            entry.maker_token_amount,
            self.quote.precision,
            entry.taker_token_amount,
            self.base.precision,
        )
    }

    /// Price of an entry resting on the side that a `side` order consumes.
    pub fn counter_price(&self, side: Side, entry: &BookEntry) -> Decimal {
        match side {
            Side::Buy => self.ask_price(entry),
            Side::Sell => self.bid_price(entry),
        }
    }
}

/// A parsed resting counter-order. Both amounts are integer base units of
/// the respective token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookEntry {
    pub maker_token_amount: BaseUnits,
    pub taker_token_amount: BaseUnits,
    pub exchange_contract_address: String,
}

impl BookEntry {
    /// Base-token capacity this entry offers to an incoming `side` order:
    /// an ask hands over its maker amount, a bid absorbs its taker amount.
    pub fn capacity(&self, side: Side) -> BaseUnits {
        match side {
            Side::Buy => self.maker_token_amount,
            Side::Sell => self.taker_token_amount,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("{side} entry has invalid {field}: {value:?}")]
    BadAmount {
        side: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("{side} side violates the worst-price-first sort contract")]
    Unsorted { side: &'static str },
}

/// One side of the book, stored in worst-price-first order as supplied by
/// the book fetch. The constructor checks the ordering, so holders of a
/// `BookSide` may consume `iter_best_first` without re-validating.
#[derive(Debug, Clone, Default)]
pub struct BookSide {
    entries: Vec<BookEntry>,
}

impl BookSide {
    fn worst_first(
        entries: Vec<BookEntry>,
        taker_side: Side,
        market: &Market,
    ) -> Result<Self, SnapshotError> {
        let sorted = entries.windows(2).all(|pair| {
            let earlier = market.counter_price(taker_side, &pair[0]);
            let later = market.counter_price(taker_side, &pair[1]);
            match taker_side {
                // asks run from most to least expensive
                Side::Buy => earlier >= later,
                // bids run from least to most generous
                Side::Sell => earlier <= later,
            }
        });
        if !sorted {
            return Err(SnapshotError::Unsorted {
                side: side_name(taker_side),
            });
        }
        Ok(Self { entries })
    }

    /// Entries in matching order: best price first.
    pub fn iter_best_first(&self) -> impl Iterator<Item = &BookEntry> {
        self.entries.iter().rev()
    }

    /// Entries in stored (worst-first) order.
    pub fn entries(&self) -> &[BookEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Immutable order-book snapshot. Construction validates every entry, so the
/// matcher can traverse without touching error paths.
#[derive(Debug, Clone)]
pub struct OrderBookSnapshot {
    pub asks: BookSide,
    pub bids: BookSide,
    pub timestamp_ms: u64,
}

impl OrderBookSnapshot {
    pub fn from_raw(
        raw: RawOrderBook,
        market: &Market,
        timestamp_ms: u64,
    ) -> Result<Self, SnapshotError> {
        let asks = parse_entries(raw.asks, "ask")?;
        let bids = parse_entries(raw.bids, "bid")?;
        Ok(Self {
            asks: BookSide::worst_first(asks, Side::Buy, market)?,
            bids: BookSide::worst_first(bids, Side::Sell, market)?,
            timestamp_ms,
        })
    }

    /// The side an incoming `side` order matches against.
    pub fn counter_side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.asks,
            Side::Sell => &self.bids,
        }
    }

    /// Precision-adjusted `[price, amount]` levels per side, amounts in
    /// human base-token units, for display and downstream consumers.
    pub fn levels(&self, market: &Market) -> ParsedBook {
        let asks = self
            .asks
            .entries()
            .iter()
            .map(|entry| BookLevel {
                price: market.ask_price(entry),
                amount: units::to_human_units(entry.maker_token_amount, market.base.precision),
            })
            .collect();
        let bids = self
            .bids
            .entries()
            .iter()
            .map(|entry| BookLevel {
                price: market.bid_price(entry),
                amount: units::to_human_units(entry.taker_token_amount, market.base.precision),
            })
            .collect();
        ParsedBook {
            bids,
            asks,
            timestamp_ms: self.timestamp_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookLevel {
    pub price: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParsedBook {
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
    pub timestamp_ms: u64,
}

fn side_name(taker_side: Side) -> &'static str {
    match taker_side {
        Side::Buy => "ask",
        Side::Sell => "bid",
    }
}

fn parse_entries(
    raw: Vec<RawBookEntry>,
    side: &'static str,
) -> Result<Vec<BookEntry>, SnapshotError> {
    raw.into_iter()
        .map(|entry| {
            let maker_token_amount =
                parse_amount(&entry.maker_token_amount, side, "makerTokenAmount")?;
            let taker_token_amount =
                parse_amount(&entry.taker_token_amount, side, "takerTokenAmount")?;
            Ok(BookEntry {
                maker_token_amount,
                taker_token_amount,
                exchange_contract_address: entry.exchange_contract_address,
            })
        })
        .collect()
}

fn parse_amount(
    value: &str,
    side: &'static str,
    field: &'static str,
) -> Result<BaseUnits, SnapshotError> {
    let bad = || SnapshotError::BadAmount {
        side,
        field,
        value: value.to_string(),
    };
    let amount: BaseUnits = value.parse().map_err(|_| bad())?;
    if amount == 0 || amount > MAX_BASE_UNITS {
        return Err(bad());
    }
    Ok(amount)
}
