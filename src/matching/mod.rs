use rust_decimal::Decimal;

use crate::book::{BookEntry, Market, OrderBookSnapshot};
use crate::models::Side;
use crate::units::BaseUnits;

/// Price bound for an incoming order. `Marketable` accepts every resting
/// price (the +infinity buy / zero sell convention); `At` bounds a limit
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceLimit {
    Marketable,
    At(Decimal),
}

impl PriceLimit {
    /// Whether a counter-order priced at `price` is acceptable to a `side`
    /// order under this limit.
    pub fn admits(&self, side: Side, price: Decimal) -> bool {
        match *self {
            PriceLimit::Marketable => true,
            PriceLimit::At(limit) => match side {
                Side::Buy => price <= limit,
                Side::Sell => price >= limit,
            },
        }
    }
}

/// Outcome of one match pass. `pending` holds the settlement references of
/// consumed counter-orders in traversal order; `leftover` is the unmatched
/// remainder in base units of the base token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillResult {
    pub pending: Vec<String>,
    pub leftover: BaseUnits,
}

/// Settlement seam: invoked exactly once per consumed counter-order, in
/// traversal order, with the consumed base-unit amount. An error aborts the
/// match and propagates to the caller.
pub trait FillSink {
    fn fill(&mut self, amount: BaseUnits, entry: &BookEntry) -> anyhow::Result<()>;
}

/// Sink for callers that do their settlement bookkeeping elsewhere.
#[derive(Debug, Default)]
pub struct NullSink;

impl FillSink for NullSink {
    fn fill(&mut self, _amount: BaseUnits, _entry: &BookEntry) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Sink that captures `(amount, reference)` pairs as they are consumed.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub fills: Vec<(BaseUnits, String)>,
}

impl FillSink for RecordingSink {
    fn fill(&mut self, amount: BaseUnits, entry: &BookEntry) -> anyhow::Result<()> {
        self.fills.push((amount, entry.exchange_contract_address.clone()));
        Ok(())
    }
}

/// Walk the counter side of `book` from the best price outward, consuming
/// resting orders against `quantity` (base units of the base token) until
/// the quantity is exhausted or the next entry's price falls outside
/// `limit`. The book is ordered, so the first disqualified entry ends the
/// pass.
///
/// Each touched entry is consumed either fully or, for the final entry
/// only, partially; `sink.fill` fires once per touched entry.
pub fn match_order(
    book: &OrderBookSnapshot,
    market: &Market,
    side: Side,
    limit: PriceLimit,
    quantity: BaseUnits,
    sink: &mut dyn FillSink,
) -> anyhow::Result<FillResult> {
    let mut leftover = quantity;
    let mut pending = Vec::new();

    for entry in book.counter_side(side).iter_best_first() {
        if leftover == 0 {
            break;
        }
        let price = market.counter_price(side, entry);
        if !limit.admits(side, price) {
            break;
        }
        let consumed = entry.capacity(side).min(leftover);
        sink.fill(consumed, entry)?;
        pending.push(entry.exchange_contract_address.clone());
        leftover -= consumed;
    }

    Ok(FillResult { pending, leftover })
}
