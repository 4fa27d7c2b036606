use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Integer token quantity in the token's smallest indivisible unit.
pub type BaseUnits = u128;

/// Largest base-unit amount representable without loss in a `Decimal`
/// mantissa. Snapshot parsing rejects anything above this.
pub const MAX_BASE_UNITS: BaseUnits = 79_228_162_514_264_337_593_543_950_335;

/// Count of implied decimal places used to scale a token's human-readable
/// quantity into base units. Supplied by market metadata; always small
/// (ERC-20 style tokens top out at 18).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precision(pub u32);

impl Precision {
    pub fn factor(self) -> Decimal {
        Decimal::from_i128_with_scale(10i128.pow(self.0), 0)
    }
}

/// Scale a human-readable quantity into base units, rounding to the nearest
/// whole unit. Returns `None` for negative quantities or values that do not
/// fit the base-unit range.
pub fn to_base_units(quantity: Decimal, precision: Precision) -> Option<BaseUnits> {
    if quantity.is_sign_negative() {
        return None;
    }
    let scaled = quantity.checked_mul(precision.factor())?;
    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u128()
}

/// Scale base units back to a human-readable decimal quantity.
pub fn to_human_units(base: BaseUnits, precision: Precision) -> Decimal {
    debug_assert!(base <= MAX_BASE_UNITS);
    Decimal::from_i128_with_scale(base as i128, 0) / precision.factor()
}

/// Implied price of a resting order: the maker-side quantity over the
/// taker-side quantity, each in human units. Taker amount must be nonzero;
/// snapshot validation guarantees this for book entries.
pub fn price_from_amounts(
    maker_amount: BaseUnits,
    maker_precision: Precision,
    taker_amount: BaseUnits,
    taker_precision: Precision,
) -> Decimal {
    debug_assert!(taker_amount > 0);
    to_human_units(maker_amount, maker_precision) / to_human_units(taker_amount, taker_precision)
}
