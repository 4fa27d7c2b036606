use rust_decimal::Decimal;

use crate::book::Market;
use crate::models::{OrderRequest, Side, ZERO_ADDRESS};
use crate::units::{self, BaseUnits};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("residual quantity must be positive")]
    ZeroResidual,
    #[error("a resting order requires a finite positive price")]
    BadPrice,
    #[error("expiration must be a positive number of minutes")]
    ZeroExpiry,
    #[error("maker address must not be empty")]
    MissingMaker,
    #[error("order amount does not fit the quote token's scale")]
    AmountOverflow,
}

/// Inputs for building an unsigned resting order from the unmatched
/// remainder of a match pass. `residual` is in base units of the base
/// token; `salt` and `exchange_contract_address` come from external
/// providers.
#[derive(Debug, Clone)]
pub struct OrderParams<'a> {
    pub side: Side,
    pub market: &'a Market,
    pub residual: BaseUnits,
    pub price: Decimal,
    pub expires_in_min: u64,
    pub maker: &'a str,
    pub now_ms: u64,
    pub salt: String,
    pub exchange_contract_address: String,
}

/// Build the unsigned relay payload for the residual quantity. The maker
/// gives quote and takes base on a buy, and the reverse on a sell; the
/// taker slot is left open (zero address). The caller still has to fetch
/// fees, sign the order hash, and submit.
pub fn build_order_request(params: OrderParams<'_>) -> Result<OrderRequest, RequestError> {
    if params.residual == 0 {
        return Err(RequestError::ZeroResidual);
    }
    if params.price <= Decimal::ZERO {
        return Err(RequestError::BadPrice);
    }
    if params.expires_in_min == 0 {
        return Err(RequestError::ZeroExpiry);
    }
    if params.maker.is_empty() {
        return Err(RequestError::MissingMaker);
    }

    let market = params.market;
    let residual_human = units::to_human_units(params.residual, market.base.precision);
    let notional = residual_human
        .checked_mul(params.price)
        .ok_or(RequestError::AmountOverflow)?;
    let quote_amount = units::to_base_units(notional, market.quote.precision)
        .ok_or(RequestError::AmountOverflow)?;

    let (maker_token, taker_token, maker_amount, taker_amount) = match params.side {
        Side::Buy => (
            market.quote.address.clone(),
            market.base.address.clone(),
            quote_amount,
            params.residual,
        ),
        Side::Sell => (
            market.base.address.clone(),
            market.quote.address.clone(),
            params.residual,
            quote_amount,
        ),
    };

    let expiration_sec = params.now_ms / 1000 + params.expires_in_min * 60;

    Ok(OrderRequest {
        exchange_contract_address: params.exchange_contract_address,
        maker: params.maker.to_string(),
        taker: ZERO_ADDRESS.to_string(),
        maker_token_address: maker_token,
        taker_token_address: taker_token,
        maker_token_amount: maker_amount.to_string(),
        taker_token_amount: taker_amount.to_string(),
        expiration_unix_timestamp_sec: expiration_sec.to_string(),
        salt: params.salt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TokenInfo, TokenPair};
    use rust_decimal_macros::dec;

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

    fn params(market: &Market) -> OrderParams<'_> {
        OrderParams {
            side: Side::Buy,
            market,
            residual: 2_500_000_000_000_000_000_000,
            price: dec!(0.00015),
            expires_in_min: 1,
            maker: "0x9e56625509c2f60af937f23b7b532600390e8c8b",
            now_ms: 42_000,
            salt: "1".into(),
            exchange_contract_address: String::new(),
        }
    }

    #[test]
    fn zero_residual_is_rejected() {
        let market = market();
        let mut p = params(&market);
        p.residual = 0;
        assert_eq!(build_order_request(p).unwrap_err(), RequestError::ZeroResidual);
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let market = market();
        let mut p = params(&market);
        p.price = Decimal::ZERO;
        assert_eq!(build_order_request(p).unwrap_err(), RequestError::BadPrice);
    }

    #[test]
    fn expiration_is_seconds_from_a_millisecond_clock() {
        let market = market();
        let request = build_order_request(params(&market)).unwrap();
        assert_eq!(request.expiration_unix_timestamp_sec, "102");
    }
}
