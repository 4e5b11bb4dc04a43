//! Fee arithmetic in basis points.

use padswap_types::{Amount, Result, constants::BPS_DENOMINATOR};

use crate::mul_div;

/// `floor(amount_in × trading_fee_bps / 10000)`.
pub fn calculate_trading_fee(amount_in: Amount, trading_fee_bps: u32) -> Result<Amount> {
    mul_div(amount_in, Amount::from(trading_fee_bps), BPS_DENOMINATOR)
}

/// `floor(trading_fee × protocol_fee_bps / 10000)`.
pub fn calculate_protocol_fee(trading_fee: Amount, protocol_fee_bps: u32) -> Result<Amount> {
    mul_div(trading_fee, Amount::from(protocol_fee_bps), BPS_DENOMINATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(n: u128) -> Amount {
        Amount::from(n)
    }

    #[test]
    fn fee_split_scenario() {
        let trading = calculate_trading_fee(amt(10_000), 30).unwrap();
        assert_eq!(trading, amt(30));
        let protocol = calculate_protocol_fee(trading, 1_667).unwrap();
        assert_eq!(protocol, amt(5));
        assert_eq!(trading - protocol, amt(25));
    }

    #[test]
    fn tiny_trades_round_to_zero_fee() {
        assert_eq!(calculate_trading_fee(amt(33), 30).unwrap(), Amount::ZERO);
        assert_eq!(calculate_protocol_fee(amt(3), 1_667).unwrap(), Amount::ZERO);
    }
}
