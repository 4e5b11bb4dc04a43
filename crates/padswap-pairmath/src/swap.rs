//! Constant-product swap formulas (x × y = k).

use padswap_types::{Amount, PadswapError, Result, amount_to_decimal, constants::BPS_DENOMINATOR};
use rust_decimal::Decimal;

use crate::mul_div;

fn check_fee_bps(fee_bps: u32) -> Result<Amount> {
    let fee = Amount::from(fee_bps);
    if fee >= BPS_DENOMINATOR {
        return Err(PadswapError::InvalidFeeConfiguration {
            reason: format!("swap fee {fee_bps} bps must be below {BPS_DENOMINATOR}"),
        });
    }
    Ok(fee)
}

/// Output of a constant-product swap after a `fee_bps` input fee.
///
/// ```text
/// fee        = floor(amount_in × fee_bps / 10000)
/// in_net     = amount_in − fee
/// amount_out = floor(in_net × reserve_out / (reserve_in + in_net))
/// ```
///
/// # Errors
/// - `ZeroAmount` if `amount_in == 0`
/// - `InsufficientLiquidity` if either reserve is zero
/// - `Overflow` on products beyond 256 bits
pub fn get_amount_out(
    amount_in: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee_bps: u32,
) -> Result<Amount> {
    if amount_in.is_zero() {
        return Err(PadswapError::ZeroAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(PadswapError::InsufficientLiquidity);
    }
    let fee_bps = check_fee_bps(fee_bps)?;
    let fee = mul_div(amount_in, fee_bps, BPS_DENOMINATOR)?;
    let in_net = amount_in - fee;
    let denominator = reserve_in
        .checked_add(in_net)
        .ok_or(PadswapError::Overflow("reserve_in + amount_in"))?;
    mul_div(in_net, reserve_out, denominator)
}

/// Smallest input that yields at least `amount_out` under [`get_amount_out`].
///
/// Rounds up by one unit, so the result is always sufficient.
///
/// # Errors
/// - `ZeroAmount` if `amount_out == 0`
/// - `InsufficientLiquidity` if either reserve is zero or
///   `amount_out >= reserve_out`
pub fn get_amount_in(
    amount_out: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee_bps: u32,
) -> Result<Amount> {
    if amount_out.is_zero() {
        return Err(PadswapError::ZeroAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() || amount_out >= reserve_out {
        return Err(PadswapError::InsufficientLiquidity);
    }
    let fee_bps = check_fee_bps(fee_bps)?;
    let numerator = reserve_in
        .checked_mul(amount_out)
        .and_then(|v| v.checked_mul(BPS_DENOMINATOR))
        .ok_or(PadswapError::Overflow("get_amount_in numerator"))?;
    let denominator = (reserve_out - amount_out)
        .checked_mul(BPS_DENOMINATOR - fee_bps)
        .ok_or(PadswapError::Overflow("get_amount_in denominator"))?;
    (numerator / denominator)
        .checked_add(Amount::from(1u8))
        .ok_or(PadswapError::Overflow("get_amount_in"))
}

/// Equivalent amount of B for `amount_a` of A at the current reserve ratio.
///
/// # Errors
/// - `ZeroAmount` if `amount_a == 0`
/// - `InsufficientLiquidity` if either reserve is zero
pub fn quote(amount_a: Amount, reserve_a: Amount, reserve_b: Amount) -> Result<Amount> {
    if amount_a.is_zero() {
        return Err(PadswapError::ZeroAmount);
    }
    if reserve_a.is_zero() || reserve_b.is_zero() {
        return Err(PadswapError::InsufficientLiquidity);
    }
    mul_div(amount_a, reserve_b, reserve_a)
}

/// Marginal price of the base token in quote-token units, for display.
/// `None` while either reserve is empty or beyond `Decimal` range.
#[must_use]
pub fn spot_price(reserve_base: Amount, reserve_quote: Amount) -> Option<Decimal> {
    if reserve_base.is_zero() {
        return None;
    }
    amount_to_decimal(reserve_quote)?.checked_div(amount_to_decimal(reserve_base)?)
}
