//! Deposit ratio, LP share minting, and pro-rata withdrawal.

use padswap_types::{Amount, PadswapError, Result};

use crate::{mul_div, sqrt};

/// Amounts to actually deposit so the pool ratio is preserved.
///
/// A brand-new pool (both reserves zero) takes the desired amounts as-is.
/// Otherwise the full `a_desired` is used if the matching B fits within
/// `b_desired`; if not, the full `b_desired` is used with the matching A.
///
/// # Errors
/// Propagates `DivisionByZero` / `Overflow` from [`mul_div`] (e.g. exactly
/// one reserve is zero).
pub fn calculate_optimal_amounts(
    a_desired: Amount,
    b_desired: Amount,
    reserve_a: Amount,
    reserve_b: Amount,
) -> Result<(Amount, Amount)> {
    if reserve_a.is_zero() && reserve_b.is_zero() {
        return Ok((a_desired, b_desired));
    }
    let b_optimal = mul_div(reserve_b, a_desired, reserve_a)?;
    if b_optimal <= b_desired {
        return Ok((a_desired, b_optimal));
    }
    let a_optimal = mul_div(reserve_a, b_desired, reserve_b)?;
    Ok((a_optimal, b_desired))
}

/// LP shares minted for a deposit of `(amount_a, amount_b)`.
///
/// First deposit: `sqrt(amount_a × amount_b)`. Later deposits: the smaller
/// of the two proportional shares, so an unbalanced deposit donates its
/// excess to existing holders.
///
/// # Errors
/// - `Overflow` if `amount_a × amount_b` exceeds 256 bits on first deposit
/// - `DivisionByZero` if supply exists but a reserve is zero
pub fn calculate_liquidity(
    amount_a: Amount,
    amount_b: Amount,
    reserve_a: Amount,
    reserve_b: Amount,
    total_supply: Amount,
) -> Result<Amount> {
    if total_supply.is_zero() {
        let product = amount_a
            .checked_mul(amount_b)
            .ok_or(PadswapError::Overflow("initial liquidity product"))?;
        return Ok(sqrt(product));
    }
    let share_a = mul_div(amount_a, total_supply, reserve_a)?;
    let share_b = mul_div(amount_b, total_supply, reserve_b)?;
    Ok(share_a.min(share_b))
}

/// Token amounts paid out for burning `lp_amount` shares (floor, pro-rata).
///
/// # Errors
/// - `DivisionByZero` if `total_supply == 0`
/// - `InsufficientLiquidity` if `lp_amount > total_supply`
pub fn calculate_remove_amounts(
    lp_amount: Amount,
    reserve_a: Amount,
    reserve_b: Amount,
    total_supply: Amount,
) -> Result<(Amount, Amount)> {
    if total_supply.is_zero() {
        return Err(PadswapError::DivisionByZero);
    }
    if lp_amount > total_supply {
        return Err(PadswapError::InsufficientLiquidity);
    }
    let amount_a = mul_div(lp_amount, reserve_a, total_supply)?;
    let amount_b = mul_div(lp_amount, reserve_b, total_supply)?;
    Ok((amount_a, amount_b))
}
