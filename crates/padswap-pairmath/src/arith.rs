//! Integer primitives: floor square root and multiply-then-divide.

use padswap_types::{Amount, PadswapError, Result};

/// Floor of the square root of `x` (Babylonian method). `sqrt(0) == 0`.
#[must_use]
pub fn sqrt(x: Amount) -> Amount {
    let one = Amount::from(1u8);
    let two = Amount::from(2u8);
    if x > Amount::from(3u8) {
        let mut z = x;
        let mut y = x / two + one;
        while y < z {
            z = y;
            y = (x / y + y) / two;
        }
        z
    } else if x.is_zero() {
        Amount::ZERO
    } else {
        one
    }
}

/// `floor(x * y / z)`.
///
/// The product is formed at single (256-bit) width: a product beyond
/// `U256::MAX` is reported as `Overflow` even when the quotient would fit.
///
/// # Errors
/// - `DivisionByZero` if `z == 0`
/// - `Overflow` if `x * y` exceeds 256 bits
pub fn mul_div(x: Amount, y: Amount, z: Amount) -> Result<Amount> {
    if z.is_zero() {
        return Err(PadswapError::DivisionByZero);
    }
    let product = x
        .checked_mul(y)
        .ok_or(PadswapError::Overflow("mul_div intermediate product"))?;
    Ok(product / z)
}
