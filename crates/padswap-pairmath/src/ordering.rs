//! Canonical token ordering.

use padswap_types::{Address, PairKey, Result};

/// Order two tokens lower-address-first.
///
/// Commutative: `sort_tokens(a, b) == sort_tokens(b, a)`.
///
/// # Errors
/// Returns `InvalidPair` if `a == b` or either is the null address.
pub fn sort_tokens(a: Address, b: Address) -> Result<(Address, Address)> {
    let key = PairKey::canonical(a, b)?;
    Ok((key.token_a(), key.token_b()))
}

#[cfg(test)]
mod tests {
    use padswap_types::PadswapError;

    use super::*;

    #[test]
    fn sorts_lower_first() {
        let lo = Address::from_low_u64(1);
        let hi = Address::from_low_u64(2);
        assert_eq!(sort_tokens(hi, lo).unwrap(), (lo, hi));
        assert_eq!(sort_tokens(lo, hi).unwrap(), (lo, hi));
    }

    #[test]
    fn rejects_equal_tokens() {
        let t = Address::from_low_u64(1);
        assert!(matches!(
            sort_tokens(t, t),
            Err(PadswapError::InvalidPair { .. })
        ));
    }

    #[test]
    fn rejects_null_token() {
        let t = Address::from_low_u64(1);
        assert!(sort_tokens(Address::ZERO, t).is_err());
        assert!(sort_tokens(t, Address::ZERO).is_err());
    }
}
