//! Time-weighted average price accumulator.
//!
//! The accumulator step is pure: it takes the TWAP state and the reserves
//! that were in force *before* the update, and returns the next state.
//! The pool repository applies it immediately before overwriting reserves.

use padswap_types::{Amount, Timestamp, TwapData, U256, amount_to_decimal};
use rust_decimal::Decimal;

/// Advance the TWAP accumulators to `now`.
///
/// Prices accumulate only when time has passed and both prior reserves were
/// non-zero. `block_timestamp_last` never moves backwards: an out-of-order
/// `now` leaves the state untouched.
///
/// Never fails: the accumulators wrap, and a step whose exact
/// `reserve × elapsed` product would not fit in 256 bits is approximated,
/// so the oracle can never block a reserve update.
#[must_use]
pub fn advance_twap(
    twap: &TwapData,
    prior_reserve_a: Amount,
    prior_reserve_b: Amount,
    now: Timestamp,
) -> TwapData {
    if now <= twap.block_timestamp_last {
        return *twap;
    }
    let elapsed = U256::from(now.elapsed_since(twap.block_timestamp_last));
    let mut next = *twap;
    if !prior_reserve_a.is_zero() && !prior_reserve_b.is_zero() {
        let price0_step = price_step(prior_reserve_b, prior_reserve_a, elapsed);
        let price1_step = price_step(prior_reserve_a, prior_reserve_b, elapsed);
        next.price0_cumulative_last = twap.price0_cumulative_last.wrapping_add(price0_step);
        next.price1_cumulative_last = twap.price1_cumulative_last.wrapping_add(price1_step);
        tracing::debug!(
            elapsed = %elapsed,
            price0_step = %price0_step,
            price1_step = %price1_step,
            "TWAP advanced"
        );
    }
    next.block_timestamp_last = now;
    next
}

/// `floor(numerator × elapsed / denominator)`, split as whole and
/// fractional price so the product never needs more than 256 bits.
///
/// The fractional term is exact unless `remainder × elapsed` overflows,
/// which needs a denominator above ~2^192. It then falls back to
/// `remainder / (denominator / elapsed)`. `denominator` must be non-zero.
fn price_step(numerator: Amount, denominator: Amount, elapsed: U256) -> U256 {
    let whole = (numerator / denominator).wrapping_mul(elapsed);
    let remainder = numerator % denominator;
    let fraction = match remainder.checked_mul(elapsed) {
        Some(product) => product / denominator,
        None => remainder / (denominator / elapsed),
    };
    whole.wrapping_add(fraction)
}

/// Average prices over the window between two samples of the same pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwapAverage {
    /// Average price of A in B.
    pub price0: Decimal,
    /// Average price of B in A.
    pub price1: Decimal,
    pub window_secs: u64,
}

/// Average prices between `older` and `newer` samples.
///
/// Returns `None` if the window is empty or the deltas do not fit in
/// `Decimal`.
#[must_use]
pub fn twap_average_price(older: &TwapData, newer: &TwapData) -> Option<TwapAverage> {
    let window_secs = newer
        .block_timestamp_last
        .elapsed_since(older.block_timestamp_last);
    if window_secs == 0 {
        return None;
    }
    let window = Decimal::from(window_secs);
    let d0 = amount_to_decimal(
        newer
            .price0_cumulative_last
            .wrapping_sub(older.price0_cumulative_last),
    )?;
    let d1 = amount_to_decimal(
        newer
            .price1_cumulative_last
            .wrapping_sub(older.price1_cumulative_last),
    )?;
    Some(TwapAverage {
        price0: d0.checked_div(window)?,
        price1: d1.checked_div(window)?,
        window_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const E18: u128 = 1_000_000_000_000_000_000;
    const YEAR: u64 = 365 * 24 * 60 * 60;

    fn amt(n: u128) -> Amount {
        Amount::from(n)
    }

    fn at(secs: u64) -> TwapData {
        TwapData {
            block_timestamp_last: Timestamp::from_secs(secs),
            ..TwapData::default()
        }
    }

    #[test]
    fn accumulates_when_time_passes() {
        let next = advance_twap(&at(100), amt(1_000), amt(2_000), Timestamp::from_secs(110));
        // price0 += 2000*10/1000, price1 += 1000*10/2000
        assert_eq!(next.price0_cumulative_last, amt(20));
        assert_eq!(next.price1_cumulative_last, amt(5));
        assert_eq!(next.block_timestamp_last, Timestamp::from_secs(110));
    }

    #[test]
    fn step_matches_single_division() {
        for (num, den, secs) in [(2_000u128, 1_000u128, 10u64), (7, 3, 5), (1, 3, 2), (10, 7, 1)] {
            let expected = amt(num) * U256::from(secs) / amt(den);
            assert_eq!(price_step(amt(num), amt(den), U256::from(secs)), expected);
        }
    }

    #[test]
    fn no_accumulation_without_elapsed_time() {
        let start = at(100);
        let next = advance_twap(&start, amt(1_000), amt(2_000), Timestamp::from_secs(100));
        assert_eq!(next, start);
    }

    #[test]
    fn no_accumulation_from_empty_reserves() {
        let next = advance_twap(&at(100), Amount::ZERO, amt(2_000), Timestamp::from_secs(150));
        assert_eq!(next.price0_cumulative_last, U256::ZERO);
        assert_eq!(next.price1_cumulative_last, U256::ZERO);
        assert_eq!(next.block_timestamp_last, Timestamp::from_secs(150));
    }

    #[test]
    fn timestamp_never_decreases() {
        let start = at(100);
        let next = advance_twap(&start, amt(1_000), amt(2_000), Timestamp::from_secs(50));
        assert_eq!(next.block_timestamp_last, Timestamp::from_secs(100));
    }

    #[test]
    fn long_window_at_token_scale() {
        // A billion tokens against a thousand, idle for ten years.
        let (a, b) = (amt(1_000_000_000 * E18), amt(1_000 * E18));
        let now = Timestamp::from_secs(10 * YEAR);
        let next = advance_twap(&at(0), a, b, now);
        let elapsed = U256::from(10 * YEAR);
        assert_eq!(next.price0_cumulative_last, b * elapsed / a);
        assert_eq!(next.price1_cumulative_last, a * elapsed / b);
        assert_eq!(next.block_timestamp_last, now);
    }

    #[test]
    fn huge_reserves_never_fail() {
        let huge = Amount::MAX - amt(1);
        let next = advance_twap(&at(0), huge, Amount::MAX, Timestamp::from_secs(u64::MAX));
        assert_eq!(next.block_timestamp_last, Timestamp::from_secs(u64::MAX));
        // Price of A in B is just above 1, so the step is about `elapsed`.
        let elapsed = U256::from(u64::MAX);
        assert!(next.price0_cumulative_last >= elapsed);
        assert!(next.price0_cumulative_last <= elapsed + elapsed);
        assert!(next.price1_cumulative_last < elapsed);
    }

    #[test]
    fn average_over_window() {
        let t0 = at(100);
        let t1 = advance_twap(&t0, amt(1_000), amt(2_000), Timestamp::from_secs(110));
        let t2 = advance_twap(&t1, amt(1_000), amt(2_000), Timestamp::from_secs(130));
        let avg = twap_average_price(&t0, &t2).unwrap();
        assert_eq!(avg.window_secs, 30);
        assert_eq!(avg.price0, Decimal::from(2));
        assert!(avg.price1 < Decimal::ONE);
    }

    #[test]
    fn average_over_wrapped_accumulator() {
        let older = TwapData {
            price0_cumulative_last: U256::MAX - amt(9),
            price1_cumulative_last: U256::ZERO,
            block_timestamp_last: Timestamp::from_secs(0),
        };
        let newer = TwapData {
            price0_cumulative_last: amt(10),
            price1_cumulative_last: amt(20),
            block_timestamp_last: Timestamp::from_secs(10),
        };
        let avg = twap_average_price(&older, &newer).unwrap();
        assert_eq!(avg.price0, Decimal::from(2));
        assert_eq!(avg.price1, Decimal::from(2));
    }

    #[test]
    fn empty_window_has_no_average() {
        assert!(twap_average_price(&at(5), &at(5)).is_none());
    }
}
