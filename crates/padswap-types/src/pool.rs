//! Pool records for the constant-product AMM.
//!
//! A [`Pool`] lives only under its canonical [`PairKey`]. Its reserves are
//! mutated exclusively through the pool repository's reserve update, which
//! also advances the [`TwapData`] accumulators.

use std::fmt;

pub use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, PairKey, PoolId, Timestamp};

/// Token and LP quantities, in the token's smallest unit.
///
/// 256 bits wide, like on-chain token balances: 18-decimal amounts and
/// their pairwise products stay representable.
pub type Amount = U256;

/// Which side of a canonical pair a token sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolSide {
    /// `token_a`, the lower address.
    A,
    /// `token_b`, the higher address.
    B,
}

impl PoolSide {
    /// Side of `token` in `pair`, if it belongs to the pair.
    #[must_use]
    pub fn of(pair: &PairKey, token: Address) -> Option<Self> {
        if token == pair.token_a() {
            Some(Self::A)
        } else if token == pair.token_b() {
            Some(Self::B)
        } else {
            None
        }
    }

    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl fmt::Display for PoolSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

/// Uniswap-V2-style running price oracle.
///
/// Sample externally as `(cum_t2 - cum_t1) / (t2 - t1)`. The accumulators
/// advance with wrapping addition, so samplers must use wrapping
/// subtraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TwapData {
    /// Σ `reserve_b / reserve_a × elapsed` (price of A in B).
    pub price0_cumulative_last: U256,
    /// Σ `reserve_a / reserve_b × elapsed` (price of B in A).
    pub price1_cumulative_last: U256,
    /// Time of the last reserve update. Never decreases.
    pub block_timestamp_last: Timestamp,
}

/// A liquidity pool for one canonical token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub id: PoolId,
    pub pair: PairKey,
    pub reserve_a: Amount,
    pub reserve_b: Amount,
    /// Cached LP supply. The LP ledger is authoritative; this mirrors it
    /// after every mint and burn.
    pub total_lp_supply: Amount,
    /// `reserve_a × reserve_b` at the last update (informational; zero if
    /// the product overflowed).
    pub k_last: U256,
    pub twap: TwapData,
    pub created_at: Timestamp,
}

impl Pool {
    /// A fresh, empty pool. The TWAP clock starts at creation.
    #[must_use]
    pub fn new(pair: PairKey, now: Timestamp) -> Self {
        Self {
            id: pair.pool_id(),
            pair,
            reserve_a: Amount::ZERO,
            reserve_b: Amount::ZERO,
            total_lp_supply: Amount::ZERO,
            k_last: U256::ZERO,
            twap: TwapData {
                block_timestamp_last: now,
                ..TwapData::default()
            },
            created_at: now,
        }
    }

    #[must_use]
    pub fn reserves(&self) -> (Amount, Amount) {
        (self.reserve_a, self.reserve_b)
    }

    /// `(reserve_in, reserve_out)` for a swap that pays in on `side_in`.
    #[must_use]
    pub fn reserves_for(&self, side_in: PoolSide) -> (Amount, Amount) {
        match side_in {
            PoolSide::A => (self.reserve_a, self.reserve_b),
            PoolSide::B => (self.reserve_b, self.reserve_a),
        }
    }

    /// Whether either reserve is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reserve_a.is_zero() || self.reserve_b.is_zero()
    }

    /// Spot price of token A denominated in token B.
    #[must_use]
    pub fn spot_price(&self) -> Option<Decimal> {
        let a = amount_to_decimal(self.reserve_a)?;
        let b = amount_to_decimal(self.reserve_b)?;
        b.checked_div(a)
    }

    /// A read-only view for components that must not see the whole record.
    #[must_use]
    pub fn view(&self) -> PoolView {
        PoolView {
            reserve_a: self.reserve_a,
            reserve_b: self.reserve_b,
            total_lp_supply: self.total_lp_supply,
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pool[{}] {} reserves=({}, {}) lp={}",
            self.id, self.pair, self.reserve_a, self.reserve_b, self.total_lp_supply
        )
    }
}

/// Reserves and LP supply at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolView {
    pub reserve_a: Amount,
    pub reserve_b: Amount,
    pub total_lp_supply: Amount,
}

/// Lossless conversion of an integer amount to `Decimal`, if it fits in 96 bits.
#[must_use]
pub fn amount_to_decimal(amount: Amount) -> Option<Decimal> {
    let narrow = u128::try_from(amount).ok()?;
    let signed = i128::try_from(narrow).ok()?;
    Decimal::try_from_i128_with_scale(signed, 0).ok()
}
