//! LP deposit snapshots and earnings reports.
//!
//! Every successful deposit appends an [`LpSnapshot`] to the provider's
//! per-pool history. Snapshots are never mutated or pruned; withdrawals
//! consume them oldest-first through a separate cursor.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Amount, Timestamp, U256};

/// Pool state right after a deposit, plus the LP minted by it.
///
/// `lp_amount × reserve_x / total_lp_supply` reproduces the deposited
/// amount of token x (up to floor rounding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LpSnapshot {
    pub reserve_a: Amount,
    pub reserve_b: Amount,
    pub lp_amount: Amount,
    pub timestamp: Timestamp,
    pub total_lp_supply: Amount,
}

/// Mark-to-market earnings of a provider's current LP position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnrealizedEarnings {
    pub deposited_a: Amount,
    pub deposited_b: Amount,
    pub current_a: Amount,
    pub current_b: Amount,
    pub earnings_a: Amount,
    pub earnings_b: Amount,
    /// Annualised return in bps; zero unless there is profit and time has passed.
    pub apy_bps: U256,
    /// Timestamp of the oldest snapshot, if any.
    pub since: Option<Timestamp>,
}

impl UnrealizedEarnings {
    /// APY as a percentage (e.g. `12.5` for 1250 bps).
    #[must_use]
    pub fn apy_percent(&self) -> Decimal {
        crate::amount_to_decimal(self.apy_bps).map_or(Decimal::MAX, |bps| bps / Decimal::ONE_HUNDRED)
    }

    #[must_use]
    pub fn has_earnings(&self) -> bool {
        !self.earnings_a.is_zero() || !self.earnings_b.is_zero()
    }
}

/// Cumulative earnings already realized by withdrawals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RealizedEarnings {
    pub token_a: Amount,
    pub token_b: Amount,
    pub withdrawals: u64,
    pub last_realized_at: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apy_percent_from_bps() {
        let e = UnrealizedEarnings {
            apy_bps: U256::from(1_250u64),
            ..UnrealizedEarnings::default()
        };
        assert_eq!(e.apy_percent(), Decimal::new(125, 1));
    }

    #[test]
    fn has_earnings_checks_both_sides() {
        let mut e = UnrealizedEarnings::default();
        assert!(!e.has_earnings());
        e.earnings_b = Amount::from(1u64);
        assert!(e.has_earnings());
    }

    #[test]
    fn snapshot_serde_roundtrip() {
        let snap = LpSnapshot {
            reserve_a: Amount::from(1_000_000_000_000_000_000_000u128),
            reserve_b: Amount::from(4_000_000_000_000_000_000_000u128),
            lp_amount: Amount::from(2_000_000_000_000_000_000_000u128),
            timestamp: Timestamp::from_secs(42),
            total_lp_supply: Amount::from(2_000_000_000_000_000_000_000u128),
        };
        let json = serde_json::to_string(&snap).unwrap();
        let back: LpSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap, back);
    }
}
