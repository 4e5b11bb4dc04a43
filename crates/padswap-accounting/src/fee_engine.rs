//! Fee engine: swap fee split, per-pool protocol fee counters, statistics.
//!
//! ```text
//! amount_in ──▶ trading_fee = floor(amount_in × trading_bps / 10000)
//!                   ├── protocol_fee = floor(trading_fee × protocol_bps / 10000)
//!                   │        └──▶ accumulated[pool][side_in]   (never in reserves)
//!                   └── lp_fee = trading_fee − protocol_fee
//!                            └──▶ stays in reserves            (LP share value grows)
//! ```
//!
//! Counter updates are split into a fallible `preview_*` and an infallible
//! `apply_*`, so the orchestrator can compute every update before it
//! touches any collaborator and commit them only once all effects landed.

use std::collections::HashMap;

use padswap_pairmath::{calculate_protocol_fee, calculate_trading_fee};
use padswap_types::{
    AccumulatedFees, Amount, CollectedFees, FeeConfig, FeeSplit, FeeStats, PadswapError, PoolId,
    PoolSide, Result, Timestamp,
};

/// A computed, not yet applied, change to one pool's fee counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapFeeUpdate {
    pub pool: PoolId,
    pub accumulated: AccumulatedFees,
    pub stats: FeeStats,
}

/// Outcome of a batched protocol fee collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionReport {
    pub collected: Vec<CollectedFees>,
    /// Pools that had nothing to collect.
    pub skipped: Vec<PoolId>,
}

impl CollectionReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collected.is_empty()
    }
}

/// Holds the fee configuration and every pool's protocol fee counters.
#[derive(Debug, Clone)]
pub struct FeeEngine {
    config: FeeConfig,
    accumulated: HashMap<PoolId, AccumulatedFees>,
    stats: HashMap<PoolId, FeeStats>,
}

impl FeeEngine {
    /// Create a fee engine with a validated configuration.
    ///
    /// # Errors
    /// Returns `InvalidFeeConfiguration` if `config` is out of bounds.
    pub fn new(config: FeeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            accumulated: HashMap::new(),
            stats: HashMap::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &FeeConfig {
        &self.config
    }

    /// Replace the configuration. Counters are untouched.
    ///
    /// # Errors
    /// Returns `InvalidFeeConfiguration`; the old configuration stays.
    pub fn set_config(&mut self, config: FeeConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_fees_enabled(&mut self, enabled: bool) {
        self.config.fees_enabled = enabled;
    }

    /// Split the fee for a swap of `amount_in`. All zero while fees are
    /// disabled.
    ///
    /// # Errors
    /// Returns `Overflow` if `amount_in × trading_fee_bps` exceeds 256 bits.
    pub fn calculate_swap_fees(&self, amount_in: Amount) -> Result<FeeSplit> {
        if !self.config.fees_enabled {
            return Ok(FeeSplit::default());
        }
        let trading_fee = calculate_trading_fee(amount_in, self.config.trading_fee_bps)?;
        let protocol_fee = calculate_protocol_fee(trading_fee, self.config.protocol_fee_bps)?;
        let split = FeeSplit {
            trading_fee,
            protocol_fee,
            lp_fee: trading_fee - protocol_fee,
        };
        tracing::debug!(
            amount_in = %amount_in,
            trading_fee = %split.trading_fee,
            protocol_fee = %split.protocol_fee,
            lp_fee = %split.lp_fee,
            "Swap fee split"
        );
        Ok(split)
    }

    /// Compute the counters after recording `split` for a swap paid in on
    /// `side_in`. Returns `None` for a fee-free swap (nothing to record).
    ///
    /// # Errors
    /// Returns `Overflow` if a cumulative counter would exceed 256 bits.
    pub fn preview_swap_fees(
        &self,
        pool: PoolId,
        side_in: PoolSide,
        split: &FeeSplit,
        now: Timestamp,
    ) -> Result<Option<SwapFeeUpdate>> {
        if split.is_zero() {
            return Ok(None);
        }
        let mut accumulated = self.accumulated(pool);
        let mut stats = self.stats(pool);

        let (acc_side, trading_side, protocol_side) = match side_in {
            PoolSide::A => (
                &mut accumulated.token_a,
                &mut stats.trading_fees_a,
                &mut stats.protocol_fees_a,
            ),
            PoolSide::B => (
                &mut accumulated.token_b,
                &mut stats.trading_fees_b,
                &mut stats.protocol_fees_b,
            ),
        };
        *acc_side = acc_side
            .checked_add(split.protocol_fee)
            .ok_or(PadswapError::Overflow("accumulated protocol fees"))?;
        *trading_side = trading_side
            .checked_add(split.trading_fee)
            .ok_or(PadswapError::Overflow("cumulative trading fees"))?;
        *protocol_side = protocol_side
            .checked_add(split.protocol_fee)
            .ok_or(PadswapError::Overflow("cumulative protocol fees"))?;
        stats.fee_paying_swaps = stats.fee_paying_swaps.saturating_add(1);
        stats.last_fee_at = Some(now);

        Ok(Some(SwapFeeUpdate {
            pool,
            accumulated,
            stats,
        }))
    }

    pub fn apply_swap_fees(&mut self, update: SwapFeeUpdate) {
        self.accumulated.insert(update.pool, update.accumulated);
        self.stats.insert(update.pool, update.stats);
    }

    /// Record a swap's fees in one step. A zero trading fee is a no-op.
    ///
    /// # Errors
    /// Returns `Overflow`; nothing is recorded in that case.
    pub fn process_swap_fees(
        &mut self,
        pool: PoolId,
        side_in: PoolSide,
        split: &FeeSplit,
        now: Timestamp,
    ) -> Result<()> {
        if let Some(update) = self.preview_swap_fees(pool, side_in, split, now)? {
            self.apply_swap_fees(update);
        }
        Ok(())
    }

    /// Protocol fees accrued by `pool` and not yet collected.
    #[must_use]
    pub fn accumulated(&self, pool: PoolId) -> AccumulatedFees {
        self.accumulated.get(&pool).copied().unwrap_or_default()
    }

    /// Lifetime fee statistics of `pool`.
    #[must_use]
    pub fn stats(&self, pool: PoolId) -> FeeStats {
        self.stats.get(&pool).copied().unwrap_or_default()
    }

    /// What a collection of `pool` would pay out right now.
    ///
    /// # Errors
    /// Returns `NoFeesToCollect` if both counters are zero.
    pub fn pending_collection(&self, pool: PoolId) -> Result<AccumulatedFees> {
        let fees = self.accumulated(pool);
        if fees.is_zero() {
            return Err(PadswapError::NoFeesToCollect(pool));
        }
        Ok(fees)
    }

    /// Partition `pools` into those with fees due and those to skip.
    #[must_use]
    pub fn plan_collection(
        &self,
        pools: &[PoolId],
    ) -> (Vec<(PoolId, AccumulatedFees)>, Vec<PoolId>) {
        let mut due = Vec::new();
        let mut skipped = Vec::new();
        for &pool in pools {
            let fees = self.accumulated(pool);
            if fees.is_zero() || due.iter().any(|(id, _)| *id == pool) {
                skipped.push(pool);
            } else {
                due.push((pool, fees));
            }
        }
        (due, skipped)
    }

    /// Zero both counters of `pool`, returning what they held.
    pub fn commit_collection(&mut self, pool: PoolId) -> AccumulatedFees {
        self.accumulated.remove(&pool).unwrap_or_default()
    }

    /// Number of pools with uncollected protocol fees.
    #[must_use]
    pub fn pools_with_fees(&self) -> usize {
        self.accumulated.values().filter(|f| !f.is_zero()).count()
    }
}

#[cfg(test)]
mod tests {
    use padswap_types::Address;

    use super::*;

    const E18: u128 = 1_000_000_000_000_000_000;

    fn amt(n: u128) -> Amount {
        Amount::from(n)
    }

    fn engine() -> FeeEngine {
        FeeEngine::new(FeeConfig::new(30, 1_667, Address::from_low_u64(9))).unwrap()
    }

    fn pool(n: u8) -> PoolId {
        PoolId([n; 32])
    }

    #[test]
    fn invalid_config_rejected_on_construction() {
        let err = FeeEngine::new(FeeConfig::new(101, 0, Address::from_low_u64(9))).unwrap_err();
        assert!(matches!(err, PadswapError::InvalidFeeConfiguration { .. }));
    }

    #[test]
    fn split_scenario() {
        let split = engine().calculate_swap_fees(amt(10_000)).unwrap();
        assert_eq!(
            split,
            FeeSplit {
                trading_fee: amt(30),
                protocol_fee: amt(5),
                lp_fee: amt(25)
            }
        );
    }

    #[test]
    fn split_at_token_scale() {
        // 10,000 tokens in: 30 tokens fee, a sixth of it to the protocol.
        let split = engine().calculate_swap_fees(amt(10_000 * E18)).unwrap();
        assert_eq!(split.trading_fee, amt(30 * E18));
        assert_eq!(split.protocol_fee, amt(30 * E18 * 1_667 / 10_000));
        assert_eq!(split.trading_fee, split.protocol_fee + split.lp_fee);
    }

    #[test]
    fn disabled_fees_split_to_zero() {
        let mut fe = engine();
        fe.set_fees_enabled(false);
        assert!(fe.calculate_swap_fees(amt(10_000)).unwrap().is_zero());
    }

    #[test]
    fn process_accumulates_on_input_side() {
        let mut fe = engine();
        let split = fe.calculate_swap_fees(amt(10_000)).unwrap();
        fe.process_swap_fees(pool(1), PoolSide::B, &split, Timestamp::from_secs(7))
            .unwrap();
        fe.process_swap_fees(pool(1), PoolSide::B, &split, Timestamp::from_secs(8))
            .unwrap();

        let acc = fe.accumulated(pool(1));
        assert_eq!(acc.token_a, Amount::ZERO);
        assert_eq!(acc.token_b, amt(10));

        let stats = fe.stats(pool(1));
        assert_eq!(stats.trading_fees_b, amt(60));
        assert_eq!(stats.protocol_fees_b, amt(10));
        assert_eq!(stats.fee_paying_swaps, 2);
        assert_eq!(stats.last_fee_at, Some(Timestamp::from_secs(8)));
    }

    #[test]
    fn zero_fee_is_noop() {
        let mut fe = engine();
        fe.process_swap_fees(pool(1), PoolSide::A, &FeeSplit::default(), Timestamp::from_secs(1))
            .unwrap();
        assert_eq!(fe.stats(pool(1)), FeeStats::default());
        assert_eq!(fe.pools_with_fees(), 0);
    }

    #[test]
    fn overflow_leaves_counters_untouched() {
        let mut fe = engine();
        let big = FeeSplit {
            trading_fee: Amount::MAX,
            protocol_fee: Amount::MAX,
            lp_fee: Amount::ZERO,
        };
        fe.process_swap_fees(pool(1), PoolSide::A, &big, Timestamp::from_secs(1))
            .unwrap();
        let err = fe
            .process_swap_fees(pool(1), PoolSide::A, &big, Timestamp::from_secs(2))
            .unwrap_err();
        assert!(matches!(err, PadswapError::Overflow(_)));
        assert_eq!(fe.stats(pool(1)).fee_paying_swaps, 1);
    }

    #[test]
    fn collection_zeroes_counters() {
        let mut fe = engine();
        let split = fe.calculate_swap_fees(amt(10_000)).unwrap();
        fe.process_swap_fees(pool(1), PoolSide::A, &split, Timestamp::from_secs(1))
            .unwrap();

        assert_eq!(fe.pending_collection(pool(1)).unwrap().token_a, amt(5));
        assert_eq!(fe.commit_collection(pool(1)).token_a, amt(5));
        assert!(matches!(
            fe.pending_collection(pool(1)),
            Err(PadswapError::NoFeesToCollect(_))
        ));
        // Stats survive collection.
        assert_eq!(fe.stats(pool(1)).protocol_fees_a, amt(5));
    }

    #[test]
    fn plan_skips_empty_and_duplicate_pools() {
        let mut fe = engine();
        let split = fe.calculate_swap_fees(amt(10_000)).unwrap();
        fe.process_swap_fees(pool(1), PoolSide::A, &split, Timestamp::from_secs(1))
            .unwrap();
        let (due, skipped) = fe.plan_collection(&[pool(1), pool(2), pool(1)]);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].0, pool(1));
        assert_eq!(skipped, vec![pool(2), pool(1)]);
    }

    #[test]
    fn set_config_keeps_old_on_error() {
        let mut fe = engine();
        let bad = FeeConfig::new(30, 3_001, Address::from_low_u64(9));
        assert!(fe.set_config(bad).is_err());
        assert_eq!(fe.config().protocol_fee_bps, 1_667);
    }
}
