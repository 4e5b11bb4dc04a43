//! Pool repository.
//!
//! Owns every [`Pool`] record, keyed by the deterministic [`PoolId`] of
//! its canonical pair and listed in creation order. Reserves change only
//! through [`PoolStore::prepare_update`] + [`PoolStore::commit`], which
//! also advance the TWAP accumulators from the *prior* reserves.

use std::collections::HashMap;

use padswap_pairmath::advance_twap;
use padswap_types::{
    AmmEvent, Amount, PairKey, PadswapError, Pool, PoolId, Result, Timestamp, U256,
};

#[derive(Debug, Clone, Default)]
pub struct PoolStore {
    pools: HashMap<PoolId, Pool>,
    /// Creation order.
    order: Vec<PoolId>,
}

impl PoolStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pools: HashMap::new(),
            order: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(&self, pair: &PairKey) -> Option<&Pool> {
        self.pools.get(&pair.pool_id())
    }

    #[must_use]
    pub fn get_by_id(&self, id: PoolId) -> Option<&Pool> {
        self.pools.get(&id)
    }

    /// # Errors
    /// Returns `PoolNotFound` if no pool exists for `pair`.
    pub fn require(&self, pair: &PairKey) -> Result<&Pool> {
        self.get(pair).ok_or(PadswapError::PoolNotFound(*pair))
    }

    #[must_use]
    pub fn contains(&self, pair: &PairKey) -> bool {
        self.pools.contains_key(&pair.pool_id())
    }

    /// All pools in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Pool> {
        self.order.iter().filter_map(|id| self.pools.get(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The record `pool` becomes after a reserve update at `now`.
    ///
    /// TWAP advances from the reserves currently in `pool`. `k_last` is
    /// zero if the new product does not fit in 256 bits.
    #[must_use]
    pub fn prepare_update(
        pool: &Pool,
        reserve_a: Amount,
        reserve_b: Amount,
        total_lp_supply: Amount,
        now: Timestamp,
    ) -> Pool {
        let twap = advance_twap(&pool.twap, pool.reserve_a, pool.reserve_b, now);
        Pool {
            reserve_a,
            reserve_b,
            total_lp_supply,
            k_last: reserve_a.checked_mul(reserve_b).unwrap_or(U256::ZERO),
            twap,
            ..pool.clone()
        }
    }

    /// Store an updated (or brand-new) pool record and return the
    /// `ReservesUpdated` event describing it.
    pub fn commit(&mut self, pool: Pool) -> AmmEvent {
        let event = AmmEvent::ReservesUpdated {
            pool: pool.id,
            reserve_a: pool.reserve_a,
            reserve_b: pool.reserve_b,
            price0_cumulative: pool.twap.price0_cumulative_last,
            price1_cumulative: pool.twap.price1_cumulative_last,
        };
        tracing::debug!(
            pool = %pool.id,
            reserve_a = %pool.reserve_a,
            reserve_b = %pool.reserve_b,
            lp_supply = %pool.total_lp_supply,
            "Reserves updated"
        );
        if self.pools.insert(pool.id, pool.clone()).is_none() {
            self.order.push(pool.id);
        }
        event
    }

    /// Prepare and commit in one step.
    ///
    /// # Errors
    /// Returns `PoolNotFound`; nothing changes in that case.
    pub fn update_reserves(
        &mut self,
        pair: &PairKey,
        reserve_a: Amount,
        reserve_b: Amount,
        total_lp_supply: Amount,
        now: Timestamp,
    ) -> Result<AmmEvent> {
        let next = Self::prepare_update(
            self.require(pair)?,
            reserve_a,
            reserve_b,
            total_lp_supply,
            now,
        );
        Ok(self.commit(next))
    }
}
