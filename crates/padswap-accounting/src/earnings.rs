//! LP earnings tracking.
//!
//! Every deposit appends an [`LpSnapshot`] to the provider's per-pool
//! history. Two views are derived from it:
//!
//! - **Unrealized**: the value the provider's whole current balance
//!   would withdraw now, against the value of every recorded deposit.
//! - **Realized**: on withdrawal, the removed LP is matched against the
//!   deposits oldest-first (FIFO). The original value consumed is
//!   subtracted from what the withdrawal actually paid.
//!
//! Snapshots are never mutated or pruned. FIFO progress is a separate
//! `consumed_lp` cursor that counts LP units already matched.

use std::collections::HashMap;

use padswap_pairmath::mul_div;
use padswap_types::{
    Address, Amount, LpSnapshot, PadswapError, PoolId, PoolView, RealizedEarnings, Result,
    Timestamp, U256, UnrealizedEarnings,
    constants::{BPS_DENOMINATOR, SECONDS_PER_YEAR},
};

#[derive(Debug, Clone, Default)]
struct Position {
    snapshots: Vec<LpSnapshot>,
    consumed_lp: Amount,
    realized: RealizedEarnings,
}

/// Result of matching one withdrawal against the deposit history.
///
/// Produced by [`EarningsTracker::preview_realization`]; nothing changes
/// until it is passed to [`EarningsTracker::commit_realization`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealizationPlan {
    pub user: Address,
    pub pool: PoolId,
    pub lp_removed: Amount,
    /// Original deposit value of the removed LP, per token.
    pub original_a: Amount,
    pub original_b: Amount,
    /// Earnings of this withdrawal, floored at zero per token.
    pub earnings_a: Amount,
    pub earnings_b: Amount,
    /// LP units matched against recorded snapshots.
    pub covered_lp: Amount,
    consumed_lp_after: Amount,
    realized_after: RealizedEarnings,
}

/// Per (user, pool) deposit histories and realized earnings.
#[derive(Debug, Clone, Default)]
pub struct EarningsTracker {
    positions: HashMap<(Address, PoolId), Position>,
}

impl EarningsTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
        }
    }

    /// Append a deposit snapshot. `state` is the pool right after the
    /// deposit (post-mint supply).
    pub fn record_snapshot(
        &mut self,
        user: Address,
        pool: PoolId,
        lp_amount: Amount,
        state: PoolView,
        now: Timestamp,
    ) {
        let position = self.positions.entry((user, pool)).or_default();
        position.snapshots.push(LpSnapshot {
            reserve_a: state.reserve_a,
            reserve_b: state.reserve_b,
            lp_amount,
            timestamp: now,
            total_lp_supply: state.total_lp_supply,
        });
        tracing::debug!(
            user = %user,
            pool = %pool,
            lp_amount = %lp_amount,
            snapshots = position.snapshots.len(),
            "LP snapshot recorded"
        );
    }

    #[must_use]
    pub fn snapshots(&self, user: Address, pool: PoolId) -> &[LpSnapshot] {
        self.positions
            .get(&(user, pool))
            .map(|p| p.snapshots.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn snapshot_count(&self, user: Address, pool: PoolId) -> usize {
        self.snapshots(user, pool).len()
    }

    /// LP units already matched by earlier withdrawals.
    #[must_use]
    pub fn consumed_lp(&self, user: Address, pool: PoolId) -> Amount {
        self.positions
            .get(&(user, pool))
            .map_or(Amount::ZERO, |p| p.consumed_lp)
    }

    #[must_use]
    pub fn realized(&self, user: Address, pool: PoolId) -> RealizedEarnings {
        self.positions
            .get(&(user, pool))
            .map_or_else(RealizedEarnings::default, |p| p.realized)
    }

    /// Mark-to-market earnings of `balance` LP at the pool state `current`.
    ///
    /// Without snapshots the whole balance counts as principal, so the
    /// report shows zero earnings. With snapshots, deposited value sums
    /// over all of them.
    ///
    /// # Errors
    /// `Overflow` / `DivisionByZero` from the valuation math.
    pub fn unrealized(
        &self,
        user: Address,
        pool: PoolId,
        balance: Amount,
        current: PoolView,
        now: Timestamp,
    ) -> Result<UnrealizedEarnings> {
        let (current_a, current_b) = if current.total_lp_supply.is_zero() {
            (Amount::ZERO, Amount::ZERO)
        } else {
            (
                mul_div(balance, current.reserve_a, current.total_lp_supply)?,
                mul_div(balance, current.reserve_b, current.total_lp_supply)?,
            )
        };

        let snapshots = self.snapshots(user, pool);
        let Some(oldest) = snapshots.first() else {
            return Ok(UnrealizedEarnings {
                deposited_a: current_a,
                deposited_b: current_b,
                current_a,
                current_b,
                ..UnrealizedEarnings::default()
            });
        };

        let mut deposited_a = Amount::ZERO;
        let mut deposited_b = Amount::ZERO;
        for snap in snapshots {
            deposited_a = deposited_a
                .checked_add(mul_div(snap.lp_amount, snap.reserve_a, snap.total_lp_supply)?)
                .ok_or(PadswapError::Overflow("deposited value"))?;
            deposited_b = deposited_b
                .checked_add(mul_div(snap.lp_amount, snap.reserve_b, snap.total_lp_supply)?)
                .ok_or(PadswapError::Overflow("deposited value"))?;
        }

        let earnings_a = current_a.saturating_sub(deposited_a);
        let earnings_b = current_b.saturating_sub(deposited_b);
        let since = oldest.timestamp;
        let apy_bps = annualized_bps(
            earnings_a.saturating_add(earnings_b),
            deposited_a.saturating_add(deposited_b),
            now.elapsed_since(since),
        )?;

        Ok(UnrealizedEarnings {
            deposited_a,
            deposited_b,
            current_a,
            current_b,
            earnings_a,
            earnings_b,
            apy_bps,
            since: Some(since),
        })
    }

    /// Match `lp_removed` against the unconsumed snapshots, oldest first.
    ///
    /// `withdrawn` is what the withdrawal pays out per token; it is the
    /// current value of the removed LP. LP beyond the recorded deposits
    /// is valued at that current value, so it adds no earnings.
    ///
    /// # Errors
    /// - `ZeroAmount` if `lp_removed == 0`
    /// - `Overflow` / `DivisionByZero` from the valuation math
    pub fn preview_realization(
        &self,
        user: Address,
        pool: PoolId,
        lp_removed: Amount,
        withdrawn: (Amount, Amount),
        now: Timestamp,
    ) -> Result<RealizationPlan> {
        if lp_removed.is_zero() {
            return Err(PadswapError::ZeroAmount);
        }
        let (withdrawn_a, withdrawn_b) = withdrawn;
        let consumed = self.consumed_lp(user, pool);

        let mut skip = consumed;
        let mut left = lp_removed;
        let mut covered = Amount::ZERO;
        let mut original_a = Amount::ZERO;
        let mut original_b = Amount::ZERO;

        for snap in self.snapshots(user, pool) {
            if left.is_zero() {
                break;
            }
            if skip >= snap.lp_amount {
                skip -= snap.lp_amount;
                continue;
            }
            let take = (snap.lp_amount - skip).min(left);
            skip = Amount::ZERO;
            let value_a = mul_div(take, snap.reserve_a, snap.total_lp_supply)?;
            let value_b = mul_div(take, snap.reserve_b, snap.total_lp_supply)?;
            original_a = original_a
                .checked_add(value_a)
                .ok_or(PadswapError::Overflow("consumed deposit value"))?;
            original_b = original_b
                .checked_add(value_b)
                .ok_or(PadswapError::Overflow("consumed deposit value"))?;
            covered += take;
            left -= take;
            tracing::debug!(
                user = %user,
                pool = %pool,
                taken = %take,
                snapshot_at = %snap.timestamp,
                value_a = %value_a,
                value_b = %value_b,
                "FIFO snapshot consumed"
            );
        }

        if !left.is_zero() {
            original_a = original_a
                .checked_add(mul_div(left, withdrawn_a, lp_removed)?)
                .ok_or(PadswapError::Overflow("consumed deposit value"))?;
            original_b = original_b
                .checked_add(mul_div(left, withdrawn_b, lp_removed)?)
                .ok_or(PadswapError::Overflow("consumed deposit value"))?;
        }

        let earnings_a = withdrawn_a.saturating_sub(original_a);
        let earnings_b = withdrawn_b.saturating_sub(original_b);

        let mut realized_after = self.realized(user, pool);
        realized_after.token_a = realized_after
            .token_a
            .checked_add(earnings_a)
            .ok_or(PadswapError::Overflow("realized earnings"))?;
        realized_after.token_b = realized_after
            .token_b
            .checked_add(earnings_b)
            .ok_or(PadswapError::Overflow("realized earnings"))?;
        realized_after.withdrawals = realized_after.withdrawals.saturating_add(1);
        realized_after.last_realized_at = Some(now);

        Ok(RealizationPlan {
            user,
            pool,
            lp_removed,
            original_a,
            original_b,
            earnings_a,
            earnings_b,
            covered_lp: covered,
            consumed_lp_after: consumed + covered,
            realized_after,
        })
    }

    /// Advance the FIFO cursor and add the plan's earnings to the
    /// cumulative counters.
    pub fn commit_realization(&mut self, plan: &RealizationPlan) {
        let position = self.positions.entry((plan.user, plan.pool)).or_default();
        position.consumed_lp = plan.consumed_lp_after;
        position.realized = plan.realized_after;
        tracing::debug!(
            user = %plan.user,
            pool = %plan.pool,
            earnings_a = %plan.earnings_a,
            earnings_b = %plan.earnings_b,
            consumed_lp = %plan.consumed_lp_after,
            "Earnings realized"
        );
    }

    /// Preview and commit in one step.
    ///
    /// # Errors
    /// See [`EarningsTracker::preview_realization`].
    pub fn realize_on_withdrawal(
        &mut self,
        user: Address,
        pool: PoolId,
        lp_removed: Amount,
        withdrawn: (Amount, Amount),
        now: Timestamp,
    ) -> Result<RealizationPlan> {
        let plan = self.preview_realization(user, pool, lp_removed, withdrawn, now)?;
        self.commit_realization(&plan);
        Ok(plan)
    }
}

/// `profit × year × 10000 / (value × elapsed)`, or zero without profit or
/// elapsed time.
fn annualized_bps(profit: Amount, value: Amount, elapsed_secs: u64) -> Result<U256> {
    if profit.is_zero() || value.is_zero() || elapsed_secs == 0 {
        return Ok(U256::ZERO);
    }
    let denominator = value
        .checked_mul(U256::from(elapsed_secs))
        .ok_or(PadswapError::Overflow("APY denominator"))?;
    let year_bps = U256::from(SECONDS_PER_YEAR)
        .checked_mul(BPS_DENOMINATOR)
        .ok_or(PadswapError::Overflow("APY scale"))?;
    mul_div(profit, year_bps, denominator)
}
