//! Hybrid auto-expiry liquidity locks.
//!
//! One [`LiquidityLock`] per (pool, owner). Expiry needs no keeper: the
//! first withdrawal check at or after `unlock_time` flips the record to
//! inactive and lets the full balance through. A manual unlock performs
//! the same flip ahead of time so the unlock event can surface on its own.
//!
//! Withdrawal checks come in two halves. [`LockManager::evaluate`] is a
//! read-only verdict; [`LockManager::apply_expiry`] performs the lazy flip.
//! [`LockManager::check_on_withdraw`] runs both.

use std::collections::HashMap;

use padswap_types::{
    Address, Amount, LiquidityLock, LockState, PadswapError, PoolId, ProjectId, Result, Timestamp,
};

/// Verdict of a withdrawal check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockDecision {
    /// No active lock applies.
    Unlocked,
    /// An active lock applies but the request fits in the unlocked part.
    WithinWithdrawable { withdrawable: Amount },
    /// The active lock has expired; it must be flipped before proceeding.
    Expired { released: Amount },
}

impl LockDecision {
    /// Whether committing this decision flips a lock to inactive.
    #[must_use]
    pub fn releases_lock(&self) -> bool {
        matches!(self, Self::Expired { .. })
    }
}

/// A lock that was just flipped from active to inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleasedLock {
    pub pool: PoolId,
    pub owner: Address,
    pub project_id: ProjectId,
    pub amount: Amount,
}

/// Lock records keyed by (pool, owner).
#[derive(Debug, Clone, Default)]
pub struct LockManager {
    locks: HashMap<(PoolId, Address), LiquidityLock>,
}

impl LockManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: HashMap::new(),
        }
    }

    /// Build a lock record without storing it.
    ///
    /// # Errors
    /// - `InvalidLockData` if `duration_secs == 0`
    /// - `ZeroAmount` if `amount` is zero
    /// - `Overflow` if `now + duration_secs` is not representable
    pub fn prepare(
        pool: PoolId,
        owner: Address,
        project_id: ProjectId,
        amount: Amount,
        duration_secs: u64,
        now: Timestamp,
    ) -> Result<LiquidityLock> {
        if duration_secs == 0 {
            return Err(PadswapError::InvalidLockData {
                reason: "lock duration must be non-zero".to_string(),
            });
        }
        if amount.is_zero() {
            return Err(PadswapError::ZeroAmount);
        }
        Ok(LiquidityLock {
            pool,
            project_owner: owner,
            project_id,
            unlock_time: now.checked_add_secs(duration_secs)?,
            locked_lp_amount: amount,
            is_active: true,
            created_at: now,
        })
    }

    /// Store a prepared lock, replacing any existing record for the same
    /// (pool, owner). Returns the replaced record.
    pub fn install(&mut self, lock: LiquidityLock) -> Option<LiquidityLock> {
        let key = (lock.pool, lock.project_owner);
        let replaced = self.locks.insert(key, lock);
        if let Some(old) = replaced.as_ref().filter(|old| old.is_active) {
            tracing::warn!(
                pool = %old.pool,
                owner = %old.project_owner,
                replaced_amount = %old.locked_lp_amount,
                replaced_unlock = %old.unlock_time,
                "Active liquidity lock overwritten"
            );
        }
        replaced
    }

    /// Create a lock: `unlock_time = now + duration_secs`, active.
    ///
    /// An existing record for (pool, owner) is overwritten unconditionally,
    /// even while still active.
    ///
    /// # Errors
    /// See [`LockManager::prepare`].
    pub fn create(
        &mut self,
        pool: PoolId,
        owner: Address,
        project_id: ProjectId,
        amount: Amount,
        duration_secs: u64,
        now: Timestamp,
    ) -> Result<LiquidityLock> {
        let lock = Self::prepare(pool, owner, project_id, amount, duration_secs, now)?;
        self.install(lock.clone());
        tracing::info!(
            pool = %pool,
            owner = %owner,
            project = %project_id,
            amount = %amount,
            unlock_time = %lock.unlock_time,
            "Liquidity locked"
        );
        Ok(lock)
    }

    #[must_use]
    pub fn lock(&self, pool: PoolId, owner: Address) -> Option<&LiquidityLock> {
        self.locks.get(&(pool, owner))
    }

    #[must_use]
    pub fn state(&self, pool: PoolId, owner: Address) -> LockState {
        self.lock(pool, owner)
            .map_or(LockState::NoLock, LiquidityLock::state)
    }

    /// LP of `balance` that could be withdrawn at `now`.
    #[must_use]
    pub fn withdrawable(
        &self,
        pool: PoolId,
        owner: Address,
        balance: Amount,
        now: Timestamp,
    ) -> Amount {
        match self.lock(pool, owner) {
            Some(lock) if lock.is_active && !lock.is_expired(now) => {
                balance.saturating_sub(lock.locked_lp_amount)
            }
            _ => balance,
        }
    }

    /// Decide whether `owner` may withdraw `requested` out of `balance`.
    ///
    /// # Errors
    /// Returns `LiquidityIsLocked` if an unexpired lock covers part of the
    /// request.
    pub fn evaluate(
        &self,
        pool: PoolId,
        owner: Address,
        requested: Amount,
        balance: Amount,
        now: Timestamp,
    ) -> Result<LockDecision> {
        let Some(lock) = self.lock(pool, owner).filter(|l| l.is_active) else {
            return Ok(LockDecision::Unlocked);
        };
        if lock.is_expired(now) {
            return Ok(LockDecision::Expired {
                released: lock.locked_lp_amount,
            });
        }
        let withdrawable = balance.saturating_sub(lock.locked_lp_amount);
        if requested > withdrawable {
            tracing::warn!(
                pool = %pool,
                owner = %owner,
                requested = %requested,
                withdrawable = %withdrawable,
                unlock_time = %lock.unlock_time,
                "Withdrawal blocked by liquidity lock"
            );
            return Err(PadswapError::LiquidityIsLocked {
                requested,
                withdrawable,
                unlock_time: lock.unlock_time,
            });
        }
        Ok(LockDecision::WithinWithdrawable { withdrawable })
    }

    /// Flip an active, expired lock to inactive. Returns `None` if there
    /// is nothing to flip, so repeated calls are no-ops.
    pub fn apply_expiry(
        &mut self,
        pool: PoolId,
        owner: Address,
        now: Timestamp,
    ) -> Option<ReleasedLock> {
        let lock = self
            .locks
            .get_mut(&(pool, owner))
            .filter(|l| l.is_active && l.is_expired(now))?;
        let amount = lock.deactivate();
        tracing::info!(
            pool = %pool,
            owner = %owner,
            amount = %amount,
            "Liquidity lock expired"
        );
        Some(ReleasedLock {
            pool,
            owner,
            project_id: lock.project_id,
            amount,
        })
    }

    /// Withdrawal guard: evaluate, then lazily flip an expired lock.
    /// Returns the lock released by this call, if any.
    ///
    /// # Errors
    /// Returns `LiquidityIsLocked`; no state changes in that case.
    pub fn check_on_withdraw(
        &mut self,
        pool: PoolId,
        owner: Address,
        requested: Amount,
        balance: Amount,
        now: Timestamp,
    ) -> Result<Option<ReleasedLock>> {
        let decision = self.evaluate(pool, owner, requested, balance, now)?;
        if decision.releases_lock() {
            return Ok(self.apply_expiry(pool, owner, now));
        }
        Ok(None)
    }

    /// Pre-check for [`LockManager::manual_unlock`].
    ///
    /// # Errors
    /// - `InvalidLockData` if there is no active lock
    /// - `LiquidityIsLocked` if `now < unlock_time`
    pub fn check_manual_unlock(&self, pool: PoolId, owner: Address, now: Timestamp) -> Result<()> {
        let Some(lock) = self.lock(pool, owner).filter(|l| l.is_active) else {
            return Err(PadswapError::InvalidLockData {
                reason: format!("no active lock for {owner} in {pool}"),
            });
        };
        if !lock.is_expired(now) {
            return Err(PadswapError::LiquidityIsLocked {
                requested: lock.locked_lp_amount,
                withdrawable: Amount::ZERO,
                unlock_time: lock.unlock_time,
            });
        }
        Ok(())
    }

    /// Explicitly unlock an expired lock.
    ///
    /// # Errors
    /// See [`LockManager::check_manual_unlock`].
    pub fn manual_unlock(
        &mut self,
        pool: PoolId,
        owner: Address,
        now: Timestamp,
    ) -> Result<ReleasedLock> {
        self.check_manual_unlock(pool, owner, now)?;
        self.apply_expiry(pool, owner, now)
            .ok_or_else(|| PadswapError::Internal("checked lock did not release".to_string()))
    }

    /// Number of locks still active (expired or not).
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.locks.values().filter(|l| l.is_active).count()
    }
}
