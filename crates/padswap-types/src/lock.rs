//! # LiquidityLock: time-locked LP for launchpad projects
//!
//! One record per (pool, owner). The launch authority creates it when a
//! project's initial liquidity is seeded; it guards the owner's LP until
//! `unlock_time`.
//!
//! ## State Machine
//!
//! ```text
//!   ┌─────────┐  create   ┌────────┐  expiry seen on withdraw  ┌──────────┐
//!   │ NO LOCK ├──────────▶│ ACTIVE ├──────────────────────────▶│ INACTIVE │
//!   └─────────┘           └───┬────┘   or manual unlock        └──────────┘
//!                             │ create again (overwrites)
//!                             ▼
//!                          ACTIVE
//! ```
//!
//! Expiry is lazy: nothing happens at `unlock_time` itself. The first
//! withdrawal check (or manual unlock) at or after it flips the record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Address, Amount, PoolId, ProjectId, Timestamp};

/// Observable lifecycle state of a (pool, owner) lock slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockState {
    /// No record has ever been created.
    NoLock,
    /// LP is locked until `unlock_time` (or until expiry is observed).
    Active,
    /// Unlocked, either lazily on withdrawal or manually.
    Inactive,
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLock => write!(f, "NO_LOCK"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Inactive => write!(f, "INACTIVE"),
        }
    }
}

/// A time lock over part of an owner's LP balance in one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityLock {
    pub pool: PoolId,
    pub project_owner: Address,
    pub project_id: ProjectId,
    pub unlock_time: Timestamp,
    /// Zeroed when the lock flips to inactive.
    pub locked_lp_amount: Amount,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl LiquidityLock {
    /// Whether `now` is at or past the unlock time.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.unlock_time
    }

    #[must_use]
    pub fn state(&self) -> LockState {
        if self.is_active {
            LockState::Active
        } else {
            LockState::Inactive
        }
    }

    /// Flip to inactive and release the locked amount. Returns the amount
    /// that was locked.
    pub fn deactivate(&mut self) -> Amount {
        self.is_active = false;
        std::mem::take(&mut self.locked_lp_amount)
    }
}
