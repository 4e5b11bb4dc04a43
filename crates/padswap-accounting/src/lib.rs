//! # padswap-accounting
//!
//! **Stateful bookkeeping** for the Padswap AMM, free of collaborators:
//!
//! - [`FeeEngine`]: fee configuration, per-swap fee split, per-pool
//!   protocol fee counters and lifetime statistics
//! - [`LockManager`]: per (pool, owner) time locks with lazy expiry on
//!   withdrawal
//! - [`EarningsTracker`]: per (user, pool) deposit snapshots, unrealized
//!   earnings, and FIFO realization on withdrawal
//!
//! Each component owns only its own maps. Mutations that the orchestrator
//! must stage are split into a fallible preview and an infallible commit.

pub mod earnings;
pub mod fee_engine;
pub mod lock_manager;

pub use earnings::{EarningsTracker, RealizationPlan};
pub use fee_engine::{CollectionReport, FeeEngine, SwapFeeUpdate};
pub use lock_manager::{LockDecision, LockManager, ReleasedLock};
