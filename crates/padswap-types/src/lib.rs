//! # padswap-types
//!
//! Shared types, errors, and configuration for the **Padswap** AMM engine.
//!
//! This crate is the leaf dependency of the workspace: every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`PairKey`], [`PoolId`], [`ProjectId`], [`Timestamp`]
//! - **Pool model**: [`Pool`], [`PoolSide`], [`PoolView`], [`TwapData`], [`Amount`] (a 256-bit [`U256`])
//! - **Fee model**: [`FeeConfig`], [`FeeSplit`], [`AccumulatedFees`], [`FeeStats`], [`CollectedFees`]
//! - **Lock model**: [`LiquidityLock`], [`LockState`]
//! - **Earnings model**: [`LpSnapshot`], [`UnrealizedEarnings`], [`RealizedEarnings`]
//! - **Events**: [`AmmEvent`], [`EventRecord`]
//! - **Configuration**: [`AmmConfig`]
//! - **Errors**: [`PadswapError`] with `PS_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod fee;
pub mod ids;
pub mod lock;
pub mod pool;
pub mod snapshot;

// Re-export all primary types at crate root for ergonomic imports:
//   use padswap_types::{Pool, PairKey, FeeConfig, ...};

pub use config::*;
pub use error::*;
pub use event::*;
pub use fee::*;
pub use ids::*;
pub use lock::*;
pub use pool::*;
pub use snapshot::*;

// Constants are accessed via `padswap_types::constants::FOO`
// (not re-exported to avoid name collisions).
