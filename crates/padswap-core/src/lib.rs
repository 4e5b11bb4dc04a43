//! # padswap-core
//!
//! The **Padswap** AMM orchestrator: constant-product pools for a token
//! launchpad, driven through pluggable collaborators.
//!
//! - [`AmmCore`]: add/remove liquidity, swaps, protocol fee collection,
//!   liquidity locks, and every read-only query
//! - [`SharedAmm`]: thread-safe handle that rejects same-thread re-entry
//! - [`collaborators`]: the [`TokenLedger`], [`LpLedger`] and
//!   [`ProjectRegistry`] seams
//! - [`memory`]: in-memory collaborators with failure injection
//! - [`journal`]: compensation of collaborator effects on abort
//!
//! ## Operation Lifecycle
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────┐
//! │ PREPARE  │───▶│ EFFECTS  │───▶│ COMMIT   │
//! │ validate │    │ journaled│    │ state +  │
//! │ + math   │    │ transfers│    │ events   │
//! └──────────┘    └────┬─────┘    └──────────┘
//!                      │ error
//!                      ▼
//!                 compensate
//! ```
//!
//! ## Invariants
//!
//! 1. **All or nothing**: a failed operation leaves no engine state change
//!    and no event
//! 2. **k never shrinks** across a swap
//! 3. **Cached LP supply** equals the LP ledger's supply after every
//!    operation ([`AmmCore::verify_lp_supply`])
//! 4. **Canonical pools**: one pool per unordered token pair

pub mod amm;
pub mod collaborators;
pub mod journal;
pub mod memory;
pub mod params;
pub mod pool_store;
pub mod shared;

pub use amm::AmmCore;
pub use collaborators::{LpLedger, ProjectRegistry, TokenLedger};
pub use journal::{Effect, Journal};
pub use memory::{MemoryLpLedger, MemoryTokenLedger, StaticRegistry, TransferHook, TransferRecord};
pub use params::{
    AddLiquidityOutcome, AddLiquidityParams, LockParams, LockRequest, RemoveLiquidityOutcome,
    RemoveLiquidityParams, SwapOutcome, SwapParams,
};
pub use pool_store::PoolStore;
pub use shared::SharedAmm;
