//! Observable events for external indexers.
//!
//! Each event carries enough data to reconstruct pool history without
//! re-reading engine state. Events are emitted only by operations that
//! succeed; an aborted operation leaves no trace in the log.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Address, Amount, PoolId, ProjectId, Timestamp, U256};

/// An engine event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmmEvent {
    PoolCreated {
        pool: PoolId,
        token_a: Address,
        token_b: Address,
        creator: Address,
    },
    LiquidityAdded {
        pool: PoolId,
        provider: Address,
        to: Address,
        amount_a: Amount,
        amount_b: Amount,
        liquidity: Amount,
    },
    LiquidityRemoved {
        pool: PoolId,
        provider: Address,
        to: Address,
        amount_a: Amount,
        amount_b: Amount,
        liquidity: Amount,
    },
    Swap {
        pool: PoolId,
        sender: Address,
        to: Address,
        token_in: Address,
        token_out: Address,
        amount_in: Amount,
        amount_out: Amount,
        trading_fee: Amount,
        protocol_fee: Amount,
    },
    ReservesUpdated {
        pool: PoolId,
        reserve_a: Amount,
        reserve_b: Amount,
        price0_cumulative: U256,
        price1_cumulative: U256,
    },
    LiquidityLocked {
        pool: PoolId,
        owner: Address,
        project_id: ProjectId,
        amount: Amount,
        unlock_time: Timestamp,
    },
    LiquidityUnlocked {
        pool: PoolId,
        owner: Address,
        project_id: ProjectId,
        amount: Amount,
        /// True when the unlock happened lazily during a withdrawal.
        automatic: bool,
    },
    ProtocolFeesCollected {
        pool: PoolId,
        recipient: Address,
        amount_a: Amount,
        amount_b: Amount,
    },
    FeeConfigUpdated {
        trading_fee_bps: u32,
        protocol_fee_bps: u32,
        fee_recipient: Address,
        fees_enabled: bool,
    },
}

impl AmmEvent {
    /// Stable upper-case name of the event kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PoolCreated { .. } => "POOL_CREATED",
            Self::LiquidityAdded { .. } => "LIQUIDITY_ADDED",
            Self::LiquidityRemoved { .. } => "LIQUIDITY_REMOVED",
            Self::Swap { .. } => "SWAP",
            Self::ReservesUpdated { .. } => "RESERVES_UPDATED",
            Self::LiquidityLocked { .. } => "LIQUIDITY_LOCKED",
            Self::LiquidityUnlocked { .. } => "LIQUIDITY_UNLOCKED",
            Self::ProtocolFeesCollected { .. } => "PROTOCOL_FEES_COLLECTED",
            Self::FeeConfigUpdated { .. } => "FEE_CONFIG_UPDATED",
        }
    }

    /// The pool this event concerns, if any.
    #[must_use]
    pub fn pool(&self) -> Option<PoolId> {
        match self {
            Self::PoolCreated { pool, .. }
            | Self::LiquidityAdded { pool, .. }
            | Self::LiquidityRemoved { pool, .. }
            | Self::Swap { pool, .. }
            | Self::ReservesUpdated { pool, .. }
            | Self::LiquidityLocked { pool, .. }
            | Self::LiquidityUnlocked { pool, .. }
            | Self::ProtocolFeesCollected { pool, .. } => Some(*pool),
            Self::FeeConfigUpdated { .. } => None,
        }
    }
}

impl fmt::Display for AmmEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pool() {
            Some(pool) => write!(f, "{} {}", self.kind(), pool),
            None => write!(f, "{}", self.kind()),
        }
    }
}

/// An event with its position in the engine's append-only log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Strictly increasing across the lifetime of the engine.
    pub sequence: u64,
    pub timestamp: Timestamp,
    pub event: AmmEvent,
}
