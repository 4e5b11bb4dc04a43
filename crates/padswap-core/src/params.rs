//! Request and outcome records for the orchestrator's entry points.
//!
//! Amounts in requests and outcomes follow the token order the caller
//! used (`token_a`/`token_b` as passed), not the canonical pair order.

use padswap_types::{Address, Amount, FeeSplit, PoolId, ProjectId, Timestamp};
use serde::{Deserialize, Serialize};

/// Deposit into a pool, creating it on first use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidityParams {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a_desired: Amount,
    pub amount_b_desired: Amount,
    pub amount_a_min: Amount,
    pub amount_b_min: Amount,
    /// Receives the minted LP shares.
    pub to: Address,
    /// The call fails if `now >= deadline`.
    pub deadline: Timestamp,
}

/// Burn LP shares for a pro-rata share of the reserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLiquidityParams {
    pub token_a: Address,
    pub token_b: Address,
    /// LP shares to burn from the caller.
    pub liquidity: Amount,
    pub amount_a_min: Amount,
    pub amount_b_min: Amount,
    pub to: Address,
    pub deadline: Timestamp,
}

/// Exact-input swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapParams {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: Amount,
    pub min_amount_out: Amount,
    pub to: Address,
    pub deadline: Timestamp,
}

/// Lock terms attached to a launch deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockParams {
    pub project_id: ProjectId,
    pub duration_secs: u64,
}

/// Stand-alone lock over LP an owner already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRequest {
    pub token_a: Address,
    pub token_b: Address,
    pub owner: Address,
    pub project_id: ProjectId,
    pub amount: Amount,
    pub duration_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidityOutcome {
    pub pool: PoolId,
    /// Received by the pool, in the caller's token order.
    pub amount_a: Amount,
    pub amount_b: Amount,
    pub liquidity: Amount,
    /// Whether this deposit created the pool.
    pub created: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLiquidityOutcome {
    pub pool: PoolId,
    /// Paid out, in the caller's token order.
    pub amount_a: Amount,
    pub amount_b: Amount,
    /// Earnings realized by this withdrawal, in the caller's token order.
    pub earnings_a: Amount,
    pub earnings_b: Amount,
    /// LP released by a lock that expired and was flipped during this call.
    pub unlocked: Option<Amount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOutcome {
    pub pool: PoolId,
    pub amount_in: Amount,
    pub amount_out: Amount,
    pub fees: FeeSplit,
}

/// Put a canonical-order pair of values into the caller's order, or
/// back again (the mapping is its own inverse).
pub(crate) fn orient<X>(flipped: bool, first: X, second: X) -> (X, X) {
    if flipped { (second, first) } else { (first, second) }
}
