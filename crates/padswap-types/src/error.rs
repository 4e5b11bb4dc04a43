//! Error types for the Padswap AMM engine.
//!
//! All errors use the `PS_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Caller input errors
//! - 2xx: Math / pool invariant errors
//! - 3xx: Fee errors
//! - 4xx: Liquidity lock errors
//! - 5xx: LP accounting errors
//! - 6xx: Collaborator (token / LP ledger) errors
//! - 8xx: Execution safety errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{Address, Amount, PairKey, PoolId, Timestamp};

/// Central error enum for all Padswap operations.
///
/// Every variant aborts the whole operation: no partial state change is
/// ever committed alongside an error.
#[derive(Debug, Error)]
pub enum PadswapError {
    // =================================================================
    // Caller Input Errors (1xx)
    // =================================================================
    /// An amount that must be positive was zero.
    #[error("PS_ERR_100: Amount must be non-zero")]
    ZeroAmount,

    /// The two tokens do not form a valid pair (identical or null).
    #[error("PS_ERR_101: Invalid pair: {reason}")]
    InvalidPair { reason: String },

    /// A token address is unusable for the requested operation.
    #[error("PS_ERR_102: Invalid token address: {reason}")]
    InvalidTokenAddress { reason: String },

    /// The recipient is the null address.
    #[error("PS_ERR_103: Invalid recipient: {0}")]
    InvalidRecipient(Address),

    /// The caller-supplied deadline has already passed.
    #[error("PS_ERR_104: Deadline expired: deadline {deadline}, now {now}")]
    DeadlineExpired { deadline: Timestamp, now: Timestamp },

    /// An output (or optimal input) fell below the caller's minimum.
    #[error("PS_ERR_105: Slippage too high on {what}: minimum {minimum}, got {actual}")]
    SlippageTooHigh {
        what: &'static str,
        minimum: Amount,
        actual: Amount,
    },

    /// No pool exists for this pair.
    #[error("PS_ERR_106: Pool not found: {0}")]
    PoolNotFound(PairKey),

    /// A pool already exists for this pair.
    #[error("PS_ERR_107: Pool already exists: {0}")]
    PoolAlreadyExists(PairKey),

    /// Only the launch authority may open a pool for a registered project token.
    #[error("PS_ERR_108: Unauthorized pool creation by {caller} for project token {token}")]
    UnauthorizedPoolCreation { caller: Address, token: Address },

    /// The caller lacks the privilege required for this operation.
    #[error("PS_ERR_109: Unauthorized: {reason}")]
    Unauthorized { reason: String },

    // =================================================================
    // Math / Invariant Errors (2xx)
    // =================================================================
    /// Division by zero in pair math.
    #[error("PS_ERR_200: Division by zero")]
    DivisionByZero,

    /// An intermediate or final value exceeded 256 bits.
    #[error("PS_ERR_201: Arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// A subtraction would have gone below zero.
    #[error("PS_ERR_202: Arithmetic underflow: {0}")]
    Underflow(&'static str),

    /// The pool has no (or not enough) reserves for the request.
    #[error("PS_ERR_203: Insufficient liquidity")]
    InsufficientLiquidity,

    /// A deposit would mint zero LP shares.
    #[error("PS_ERR_204: Zero liquidity minted")]
    ZeroLiquidity,

    /// A swap or withdrawal would pay out nothing.
    #[error("PS_ERR_205: Insufficient output amount")]
    InsufficientOutputAmount,

    // =================================================================
    // Fee Errors (3xx)
    // =================================================================
    /// Fee configuration outside the permitted bounds.
    #[error("PS_ERR_300: Invalid fee configuration: {reason}")]
    InvalidFeeConfiguration { reason: String },

    /// Both protocol-fee counters of the pool are zero.
    #[error("PS_ERR_301: No protocol fees to collect for {0}")]
    NoFeesToCollect(PoolId),

    // =================================================================
    // Liquidity Lock Errors (4xx)
    // =================================================================
    /// Lock parameters are invalid, or there is no active lock to act on.
    #[error("PS_ERR_400: Invalid lock data: {reason}")]
    InvalidLockData { reason: String },

    /// The withdrawal would dip into LP that is still time-locked.
    #[error(
        "PS_ERR_401: Liquidity is locked until {unlock_time}: requested {requested}, withdrawable {withdrawable}"
    )]
    LiquidityIsLocked {
        requested: Amount,
        withdrawable: Amount,
        unlock_time: Timestamp,
    },

    // =================================================================
    // LP Accounting Errors (5xx)
    // =================================================================
    /// The holder does not own enough LP shares.
    #[error("PS_ERR_500: Insufficient LP balance: need {needed}, have {available}")]
    InsufficientLpBalance { needed: Amount, available: Amount },

    /// Cached LP supply diverged from the authoritative LP ledger.
    #[error("PS_ERR_501: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // Collaborator Errors (6xx)
    // =================================================================
    /// A token transfer was rejected by the token collaborator.
    #[error("PS_ERR_600: Token transfer failed: {reason}")]
    TransferFailed { reason: String },

    /// The LP ledger rejected a mint or burn.
    #[error("PS_ERR_601: LP ledger operation failed: {reason}")]
    LedgerFailed { reason: String },

    /// A compensating action could not undo an earlier collaborator effect.
    #[error("PS_ERR_602: Rollback failed: {reason}")]
    RollbackFailed { reason: String },

    // =================================================================
    // Execution Safety Errors (8xx)
    // =================================================================
    /// A state-mutating entry point was re-entered mid-operation.
    #[error("PS_ERR_800: Re-entrant call rejected")]
    ReentrantCall,

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("PS_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("PS_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid JSON, missing fields, bad values).
    #[error("PS_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, PadswapError>;

impl From<serde_json::Error> for PadswapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl PadswapError {
    /// Whether this error came from a collaborator rather than from the
    /// caller's input or the engine's own invariants.
    #[must_use]
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            Self::TransferFailed { .. } | Self::LedgerFailed { .. } | Self::RollbackFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = PadswapError::ZeroAmount;
        let msg = format!("{err}");
        assert!(msg.starts_with("PS_ERR_100"), "Got: {msg}");
    }

    #[test]
    fn deadline_display_has_both_times() {
        let err = PadswapError::DeadlineExpired {
            deadline: Timestamp::from_secs(100),
            now: Timestamp::from_secs(150),
        };
        let msg = format!("{err}");
        assert!(msg.contains("PS_ERR_104"));
        assert!(msg.contains("100"));
        assert!(msg.contains("150"));
    }

    #[test]
    fn locked_display() {
        let err = PadswapError::LiquidityIsLocked {
            requested: Amount::from(500u64),
            withdrawable: Amount::from(200u64),
            unlock_time: Timestamp::from_secs(1_000),
        };
        let msg = format!("{err}");
        assert!(msg.contains("PS_ERR_401"));
        assert!(msg.contains("500"));
        assert!(msg.contains("200"));
    }

    #[test]
    fn collaborator_classification() {
        assert!(PadswapError::TransferFailed { reason: "x".into() }.is_collaborator_failure());
        assert!(!PadswapError::ZeroAmount.is_collaborator_failure());
    }

    #[test]
    fn all_errors_have_ps_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(PadswapError::DivisionByZero),
            Box::new(PadswapError::Overflow("mul")),
            Box::new(PadswapError::ReentrantCall),
            Box::new(PadswapError::Internal("test".into())),
            Box::new(PadswapError::InsufficientLpBalance {
                needed: Amount::from(2u64),
                available: Amount::from(1u64),
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("PS_ERR_"),
                "Error missing PS_ERR_ prefix: {msg}"
            );
        }
    }

    #[test]
    fn serde_json_error_converts() {
        let bad: std::result::Result<u32, _> = serde_json::from_str("not json");
        let err: PadswapError = bad.unwrap_err().into();
        assert!(matches!(err, PadswapError::Serialization(_)));
    }
}
