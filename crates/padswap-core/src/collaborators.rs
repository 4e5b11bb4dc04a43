//! Collaborator seams.
//!
//! The AMM core owns no token or LP balances of its own. It drives three
//! external collaborators through these traits:
//!
//! - [`TokenLedger`]: moves ERC-20-style tokens. Pooled tokens sit in the
//!   engine's vault account at this ledger.
//! - [`LpLedger`]: authoritative LP share balances and supply, per pair.
//! - [`ProjectRegistry`]: the launchpad. Says which tokens are protected
//!   project tokens and who the launch authority is.
//!
//! Any `Err` from a collaborator aborts the whole operation.

use padswap_types::{Address, Amount, PairKey, Result};

/// Token transfer collaborator.
pub trait TokenLedger {
    /// Balance of `holder` in `token`.
    fn balance_of(&self, token: Address, holder: Address) -> Amount;

    /// Move `amount` of `token` out of `from` (the engine's own account).
    ///
    /// # Errors
    /// `TransferFailed` if the ledger rejects the transfer.
    fn transfer(&mut self, token: Address, from: Address, to: Address, amount: Amount)
    -> Result<()>;

    /// Pull `amount` of `token` from `owner` into `to` on the owner's
    /// behalf.
    ///
    /// # Errors
    /// `TransferFailed` if the ledger rejects the transfer.
    fn transfer_from(
        &mut self,
        token: Address,
        owner: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()>;
}

/// LP share ledger, keyed by canonical pair.
pub trait LpLedger {
    /// # Errors
    /// `LedgerFailed` if the ledger rejects the mint.
    fn mint(&mut self, pair: &PairKey, to: Address, amount: Amount) -> Result<()>;

    /// # Errors
    /// `InsufficientLpBalance` or `LedgerFailed`.
    fn burn(&mut self, pair: &PairKey, from: Address, amount: Amount) -> Result<()>;

    fn balance_of(&self, pair: &PairKey, holder: Address) -> Amount;

    fn total_supply(&self, pair: &PairKey) -> Amount;
}

/// Launchpad registry.
pub trait ProjectRegistry {
    /// Whether `token` belongs to a launchpad project.
    fn is_project_token(&self, token: Address) -> bool;

    /// The only account allowed to open pools for project tokens and to
    /// create liquidity locks.
    fn launch_authority(&self) -> Address;
}
