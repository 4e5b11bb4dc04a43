//! In-memory collaborators for simulations and tests.
//!
//! [`MemoryTokenLedger`] can inject failures, apply a per-token transfer
//! tax (fee-on-transfer tokens), and run a hook after every successful
//! transfer, which is how tests model a token that calls back into the
//! engine mid-operation.

use std::collections::{HashMap, HashSet};

use padswap_types::{Address, Amount, PadswapError, PairKey, Result, constants::BPS_DENOMINATOR};

use crate::collaborators::{LpLedger, ProjectRegistry, TokenLedger};

/// A completed token movement, as seen by a transfer hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRecord {
    pub token: Address,
    pub from: Address,
    pub to: Address,
    /// Debited from `from`.
    pub amount: Amount,
    /// Credited to `to` after any transfer tax.
    pub received: Amount,
}

/// Callback run after each successful transfer.
pub type TransferHook = Box<dyn FnMut(&TransferRecord) + Send>;

/// Multi-token balance book.
#[derive(Default)]
pub struct MemoryTokenLedger {
    /// Per-(token, holder) balances.
    balances: HashMap<(Address, Address), Amount>,
    /// Transfer tax per token, in bps. Taxed units are burned.
    tax_bps: HashMap<Address, u32>,
    failing_tokens: HashSet<Address>,
    /// Number of transfers to let through before failing one.
    fail_after: Option<usize>,
    transfer_count: u64,
    hook: Option<TransferHook>,
}

impl MemoryTokenLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `token` to `holder` out of thin air.
    pub fn mint(&mut self, token: Address, holder: Address, amount: Amount) {
        let entry = self.balances.entry((token, holder)).or_default();
        *entry = entry.saturating_add(amount);
    }

    /// Charge `bps` on every transfer of `token`.
    pub fn set_transfer_tax(&mut self, token: Address, bps: u32) {
        if bps == 0 {
            self.tax_bps.remove(&token);
        } else {
            self.tax_bps.insert(token, bps);
        }
    }

    /// Reject every transfer of `token` until cleared.
    pub fn fail_token(&mut self, token: Address) {
        self.failing_tokens.insert(token);
    }

    /// Let `successes` more transfers through, then fail exactly one.
    pub fn fail_after(&mut self, successes: usize) {
        self.fail_after = Some(successes);
    }

    pub fn clear_failures(&mut self) {
        self.failing_tokens.clear();
        self.fail_after = None;
    }

    pub fn set_hook(&mut self, hook: TransferHook) {
        self.hook = Some(hook);
    }

    pub fn clear_hook(&mut self) {
        self.hook = None;
    }

    /// Successful transfers so far.
    #[must_use]
    pub fn transfer_count(&self) -> u64 {
        self.transfer_count
    }

    /// Sum of all balances in `token`.
    #[must_use]
    pub fn total_supply(&self, token: Address) -> Amount {
        self.balances
            .iter()
            .filter(|((t, _), _)| *t == token)
            .map(|(_, amount)| *amount)
            .fold(Amount::ZERO, Amount::saturating_add)
    }

    fn check_injected_failure(&mut self, token: Address) -> Result<()> {
        if self.failing_tokens.contains(&token) {
            return Err(PadswapError::TransferFailed {
                reason: format!("token {token} rejects transfers"),
            });
        }
        match self.fail_after {
            Some(0) => {
                self.fail_after = None;
                Err(PadswapError::TransferFailed {
                    reason: "injected transfer failure".to_string(),
                })
            }
            Some(n) => {
                self.fail_after = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn move_tokens(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        self.check_injected_failure(token)?;

        let available = self.balance_of(token, from);
        if available < amount {
            return Err(PadswapError::TransferFailed {
                reason: format!("{from} holds {available} of {token}, needs {amount}"),
            });
        }
        let tax = self.tax_bps.get(&token).map_or(Amount::ZERO, |&bps| {
            amount.saturating_mul(Amount::from(bps)) / BPS_DENOMINATOR
        });
        let received = amount - tax;

        self.balances.insert((token, from), available - amount);
        let entry = self.balances.entry((token, to)).or_default();
        *entry = entry.saturating_add(received);
        self.transfer_count += 1;

        if let Some(hook) = self.hook.as_mut() {
            hook(&TransferRecord {
                token,
                from,
                to,
                amount,
                received,
            });
        }
        Ok(())
    }
}

impl TokenLedger for MemoryTokenLedger {
    fn balance_of(&self, token: Address, holder: Address) -> Amount {
        self.balances.get(&(token, holder)).copied().unwrap_or_default()
    }

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        self.move_tokens(token, from, to, amount)
    }

    fn transfer_from(
        &mut self,
        token: Address,
        owner: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        self.move_tokens(token, owner, to, amount)
    }
}

/// LP share book, one supply per pair.
#[derive(Debug, Default)]
pub struct MemoryLpLedger {
    balances: HashMap<(PairKey, Address), Amount>,
    supply: HashMap<PairKey, Amount>,
    fail_mints: bool,
    fail_burns: bool,
}

impl MemoryLpLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_mints(&mut self, fail: bool) {
        self.fail_mints = fail;
    }

    pub fn set_fail_burns(&mut self, fail: bool) {
        self.fail_burns = fail;
    }

    /// Move LP shares between holders (supply unchanged).
    ///
    /// # Errors
    /// `InsufficientLpBalance` if `from` holds less than `amount`.
    pub fn transfer(
        &mut self,
        pair: &PairKey,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        let available = self.balance_of(pair, from);
        if available < amount {
            return Err(PadswapError::InsufficientLpBalance {
                needed: amount,
                available,
            });
        }
        self.balances.insert((*pair, from), available - amount);
        *self.balances.entry((*pair, to)).or_default() += amount;
        Ok(())
    }
}

impl LpLedger for MemoryLpLedger {
    fn mint(&mut self, pair: &PairKey, to: Address, amount: Amount) -> Result<()> {
        if self.fail_mints {
            return Err(PadswapError::LedgerFailed {
                reason: format!("mint of {amount} LP for {pair} rejected"),
            });
        }
        let supply = self
            .total_supply(pair)
            .checked_add(amount)
            .ok_or(PadswapError::Overflow("LP supply"))?;
        self.supply.insert(*pair, supply);
        *self.balances.entry((*pair, to)).or_default() += amount;
        Ok(())
    }

    fn burn(&mut self, pair: &PairKey, from: Address, amount: Amount) -> Result<()> {
        if self.fail_burns {
            return Err(PadswapError::LedgerFailed {
                reason: format!("burn of {amount} LP for {pair} rejected"),
            });
        }
        let available = self.balance_of(pair, from);
        if available < amount {
            return Err(PadswapError::InsufficientLpBalance {
                needed: amount,
                available,
            });
        }
        self.balances.insert((*pair, from), available - amount);
        let supply = self.total_supply(pair);
        self.supply.insert(*pair, supply - amount);
        Ok(())
    }

    fn balance_of(&self, pair: &PairKey, holder: Address) -> Amount {
        self.balances.get(&(*pair, holder)).copied().unwrap_or_default()
    }

    fn total_supply(&self, pair: &PairKey) -> Amount {
        self.supply.get(pair).copied().unwrap_or_default()
    }
}

/// Fixed launch authority and a set of registered project tokens.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    authority: Address,
    project_tokens: HashSet<Address>,
}

impl StaticRegistry {
    #[must_use]
    pub fn new(authority: Address) -> Self {
        Self {
            authority,
            project_tokens: HashSet::new(),
        }
    }

    #[must_use]
    pub fn with_project_token(mut self, token: Address) -> Self {
        self.project_tokens.insert(token);
        self
    }

    pub fn register(&mut self, token: Address) {
        self.project_tokens.insert(token);
    }
}

impl ProjectRegistry for StaticRegistry {
    fn is_project_token(&self, token: Address) -> bool {
        self.project_tokens.contains(&token)
    }

    fn launch_authority(&self) -> Address {
        self.authority
    }
}
