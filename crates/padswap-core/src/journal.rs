//! Operation journal: collaborator effects and their compensation.
//!
//! Each operation records every collaborator call that succeeded. If a
//! later step fails, [`Journal::compensate`] undoes the recorded effects
//! newest-first, so the collaborators end up where they started and the
//! engine's own state (never touched before commit) needs no undo.
//!
//! ```text
//!   effect                     compensation
//!   ─────────────────────────  ───────────────────────────────
//!   TokenPulled  owner→vault   transfer      vault→owner (received)
//!   TokenSent    vault→to      transfer_from to→vault    (amount)
//!   LpMinted     +to           burn          −to
//!   LpBurned     −from         mint          +from
//! ```

use std::fmt;

use padswap_types::{Address, Amount, PadswapError, PairKey};

use crate::collaborators::{LpLedger, TokenLedger};

/// One successful collaborator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    TokenPulled {
        token: Address,
        owner: Address,
        vault: Address,
        /// What actually arrived in the vault.
        received: Amount,
    },
    TokenSent {
        token: Address,
        vault: Address,
        to: Address,
        amount: Amount,
    },
    LpMinted {
        pair: PairKey,
        to: Address,
        amount: Amount,
    },
    LpBurned {
        pair: PairKey,
        from: Address,
        amount: Amount,
    },
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenPulled {
                token,
                owner,
                received,
                ..
            } => write!(f, "pull {received} {token} from {owner}"),
            Self::TokenSent {
                token, to, amount, ..
            } => write!(f, "send {amount} {token} to {to}"),
            Self::LpMinted { pair, to, amount } => write!(f, "mint {amount} LP {pair} to {to}"),
            Self::LpBurned { pair, from, amount } => {
                write!(f, "burn {amount} LP {pair} from {from}")
            }
        }
    }
}

/// Effects of the operation in flight, oldest first.
#[derive(Debug, Default)]
pub struct Journal {
    effects: Vec<Effect>,
}

impl Journal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Undo every recorded effect, newest first, and return the error to
    /// surface: `cause` if every compensation succeeded, otherwise
    /// `RollbackFailed`. Compensation continues past a failed step so as
    /// much as possible is restored.
    pub fn compensate<T, L>(self, tokens: &mut T, lp: &mut L, cause: PadswapError) -> PadswapError
    where
        T: TokenLedger + ?Sized,
        L: LpLedger + ?Sized,
    {
        if self.effects.is_empty() {
            return cause;
        }
        let mut failures = Vec::new();
        for effect in self.effects.iter().rev() {
            let outcome = match *effect {
                Effect::TokenPulled {
                    token,
                    owner,
                    vault,
                    received,
                } => tokens.transfer(token, vault, owner, received),
                Effect::TokenSent {
                    token,
                    vault,
                    to,
                    amount,
                } => tokens.transfer_from(token, to, vault, amount),
                Effect::LpMinted { pair, to, amount } => lp.burn(&pair, to, amount),
                Effect::LpBurned { pair, from, amount } => lp.mint(&pair, from, amount),
            };
            if let Err(err) = outcome {
                tracing::error!(effect = %effect, error = %err, "Compensation failed");
                failures.push(format!("{effect}: {err}"));
            }
        }

        if failures.is_empty() {
            tracing::warn!(
                effects = self.effects.len(),
                cause = %cause,
                "Operation rolled back"
            );
            cause
        } else {
            PadswapError::RollbackFailed {
                reason: format!("{cause}; could not undo {}", failures.join(", ")),
            }
        }
    }
}
