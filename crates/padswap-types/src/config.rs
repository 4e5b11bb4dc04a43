//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::{Address, FeeConfig, PadswapError, Result};

/// Configuration for one Padswap engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmConfig {
    /// Account allowed to change fee configuration.
    pub admin: Address,
    /// Account that custodies pooled tokens at the token collaborator.
    pub vault: Address,
    /// Fee configuration in force at start-up.
    #[serde(default)]
    pub fee: FeeConfig,
}

impl AmmConfig {
    #[must_use]
    pub fn new(admin: Address, vault: Address, fee: FeeConfig) -> Self {
        Self { admin, vault, fee }
    }

    /// Parse a JSON configuration document and validate it.
    ///
    /// # Errors
    /// Returns `Serialization` for malformed JSON, or the validation error.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    /// Returns `Configuration` for a null admin or vault, or
    /// `InvalidFeeConfiguration` for bad fee bounds.
    pub fn validate(&self) -> Result<()> {
        if self.admin.is_zero() {
            return Err(PadswapError::Configuration(
                "admin must not be the null address".to_string(),
            ));
        }
        if self.vault.is_zero() {
            return Err(PadswapError::Configuration(
                "vault must not be the null address".to_string(),
            ));
        }
        self.fee.validate()
    }
}
