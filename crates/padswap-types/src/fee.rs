//! Fee configuration and fee accounting records.
//!
//! On every swap the trading fee is split into a protocol part (carved out
//! before it ever reaches reserves, accumulated per pool and per side) and
//! an LP part (left inside reserves, which is how LP shares appreciate).

use serde::{Deserialize, Serialize};

use crate::{Address, Amount, PadswapError, PoolId, PoolSide, Result, Timestamp, constants};

/// Global fee configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Trading fee charged on `amount_in`, in bps. At most 100 (1%).
    pub trading_fee_bps: u32,
    /// Share of the trading fee routed to the protocol, in bps. At most 3000 (30%).
    pub protocol_fee_bps: u32,
    /// Where collected protocol fees are sent.
    pub fee_recipient: Address,
    /// When false, swaps charge no fee at all.
    pub fees_enabled: bool,
}

impl FeeConfig {
    #[must_use]
    pub fn new(trading_fee_bps: u32, protocol_fee_bps: u32, fee_recipient: Address) -> Self {
        Self {
            trading_fee_bps,
            protocol_fee_bps,
            fee_recipient,
            fees_enabled: true,
        }
    }

    /// Check the configuration bounds.
    ///
    /// # Errors
    /// Returns `InvalidFeeConfiguration` if a bound is exceeded or the
    /// recipient is null.
    pub fn validate(&self) -> Result<()> {
        if self.trading_fee_bps > constants::MAX_TRADING_FEE_BPS {
            return Err(PadswapError::InvalidFeeConfiguration {
                reason: format!(
                    "trading fee {} bps exceeds maximum {}",
                    self.trading_fee_bps,
                    constants::MAX_TRADING_FEE_BPS
                ),
            });
        }
        if self.protocol_fee_bps > constants::MAX_PROTOCOL_FEE_BPS {
            return Err(PadswapError::InvalidFeeConfiguration {
                reason: format!(
                    "protocol fee {} bps exceeds maximum {}",
                    self.protocol_fee_bps,
                    constants::MAX_PROTOCOL_FEE_BPS
                ),
            });
        }
        if self.fee_recipient.is_zero() {
            return Err(PadswapError::InvalidFeeConfiguration {
                reason: "fee recipient is the null address".to_string(),
            });
        }
        Ok(())
    }

    /// The fee actually charged on swaps: zero while fees are disabled.
    #[must_use]
    pub fn effective_trading_fee_bps(&self) -> u32 {
        if self.fees_enabled {
            self.trading_fee_bps
        } else {
            0
        }
    }
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self::new(
            constants::DEFAULT_TRADING_FEE_BPS,
            constants::DEFAULT_PROTOCOL_FEE_BPS,
            Address::ZERO,
        )
    }
}

/// The three-way split of one swap's fee.
///
/// Invariant: `trading_fee == protocol_fee + lp_fee`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeSplit {
    pub trading_fee: Amount,
    pub protocol_fee: Amount,
    pub lp_fee: Amount,
}

impl FeeSplit {
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.trading_fee.is_zero()
    }
}

/// Protocol fees accrued by a pool and not yet collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccumulatedFees {
    pub token_a: Amount,
    pub token_b: Amount,
}

impl AccumulatedFees {
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.token_a.is_zero() && self.token_b.is_zero()
    }

    #[must_use]
    pub fn side(&self, side: PoolSide) -> Amount {
        match side {
            PoolSide::A => self.token_a,
            PoolSide::B => self.token_b,
        }
    }
}

/// Lifetime fee statistics for a pool. Never reset by collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeStats {
    pub trading_fees_a: Amount,
    pub trading_fees_b: Amount,
    pub protocol_fees_a: Amount,
    pub protocol_fees_b: Amount,
    pub fee_paying_swaps: u64,
    pub last_fee_at: Option<Timestamp>,
}

/// What a single protocol-fee collection paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedFees {
    pub pool: PoolId,
    pub recipient: Address,
    pub amount_a: Amount,
    pub amount_b: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient() -> Address {
        Address::from_low_u64(99)
    }

    #[test]
    fn valid_config_passes() {
        assert!(FeeConfig::new(30, 1_667, recipient()).validate().is_ok());
        assert!(FeeConfig::new(100, 3_000, recipient()).validate().is_ok());
        assert!(FeeConfig::new(0, 0, recipient()).validate().is_ok());
    }

    #[test]
    fn trading_fee_bound() {
        let err = FeeConfig::new(101, 0, recipient()).validate().unwrap_err();
        assert!(matches!(err, PadswapError::InvalidFeeConfiguration { .. }));
    }

    #[test]
    fn protocol_fee_bound() {
        let err = FeeConfig::new(30, 3_001, recipient()).validate().unwrap_err();
        assert!(matches!(err, PadswapError::InvalidFeeConfiguration { .. }));
    }

    #[test]
    fn null_recipient_rejected() {
        let err = FeeConfig::default().validate().unwrap_err();
        assert!(matches!(err, PadswapError::InvalidFeeConfiguration { .. }));
    }

    #[test]
    fn disabled_fees_charge_nothing() {
        let mut cfg = FeeConfig::new(30, 1_667, recipient());
        assert_eq!(cfg.effective_trading_fee_bps(), 30);
        cfg.fees_enabled = false;
        assert_eq!(cfg.effective_trading_fee_bps(), 0);
    }

    #[test]
    fn accumulated_side_access() {
        let acc = AccumulatedFees {
            token_a: Amount::from(5u64),
            token_b: Amount::ZERO,
        };
        assert_eq!(acc.side(PoolSide::A), Amount::from(5u64));
        assert_eq!(acc.side(PoolSide::B), Amount::ZERO);
        assert!(!acc.is_zero());
        assert!(AccumulatedFees::default().is_zero());
    }

    #[test]
    fn fee_config_serde_roundtrip() {
        let cfg = FeeConfig::new(25, 2_000, recipient());
        let json = serde_json::to_string(&cfg).unwrap();
        let back: FeeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
