//! System-wide constants for the Padswap AMM engine.

use crate::U256;

/// Basis-point denominator: 10 000 bps = 100%.
pub const BPS_DENOMINATOR: U256 = U256::from_limbs([10_000, 0, 0, 0]);

/// Upper bound on the trading fee (100 bps = 1%).
pub const MAX_TRADING_FEE_BPS: u32 = 100;

/// Upper bound on the protocol share of the trading fee (3000 bps = 30%).
pub const MAX_PROTOCOL_FEE_BPS: u32 = 3_000;

/// Default trading fee (0.30%).
pub const DEFAULT_TRADING_FEE_BPS: u32 = 30;

/// Default protocol share of the trading fee (~1/6).
pub const DEFAULT_PROTOCOL_FEE_BPS: u32 = 1_667;

/// Seconds in a 365-day year, used for APY annualisation.
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// Domain separator for deterministic pool ids.
pub const POOL_ID_DOMAIN: &[u8] = b"padswap:pool_id:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Padswap";
