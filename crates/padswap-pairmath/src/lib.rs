//! # padswap-pairmath
//!
//! **Pure constant-product pair math for Padswap.**
//!
//! Every function here is stateless and deterministic:
//!
//! - **Zero side effects**: no storage, no collaborators, no clock
//! - **Exact integers**: 256-bit amounts with floor division, checked everywhere
//! - **Single-width products**: `mul_div` reports `Overflow` rather than
//!   widening past 256 bits; 18-decimal amounts and their products fit

pub mod arith;
pub mod fee;
pub mod liquidity;
pub mod ordering;
pub mod swap;
pub mod twap;

pub use arith::{mul_div, sqrt};
pub use fee::{calculate_protocol_fee, calculate_trading_fee};
pub use liquidity::{calculate_liquidity, calculate_optimal_amounts, calculate_remove_amounts};
pub use ordering::sort_tokens;
pub use swap::{get_amount_in, get_amount_out, quote, spot_price};
pub use twap::{TwapAverage, advance_twap, twap_average_price};
