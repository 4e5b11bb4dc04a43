//! Shared harness for the integration tests.

#![allow(dead_code)]

use padswap_core::{
    AddLiquidityParams, AmmCore, LpLedger, MemoryLpLedger, MemoryTokenLedger,
    RemoveLiquidityParams, StaticRegistry, SwapParams, TokenLedger,
};
use padswap_types::{Address, AmmConfig, Amount, FeeConfig, Timestamp};
use tracing_subscriber::EnvFilter;

pub type Core = AmmCore<MemoryTokenLedger, MemoryLpLedger, StaticRegistry>;

/// One whole token at 18 decimals, in base units.
pub const E18: u128 = 1_000_000_000_000_000_000;
/// Whole tokens minted to every holder.
pub const FUNDS: u128 = 1_000_000_000_000;
pub const FAR: Timestamp = Timestamp(u64::MAX);

pub fn admin() -> Address {
    Address::from_low_u64(1)
}
pub fn fee_recipient() -> Address {
    Address::from_low_u64(5)
}
pub fn authority() -> Address {
    Address::from_low_u64(7)
}
pub fn vault() -> Address {
    Address::from_low_u64(9)
}
pub fn user(n: u64) -> Address {
    Address::from_low_u64(1_000 + n)
}
/// Launchpad project token.
pub fn project() -> Address {
    Address::from_low_u64(0xA0)
}
/// Quote token.
pub fn quote() -> Address {
    Address::from_low_u64(0xB0)
}
pub fn other() -> Address {
    Address::from_low_u64(0xC0)
}

/// `n` base units.
pub fn wei(n: u128) -> Amount {
    Amount::from(n)
}

/// `n` whole tokens.
pub fn tokens(n: u128) -> Amount {
    Amount::from(n) * Amount::from(E18)
}

pub fn at(secs: u64) -> Timestamp {
    Timestamp::from_secs(secs)
}

/// Log to the test writer when `RUST_LOG` is set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An engine with 30 bps trading fee, 16.67 % protocol share, and
/// `users` funded traders (plus the launch authority) holding [`FUNDS`]
/// whole tokens of every token.
pub fn engine(users: u64) -> Core {
    init_tracing();
    let config = AmmConfig::new(admin(), vault(), FeeConfig::new(30, 1_667, fee_recipient()));
    let mut tokens = MemoryTokenLedger::new();
    let holders = (0..users).map(user).chain([authority()]);
    for holder in holders {
        for token in [project(), quote(), other()] {
            tokens.mint(token, holder, funds());
        }
    }
    AmmCore::new(
        config,
        tokens,
        MemoryLpLedger::new(),
        StaticRegistry::new(authority()),
    )
    .unwrap()
}

/// Balance of every funded holder before any trading.
pub fn funds() -> Amount {
    tokens(FUNDS)
}

pub fn add(
    a: Address,
    b: Address,
    amount_a: Amount,
    amount_b: Amount,
    to: Address,
) -> AddLiquidityParams {
    AddLiquidityParams {
        token_a: a,
        token_b: b,
        amount_a_desired: amount_a,
        amount_b_desired: amount_b,
        amount_a_min: Amount::ZERO,
        amount_b_min: Amount::ZERO,
        to,
        deadline: FAR,
    }
}

pub fn remove(a: Address, b: Address, liquidity: Amount, to: Address) -> RemoveLiquidityParams {
    RemoveLiquidityParams {
        token_a: a,
        token_b: b,
        liquidity,
        amount_a_min: Amount::ZERO,
        amount_b_min: Amount::ZERO,
        to,
        deadline: FAR,
    }
}

pub fn swap(token_in: Address, token_out: Address, amount_in: Amount, to: Address) -> SwapParams {
    SwapParams {
        token_in,
        token_out,
        amount_in,
        min_amount_out: Amount::ZERO,
        to,
        deadline: FAR,
    }
}

pub fn lp_balance(core: &Core, a: Address, b: Address, holder: Address) -> Amount {
    let pair = core.pool(a, b).unwrap().pair;
    core.lp_ledger().balance_of(&pair, holder)
}

pub fn token_balance(core: &Core, token: Address, holder: Address) -> Amount {
    core.tokens().balance_of(token, holder)
}

/// Everything observable about one pool, for before/after comparisons.
#[derive(Debug, PartialEq, Eq)]
pub struct PoolState {
    pub reserves: Option<(Amount, Amount)>,
    pub lp_supply: Amount,
    pub events: usize,
    pub vault_a: Amount,
    pub vault_b: Amount,
    pub balances: Vec<(Amount, Amount, Amount)>,
}

pub fn pool_state(core: &Core, a: Address, b: Address, users: u64) -> PoolState {
    let pair = padswap_types::PairKey::canonical(a, b).unwrap();
    PoolState {
        reserves: core.reserves(a, b).ok(),
        lp_supply: core.lp_ledger().total_supply(&pair),
        events: core.events().len(),
        vault_a: token_balance(core, a, vault()),
        vault_b: token_balance(core, b, vault()),
        balances: (0..users)
            .map(user)
            .map(|u| {
                (
                    token_balance(core, a, u),
                    token_balance(core, b, u),
                    core.lp_ledger().balance_of(&pair, u),
                )
            })
            .collect(),
    }
}
