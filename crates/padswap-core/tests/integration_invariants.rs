//! Integration test: pool invariants under random activity
//!
//! Random multi-user sequences of deposits, withdrawals and swaps. After
//! every step:
//! - k never shrinks across a swap
//! - cached LP supply matches the LP ledger
//! - the vault holds exactly reserves + uncollected protocol fees
//! - token supply is conserved across users, vault and fee recipient
//!
//! Amounts are 18-decimal base units, with pools from 1 to 1e9 tokens
//! per side.

mod common;

use common::*;
use padswap_core::{LpLedger, TokenLedger};
use padswap_types::{Amount, PadswapError, PairKey};
use proptest::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};

const USERS: u64 = 4;

fn check_pool(core: &Core) {
    core.verify_lp_supply(project(), quote()).unwrap();
    let pool = core.pool(project(), quote()).unwrap();
    let fees = core.accumulated_fees(project(), quote()).unwrap();
    assert_eq!(
        core.tokens().balance_of(project(), vault()),
        pool.reserve_a + fees.token_a
    );
    assert_eq!(
        core.tokens().balance_of(quote(), vault()),
        pool.reserve_b + fees.token_b
    );
    for token in [project(), quote()] {
        assert_eq!(
            core.tokens().total_supply(token),
            funds() * Amount::from(USERS + 1)
        );
    }
}

/// Uniform in `1..=max`; LP balances here stay far below `u128::MAX`.
fn some_of(rng: &mut StdRng, max: Amount) -> Amount {
    let max = u128::try_from(max).unwrap();
    wei(rng.gen_range(1..=max))
}

fn k(core: &Core) -> Amount {
    let (a, b) = core.reserves(project(), quote()).unwrap();
    a * b
}

/// Errors a random step may legitimately hit.
fn expected(err: &PadswapError) -> bool {
    matches!(
        err,
        PadswapError::InsufficientOutputAmount
            | PadswapError::InsufficientLiquidity
            | PadswapError::ZeroLiquidity
            | PadswapError::InsufficientLpBalance { .. }
    )
}

fn run(seed: u64, steps: usize) {
    let mut core = engine(USERS);
    let mut rng = StdRng::seed_from_u64(seed);
    core.add_liquidity(
        user(0),
        &add(project(), quote(), tokens(5_000_000), tokens(2_000_000), user(0)),
        at(1),
    )
    .unwrap();
    let pair = PairKey::canonical(project(), quote()).unwrap();

    for step in 0..steps {
        let who = user(rng.gen_range(0..USERS));
        let now = at(2 + step as u64);
        let before = pool_state(&core, project(), quote(), USERS);
        let result = match rng.gen_range(0..4) {
            0 => {
                let a = wei(rng.gen_range(1..200_000 * E18));
                let b = wei(rng.gen_range(1..200_000 * E18));
                core.add_liquidity(who, &add(project(), quote(), a, b, who), now)
                    .map(drop)
            }
            1 => {
                let held = core.lp_ledger().balance_of(&pair, who);
                let amount = if held.is_zero() {
                    wei(1)
                } else {
                    some_of(&mut rng, held)
                };
                core.remove_liquidity(who, &remove(project(), quote(), amount, who), now)
                    .map(drop)
            }
            _ => {
                let k_before = k(&core);
                let (token_in, token_out) = if rng.gen_bool(0.5) {
                    (project(), quote())
                } else {
                    (quote(), project())
                };
                let amount = wei(rng.gen_range(1..500_000 * E18));
                let params = swap(token_in, token_out, amount, who);
                let out = core.swap_token_for_token(who, &params, now);
                if out.is_ok() {
                    assert!(k(&core) >= k_before, "k shrank at step {step}");
                }
                out.map(drop)
            }
        };
        match result {
            Ok(()) => {}
            Err(err) => {
                assert!(expected(&err), "step {step}: unexpected {err}");
                assert_eq!(pool_state(&core, project(), quote(), USERS), before);
            }
        }
        check_pool(&core);
    }
}

#[test]
fn random_sequences_keep_invariants() {
    for seed in 0..8 {
        run(seed, 300);
    }
}

#[test]
fn everyone_can_exit() {
    let mut core = engine(USERS);
    let mut rng = StdRng::seed_from_u64(42);
    for n in 0..USERS {
        let a = wei(rng.gen_range(10_000 * E18..1_000_000 * E18));
        let b = wei(rng.gen_range(10_000 * E18..1_000_000 * E18));
        core.add_liquidity(user(n), &add(project(), quote(), a, b, user(n)), at(1 + n))
            .unwrap();
    }
    for i in 0..50 {
        let who = user(rng.gen_range(0..USERS));
        let amount = wei(rng.gen_range(1_000 * E18..50_000 * E18));
        let (token_in, token_out) = if i % 2 == 0 {
            (project(), quote())
        } else {
            (quote(), project())
        };
        core.swap_token_for_token(who, &swap(token_in, token_out, amount, who), at(10 + i))
            .unwrap();
    }

    let pair = PairKey::canonical(project(), quote()).unwrap();
    for n in 0..USERS {
        let held = core.lp_ledger().balance_of(&pair, user(n));
        core.remove_liquidity(user(n), &remove(project(), quote(), held, user(n)), at(100))
            .unwrap();
        check_pool(&core);
    }
    let pool = core.pool(project(), quote()).unwrap();
    assert!(pool.total_lp_supply.is_zero());
    assert!(pool.reserve_a.is_zero() && pool.reserve_b.is_zero());
    // All LP fees went to the providers; only protocol fees remain.
    let fees = core.accumulated_fees(project(), quote()).unwrap();
    assert_eq!(token_balance(&core, project(), vault()), fees.token_a);
    assert_eq!(token_balance(&core, quote(), vault()), fees.token_b);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn swap_never_drains_or_shrinks_k(
        reserve_a in E18..1_000_000_000 * E18,
        reserve_b in E18..1_000_000_000 * E18,
        amount_in in 1u128..10_000_000_000 * E18,
        a_to_b in any::<bool>(),
    ) {
        let mut core = engine(USERS);
        let seed = add(project(), quote(), wei(reserve_a), wei(reserve_b), user(0));
        core.add_liquidity(user(0), &seed, at(1)).unwrap();
        let amount_in = wei(amount_in);
        let (token_in, token_out) = if a_to_b {
            (project(), quote())
        } else {
            (quote(), project())
        };
        let k_before = k(&core);
        let (_, reserve_out) = core.reserves(token_in, token_out).unwrap();
        let quoted = core.quote_swap(token_in, token_out, amount_in).ok();

        let params = swap(token_in, token_out, amount_in, user(1));
        match core.swap_token_for_token(user(1), &params, at(2)) {
            Ok(out) => {
                prop_assert!(out.amount_out < reserve_out);
                prop_assert!(k(&core) >= k_before);
                prop_assert_eq!(out.fees.trading_fee, out.fees.protocol_fee + out.fees.lp_fee);
                prop_assert_eq!(quoted, Some(out.amount_out));
            }
            Err(err) => prop_assert!(matches!(err, PadswapError::InsufficientOutputAmount)),
        }
        check_pool(&core);
    }

    #[test]
    fn deposit_then_full_withdrawal_never_profits(
        seed_a in E18..1_000_000_000 * E18,
        seed_b in E18..1_000_000_000 * E18,
        add_a in E18..1_000_000_000 * E18,
        add_b in E18..1_000_000_000 * E18,
    ) {
        let mut core = engine(USERS);
        let seed = add(project(), quote(), wei(seed_a), wei(seed_b), user(0));
        core.add_liquidity(user(0), &seed, at(1)).unwrap();
        let deposit = add(project(), quote(), wei(add_a), wei(add_b), user(1));
        let Ok(added) = core.add_liquidity(user(1), &deposit, at(2)) else {
            return Ok(());
        };
        let exit = remove(project(), quote(), added.liquidity, user(1));
        if let Ok(out) = core.remove_liquidity(user(1), &exit, at(3)) {
            prop_assert!(out.amount_a <= added.amount_a);
            prop_assert!(out.amount_b <= added.amount_b);
            prop_assert!(out.earnings_a.is_zero() && out.earnings_b.is_zero());
        }
        check_pool(&core);
    }

    #[test]
    fn stale_pool_still_withdraws(
        reserve_a in E18..1_000_000_000 * E18,
        reserve_b in E18..1_000_000_000 * E18,
        idle_secs in 1u64..100 * 365 * 24 * 3_600,
    ) {
        let mut core = engine(USERS);
        let seed = add(project(), quote(), wei(reserve_a), wei(reserve_b), user(0));
        let seeded = core.add_liquidity(user(0), &seed, at(1)).unwrap();
        let start = core.twap(project(), quote()).unwrap();

        let exit = remove(project(), quote(), seeded.liquidity, user(0));
        let out = core.remove_liquidity(user(0), &exit, at(1 + idle_secs)).unwrap();
        prop_assert_eq!((out.amount_a, out.amount_b), (wei(reserve_a), wei(reserve_b)));
        let twap = core.twap(project(), quote()).unwrap();
        prop_assert_eq!(twap.block_timestamp_last, at(1 + idle_secs));
        prop_assert!(twap.price0_cumulative_last >= start.price0_cumulative_last);
        prop_assert!(twap.price1_cumulative_last >= start.price1_cumulative_last);
        check_pool(&core);
    }
}
