//! Thread-safe handle with re-entrancy rejection.
//!
//! Calls from different threads are serialized by a re-entrant mutex. A
//! call that re-enters the engine on the *same* thread (for instance from
//! a token hook fired during a transfer) gets the lock but finds the core
//! already borrowed, and is rejected with `ReentrantCall` before it can
//! observe or touch half-applied state.

use std::cell::RefCell;

use padswap_accounting::ReleasedLock;
use padswap_types::{Address, CollectedFees, LiquidityLock, PadswapError, Result, Timestamp};
use parking_lot::ReentrantMutex;

use crate::{
    amm::AmmCore,
    collaborators::{LpLedger, ProjectRegistry, TokenLedger},
    params::{
        AddLiquidityOutcome, AddLiquidityParams, LockParams, LockRequest, RemoveLiquidityOutcome,
        RemoveLiquidityParams, SwapOutcome, SwapParams,
    },
};

pub struct SharedAmm<T, L, R> {
    inner: ReentrantMutex<RefCell<AmmCore<T, L, R>>>,
}

impl<T, L, R> SharedAmm<T, L, R>
where
    T: TokenLedger,
    L: LpLedger,
    R: ProjectRegistry,
{
    #[must_use]
    pub fn new(core: AmmCore<T, L, R>) -> Self {
        Self {
            inner: ReentrantMutex::new(RefCell::new(core)),
        }
    }

    /// Run `f` with exclusive access to the core.
    ///
    /// # Errors
    /// `ReentrantCall` if this thread is already inside the engine,
    /// otherwise whatever `f` returns.
    pub fn with_core<X>(
        &self,
        f: impl FnOnce(&mut AmmCore<T, L, R>) -> Result<X>,
    ) -> Result<X> {
        let guard = self.inner.lock();
        let Ok(mut core) = guard.try_borrow_mut() else {
            tracing::warn!("Re-entrant engine call rejected");
            return Err(PadswapError::ReentrantCall);
        };
        f(&mut core)
    }

    /// Run `f` with shared access to the core.
    ///
    /// # Errors
    /// `ReentrantCall` if called from inside an operation in flight.
    pub fn read<X>(&self, f: impl FnOnce(&AmmCore<T, L, R>) -> X) -> Result<X> {
        let guard = self.inner.lock();
        let Ok(core) = guard.try_borrow() else {
            tracing::warn!("Engine read during an operation in flight rejected");
            return Err(PadswapError::ReentrantCall);
        };
        Ok(f(&core))
    }

    /// # Errors
    /// See [`AmmCore::add_liquidity`].
    pub fn add_liquidity(
        &self,
        caller: Address,
        params: &AddLiquidityParams,
        now: Timestamp,
    ) -> Result<AddLiquidityOutcome> {
        self.with_core(|core| core.add_liquidity(caller, params, now))
    }

    /// # Errors
    /// See [`AmmCore::add_liquidity_with_lock`].
    pub fn add_liquidity_with_lock(
        &self,
        caller: Address,
        params: &AddLiquidityParams,
        lock: &LockParams,
        now: Timestamp,
    ) -> Result<AddLiquidityOutcome> {
        self.with_core(|core| core.add_liquidity_with_lock(caller, params, lock, now))
    }

    /// # Errors
    /// See [`AmmCore::remove_liquidity`].
    pub fn remove_liquidity(
        &self,
        caller: Address,
        params: &RemoveLiquidityParams,
        now: Timestamp,
    ) -> Result<RemoveLiquidityOutcome> {
        self.with_core(|core| core.remove_liquidity(caller, params, now))
    }

    /// # Errors
    /// See [`AmmCore::swap_token_for_token`].
    pub fn swap_token_for_token(
        &self,
        caller: Address,
        params: &SwapParams,
        now: Timestamp,
    ) -> Result<SwapOutcome> {
        self.with_core(|core| core.swap_token_for_token(caller, params, now))
    }

    /// # Errors
    /// See [`AmmCore::collect_protocol_fees`].
    pub fn collect_protocol_fees(
        &self,
        caller: Address,
        token_a: Address,
        token_b: Address,
        now: Timestamp,
    ) -> Result<CollectedFees> {
        self.with_core(|core| core.collect_protocol_fees(caller, token_a, token_b, now))
    }

    /// # Errors
    /// See [`AmmCore::create_liquidity_lock`].
    pub fn create_liquidity_lock(
        &self,
        caller: Address,
        request: &LockRequest,
        now: Timestamp,
    ) -> Result<LiquidityLock> {
        self.with_core(|core| core.create_liquidity_lock(caller, request, now))
    }

    /// # Errors
    /// See [`AmmCore::unlock_liquidity`].
    pub fn unlock_liquidity(
        &self,
        caller: Address,
        token_a: Address,
        token_b: Address,
        now: Timestamp,
    ) -> Result<ReleasedLock> {
        self.with_core(|core| core.unlock_liquidity(caller, token_a, token_b, now))
    }

    pub fn into_inner(self) -> AmmCore<T, L, R> {
        self.inner.into_inner().into_inner()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Weak};

    use padswap_types::{AmmConfig, Amount, FeeConfig};
    use parking_lot::Mutex;

    use super::*;
    use crate::memory::{MemoryLpLedger, MemoryTokenLedger, StaticRegistry, TransferRecord};

    type Shared = SharedAmm<MemoryTokenLedger, MemoryLpLedger, StaticRegistry>;

    const E18: u128 = 1_000_000_000_000_000_000;

    fn tka() -> Address {
        Address::from_low_u64(0xA0)
    }
    fn tkb() -> Address {
        Address::from_low_u64(0xB0)
    }
    fn user(n: u64) -> Address {
        Address::from_low_u64(100 + n)
    }

    fn shared(users: u64) -> Shared {
        let fee = FeeConfig::new(30, 1_667, Address::from_low_u64(5));
        let config = AmmConfig::new(Address::from_low_u64(1), Address::from_low_u64(9), fee);
        let mut tokens = MemoryTokenLedger::new();
        for n in 0..users {
            tokens.mint(tka(), user(n), Amount::from(1_000_000 * E18));
            tokens.mint(tkb(), user(n), Amount::from(1_000_000 * E18));
        }
        let core = AmmCore::new(
            config,
            tokens,
            MemoryLpLedger::new(),
            StaticRegistry::new(Address::from_low_u64(7)),
        )
        .unwrap();
        SharedAmm::new(core)
    }

    fn seed(amm: &Shared) {
        let params = AddLiquidityParams {
            token_a: tka(),
            token_b: tkb(),
            amount_a_desired: Amount::from(1_000 * E18),
            amount_b_desired: Amount::from(1_000 * E18),
            amount_a_min: Amount::ZERO,
            amount_b_min: Amount::ZERO,
            to: user(0),
            deadline: Timestamp::from_secs(u64::MAX),
        };
        amm.add_liquidity(user(0), &params, Timestamp::from_secs(1))
            .unwrap();
    }

    fn swap(n: u64, amount_in: u128) -> SwapParams {
        SwapParams {
            token_in: tka(),
            token_out: tkb(),
            amount_in: Amount::from(amount_in),
            min_amount_out: Amount::ZERO,
            to: user(n),
            deadline: Timestamp::from_secs(u64::MAX),
        }
    }

    #[test]
    fn hook_reentry_is_rejected() {
        let amm = Arc::new(shared(2));
        seed(&amm);

        let weak: Weak<Shared> = Arc::downgrade(&amm);
        let outcomes: Arc<Mutex<Vec<bool>>> = Arc::default();
        let seen = Arc::clone(&outcomes);
        amm.with_core(|core| {
            core.tokens_mut().set_hook(Box::new(move |_: &TransferRecord| {
                if let Some(amm) = weak.upgrade() {
                    let nested =
                        amm.swap_token_for_token(user(1), &swap(1, E18 / 100), Timestamp::from_secs(2));
                    seen.lock()
                        .push(matches!(nested, Err(PadswapError::ReentrantCall)));
                }
            }));
            Ok(())
        })
        .unwrap();

        let before = amm.read(|core| core.events().len()).unwrap();
        amm.swap_token_for_token(user(1), &swap(1, E18), Timestamp::from_secs(2))
            .unwrap();

        let outcomes = outcomes.lock();
        assert!(!outcomes.is_empty());
        assert!(outcomes.iter().all(|rejected| *rejected));
        // Only the outer swap landed: ReservesUpdated + Swap.
        assert_eq!(amm.read(|core| core.events().len()).unwrap(), before + 2);
    }

    #[test]
    fn concurrent_swaps_serialize() {
        let amm = Arc::new(shared(5));
        seed(&amm);
        let k_before = amm
            .read(|core| {
                let (a, b) = core.reserves(tka(), tkb()).unwrap();
                a * b
            })
            .unwrap();

        let handles: Vec<_> = (1..5)
            .map(|n| {
                let amm = Arc::clone(&amm);
                std::thread::spawn(move || {
                    for i in 0..25u64 {
                        let params = swap(n, E18 + u128::from(i));
                        amm.swap_token_for_token(user(n), &params, Timestamp::from_secs(2 + i))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let core = Arc::try_unwrap(amm).ok().unwrap().into_inner();
        let (a, b) = core.reserves(tka(), tkb()).unwrap();
        assert!(a * b >= k_before);
        assert_eq!(core.fee_stats(tka(), tkb()).unwrap().fee_paying_swaps, 100);
        core.verify_lp_supply(tka(), tkb()).unwrap();
    }
}
