//! # AmmCore: pool orchestration
//!
//! The only entry point external callers use. Every state-changing
//! operation runs in three phases:
//!
//! ```text
//!   ┌──────────┐   ┌───────────────────────────┐   ┌──────────┐
//!   │ PREPARE  ├──▶│ EFFECTS (journaled)       ├──▶│ COMMIT   │
//!   │ validate │   │ token pulls / sends,      │   │ pools,   │
//!   │ compute  │   │ LP mint / burn            │   │ fees,    │
//!   └────┬─────┘   └────────────┬──────────────┘   │ locks,   │
//!        │ Err                  │ Err              │ earnings,│
//!        ▼                      ▼                  │ events   │
//!    nothing to undo     compensate in reverse     └──────────┘
//! ```
//!
//! Engine state (pools, fee counters, locks, snapshots, events) is written
//! only in COMMIT, which cannot fail. A failed call therefore leaves the
//! engine exactly as it was, and its collaborators as well unless a
//! compensation itself fails (`RollbackFailed`).
//!
//! `now` and `caller` are explicit on every operation.

use padswap_accounting::{
    CollectionReport, EarningsTracker, FeeEngine, LockManager, ReleasedLock, SwapFeeUpdate,
};
use padswap_pairmath::{
    TwapAverage, calculate_liquidity, calculate_optimal_amounts, calculate_remove_amounts,
    get_amount_out, spot_price, twap_average_price,
};
use padswap_types::{
    AccumulatedFees, Address, AmmConfig, AmmEvent, Amount, CollectedFees, EventRecord, FeeConfig,
    FeeSplit, FeeStats, LiquidityLock, LpSnapshot, PadswapError, PairKey, Pool, PoolId, PoolSide,
    RealizedEarnings, Result, Timestamp, TwapData, UnrealizedEarnings,
};
use rust_decimal::Decimal;

use crate::{
    collaborators::{LpLedger, ProjectRegistry, TokenLedger},
    journal::{Effect, Journal},
    params::{
        AddLiquidityOutcome, AddLiquidityParams, LockParams, LockRequest, RemoveLiquidityOutcome,
        RemoveLiquidityParams, SwapOutcome, SwapParams, orient,
    },
    pool_store::PoolStore,
};

/// Constant-product AMM engine over pluggable collaborators.
pub struct AmmCore<T, L, R> {
    config: AmmConfig,
    pools: PoolStore,
    fees: FeeEngine,
    locks: LockManager,
    earnings: EarningsTracker,
    tokens: T,
    lp: L,
    registry: R,
    events: Vec<EventRecord>,
    next_sequence: u64,
}

/// Deposit state staged between EFFECTS and COMMIT.
struct StagedDeposit {
    next: Pool,
    received_a: Amount,
    received_b: Amount,
    liquidity: Amount,
    lock: Option<LiquidityLock>,
}

/// Swap priced for one input amount, staged until COMMIT.
struct StagedSwap {
    amount_in: Amount,
    amount_out: Amount,
    split: FeeSplit,
    fee_update: Option<SwapFeeUpdate>,
    next: Pool,
}

fn check_deadline(deadline: Timestamp, now: Timestamp) -> Result<()> {
    if now >= deadline {
        return Err(PadswapError::DeadlineExpired { deadline, now });
    }
    Ok(())
}

fn check_recipient(to: Address) -> Result<()> {
    if to.is_zero() {
        return Err(PadswapError::InvalidRecipient(to));
    }
    Ok(())
}

fn check_minimum(what: &'static str, minimum: Amount, actual: Amount) -> Result<()> {
    if actual < minimum {
        return Err(PadswapError::SlippageTooHigh {
            what,
            minimum,
            actual,
        });
    }
    Ok(())
}

impl<T, L, R> AmmCore<T, L, R>
where
    T: TokenLedger,
    L: LpLedger,
    R: ProjectRegistry,
{
    /// Build an engine from a validated configuration.
    ///
    /// # Errors
    /// `Configuration` or `InvalidFeeConfiguration` from validation.
    pub fn new(config: AmmConfig, tokens: T, lp: L, registry: R) -> Result<Self> {
        config.validate()?;
        let fees = FeeEngine::new(config.fee)?;
        tracing::info!(
            admin = %config.admin,
            vault = %config.vault,
            trading_fee_bps = config.fee.trading_fee_bps,
            protocol_fee_bps = config.fee.protocol_fee_bps,
            "AMM core initialized"
        );
        Ok(Self {
            config,
            pools: PoolStore::new(),
            fees,
            locks: LockManager::new(),
            earnings: EarningsTracker::new(),
            tokens,
            lp,
            registry,
            events: Vec::new(),
            next_sequence: 0,
        })
    }

    // -----------------------------------------------------------------
    // Liquidity
    // -----------------------------------------------------------------

    /// Deposit both tokens and mint LP shares to `params.to`.
    ///
    /// Creates the pool on first use; if either token is a registered
    /// project token only the launch authority may do so. The first
    /// deposit sets the price and mints `sqrt(a × b)`; later deposits are
    /// trimmed to the pool ratio and checked against the minimums.
    ///
    /// Received amounts are measured at the vault, so fee-on-transfer
    /// tokens credit only what actually arrived.
    ///
    /// # Errors
    /// `DeadlineExpired`, `InvalidRecipient`, `ZeroAmount`, `InvalidPair`,
    /// `UnauthorizedPoolCreation`, `SlippageTooHigh`, `ZeroLiquidity`,
    /// collaborator failures, and math errors.
    pub fn add_liquidity(
        &mut self,
        caller: Address,
        params: &AddLiquidityParams,
        now: Timestamp,
    ) -> Result<AddLiquidityOutcome> {
        self.deposit(caller, params, None, now)
    }

    /// Launch deposit: [`AmmCore::add_liquidity`] plus a lock over the
    /// minted LP under `(pool, params.to)`. Launch authority only.
    ///
    /// # Errors
    /// `Unauthorized`, `InvalidLockData`, and everything
    /// [`AmmCore::add_liquidity`] returns.
    pub fn add_liquidity_with_lock(
        &mut self,
        caller: Address,
        params: &AddLiquidityParams,
        lock: &LockParams,
        now: Timestamp,
    ) -> Result<AddLiquidityOutcome> {
        self.require_launch_authority(caller)?;
        if lock.duration_secs == 0 {
            return Err(PadswapError::InvalidLockData {
                reason: "lock duration must be non-zero".to_string(),
            });
        }
        self.deposit(caller, params, Some(lock), now)
    }

    fn deposit(
        &mut self,
        caller: Address,
        params: &AddLiquidityParams,
        lock: Option<&LockParams>,
        now: Timestamp,
    ) -> Result<AddLiquidityOutcome> {
        // PREPARE
        check_deadline(params.deadline, now)?;
        check_recipient(params.to)?;
        if params.amount_a_desired.is_zero() || params.amount_b_desired.is_zero() {
            return Err(PadswapError::ZeroAmount);
        }
        let pair = PairKey::canonical(params.token_a, params.token_b)?;
        let flipped = params.token_a != pair.token_a();
        let (a_desired, b_desired) =
            orient(flipped, params.amount_a_desired, params.amount_b_desired);
        let (a_min, b_min) = orient(flipped, params.amount_a_min, params.amount_b_min);

        let (pool, created) = match self.pools.get(&pair) {
            Some(pool) => (pool.clone(), false),
            None => {
                self.authorize_pool_creation(caller, &pair)?;
                (Pool::new(pair, now), true)
            }
        };

        let (amount_a, amount_b) =
            calculate_optimal_amounts(a_desired, b_desired, pool.reserve_a, pool.reserve_b)?;
        check_minimum("token_a deposit", a_min, amount_a)?;
        check_minimum("token_b deposit", b_min, amount_b)?;
        let expected = calculate_liquidity(
            amount_a,
            amount_b,
            pool.reserve_a,
            pool.reserve_b,
            pool.total_lp_supply,
        )?;
        if expected.is_zero() {
            return Err(PadswapError::ZeroLiquidity);
        }

        // EFFECTS
        let to = params.to;
        let staged = self.with_rollback(|core, journal| {
            let received_a = core.pull(pair.token_a(), caller, amount_a, journal)?;
            let received_b = core.pull(pair.token_b(), caller, amount_b, journal)?;
            let liquidity = calculate_liquidity(
                received_a,
                received_b,
                pool.reserve_a,
                pool.reserve_b,
                pool.total_lp_supply,
            )?;
            if liquidity.is_zero() {
                return Err(PadswapError::ZeroLiquidity);
            }
            let reserve_a = pool
                .reserve_a
                .checked_add(received_a)
                .ok_or(PadswapError::Overflow("reserve_a"))?;
            let reserve_b = pool
                .reserve_b
                .checked_add(received_b)
                .ok_or(PadswapError::Overflow("reserve_b"))?;
            let supply = pool
                .total_lp_supply
                .checked_add(liquidity)
                .ok_or(PadswapError::Overflow("LP supply"))?;
            let next = PoolStore::prepare_update(&pool, reserve_a, reserve_b, supply, now);
            let lock = lock
                .map(|terms| {
                    LockManager::prepare(
                        pool.id,
                        to,
                        terms.project_id,
                        liquidity,
                        terms.duration_secs,
                        now,
                    )
                })
                .transpose()?;

            core.lp.mint(&pair, to, liquidity)?;
            journal.record(Effect::LpMinted {
                pair,
                to,
                amount: liquidity,
            });
            Ok(StagedDeposit {
                next,
                received_a,
                received_b,
                liquidity,
                lock,
            })
        })?;

        // COMMIT
        let pool_id = pool.id;
        if created {
            self.emit(
                now,
                AmmEvent::PoolCreated {
                    pool: pool_id,
                    token_a: pair.token_a(),
                    token_b: pair.token_b(),
                    creator: caller,
                },
            );
            tracing::info!(pool = %pool_id, pair = %pair, creator = %caller, "Pool created");
        }
        let post = staged.next.view();
        let reserves_event = self.pools.commit(staged.next);
        self.earnings
            .record_snapshot(to, pool_id, staged.liquidity, post, now);
        self.emit(now, reserves_event);
        self.emit(
            now,
            AmmEvent::LiquidityAdded {
                pool: pool_id,
                provider: caller,
                to,
                amount_a: staged.received_a,
                amount_b: staged.received_b,
                liquidity: staged.liquidity,
            },
        );
        if let Some(lock) = staged.lock {
            self.locks.install(lock.clone());
            self.emit(
                now,
                AmmEvent::LiquidityLocked {
                    pool: pool_id,
                    owner: lock.project_owner,
                    project_id: lock.project_id,
                    amount: lock.locked_lp_amount,
                    unlock_time: lock.unlock_time,
                },
            );
            tracing::info!(
                pool = %pool_id,
                owner = %lock.project_owner,
                project = %lock.project_id,
                amount = %lock.locked_lp_amount,
                unlock_time = %lock.unlock_time,
                "Launch liquidity locked"
            );
        }
        tracing::info!(
            pool = %pool_id,
            provider = %caller,
            to = %to,
            amount_a = %staged.received_a,
            amount_b = %staged.received_b,
            liquidity = %staged.liquidity,
            "Liquidity added"
        );

        let (amount_a, amount_b) = orient(flipped, staged.received_a, staged.received_b);
        Ok(AddLiquidityOutcome {
            pool: pool_id,
            amount_a,
            amount_b,
            liquidity: staged.liquidity,
            created,
        })
    }

    /// Burn `params.liquidity` LP from the caller and pay out the pro-rata
    /// reserves to `params.to`.
    ///
    /// An active lock limits the burn to the unlocked part of the balance
    /// until `unlock_time`; at or after it the lock is flipped lazily and
    /// `LiquidityUnlocked` is emitted. Earnings are realized FIFO against
    /// the caller's deposit history.
    ///
    /// # Errors
    /// `DeadlineExpired`, `InvalidRecipient`, `ZeroAmount`, `InvalidPair`,
    /// `PoolNotFound`, `InsufficientLpBalance`, `LiquidityIsLocked`,
    /// `InsufficientOutputAmount`, `SlippageTooHigh`, collaborator
    /// failures, and math errors.
    pub fn remove_liquidity(
        &mut self,
        caller: Address,
        params: &RemoveLiquidityParams,
        now: Timestamp,
    ) -> Result<RemoveLiquidityOutcome> {
        // PREPARE
        check_deadline(params.deadline, now)?;
        check_recipient(params.to)?;
        if params.liquidity.is_zero() {
            return Err(PadswapError::ZeroAmount);
        }
        let pair = PairKey::canonical(params.token_a, params.token_b)?;
        let flipped = params.token_a != pair.token_a();
        let (a_min, b_min) = orient(flipped, params.amount_a_min, params.amount_b_min);
        let pool = self.pools.require(&pair)?.clone();
        let liquidity = params.liquidity;

        let balance = self.lp.balance_of(&pair, caller);
        if liquidity > balance {
            return Err(PadswapError::InsufficientLpBalance {
                needed: liquidity,
                available: balance,
            });
        }
        let decision = self
            .locks
            .evaluate(pool.id, caller, liquidity, balance, now)?;

        let (amount_a, amount_b) = calculate_remove_amounts(
            liquidity,
            pool.reserve_a,
            pool.reserve_b,
            pool.total_lp_supply,
        )?;
        if amount_a.is_zero() || amount_b.is_zero() {
            return Err(PadswapError::InsufficientOutputAmount);
        }
        check_minimum("token_a withdrawal", a_min, amount_a)?;
        check_minimum("token_b withdrawal", b_min, amount_b)?;

        let plan =
            self.earnings
                .preview_realization(caller, pool.id, liquidity, (amount_a, amount_b), now)?;
        let reserve_a = pool
            .reserve_a
            .checked_sub(amount_a)
            .ok_or(PadswapError::Underflow("reserve_a"))?;
        let reserve_b = pool
            .reserve_b
            .checked_sub(amount_b)
            .ok_or(PadswapError::Underflow("reserve_b"))?;
        let supply = pool
            .total_lp_supply
            .checked_sub(liquidity)
            .ok_or(PadswapError::Underflow("LP supply"))?;
        let next = PoolStore::prepare_update(&pool, reserve_a, reserve_b, supply, now);

        // EFFECTS
        let to = params.to;
        self.with_rollback(|core, journal| {
            core.lp.burn(&pair, caller, liquidity)?;
            journal.record(Effect::LpBurned {
                pair,
                from: caller,
                amount: liquidity,
            });
            core.send(pair.token_a(), to, amount_a, journal)?;
            core.send(pair.token_b(), to, amount_b, journal)
        })?;

        // COMMIT
        let pool_id = pool.id;
        let released = if decision.releases_lock() {
            self.locks.apply_expiry(pool_id, caller, now)
        } else {
            None
        };
        if let Some(released) = released {
            self.emit_unlocked(now, &released, true);
        }
        self.earnings.commit_realization(&plan);
        let reserves_event = self.pools.commit(next);
        self.emit(now, reserves_event);
        self.emit(
            now,
            AmmEvent::LiquidityRemoved {
                pool: pool_id,
                provider: caller,
                to,
                amount_a,
                amount_b,
                liquidity,
            },
        );
        tracing::info!(
            pool = %pool_id,
            provider = %caller,
            to = %to,
            amount_a = %amount_a,
            amount_b = %amount_b,
            liquidity = %liquidity,
            earnings_a = %plan.earnings_a,
            earnings_b = %plan.earnings_b,
            "Liquidity removed"
        );

        let (amount_a, amount_b) = orient(flipped, amount_a, amount_b);
        let (earnings_a, earnings_b) = orient(flipped, plan.earnings_a, plan.earnings_b);
        Ok(RemoveLiquidityOutcome {
            pool: pool_id,
            amount_a,
            amount_b,
            earnings_a,
            earnings_b,
            unlocked: released.map(|r| r.amount),
        })
    }

    // -----------------------------------------------------------------
    // Swaps
    // -----------------------------------------------------------------

    /// Exact-input swap of `params.amount_in` of `token_in` for `token_out`.
    ///
    /// The output is priced on `amount_in − trading_fee`. The input reserve
    /// grows by `amount_in − protocol_fee`: the LP fee stays in the pool,
    /// the protocol fee is carved out into the fee counters.
    ///
    /// `amount_in` is what the vault actually received, so a fee-on-transfer
    /// input token is re-priced on the net amount and `min_amount_out`
    /// applies to that price.
    ///
    /// # Errors
    /// `DeadlineExpired`, `InvalidRecipient`, `InvalidTokenAddress`,
    /// `ZeroAmount`, `InvalidPair`, `PoolNotFound`,
    /// `InsufficientLiquidity`, `InsufficientOutputAmount`,
    /// `SlippageTooHigh`, collaborator failures, and math errors.
    pub fn swap_token_for_token(
        &mut self,
        caller: Address,
        params: &SwapParams,
        now: Timestamp,
    ) -> Result<SwapOutcome> {
        // PREPARE
        check_deadline(params.deadline, now)?;
        check_recipient(params.to)?;
        if params.token_in == params.token_out {
            return Err(PadswapError::InvalidTokenAddress {
                reason: format!("cannot swap {} for itself", params.token_in),
            });
        }
        if params.amount_in.is_zero() {
            return Err(PadswapError::ZeroAmount);
        }
        let pair = PairKey::canonical(params.token_in, params.token_out)?;
        let pool = self.pools.require(&pair)?.clone();
        let side_in = PoolSide::of(&pair, params.token_in).ok_or_else(|| {
            PadswapError::Internal(format!("{} not in {pair}", params.token_in))
        })?;
        let quoted = self.price_swap(&pool, side_in, params.amount_in, params.min_amount_out, now)?;

        // EFFECTS
        let to = params.to;
        let staged = self.with_rollback(|core, journal| {
            let received = core.pull(params.token_in, caller, params.amount_in, journal)?;
            let staged = if received == quoted.amount_in {
                quoted
            } else {
                core.price_swap(&pool, side_in, received, params.min_amount_out, now)?
            };
            core.send(params.token_out, to, staged.amount_out, journal)?;
            Ok(staged)
        })?;

        // COMMIT
        if let Some(update) = staged.fee_update {
            self.fees.apply_swap_fees(update);
        }
        let reserves_event = self.pools.commit(staged.next);
        self.emit(now, reserves_event);
        self.emit(
            now,
            AmmEvent::Swap {
                pool: pool.id,
                sender: caller,
                to,
                token_in: params.token_in,
                token_out: params.token_out,
                amount_in: staged.amount_in,
                amount_out: staged.amount_out,
                trading_fee: staged.split.trading_fee,
                protocol_fee: staged.split.protocol_fee,
            },
        );
        tracing::info!(
            pool = %pool.id,
            sender = %caller,
            token_in = %params.token_in,
            amount_in = %staged.amount_in,
            amount_out = %staged.amount_out,
            trading_fee = %staged.split.trading_fee,
            protocol_fee = %staged.split.protocol_fee,
            "Swap executed"
        );

        Ok(SwapOutcome {
            pool: pool.id,
            amount_in: staged.amount_in,
            amount_out: staged.amount_out,
            fees: staged.split,
        })
    }

    /// Price `amount_in` against `pool` and stage the pool record and fee
    /// counters the swap would leave behind.
    fn price_swap(
        &self,
        pool: &Pool,
        side_in: PoolSide,
        amount_in: Amount,
        min_amount_out: Amount,
        now: Timestamp,
    ) -> Result<StagedSwap> {
        let (reserve_in, reserve_out) = pool.reserves_for(side_in);
        let split = self.fees.calculate_swap_fees(amount_in)?;
        let amount_out = get_amount_out(
            amount_in,
            reserve_in,
            reserve_out,
            self.fees.config().effective_trading_fee_bps(),
        )?;
        if amount_out.is_zero() {
            return Err(PadswapError::InsufficientOutputAmount);
        }
        check_minimum("swap output", min_amount_out, amount_out)?;

        let fee_update = self
            .fees
            .preview_swap_fees(pool.id, side_in, &split, now)?;
        let retained = amount_in
            .checked_sub(split.protocol_fee)
            .ok_or(PadswapError::Underflow("protocol fee"))?;
        let new_in = reserve_in
            .checked_add(retained)
            .ok_or(PadswapError::Overflow("reserve_in"))?;
        let new_out = reserve_out
            .checked_sub(amount_out)
            .ok_or(PadswapError::Underflow("reserve_out"))?;
        let (reserve_a, reserve_b) = match side_in {
            PoolSide::A => (new_in, new_out),
            PoolSide::B => (new_out, new_in),
        };
        Ok(StagedSwap {
            amount_in,
            amount_out,
            split,
            fee_update,
            next: PoolStore::prepare_update(pool, reserve_a, reserve_b, pool.total_lp_supply, now),
        })
    }

    /// Output a swap would produce right now, under the current fee
    /// configuration.
    ///
    /// # Errors
    /// `InvalidPair`, `PoolNotFound`, and the pair math errors.
    pub fn quote_swap(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: Amount,
    ) -> Result<Amount> {
        let pair = PairKey::canonical(token_in, token_out)?;
        let pool = self.pools.require(&pair)?;
        let side_in = PoolSide::of(&pair, token_in).unwrap_or(PoolSide::A);
        let (reserve_in, reserve_out) = pool.reserves_for(side_in);
        get_amount_out(
            amount_in,
            reserve_in,
            reserve_out,
            self.fees.config().effective_trading_fee_bps(),
        )
    }

    // -----------------------------------------------------------------
    // Protocol fees
    // -----------------------------------------------------------------

    /// Send a pool's accumulated protocol fees to the fee recipient and
    /// zero its counters.
    ///
    /// # Errors
    /// `InvalidPair`, `PoolNotFound`, `NoFeesToCollect`, collaborator
    /// failures.
    pub fn collect_protocol_fees(
        &mut self,
        caller: Address,
        token_a: Address,
        token_b: Address,
        now: Timestamp,
    ) -> Result<CollectedFees> {
        let pair = PairKey::canonical(token_a, token_b)?;
        let pool_id = self.pools.require(&pair)?.id;
        let due = self.fees.pending_collection(pool_id)?;
        let recipient = self.fees.config().fee_recipient;

        self.with_rollback(|core, journal| core.send_fees(&pair, recipient, due, journal))?;

        Ok(self.commit_collection(caller, pool_id, recipient, now))
    }

    /// Collect from every listed pool that has fees; pools without fees
    /// are skipped. The batch is all-or-nothing.
    ///
    /// # Errors
    /// Collaborator failures; every transfer of the batch is undone.
    pub fn collect_many(
        &mut self,
        caller: Address,
        pools: &[PoolId],
        now: Timestamp,
    ) -> Result<CollectionReport> {
        let (due, skipped) = self.fees.plan_collection(pools);
        let recipient = self.fees.config().fee_recipient;

        self.with_rollback(|core, journal| {
            for (pool_id, fees) in &due {
                let pair = core
                    .pools
                    .get_by_id(*pool_id)
                    .map(|p| p.pair)
                    .ok_or_else(|| {
                        PadswapError::Internal(format!("fees accrued for unknown {pool_id}"))
                    })?;
                core.send_fees(&pair, recipient, *fees, journal)?;
            }
            Ok(())
        })?;

        let collected = due
            .iter()
            .map(|(pool_id, _)| self.commit_collection(caller, *pool_id, recipient, now))
            .collect();
        Ok(CollectionReport { collected, skipped })
    }

    fn send_fees(
        &mut self,
        pair: &PairKey,
        recipient: Address,
        fees: AccumulatedFees,
        journal: &mut Journal,
    ) -> Result<()> {
        self.send(pair.token_a(), recipient, fees.token_a, journal)?;
        self.send(pair.token_b(), recipient, fees.token_b, journal)
    }

    fn commit_collection(
        &mut self,
        caller: Address,
        pool: PoolId,
        recipient: Address,
        now: Timestamp,
    ) -> CollectedFees {
        let fees = self.fees.commit_collection(pool);
        self.emit(
            now,
            AmmEvent::ProtocolFeesCollected {
                pool,
                recipient,
                amount_a: fees.token_a,
                amount_b: fees.token_b,
            },
        );
        tracing::info!(
            pool = %pool,
            caller = %caller,
            recipient = %recipient,
            amount_a = %fees.token_a,
            amount_b = %fees.token_b,
            "Protocol fees collected"
        );
        CollectedFees {
            pool,
            recipient,
            amount_a: fees.token_a,
            amount_b: fees.token_b,
        }
    }

    // -----------------------------------------------------------------
    // Locks
    // -----------------------------------------------------------------

    /// Lock LP that `request.owner` already holds. Launch authority only.
    /// Replaces any existing lock of the owner in that pool.
    ///
    /// # Errors
    /// `Unauthorized`, `InvalidPair`, `PoolNotFound`,
    /// `InsufficientLpBalance`, `InvalidLockData`, `ZeroAmount`.
    pub fn create_liquidity_lock(
        &mut self,
        caller: Address,
        request: &LockRequest,
        now: Timestamp,
    ) -> Result<LiquidityLock> {
        self.require_launch_authority(caller)?;
        let pair = PairKey::canonical(request.token_a, request.token_b)?;
        let pool_id = self.pools.require(&pair)?.id;
        let balance = self.lp.balance_of(&pair, request.owner);
        if request.amount > balance {
            return Err(PadswapError::InsufficientLpBalance {
                needed: request.amount,
                available: balance,
            });
        }
        let lock = self.locks.create(
            pool_id,
            request.owner,
            request.project_id,
            request.amount,
            request.duration_secs,
            now,
        )?;
        self.emit(
            now,
            AmmEvent::LiquidityLocked {
                pool: pool_id,
                owner: lock.project_owner,
                project_id: lock.project_id,
                amount: lock.locked_lp_amount,
                unlock_time: lock.unlock_time,
            },
        );
        Ok(lock)
    }

    /// Manually unlock the caller's expired lock in a pool.
    ///
    /// # Errors
    /// `InvalidPair`, `PoolNotFound`, `InvalidLockData` (no active lock),
    /// `LiquidityIsLocked` (not yet expired).
    pub fn unlock_liquidity(
        &mut self,
        caller: Address,
        token_a: Address,
        token_b: Address,
        now: Timestamp,
    ) -> Result<ReleasedLock> {
        let pair = PairKey::canonical(token_a, token_b)?;
        let pool_id = self.pools.require(&pair)?.id;
        let released = self.locks.manual_unlock(pool_id, caller, now)?;
        self.emit_unlocked(now, &released, false);
        Ok(released)
    }

    fn emit_unlocked(&mut self, now: Timestamp, released: &ReleasedLock, automatic: bool) {
        self.emit(
            now,
            AmmEvent::LiquidityUnlocked {
                pool: released.pool,
                owner: released.owner,
                project_id: released.project_id,
                amount: released.amount,
                automatic,
            },
        );
        tracing::info!(
            pool = %released.pool,
            owner = %released.owner,
            amount = %released.amount,
            automatic,
            "Liquidity unlocked"
        );
    }

    // -----------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------

    /// Replace the fee configuration. Admin only.
    ///
    /// # Errors
    /// `Unauthorized`, `InvalidFeeConfiguration`.
    pub fn set_fee_config(
        &mut self,
        caller: Address,
        fee: FeeConfig,
        now: Timestamp,
    ) -> Result<()> {
        self.require_admin(caller)?;
        self.fees.set_config(fee)?;
        self.config.fee = fee;
        self.emit_fee_config(now);
        Ok(())
    }

    /// Switch swap fees on or off. Admin only.
    ///
    /// # Errors
    /// `Unauthorized`.
    pub fn set_fees_enabled(
        &mut self,
        caller: Address,
        enabled: bool,
        now: Timestamp,
    ) -> Result<()> {
        self.require_admin(caller)?;
        self.fees.set_fees_enabled(enabled);
        self.config.fee.fees_enabled = enabled;
        self.emit_fee_config(now);
        Ok(())
    }

    fn emit_fee_config(&mut self, now: Timestamp) {
        let fee = *self.fees.config();
        self.emit(
            now,
            AmmEvent::FeeConfigUpdated {
                trading_fee_bps: fee.trading_fee_bps,
                protocol_fee_bps: fee.protocol_fee_bps,
                fee_recipient: fee.fee_recipient,
                fees_enabled: fee.fees_enabled,
            },
        );
        tracing::info!(
            trading_fee_bps = fee.trading_fee_bps,
            protocol_fee_bps = fee.protocol_fee_bps,
            fee_recipient = %fee.fee_recipient,
            fees_enabled = fee.fees_enabled,
            "Fee configuration updated"
        );
    }

    fn require_admin(&self, caller: Address) -> Result<()> {
        if caller != self.config.admin {
            tracing::warn!(caller = %caller, "Admin operation rejected");
            return Err(PadswapError::Unauthorized {
                reason: format!("{caller} is not the admin"),
            });
        }
        Ok(())
    }

    fn require_launch_authority(&self, caller: Address) -> Result<()> {
        if caller != self.registry.launch_authority() {
            tracing::warn!(caller = %caller, "Launch-authority operation rejected");
            return Err(PadswapError::Unauthorized {
                reason: format!("{caller} is not the launch authority"),
            });
        }
        Ok(())
    }

    fn authorize_pool_creation(&self, caller: Address, pair: &PairKey) -> Result<()> {
        let authority = self.registry.launch_authority();
        for token in [pair.token_a(), pair.token_b()] {
            if self.registry.is_project_token(token) && caller != authority {
                tracing::warn!(
                    caller = %caller,
                    token = %token,
                    "Unauthorized pool creation for project token"
                );
                return Err(PadswapError::UnauthorizedPoolCreation { caller, token });
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Invariants
    // -----------------------------------------------------------------

    /// Compare the pool's cached LP supply with the LP ledger.
    ///
    /// # Errors
    /// `InvalidPair`, `PoolNotFound`, or `SupplyInvariantViolation`.
    pub fn verify_lp_supply(&self, token_a: Address, token_b: Address) -> Result<()> {
        let pair = PairKey::canonical(token_a, token_b)?;
        let pool = self.pools.require(&pair)?;
        let ledger = self.lp.total_supply(&pair);
        if pool.total_lp_supply != ledger {
            tracing::error!(
                pool = %pool.id,
                cached = %pool.total_lp_supply,
                ledger = %ledger,
                "LP supply invariant violated"
            );
            return Err(PadswapError::SupplyInvariantViolation {
                reason: format!(
                    "{}: cached supply {} != ledger supply {ledger}",
                    pool.id, pool.total_lp_supply
                ),
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// # Errors
    /// `InvalidPair`, `PoolNotFound`.
    pub fn pool(&self, token_a: Address, token_b: Address) -> Result<&Pool> {
        let pair = PairKey::canonical(token_a, token_b)?;
        self.pools.require(&pair)
    }

    #[must_use]
    pub fn pool_by_id(&self, id: PoolId) -> Option<&Pool> {
        self.pools.get_by_id(id)
    }

    /// All pools in creation order.
    pub fn pools(&self) -> impl Iterator<Item = &Pool> {
        self.pools.iter()
    }

    /// Reserves in the order the tokens are given.
    ///
    /// # Errors
    /// `InvalidPair`, `PoolNotFound`.
    pub fn reserves(&self, token_a: Address, token_b: Address) -> Result<(Amount, Amount)> {
        let pool = self.pool(token_a, token_b)?;
        Ok(orient(
            token_a != pool.pair.token_a(),
            pool.reserve_a,
            pool.reserve_b,
        ))
    }

    /// TWAP accumulators, always in canonical pair order.
    ///
    /// # Errors
    /// `InvalidPair`, `PoolNotFound`.
    pub fn twap(&self, token_a: Address, token_b: Address) -> Result<TwapData> {
        Ok(self.pool(token_a, token_b)?.twap)
    }

    /// Average prices since an earlier [`AmmCore::twap`] sample. `None`
    /// if no time has passed since the sample.
    ///
    /// # Errors
    /// `InvalidPair`, `PoolNotFound`.
    pub fn twap_since(
        &self,
        token_a: Address,
        token_b: Address,
        earlier: &TwapData,
    ) -> Result<Option<TwapAverage>> {
        let current = self.pool(token_a, token_b)?.twap;
        Ok(twap_average_price(earlier, &current))
    }

    /// Spot price of `token_a` in `token_b`, for display. `None` while the
    /// pool is empty.
    ///
    /// # Errors
    /// `InvalidPair`, `PoolNotFound`.
    pub fn spot_price(&self, token_a: Address, token_b: Address) -> Result<Option<Decimal>> {
        let (base, quote) = self.reserves(token_a, token_b)?;
        Ok(spot_price(base, quote))
    }

    /// # Errors
    /// `InvalidPair`, `PoolNotFound`.
    pub fn lock(
        &self,
        token_a: Address,
        token_b: Address,
        owner: Address,
    ) -> Result<Option<&LiquidityLock>> {
        let pool_id = self.pool(token_a, token_b)?.id;
        Ok(self.locks.lock(pool_id, owner))
    }

    /// LP of `owner` that could be withdrawn at `now`.
    ///
    /// # Errors
    /// `InvalidPair`, `PoolNotFound`.
    pub fn withdrawable_lp(
        &self,
        token_a: Address,
        token_b: Address,
        owner: Address,
        now: Timestamp,
    ) -> Result<Amount> {
        let pool = self.pool(token_a, token_b)?;
        let balance = self.lp.balance_of(&pool.pair, owner);
        Ok(self.locks.withdrawable(pool.id, owner, balance, now))
    }

    /// Earnings of `user`'s current LP balance, in canonical pair order.
    ///
    /// # Errors
    /// `InvalidPair`, `PoolNotFound`, math errors.
    pub fn unrealized_earnings(
        &self,
        user: Address,
        token_a: Address,
        token_b: Address,
        now: Timestamp,
    ) -> Result<UnrealizedEarnings> {
        let pool = self.pool(token_a, token_b)?;
        let balance = self.lp.balance_of(&pool.pair, user);
        self.earnings
            .unrealized(user, pool.id, balance, pool.view(), now)
    }

    /// Cumulative realized earnings, in canonical pair order.
    ///
    /// # Errors
    /// `InvalidPair`, `PoolNotFound`.
    pub fn realized_earnings(
        &self,
        user: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<RealizedEarnings> {
        let pool_id = self.pool(token_a, token_b)?.id;
        Ok(self.earnings.realized(user, pool_id))
    }

    /// # Errors
    /// `InvalidPair`, `PoolNotFound`.
    pub fn snapshots(
        &self,
        user: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<&[LpSnapshot]> {
        let pool_id = self.pool(token_a, token_b)?.id;
        Ok(self.earnings.snapshots(user, pool_id))
    }

    /// # Errors
    /// `InvalidPair`, `PoolNotFound`.
    pub fn accumulated_fees(&self, token_a: Address, token_b: Address) -> Result<AccumulatedFees> {
        let pool_id = self.pool(token_a, token_b)?.id;
        Ok(self.fees.accumulated(pool_id))
    }

    /// # Errors
    /// `InvalidPair`, `PoolNotFound`.
    pub fn fee_stats(&self, token_a: Address, token_b: Address) -> Result<FeeStats> {
        let pool_id = self.pool(token_a, token_b)?.id;
        Ok(self.fees.stats(pool_id))
    }

    #[must_use]
    pub fn fee_config(&self) -> &FeeConfig {
        self.fees.config()
    }

    #[must_use]
    pub fn config(&self) -> &AmmConfig {
        &self.config
    }

    // -----------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------

    #[must_use]
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Take every buffered event. Sequence numbers keep counting.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, now: Timestamp, event: AmmEvent) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.events.push(EventRecord {
            sequence,
            timestamp: now,
            event,
        });
    }

    // -----------------------------------------------------------------
    // Collaborators
    // -----------------------------------------------------------------

    #[must_use]
    pub fn tokens(&self) -> &T {
        &self.tokens
    }

    pub fn tokens_mut(&mut self) -> &mut T {
        &mut self.tokens
    }

    #[must_use]
    pub fn lp_ledger(&self) -> &L {
        &self.lp
    }

    pub fn lp_ledger_mut(&mut self) -> &mut L {
        &mut self.lp
    }

    #[must_use]
    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    /// Run the EFFECTS phase; on error, compensate what it recorded.
    fn with_rollback<X>(
        &mut self,
        effects: impl FnOnce(&mut Self, &mut Journal) -> Result<X>,
    ) -> Result<X> {
        let mut journal = Journal::new();
        match effects(self, &mut journal) {
            Ok(value) => Ok(value),
            Err(cause) => Err(journal.compensate(&mut self.tokens, &mut self.lp, cause)),
        }
    }

    /// Pull `amount` of `token` from `owner` into the vault. Returns what
    /// the vault actually received.
    fn pull(
        &mut self,
        token: Address,
        owner: Address,
        amount: Amount,
        journal: &mut Journal,
    ) -> Result<Amount> {
        let vault = self.config.vault;
        let before = self.tokens.balance_of(token, vault);
        self.tokens.transfer_from(token, owner, vault, amount)?;
        let received = self.tokens.balance_of(token, vault).saturating_sub(before);
        journal.record(Effect::TokenPulled {
            token,
            owner,
            vault,
            received,
        });
        if received != amount {
            tracing::debug!(
                token = %token,
                requested = %amount,
                received = %received,
                "Fee-on-transfer shortfall"
            );
        }
        Ok(received)
    }

    /// Send `amount` of `token` from the vault to `to`. Zero is a no-op.
    fn send(
        &mut self,
        token: Address,
        to: Address,
        amount: Amount,
        journal: &mut Journal,
    ) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let vault = self.config.vault;
        self.tokens.transfer(token, vault, to, amount)?;
        journal.record(Effect::TokenSent {
            token,
            vault,
            to,
            amount,
        });
        Ok(())
    }
}
