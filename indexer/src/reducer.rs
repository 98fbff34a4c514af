//! The event reducer: create/burn/claim state transitions.

use crate::config::{IndexerConfig, UnknownWalletBurns};
use crate::error::ReduceError;
use stakeindex_events::{EventContext, EventRecord, StakingEvent};
use stakeindex_store::stake::{StakeRecord, StakeStore};
use stakeindex_store::wallet::{WalletRecord, WalletStore};
use stakeindex_types::{Timestamp, TokenAmount, WalletAddress};
use tracing::{debug, error, warn};

/// Applies decoded staking events to the entity store.
///
/// Stores are injected as trait objects so the same reducer runs against
/// LMDB in production and the in-memory nullable store in tests. The reducer
/// holds no state of its own: every transition reads from and writes to the
/// stores, and each `put` is durable before the handler returns.
pub struct EventReducer<'a> {
    wallets: &'a dyn WalletStore,
    stakes: &'a dyn StakeStore,
    config: IndexerConfig,
}

impl<'a> EventReducer<'a> {
    pub fn new(wallets: &'a dyn WalletStore, stakes: &'a dyn StakeStore) -> Self {
        Self::with_config(wallets, stakes, IndexerConfig::default())
    }

    pub fn with_config(
        wallets: &'a dyn WalletStore,
        stakes: &'a dyn StakeStore,
        config: IndexerConfig,
    ) -> Self {
        Self {
            wallets,
            stakes,
            config,
        }
    }

    /// Route one event to its handler. Pure dispatch, no business logic.
    pub fn apply(&self, record: &EventRecord) -> Result<(), ReduceError> {
        match &record.event {
            StakingEvent::StakeCreated {
                user,
                amount,
                multiplier,
                start_timestamp,
            } => self.on_stake_created(&record.context, user, *amount, *multiplier, *start_timestamp),
            StakingEvent::StakeBurned { user, burn_amount } => {
                self.on_stake_burned(&record.context, user, *burn_amount)
            }
            StakingEvent::StakeClaimed {
                user,
                total_user_staked,
                klima_allocation,
                klimax_allocation,
            } => self.on_stake_claimed(
                &record.context,
                user,
                *total_user_staked,
                *klima_allocation,
                *klimax_allocation,
            ),
        }
    }

    /// Return the persisted wallet, or a fresh zero-valued one.
    ///
    /// Does not persist: the caller saves after mutating, so two calls
    /// without an intervening save both see the unpersisted default.
    fn load_or_create_wallet(
        &self,
        address: &WalletAddress,
    ) -> Result<WalletRecord, ReduceError> {
        Ok(self
            .wallets
            .get_wallet(address)?
            .unwrap_or_else(|| WalletRecord::empty(*address)))
    }

    /// `StakeCreated`: credit the wallet total and append one stake record
    /// keyed by the creating transaction hash.
    fn on_stake_created(
        &self,
        ctx: &EventContext,
        user: &WalletAddress,
        amount: TokenAmount,
        multiplier: u64,
        start_timestamp: Timestamp,
    ) -> Result<(), ReduceError> {
        let mut wallet = self.load_or_create_wallet(user)?;
        wallet.total_staked = wallet
            .total_staked
            .checked_add(amount)
            .ok_or(ReduceError::Overflow {
                tx: ctx.transaction_hash,
            })?;
        self.wallets.put_wallet(&wallet)?;

        let stake = StakeRecord {
            id: ctx.transaction_hash,
            wallet: *user,
            amount,
            multiplier,
            start_timestamp,
            stake_creation_hash: ctx.transaction_hash,
        };
        self.stakes.put_stake(&stake)?;

        debug!(user = %user, tx = %ctx.transaction_hash, %amount, "stake created");
        Ok(())
    }

    /// `StakeBurned`: debit the wallet total, then distribute the burn
    /// across the wallet's stakes, newest start timestamp first.
    ///
    /// The newest-first order is product policy (early-unstake penalties eat
    /// the newest positions), not an implementation detail: it decides which
    /// multipliers and timestamps survive a partial burn. Ties on the start
    /// timestamp break by stake id, ascending, so allocation never depends
    /// on store iteration order.
    fn on_stake_burned(
        &self,
        ctx: &EventContext,
        user: &WalletAddress,
        burn_amount: TokenAmount,
    ) -> Result<(), ReduceError> {
        if burn_amount.is_zero() {
            error!(user = %user, tx = %ctx.transaction_hash, "burn event with zero amount, ignoring");
            return Ok(());
        }

        let mut wallet = match self.config.unknown_wallet_burns {
            UnknownWalletBurns::CreateEmpty => self.load_or_create_wallet(user)?,
            UnknownWalletBurns::Skip => match self.wallets.get_wallet(user)? {
                Some(wallet) => wallet,
                None => {
                    error!(user = %user, tx = %ctx.transaction_hash, "burn for unknown wallet, ignoring");
                    return Ok(());
                }
            },
        };

        // The wallet total drops by the full burn amount even when the
        // stakes below cannot absorb it all; only an outright underflow is
        // clamped (and flagged). This asymmetry matches the contract's
        // accounting.
        wallet.total_staked = match wallet.total_staked.checked_sub(burn_amount) {
            Some(remaining) => remaining,
            None => {
                warn!(
                    user = %user,
                    tx = %ctx.transaction_hash,
                    total_staked = %wallet.total_staked,
                    %burn_amount,
                    "burn exceeds wallet total, clamping to zero"
                );
                TokenAmount::ZERO
            }
        };
        self.wallets.put_wallet(&wallet)?;

        let mut stakes = self.stakes.stakes_for_wallet(user)?;
        stakes.sort_by(|a, b| {
            b.start_timestamp
                .cmp(&a.start_timestamp)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut remaining_burn = burn_amount;
        for stake in &mut stakes {
            if remaining_burn.is_zero() {
                break;
            }
            // Already fully consumed by an earlier burn.
            if stake.amount.is_zero() {
                continue;
            }
            if stake.amount >= remaining_burn {
                stake.amount = stake.amount - remaining_burn;
                remaining_burn = TokenAmount::ZERO;
                self.stakes.put_stake(stake)?;
            } else {
                remaining_burn = remaining_burn - stake.amount;
                stake.amount = TokenAmount::ZERO;
                self.stakes.put_stake(stake)?;
            }
        }

        if !remaining_burn.is_zero() {
            warn!(
                user = %user,
                tx = %ctx.transaction_hash,
                unallocated = %remaining_burn,
                "burn exceeds sum of stake amounts; remainder not distributed"
            );
        }
        debug!(user = %user, tx = %ctx.transaction_hash, %burn_amount, "burn applied");
        Ok(())
    }

    /// `StakeClaimed`: authoritative overwrite of the wallet's totals with
    /// the contract's values. Strict-load: a claim cannot conjure a wallet.
    /// Stake records are untouched.
    fn on_stake_claimed(
        &self,
        ctx: &EventContext,
        user: &WalletAddress,
        total_user_staked: TokenAmount,
        klima_allocation: TokenAmount,
        klimax_allocation: TokenAmount,
    ) -> Result<(), ReduceError> {
        let mut wallet = match self.wallets.get_wallet(user)? {
            Some(wallet) => wallet,
            None => {
                error!(user = %user, tx = %ctx.transaction_hash, "claim for unknown wallet, ignoring");
                return Ok(());
            }
        };
        wallet.klima_allocation = klima_allocation;
        wallet.klimax_allocation = klimax_allocation;
        wallet.total_staked = total_user_staked;
        self.wallets.put_wallet(&wallet)?;

        debug!(user = %user, tx = %ctx.transaction_hash, "claim reconciled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use stakeindex_nullables::NullStore;
    use stakeindex_types::TxHash;

    fn addr(n: u8) -> WalletAddress {
        WalletAddress::new([n; 20])
    }

    fn tx(n: u8) -> TxHash {
        TxHash::new([n; 32])
    }

    fn ctx(n: u8) -> EventContext {
        EventContext {
            transaction_hash: tx(n),
            block_number: n as u64,
            log_index: 0,
        }
    }

    fn created(n: u8, user: WalletAddress, amount: u128, ts: u64) -> EventRecord {
        EventRecord {
            context: ctx(n),
            event: StakingEvent::StakeCreated {
                user,
                amount: TokenAmount::new(amount),
                multiplier: 1,
                start_timestamp: Timestamp::new(ts),
            },
        }
    }

    fn burned(n: u8, user: WalletAddress, amount: u128) -> EventRecord {
        EventRecord {
            context: ctx(n),
            event: StakingEvent::StakeBurned {
                user,
                burn_amount: TokenAmount::new(amount),
            },
        }
    }

    fn claimed(n: u8, user: WalletAddress, total: u128, klima: u128, klimax: u128) -> EventRecord {
        EventRecord {
            context: ctx(n),
            event: StakingEvent::StakeClaimed {
                user,
                total_user_staked: TokenAmount::new(total),
                klima_allocation: TokenAmount::new(klima),
                klimax_allocation: TokenAmount::new(klimax),
            },
        }
    }

    fn amount_of(store: &NullStore, id: TxHash) -> TokenAmount {
        store.get_stake(&id).unwrap().unwrap().amount
    }

    #[test]
    fn creation_accumulates_wallet_total_and_records_stakes() {
        let store = NullStore::new();
        let reducer = EventReducer::new(&store, &store);
        let user = addr(1);

        reducer.apply(&created(1, user, 100, 1000)).unwrap();
        reducer.apply(&created(2, user, 250, 2000)).unwrap();
        reducer.apply(&created(3, user, 50, 3000)).unwrap();

        let wallet = store.get_wallet(&user).unwrap().unwrap();
        assert_eq!(wallet.total_staked, TokenAmount::new(400));
        assert_eq!(wallet.klima_allocation, TokenAmount::ZERO);
        assert_eq!(wallet.klimax_allocation, TokenAmount::ZERO);

        let stakes = store.stakes_for_wallet(&user).unwrap();
        assert_eq!(stakes.len(), 3);
        let second = store.get_stake(&tx(2)).unwrap().unwrap();
        assert_eq!(second.wallet, user);
        assert_eq!(second.amount, TokenAmount::new(250));
        assert_eq!(second.multiplier, 1);
        assert_eq!(second.start_timestamp, Timestamp::new(2000));
        assert_eq!(second.stake_creation_hash, tx(2));
    }

    #[test]
    fn zero_amount_stake_still_creates_a_record() {
        let store = NullStore::new();
        let reducer = EventReducer::new(&store, &store);
        let user = addr(1);

        reducer.apply(&created(1, user, 0, 1000)).unwrap();

        let wallet = store.get_wallet(&user).unwrap().unwrap();
        assert_eq!(wallet.total_staked, TokenAmount::ZERO);
        assert_eq!(store.stakes_for_wallet(&user).unwrap().len(), 1);
    }

    #[test]
    fn burn_consumes_newest_stakes_first() {
        let store = NullStore::new();
        let reducer = EventReducer::new(&store, &store);
        let user = addr(1);

        // Timestamps t1 < t2 < t3 < t4 with amounts 50, 100, 25, 100.
        reducer.apply(&created(1, user, 50, 1000)).unwrap();
        reducer.apply(&created(2, user, 100, 2000)).unwrap();
        reducer.apply(&created(3, user, 25, 3000)).unwrap();
        reducer.apply(&created(4, user, 100, 4000)).unwrap();

        reducer.apply(&burned(5, user, 200)).unwrap();

        // Newest consumed first: t4 and t3 zeroed, t2 partially debited,
        // t1 untouched.
        assert_eq!(amount_of(&store, tx(1)), TokenAmount::new(50));
        assert_eq!(amount_of(&store, tx(2)), TokenAmount::new(25));
        assert_eq!(amount_of(&store, tx(3)), TokenAmount::ZERO);
        assert_eq!(amount_of(&store, tx(4)), TokenAmount::ZERO);

        let wallet = store.get_wallet(&user).unwrap().unwrap();
        assert_eq!(wallet.total_staked, TokenAmount::new(75));
    }

    #[test]
    fn burn_skips_already_consumed_stakes() {
        let store = NullStore::new();
        let reducer = EventReducer::new(&store, &store);
        let user = addr(1);

        reducer.apply(&created(1, user, 30, 1000)).unwrap();
        reducer.apply(&created(2, user, 40, 2000)).unwrap();

        // First burn zeroes the newest stake exactly.
        reducer.apply(&burned(3, user, 40)).unwrap();
        assert_eq!(amount_of(&store, tx(2)), TokenAmount::ZERO);
        assert_eq!(amount_of(&store, tx(1)), TokenAmount::new(30));

        // Second burn must skip the zeroed stake and debit the older one.
        reducer.apply(&burned(4, user, 10)).unwrap();
        assert_eq!(amount_of(&store, tx(2)), TokenAmount::ZERO);
        assert_eq!(amount_of(&store, tx(1)), TokenAmount::new(20));
    }

    #[test]
    fn equal_timestamps_break_ties_by_stake_id() {
        let store = NullStore::new();
        let reducer = EventReducer::new(&store, &store);
        let user = addr(1);

        reducer.apply(&created(9, user, 10, 1000)).unwrap();
        reducer.apply(&created(2, user, 10, 1000)).unwrap();

        // Lower id debited first among equal timestamps.
        reducer.apply(&burned(5, user, 10)).unwrap();
        assert_eq!(amount_of(&store, tx(2)), TokenAmount::ZERO);
        assert_eq!(amount_of(&store, tx(9)), TokenAmount::new(10));
    }

    #[test]
    fn zero_burn_changes_nothing() {
        let store = NullStore::new();
        let reducer = EventReducer::new(&store, &store);
        let user = addr(1);

        reducer.apply(&created(1, user, 100, 1000)).unwrap();
        reducer.apply(&burned(2, user, 0)).unwrap();

        let wallet = store.get_wallet(&user).unwrap().unwrap();
        assert_eq!(wallet.total_staked, TokenAmount::new(100));
        assert_eq!(amount_of(&store, tx(1)), TokenAmount::new(100));
    }

    #[test]
    fn burn_overrun_leaves_wallet_stake_discrepancy() {
        let store = NullStore::new();
        let reducer = EventReducer::new(&store, &store);
        let user = addr(1);

        // A claim sets the wallet total above what the stakes hold.
        reducer.apply(&created(1, user, 100, 1000)).unwrap();
        reducer.apply(&claimed(2, user, 1000, 0, 0)).unwrap();

        // The wallet absorbs the full 150; the single stake only 100.
        reducer.apply(&burned(3, user, 150)).unwrap();

        let wallet = store.get_wallet(&user).unwrap().unwrap();
        assert_eq!(wallet.total_staked, TokenAmount::new(850));
        assert_eq!(amount_of(&store, tx(1)), TokenAmount::ZERO);
    }

    #[test]
    fn burn_underflow_clamps_wallet_total_to_zero() {
        let store = NullStore::new();
        let reducer = EventReducer::new(&store, &store);
        let user = addr(1);

        reducer.apply(&created(1, user, 100, 1000)).unwrap();
        reducer.apply(&burned(2, user, 150)).unwrap();

        let wallet = store.get_wallet(&user).unwrap().unwrap();
        assert_eq!(wallet.total_staked, TokenAmount::ZERO);
        assert_eq!(amount_of(&store, tx(1)), TokenAmount::ZERO);
    }

    #[test]
    fn burn_for_unknown_wallet_creates_empty_wallet_by_default() {
        let store = NullStore::new();
        let reducer = EventReducer::new(&store, &store);
        let user = addr(7);

        reducer.apply(&burned(1, user, 50)).unwrap();

        let wallet = store.get_wallet(&user).unwrap().unwrap();
        assert_eq!(wallet.total_staked, TokenAmount::ZERO);
        assert_eq!(store.stakes_for_wallet(&user).unwrap().len(), 0);
    }

    #[test]
    fn burn_for_unknown_wallet_skipped_under_strict_policy() {
        let store = NullStore::new();
        let config = IndexerConfig {
            unknown_wallet_burns: UnknownWalletBurns::Skip,
        };
        let reducer = EventReducer::with_config(&store, &store, config);
        let user = addr(7);

        reducer.apply(&burned(1, user, 50)).unwrap();

        assert!(store.get_wallet(&user).unwrap().is_none());
    }

    #[test]
    fn claim_overwrites_wallet_totals_authoritatively() {
        let store = NullStore::new();
        let reducer = EventReducer::new(&store, &store);
        let user = addr(1);

        reducer.apply(&created(1, user, 500, 1000)).unwrap();
        reducer.apply(&claimed(2, user, 321, 11, 22)).unwrap();

        let wallet = store.get_wallet(&user).unwrap().unwrap();
        assert_eq!(wallet.total_staked, TokenAmount::new(321));
        assert_eq!(wallet.klima_allocation, TokenAmount::new(11));
        assert_eq!(wallet.klimax_allocation, TokenAmount::new(22));
        // Stake records are untouched by a claim.
        assert_eq!(amount_of(&store, tx(1)), TokenAmount::new(500));
    }

    #[test]
    fn claim_is_idempotent() {
        let store = NullStore::new();
        let reducer = EventReducer::new(&store, &store);
        let user = addr(1);

        reducer.apply(&created(1, user, 500, 1000)).unwrap();
        reducer.apply(&claimed(2, user, 321, 11, 22)).unwrap();
        let after_once = store.get_wallet(&user).unwrap().unwrap();

        reducer.apply(&claimed(2, user, 321, 11, 22)).unwrap();
        let after_twice = store.get_wallet(&user).unwrap().unwrap();
        assert_eq!(after_once, after_twice);
    }

    #[test]
    fn claim_for_unknown_wallet_creates_nothing() {
        let store = NullStore::new();
        let reducer = EventReducer::new(&store, &store);

        reducer.apply(&claimed(1, addr(9), 100, 1, 2)).unwrap();

        assert!(store.get_wallet(&addr(9)).unwrap().is_none());
        assert_eq!(store.wallet_count().unwrap(), 0);
        assert_eq!(store.stake_count().unwrap(), 0);
    }

    #[test]
    fn wallets_are_isolated() {
        let store = NullStore::new();
        let reducer = EventReducer::new(&store, &store);
        let alice = addr(1);
        let bob = addr(2);

        reducer.apply(&created(1, alice, 100, 1000)).unwrap();
        reducer.apply(&created(2, bob, 200, 1000)).unwrap();
        reducer.apply(&burned(3, alice, 60)).unwrap();

        let bob_wallet = store.get_wallet(&bob).unwrap().unwrap();
        assert_eq!(bob_wallet.total_staked, TokenAmount::new(200));
        assert_eq!(amount_of(&store, tx(2)), TokenAmount::new(200));
    }

    proptest! {
        /// For any burn not exceeding the stake sum, the total deducted
        /// across stakes equals the burn, and consumption in newest-first
        /// order is: some fully zeroed, at most one partial, rest untouched.
        #[test]
        fn partial_burn_conserves_and_orders(
            amounts in proptest::collection::vec(1u128..1_000, 1..20),
            timestamps in proptest::collection::vec(0u64..100, 1..20),
            burn_fraction in 0.0f64..1.0,
        ) {
            let store = NullStore::new();
            let reducer = EventReducer::new(&store, &store);
            let user = addr(1);

            let n = amounts.len().min(timestamps.len());
            let mut total: u128 = 0;
            for i in 0..n {
                let record = EventRecord {
                    context: EventContext {
                        transaction_hash: TxHash::new([i as u8 + 1; 32]),
                        block_number: i as u64,
                        log_index: 0,
                    },
                    event: StakingEvent::StakeCreated {
                        user,
                        amount: TokenAmount::new(amounts[i]),
                        multiplier: 1,
                        start_timestamp: Timestamp::new(timestamps[i]),
                    },
                };
                reducer.apply(&record).unwrap();
                total += amounts[i];
            }
            let burn = ((total as f64) * burn_fraction) as u128;
            prop_assume!(burn > 0);

            let before = store.stakes_for_wallet(&user).unwrap();
            reducer.apply(&burned(200, user, burn)).unwrap();
            let after = store.stakes_for_wallet(&user).unwrap();

            let deducted: u128 = before
                .iter()
                .zip(after.iter())
                .map(|(b, a)| b.amount.raw() - a.amount.raw())
                .sum();
            prop_assert_eq!(deducted, burn);

            // Check the newest-first consumption shape.
            let mut pairs: Vec<_> = before.iter().zip(after.iter()).collect();
            pairs.sort_by(|(a, _), (b, _)| {
                b.start_timestamp
                    .cmp(&a.start_timestamp)
                    .then_with(|| a.id.cmp(&b.id))
            });
            let mut saw_untouched = false;
            for (b, a) in pairs {
                if a.amount.is_zero() && b.amount != a.amount {
                    prop_assert!(!saw_untouched, "zeroed stake after an untouched one");
                } else if b.amount != a.amount {
                    prop_assert!(!saw_untouched, "partial debit after an untouched stake");
                    saw_untouched = true;
                } else {
                    saw_untouched = true;
                }
            }
        }
    }
}
