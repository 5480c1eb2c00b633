//! Multi-user flows run against an in-memory keyed store.
//!
//! `Reserve` holds records the way the chain does (one map per seed family)
//! and mirrors each instruction handler: load records by key (a missing
//! `init_if_needed` record loads as its default), run the ledger transition
//! on copies, and write everything back only on success.

use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use proptest::prelude::*;

use crate::{
    constants::*,
    errors::ReserveError,
    ledger::{self, EpochClosure, Provisioned},
    state::*,
};

const START_TS: i64 = 1_700_000_000;

struct Reserve {
    cfg: GlobalDataAccount,
    epochs: BTreeMap<u64, EpochAccount>,
    locks: BTreeMap<(Pubkey, u64), LockAccount>,
    data: BTreeMap<Pubkey, UserDataAccount>,
    votes: BTreeMap<(Pubkey, u64), VoteAccount>,
    stats: BTreeMap<Pubkey, UserStatsAccount>,
    wallets: BTreeMap<Pubkey, u64>,
    holder: u64,
    locked_vault: u64,
    now: i64,
}

impl Reserve {
    fn new(admin: Pubkey) -> Self {
        let mut cfg = GlobalDataAccount::default();
        let mut genesis = EpochAccount::default();
        ledger::initialize_core(&mut cfg, &mut genesis, admin, START_TS).unwrap();

        let mut epochs = BTreeMap::new();
        epochs.insert(INITIAL_EPOCH, genesis);
        Self {
            cfg,
            epochs,
            locks: BTreeMap::new(),
            data: BTreeMap::new(),
            votes: BTreeMap::new(),
            stats: BTreeMap::new(),
            wallets: BTreeMap::new(),
            holder: 0,
            locked_vault: 0,
            now: START_TS,
        }
    }

    fn fund(&mut self, who: Pubkey, amount: u64) {
        *self.wallets.entry(who).or_default() += amount;
    }

    fn wallet(&self, who: Pubkey) -> u64 {
        self.wallets.get(&who).copied().unwrap_or(0)
    }

    fn debit(&mut self, who: Pubkey, amount: u64) -> Result<()> {
        let balance = self.wallets.entry(who).or_default();
        require!(*balance >= amount, ReserveError::InsufficientFunds);
        *balance -= amount;
        Ok(())
    }

    fn voting_power(&self, who: Pubkey) -> u64 {
        self.data.get(&who).map(|d| d.amount).unwrap_or(0)
    }

    // -- admin --

    fn deposit(&mut self, signer: Pubkey, amount: u64) -> Result<()> {
        ledger::assert_admin(&self.cfg, &signer)?;
        require!(amount > 0, ReserveError::InvalidAmount);
        let holder = self
            .holder
            .checked_add(amount)
            .ok_or(ReserveError::ArithmeticOverflow)?;
        self.debit(signer, amount)?;
        self.holder = holder;
        Ok(())
    }

    fn withdraw(&mut self, signer: Pubkey, amount: u64) -> Result<()> {
        ledger::assert_admin(&self.cfg, &signer)?;
        ledger::check_pool_withdrawal(&self.cfg, self.holder, amount)?;
        self.holder -= amount;
        self.fund(signer, amount);
        Ok(())
    }

    fn set_reward_mode(&mut self, signer: Pubkey, mode: RewardMode, param: u64) -> Result<()> {
        let mut cfg = self.cfg.clone();
        ledger::set_reward_mode_core(&mut cfg, &signer, mode as u8, param)?;
        self.cfg = cfg;
        Ok(())
    }

    // -- epochs --

    fn new_epoch(
        &mut self,
        caller: Pubkey,
        closing_epoch: u64,
        next_epoch: u64,
    ) -> Result<EpochClosure> {
        let mut cfg = self.cfg.clone();
        let mut closing = self
            .epochs
            .get(&closing_epoch)
            .cloned()
            .ok_or(ReserveError::NotFound)?;
        let mut opening = self.epochs.get(&next_epoch).cloned().unwrap_or_default();

        let closure = ledger::new_epoch_core(
            &mut cfg,
            &mut closing,
            &mut opening,
            0,
            &caller,
            next_epoch,
            self.holder,
            self.now,
        )?;

        self.epochs.insert(closing_epoch, closing);
        self.epochs.insert(next_epoch, opening);
        self.cfg = cfg;
        Ok(closure)
    }

    fn advance(&mut self, caller: Pubkey) -> Result<EpochClosure> {
        let current = self.cfg.epoch;
        self.new_epoch(caller, current, current + 1)
    }

    // -- locks --

    fn create_lock(&mut self, user: Pubkey, series_id: u64) -> Result<()> {
        let mut lock = self.locks.get(&(user, series_id)).cloned().unwrap_or_default();
        ledger::create_lock_core(&mut lock, user, series_id, 0)?;
        self.locks.insert((user, series_id), lock);
        Ok(())
    }

    fn lock(&mut self, user: Pubkey, series_id: u64, amount: u64) -> Result<()> {
        let mut lock = self
            .locks
            .get(&(user, series_id))
            .cloned()
            .ok_or(ReserveError::NotFound)?;
        let mut data = self.data.get(&user).cloned().unwrap_or_default();
        ledger::open_user_data(&mut data, user, 0)?;
        ledger::lock_core(&self.cfg, &mut lock, &mut data, amount)?;

        let vault = self
            .locked_vault
            .checked_add(amount)
            .ok_or(ReserveError::ArithmeticOverflow)?;
        self.debit(user, amount)?;

        self.locked_vault = vault;
        self.locks.insert((user, series_id), lock);
        self.data.insert(user, data);
        Ok(())
    }

    fn unlock(&mut self, user: Pubkey, series_id: u64, amount: u64) -> Result<()> {
        let mut lock = self
            .locks
            .get(&(user, series_id))
            .cloned()
            .ok_or(ReserveError::NotFound)?;
        let mut data = self.data.get(&user).cloned().ok_or(ReserveError::NotFound)?;
        let emptied = ledger::unlock_core(&self.cfg, &mut lock, &mut data, amount)?;
        let vault = self
            .locked_vault
            .checked_sub(amount)
            .ok_or(ReserveError::InsufficientFunds)?;

        self.locked_vault = vault;
        self.fund(user, amount);
        if emptied {
            self.locks.remove(&(user, series_id));
        } else {
            self.locks.insert((user, series_id), lock);
        }
        self.data.insert(user, data);
        Ok(())
    }

    // -- votes / claims --

    fn create_vote(&mut self, user: Pubkey, epoch: u64) -> Result<()> {
        let mut vote = self.votes.get(&(user, epoch)).cloned().unwrap_or_default();
        ledger::create_vote_core(&self.cfg, &mut vote, user, epoch, 0)?;
        self.votes.insert((user, epoch), vote);
        Ok(())
    }

    fn vote(
        &mut self,
        user: Pubkey,
        epoch: u64,
        weights: [u64; NUM_FIELDS],
    ) -> Result<Provisioned> {
        let mut record = self.epochs.get(&epoch).cloned().ok_or(ReserveError::NotFound)?;
        let data = self.data.get(&user).cloned().ok_or(ReserveError::NotFound)?;
        let mut vote = self.votes.get(&(user, epoch)).cloned().unwrap_or_default();

        let provisioned = ledger::open_vote_core(&self.cfg, &mut vote, user, epoch, 0)?;
        ledger::vote_core(&self.cfg, &mut record, &data, &mut vote, epoch, &weights)?;

        self.epochs.insert(epoch, record);
        self.votes.insert((user, epoch), vote);
        Ok(provisioned)
    }

    fn claim(&mut self, user: Pubkey, epoch: u64) -> Result<u64> {
        let mut cfg = self.cfg.clone();
        let mut stats = self.stats.get(&user).cloned().unwrap_or_default();
        ledger::open_user_stats(&mut stats, user, 0)?;

        let record = self.epochs.get(&epoch).ok_or(ReserveError::NotFound)?;
        let vote = self.votes.get(&(user, epoch));
        let payout = ledger::claim_core(&mut cfg, record, vote, &mut stats, epoch, self.holder)?;

        self.holder -= payout;
        self.fund(user, payout);
        self.votes.remove(&(user, epoch));
        self.stats.insert(user, stats);
        self.cfg = cfg;
        Ok(payout)
    }
}

fn expect_err<T: std::fmt::Debug>(res: Result<T>, expected: ReserveError) {
    assert_eq!(res.unwrap_err(), Error::from(expected));
}

fn single(field: usize, v: u64) -> [u64; NUM_FIELDS] {
    let mut w = [0u64; NUM_FIELDS];
    w[field] = v;
    w
}

fn locked_user(r: &mut Reserve, series_id: u64, amount: u64) -> Pubkey {
    let user = Pubkey::new_unique();
    r.fund(user, amount);
    r.create_lock(user, series_id).unwrap();
    r.lock(user, series_id, amount).unwrap();
    user
}

#[test]
fn unlock_after_window_returns_everything_and_deletes_position() {
    let admin = Pubkey::new_unique();
    let mut r = Reserve::new(admin);
    let user = Pubkey::new_unique();
    r.fund(user, 1_000);
    r.create_lock(user, 1).unwrap();
    r.lock(user, 1, 400).unwrap();
    assert_eq!(r.wallet(user), 600);
    assert_eq!(r.locked_vault, 400);

    expect_err(r.unlock(user, 1, 400), ReserveError::StillLocked);
    assert_eq!(r.locks[&(user, 1)].amount, 400);

    r.advance(admin).unwrap();
    r.unlock(user, 1, 400).unwrap();

    assert!(!r.locks.contains_key(&(user, 1)));
    assert_eq!(r.wallet(user), 1_000);
    assert_eq!(r.voting_power(user), 0);
    assert_eq!(r.locked_vault, 0);

    expect_err(r.unlock(user, 1, 1), ReserveError::NotFound);
    expect_err(r.lock(user, 1, 1), ReserveError::NotFound);
    r.create_lock(user, 1).unwrap();
}

#[test]
fn two_locks_in_one_epoch_share_unlock_epoch() {
    let mut r = Reserve::new(Pubkey::new_unique());
    let user = locked_user(&mut r, 1, 100);
    let first = r.locks[&(user, 1)].unlock_epoch;

    r.fund(user, 100);
    r.lock(user, 1, 100).unwrap();

    let lock = &r.locks[&(user, 1)];
    assert_eq!(lock.amount, 200);
    assert_eq!(lock.unlock_epoch, first);
    assert_eq!(r.voting_power(user), 200);
}

#[test]
fn series_are_tracked_independently() {
    let admin = Pubkey::new_unique();
    let mut r = Reserve::new(admin);
    let user = locked_user(&mut r, 1, 300);

    r.advance(admin).unwrap();
    r.advance(admin).unwrap();
    r.fund(user, 50);
    r.create_lock(user, 2).unwrap();
    r.lock(user, 2, 50).unwrap();
    assert_eq!(r.voting_power(user), 350);
    expect_err(r.create_lock(user, 2), ReserveError::AlreadyInitialized);

    r.unlock(user, 1, 300).unwrap();
    expect_err(r.unlock(user, 2, 50), ReserveError::StillLocked);
    assert_eq!(r.voting_power(user), 50);
    assert_eq!(r.locks[&(user, 2)].amount, 50);
}

#[test]
fn lock_without_funds_changes_nothing() {
    let mut r = Reserve::new(Pubkey::new_unique());
    let user = Pubkey::new_unique();
    r.fund(user, 10);
    r.create_lock(user, 1).unwrap();

    expect_err(r.lock(user, 1, 11), ReserveError::InsufficientFunds);
    assert_eq!(r.locks[&(user, 1)].amount, 0);
    assert!(!r.data.contains_key(&user));
    assert_eq!(r.wallet(user), 10);
}

#[test]
fn votes_accumulate_across_calls() {
    let mut r = Reserve::new(Pubkey::new_unique());
    let user = locked_user(&mut r, 1, 16_000);

    let mut four = [0u64; NUM_FIELDS];
    four[..4].copy_from_slice(&[500, 500, 500, 500]);
    assert_eq!(r.vote(user, 0, four).unwrap(), Provisioned::Created);
    assert_eq!(r.vote(user, 0, four).unwrap(), Provisioned::Existing);

    assert_eq!(&r.votes[&(user, 0)].fields[..4], &[1_000, 1_000, 1_000, 1_000]);
    assert_eq!(&r.epochs[&0].fields[..4], &[1_000, 1_000, 1_000, 1_000]);
    assert_eq!(r.epochs[&0].voters, 2);
    expect_err(r.create_vote(user, 0), ReserveError::AlreadyInitialized);
}

#[test]
fn explicit_vote_record_only_for_open_epoch() {
    let admin = Pubkey::new_unique();
    let mut r = Reserve::new(admin);
    let user = locked_user(&mut r, 1, 100);

    expect_err(r.create_vote(user, 1), ReserveError::EpochClosed);
    r.create_vote(user, 0).unwrap();
    assert_eq!(r.vote(user, 0, single(2, 40)).unwrap(), Provisioned::Existing);
}

#[test]
fn votes_after_close_cannot_touch_frozen_record() {
    let admin = Pubkey::new_unique();
    let mut r = Reserve::new(admin);
    let user = locked_user(&mut r, 1, 1_000);
    r.vote(user, 0, single(0, 100)).unwrap();

    r.advance(admin).unwrap();
    let frozen = r.epochs[&0].clone();
    expect_err(r.vote(user, 0, single(0, 100)), ReserveError::EpochClosed);
    assert_eq!(r.epochs[&0], frozen);

    r.vote(user, 1, single(0, 1_000)).unwrap();
    assert_eq!(r.epochs[&1].fields[0], 1_000);
}

#[test]
fn only_one_close_per_epoch() {
    let admin = Pubkey::new_unique();
    let mut r = Reserve::new(admin);

    r.new_epoch(admin, 0, 1).unwrap();
    let (cfg, epochs) = (r.cfg.clone(), r.epochs.clone());

    // replays land on records that already exist
    assert!(r.epochs.contains_key(&1));
    expect_err(r.new_epoch(admin, 0, 1), ReserveError::EpochOutOfOrder);
    expect_err(r.new_epoch(admin, 1, 0), ReserveError::EpochOutOfOrder);
    expect_err(r.new_epoch(admin, 1, 1), ReserveError::EpochOutOfOrder);
    expect_err(r.new_epoch(admin, 0, 2), ReserveError::WrongEpochRecord);
    expect_err(r.new_epoch(admin, 1, 3), ReserveError::EpochOutOfOrder);
    assert_eq!(r.cfg, cfg);
    assert_eq!(r.epochs, epochs);
}

#[test]
fn anyone_can_advance_once_epoch_elapsed() {
    let admin = Pubkey::new_unique();
    let crank = Pubkey::new_unique();
    let mut r = Reserve::new(admin);

    r.now += DEFAULT_EPOCH_LENGTH as i64 - 1;
    expect_err(r.advance(crank), ReserveError::EpochNotElapsed);
    r.now += 1;
    r.advance(crank).unwrap();
    assert_eq!(r.cfg.epoch, 1);

    // admin is not bound by the clock
    r.advance(admin).unwrap();
    assert_eq!(r.cfg.epoch, 2);
}

#[test]
fn lock_vote_close_claim_end_to_end() {
    let admin = Pubkey::new_unique();
    let mut r = Reserve::new(admin);
    r.fund(admin, 100_000);
    r.deposit(admin, 50_000).unwrap();

    let alice = locked_user(&mut r, 1, 16_000);
    let bob = locked_user(&mut r, 1, 8_000);

    let mut alice_w = single(3, 6_000);
    alice_w[7] = 10_000;
    r.vote(alice, 0, alice_w).unwrap();
    r.vote(bob, 0, single(3, 8_000)).unwrap();
    expect_err(r.vote(alice, 0, single(0, 1)), ReserveError::InsufficientVotingPower);

    let closure = r.advance(admin).unwrap();
    assert_eq!(closure.winner, 3);
    assert_eq!(closure.reward, 5_000);
    assert_eq!(closure.voters, 2);
    assert!(r.epochs[&0].closed);
    assert_eq!(r.cfg.epoch, 1);
    assert_eq!(r.cfg.reserved_rewards, 5_000);

    // 5_000 * 6_000 / 14_000 and 5_000 * 8_000 / 14_000, truncated
    assert_eq!(r.claim(alice, 0).unwrap(), 2_142);
    assert_eq!(r.claim(bob, 0).unwrap(), 2_857);
    assert!(!r.votes.contains_key(&(alice, 0)));
    assert!(!r.votes.contains_key(&(bob, 0)));

    assert_eq!(r.wallet(alice), 2_142);
    assert_eq!(r.holder, 50_000 - 4_999);
    assert_eq!(r.cfg.reserved_rewards, 1);

    let stats = r.stats[&alice].clone();
    expect_err(r.claim(alice, 0), ReserveError::NothingToClaim);
    assert_eq!(r.stats[&alice], stats);
    assert_eq!(stats.amount_claimed, 2_142);
    assert_eq!(stats.last_claimed_epoch, 0);
}

#[test]
fn claim_needs_closed_epoch_and_vote() {
    let admin = Pubkey::new_unique();
    let mut r = Reserve::new(admin);
    let user = locked_user(&mut r, 1, 100);
    r.vote(user, 0, single(1, 100)).unwrap();

    expect_err(r.claim(user, 0), ReserveError::EpochStillOpen);
    r.advance(admin).unwrap();
    expect_err(r.claim(Pubkey::new_unique(), 0), ReserveError::NothingToClaim);
    expect_err(r.claim(user, 5), ReserveError::NotFound);
    r.claim(user, 0).unwrap();
}

#[test]
fn losing_voter_retires_record_for_nothing() {
    let admin = Pubkey::new_unique();
    let mut r = Reserve::new(admin);
    r.fund(admin, 10_000);
    r.deposit(admin, 10_000).unwrap();
    let winner = locked_user(&mut r, 1, 500);
    let loser = locked_user(&mut r, 1, 500);
    r.vote(winner, 0, single(9, 500)).unwrap();
    r.vote(loser, 0, single(4, 100)).unwrap();
    r.advance(admin).unwrap();

    assert_eq!(r.claim(loser, 0).unwrap(), 0);
    assert!(!r.votes.contains_key(&(loser, 0)));
    assert_eq!(r.stats[&loser].claims, 1);
    assert_eq!(r.claim(winner, 0).unwrap(), 1_000);
    assert_eq!(r.cfg.reserved_rewards, 0);
}

#[test]
fn reserved_rewards_survive_pool_withdrawal() {
    let admin = Pubkey::new_unique();
    let mut r = Reserve::new(admin);
    r.fund(admin, 10_000);
    r.deposit(admin, 10_000).unwrap();
    let user = locked_user(&mut r, 1, 100);
    r.vote(user, 0, single(0, 100)).unwrap();
    r.advance(admin).unwrap();
    assert_eq!(r.cfg.reserved_rewards, 1_000);

    expect_err(r.withdraw(admin, 9_001), ReserveError::InsufficientFunds);
    expect_err(r.withdraw(user, 1), ReserveError::Unauthorized);
    r.withdraw(admin, 9_000).unwrap();
    assert_eq!(r.holder, 1_000);

    assert_eq!(r.claim(user, 0).unwrap(), 1_000);
    assert_eq!(r.holder, 0);
}

#[test]
fn fixed_reward_is_capped_by_unreserved_pool() {
    let admin = Pubkey::new_unique();
    let mut r = Reserve::new(admin);
    r.fund(admin, 3_000);
    r.deposit(admin, 3_000).unwrap();
    r.set_reward_mode(admin, RewardMode::Fixed, 5_000).unwrap();
    expect_err(
        r.set_reward_mode(Pubkey::new_unique(), RewardMode::Fixed, 1),
        ReserveError::Unauthorized,
    );

    let user = locked_user(&mut r, 1, 10);
    r.vote(user, 0, single(0, 10)).unwrap();
    assert_eq!(r.advance(admin).unwrap().reward, 3_000);

    // everything is owed now; the next epoch has nothing to hand out
    r.vote(user, 1, single(0, 10)).unwrap();
    assert_eq!(r.advance(admin).unwrap().reward, 0);
}

#[derive(Clone, Debug)]
enum Action {
    Lock { user: usize, series: u64, amount: u64 },
    Unlock { user: usize, series: u64, amount: u64 },
    Vote { user: usize, field: usize, weight: u64 },
    Advance,
    Claim { user: usize, back: u64 },
    Deposit(u64),
    Withdraw(u64),
}

fn action_strategy() -> impl Strategy<Value = Action> {
    let lock = (0..3usize, 0..3u64, 1..5_000u64)
        .prop_map(|(user, series, amount)| Action::Lock { user, series, amount });
    let unlock = (0..3usize, 0..3u64, 1..5_000u64)
        .prop_map(|(user, series, amount)| Action::Unlock { user, series, amount });
    let vote = (0..3usize, 0..NUM_FIELDS, 1..5_000u64)
        .prop_map(|(user, field, weight)| Action::Vote { user, field, weight });
    let claim = (0..3usize, 0..3u64).prop_map(|(user, back)| Action::Claim { user, back });
    let deposit = (1..20_000u64).prop_map(Action::Deposit);
    let withdraw = (1..20_000u64).prop_map(Action::Withdraw);

    prop_oneof![
        4 => lock,
        2 => unlock,
        4 => vote,
        2 => Just(Action::Advance),
        3 => claim,
        1 => deposit,
        1 => withdraw,
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// Random interleavings of every user-facing operation. Failed calls are
    /// expected and ignored; the point is that no sequence of them breaks
    /// the accounting.
    #[test]
    fn accounting_holds_under_any_trace(
        actions in prop::collection::vec(action_strategy(), 0..120)
    ) {
        let admin = Pubkey::new_unique();
        let users = [Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique()];
        let mut r = Reserve::new(admin);
        r.fund(admin, 1_000_000);
        for u in users {
            r.fund(u, 100_000);
        }
        let supply: u64 = 1_300_000;
        let mut paid: BTreeMap<u64, u64> = BTreeMap::new();

        for action in actions {
            match action {
                Action::Lock { user, series, amount } => {
                    let _ = r.create_lock(users[user], series);
                    let _ = r.lock(users[user], series, amount);
                }
                Action::Unlock { user, series, amount } => {
                    let _ = r.unlock(users[user], series, amount);
                }
                Action::Vote { user, field, weight } => {
                    let epoch = r.cfg.epoch;
                    let _ = r.vote(users[user], epoch, single(field, weight));
                }
                Action::Advance => {
                    r.advance(admin).unwrap();
                }
                Action::Claim { user, back } => {
                    let epoch = r.cfg.epoch.saturating_sub(back);
                    if let Ok(payout) = r.claim(users[user], epoch) {
                        *paid.entry(epoch).or_default() += payout;
                    }
                }
                Action::Deposit(amount) => {
                    let _ = r.deposit(admin, amount);
                }
                Action::Withdraw(amount) => {
                    let _ = r.withdraw(admin, amount);
                }
            }

            for u in users {
                let locked: u64 = r
                    .locks
                    .iter()
                    .filter(|((owner, _), _)| *owner == u)
                    .map(|(_, l)| l.amount)
                    .sum();
                prop_assert_eq!(r.voting_power(u), locked);
            }
            let all_locked: u64 = r.locks.values().map(|l| l.amount).sum();
            prop_assert_eq!(r.locked_vault, all_locked);

            for (epoch, total) in &paid {
                prop_assert!(*total <= r.epochs[epoch].reward);
            }
            prop_assert!(r.holder >= r.cfg.reserved_rewards);

            let wallets: u64 = r.wallets.values().sum();
            prop_assert_eq!(wallets + r.holder + r.locked_vault, supply);
        }
    }
}
