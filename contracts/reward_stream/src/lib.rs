#![no_std]

pub mod events;
pub mod position;
pub mod rewards;
pub mod schedule;
pub mod state;

use common::{admin, ReentrancyGuard};
use soroban_sdk::{contract, contractimpl, log, symbol_short, token, Address, Env, Symbol};

pub use position::Position;
pub use schedule::PeriodState;
pub use state::GlobalState;

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const STAKE_TOKEN: Symbol = symbol_short!("STK_TOK");
const REWARD_TOKEN: Symbol = symbol_short!("RWD_TOK");
const PAUSED: Symbol = symbol_short!("PAUSED");

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidAmount = 4,
    InsufficientBalance = 5,
    InsufficientRewardBalance = 6,
    RewardPeriodActive = 7,
    InvalidReference = 8,
    TokensIdentical = 9,
    TransferFailed = 10,
    Reentrant = 11,
    Overflow = 12,
    Paused = 13,
    CannotRecoverStakeToken = 14,
    NoPendingAdmin = 15,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct RewardStreamContract;

#[contractimpl]
impl RewardStreamContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the ledger.
    ///
    /// * `stake_token`      – SAC address of the token users lock.
    /// * `reward_token`     – SAC address of the token streamed as reward.
    /// * `rewards_duration` – length in seconds of each period started by
    ///   `inject_reward`.
    pub fn initialize(
        env: Env,
        admin: Address,
        stake_token: Address,
        reward_token: Address,
        rewards_duration: u64,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        let this = env.current_contract_address();
        if stake_token == this || reward_token == this {
            return Err(ContractError::InvalidReference);
        }
        if stake_token == reward_token {
            return Err(ContractError::TokensIdentical);
        }
        if rewards_duration == 0 {
            return Err(ContractError::InvalidAmount);
        }

        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&STAKE_TOKEN, &stake_token);
        env.storage().instance().set(&REWARD_TOKEN, &reward_token);
        admin::set_admin(&env, &admin);

        // Accumulators start at zero and no period exists until the first injection.
        state::store(
            &env,
            &GlobalState {
                rewards_duration,
                ..GlobalState::default()
            },
        );

        events::publish_initialized(&env, admin, stake_token, reward_token, rewards_duration);

        Ok(())
    }

    // ── Position ledger ─────────────────────────────────────────────────────

    /// Lock `amount` stake tokens.
    ///
    /// The staker is settled first, so the new tokens only earn from this
    /// instant onward.
    pub fn stake(env: Env, staker: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();
        let _guard = Self::enter(&env)?;

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if Self::is_paused(env.clone()) {
            return Err(ContractError::Paused);
        }

        // 1. Settle global accumulator and this staker.
        let mut global = Self::load_state(&env)?;
        let mut position = Self::settle(&env, &mut global, &staker)?;

        // 2. Book the deposit.
        position.staked = position
            .staked
            .checked_add(amount)
            .ok_or(ContractError::Overflow)?;
        global.total_staked = global
            .total_staked
            .checked_add(amount)
            .ok_or(ContractError::Overflow)?;
        state::store(&env, &global);
        position::store(&env, &staker, &position);

        // 3. Pull the tokens; a failure unwinds the bookkeeping above.
        let stake_token = Self::get_stake_token(env.clone())?;
        Self::transfer(
            &env,
            &stake_token,
            &staker,
            &env.current_contract_address(),
            amount,
        )?;

        events::publish_staked(&env, staker, amount, global.total_staked);

        Ok(())
    }

    /// Unlock `amount` stake tokens and send them back to the staker.
    ///
    /// Rewards accrued so far stay with the staker. Available while paused.
    pub fn withdraw(env: Env, staker: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();
        let _guard = Self::enter(&env)?;

        let mut global = Self::load_state(&env)?;
        let mut position = Self::settle(&env, &mut global, &staker)?;
        Self::apply_withdraw(&env, &mut global, &staker, &mut position, amount)
    }

    /// Withdraw the whole position and claim every accrued reward.
    ///
    /// Returns the reward paid out.
    pub fn exit(env: Env, staker: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();
        let _guard = Self::enter(&env)?;

        let mut global = Self::load_state(&env)?;
        let mut position = Self::settle(&env, &mut global, &staker)?;

        if position.staked > 0 {
            let all = position.staked;
            Self::apply_withdraw(&env, &mut global, &staker, &mut position, all)?;
        }
        Self::apply_claim(&env, &mut global, &staker, &mut position)
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Pay out everything `staker` has accrued.
    ///
    /// Returns the amount paid; an account with nothing accrued (including
    /// one that never staked) gets `0` and no error.
    pub fn claim(env: Env, staker: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();
        let _guard = Self::enter(&env)?;

        let mut global = Self::load_state(&env)?;
        let mut position = Self::settle(&env, &mut global, &staker)?;
        Self::apply_claim(&env, &mut global, &staker, &mut position)
    }

    // ── Reward scheduler (admin) ────────────────────────────────────────────

    /// Fund a new period with `amount` reward units.
    ///
    /// Whatever the running period has not paid out yet is carried over and
    /// spread, together with `amount`, over a full `rewards_duration`. The
    /// reward tokens must already be held by the ledger; the call fails with
    /// `InsufficientRewardBalance` if the balance not already owed to stakers
    /// cannot cover the new commitment.
    ///
    /// Returns the new reward rate.
    pub fn inject_reward(env: Env, caller: Address, amount: i128) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_admin(&env, &caller)?;
        let _guard = Self::enter(&env)?;

        if amount < 0 {
            return Err(ContractError::InvalidAmount);
        }

        let mut global = Self::load_state(&env)?;
        Self::settle_global(&env, &mut global)?;

        let now = env.ledger().timestamp();
        let carried_over =
            schedule::remaining_reward(now, global.period_finish, global.reward_rate)
                .ok_or(ContractError::Overflow)?;
        let new_rate = schedule::renewed_rate(carried_over, amount, global.rewards_duration)
            .ok_or(ContractError::Overflow)?;

        if !schedule::settles_within_precision(new_rate, global.rewards_duration) {
            log!(&env, "rate too large to settle", new_rate);
            return Err(ContractError::Overflow);
        }

        // Solvency is judged on the new rate against what is on hand right now.
        let commitment = schedule::reward_for_duration(new_rate, global.rewards_duration)
            .ok_or(ContractError::Overflow)?;
        let headroom = Self::reward_headroom(&env, &global)?;
        if headroom < commitment {
            log!(&env, "injection exceeds headroom", commitment, headroom);
            return Err(ContractError::InsufficientRewardBalance);
        }

        global.reward_rate = new_rate;
        global.last_update_time = now;
        global.period_finish = now
            .checked_add(global.rewards_duration)
            .ok_or(ContractError::Overflow)?;
        state::store(&env, &global);

        log!(&env, "reward injected", amount, carried_over, new_rate);
        events::publish_reward_injected(
            &env,
            amount,
            carried_over,
            new_rate,
            global.period_finish,
        );

        Ok(new_rate)
    }

    /// Change the length of the next period.
    ///
    /// Only allowed before the first period or once the current one has
    /// ended; otherwise fails with `RewardPeriodActive`.
    pub fn set_rewards_duration(
        env: Env,
        caller: Address,
        rewards_duration: u64,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_admin(&env, &caller)?;
        let _guard = Self::enter(&env)?;

        if rewards_duration == 0 {
            return Err(ContractError::InvalidAmount);
        }

        let mut global = Self::load_state(&env)?;
        let now = env.ledger().timestamp();
        if !schedule::duration_change_allowed(now, global.period_finish) {
            return Err(ContractError::RewardPeriodActive);
        }

        global.rewards_duration = rewards_duration;
        state::store(&env, &global);

        events::publish_duration_updated(&env, rewards_duration);

        Ok(())
    }

    // ── Admin functions ──────────────────────────────────────────────────────

    /// Stop new deposits. Withdrawals and claims keep working.
    pub fn pause(env: Env, caller: Address) -> Result<(), ContractError> {
        Self::set_paused(&env, caller, true)
    }

    /// Accept deposits again.
    pub fn unpause(env: Env, caller: Address) -> Result<(), ContractError> {
        Self::set_paused(&env, caller, false)
    }

    /// Send `amount` of a token held by the ledger to the admin.
    ///
    /// Stake tokens can never be recovered. Reward tokens can only be
    /// recovered out of the surplus beyond what stakers have earned and what
    /// the running period still owes.
    pub fn recover_token(
        env: Env,
        caller: Address,
        token: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_admin(&env, &caller)?;
        let _guard = Self::enter(&env)?;

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if token == Self::get_stake_token(env.clone())? {
            return Err(ContractError::CannotRecoverStakeToken);
        }

        if token == Self::get_reward_token(env.clone())? {
            let mut global = Self::load_state(&env)?;
            Self::settle_global(&env, &mut global)?;

            let owed = schedule::remaining_reward(
                env.ledger().timestamp(),
                global.period_finish,
                global.reward_rate,
            )
            .ok_or(ContractError::Overflow)?;
            let headroom = Self::reward_headroom(&env, &global)?;
            if headroom.checked_sub(owed).ok_or(ContractError::Overflow)? < amount {
                return Err(ContractError::InsufficientRewardBalance);
            }
            state::store(&env, &global);
        }

        Self::transfer(
            &env,
            &token,
            &env.current_contract_address(),
            &caller,
            amount,
        )?;

        events::publish_recovered(&env, token, caller, amount);

        Ok(())
    }

    // ── Admin transfer (two-step) ──────────────────────────────────────────

    /// Propose a new admin address. Only the current admin can call this.
    /// The new admin must call `accept_admin` to complete the transfer.
    pub fn propose_admin(
        env: Env,
        current_admin: Address,
        new_admin: Address,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        current_admin.require_auth();

        if !admin::propose_admin(&env, &current_admin, &new_admin) {
            return Err(ContractError::Unauthorized);
        }

        events::publish_admin_transfer_proposed(&env, current_admin, new_admin);

        Ok(())
    }

    /// Accept the pending admin transfer. Only the proposed new admin can call this.
    pub fn accept_admin(env: Env, new_admin: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        new_admin.require_auth();

        let old_admin =
            admin::accept_admin(&env, &new_admin).ok_or(ContractError::Unauthorized)?;

        events::publish_admin_transfer_accepted(&env, old_admin, new_admin);

        Ok(())
    }

    /// Cancel a pending admin transfer. Only the current admin can call this.
    pub fn cancel_admin_transfer(env: Env, current_admin: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        current_admin.require_auth();
        Self::require_admin(&env, &current_admin)?;

        let pending = admin::cancel_admin_transfer(&env, &current_admin)
            .ok_or(ContractError::NoPendingAdmin)?;

        events::publish_admin_transfer_cancelled(&env, current_admin, pending);

        Ok(())
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Live reward owed to `account`, without mutating state.
    pub fn earned(env: Env, account: Address) -> Result<i128, ContractError> {
        let current = Self::reward_per_unit(env.clone())?;
        let p = position::load(&env, &account);
        rewards::earned(p.staked, current, p.reward_per_unit_paid, p.accrued_reward)
            .ok_or(ContractError::Overflow)
    }

    /// Live value of the global accumulator, without mutating state.
    pub fn reward_per_unit(env: Env) -> Result<i128, ContractError> {
        let global = state::load(&env).unwrap_or_default();
        let (current, _) = Self::advance(&env, &global)?;
        Ok(current)
    }

    /// The instant up to which reward is currently being paid.
    pub fn last_time_reward_applicable(env: Env) -> u64 {
        let global = state::load(&env).unwrap_or_default();
        rewards::last_time_reward_applicable(env.ledger().timestamp(), global.period_finish)
    }

    /// Raw bookkeeping for `account` as of its last settlement.
    pub fn get_position(env: Env, account: Address) -> Position {
        position::load(&env, &account)
    }

    /// Raw global bookkeeping as of the last settlement.
    pub fn get_global_state(env: Env) -> Result<GlobalState, ContractError> {
        Self::load_state(&env)
    }

    pub fn get_staked(env: Env, account: Address) -> i128 {
        position::load(&env, &account).staked
    }

    pub fn get_total_staked(env: Env) -> i128 {
        state::load(&env).unwrap_or_default().total_staked
    }

    /// Reward units emitted per second while the period is active.
    pub fn get_reward_rate(env: Env) -> i128 {
        state::load(&env).unwrap_or_default().reward_rate
    }

    pub fn get_period_finish(env: Env) -> u64 {
        state::load(&env).unwrap_or_default().period_finish
    }

    pub fn get_rewards_duration(env: Env) -> u64 {
        state::load(&env).unwrap_or_default().rewards_duration
    }

    /// Total the current rate pays over one full period.
    pub fn get_reward_for_duration(env: Env) -> Result<i128, ContractError> {
        let global = state::load(&env).unwrap_or_default();
        schedule::reward_for_duration(global.reward_rate, global.rewards_duration)
            .ok_or(ContractError::Overflow)
    }

    pub fn get_period_state(env: Env) -> PeriodState {
        let global = state::load(&env).unwrap_or_default();
        schedule::period_state(env.ledger().timestamp(), global.period_finish)
    }

    /// Reward streamed to stakers (as of the last settlement) and not yet
    /// claimed. Includes truncation dust until the pool empties.
    pub fn get_reward_liability(env: Env) -> i128 {
        state::load(&env).unwrap_or_default().reward_liability
    }

    pub fn get_stake_token(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&STAKE_TOKEN)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn get_reward_token(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&REWARD_TOKEN)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn is_paused(env: Env) -> bool {
        env.storage().instance().get(&PAUSED).unwrap_or(false)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        admin::get_admin(&env).ok_or(ContractError::NotInitialized)
    }

    pub fn get_pending_admin(env: Env) -> Option<Address> {
        admin::get_pending_admin(&env)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Guard: revert if the ledger is not yet initialized.
    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    /// Guard: revert if `caller` is not the administrator.
    fn require_admin(env: &Env, caller: &Address) -> Result<(), ContractError> {
        if !admin::is_admin(env, caller) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    /// Enter the ledger-wide critical section for the rest of the call.
    fn enter(env: &Env) -> Result<ReentrancyGuard, ContractError> {
        ReentrancyGuard::enter(env).ok_or(ContractError::Reentrant)
    }

    fn load_state(env: &Env) -> Result<GlobalState, ContractError> {
        state::load(env).ok_or(ContractError::NotInitialized)
    }

    fn set_paused(env: &Env, caller: Address, paused: bool) -> Result<(), ContractError> {
        Self::require_initialized(env)?;
        caller.require_auth();
        Self::require_admin(env, &caller)?;
        let _guard = Self::enter(env)?;

        env.storage().instance().set(&PAUSED, &paused);

        events::publish_pause_toggled(env, caller, paused);

        Ok(())
    }

    /// Accumulator value at the current instant plus the reward streamed
    /// since the last settlement.
    fn advance(env: &Env, global: &GlobalState) -> Result<(i128, i128), ContractError> {
        let applicable =
            rewards::last_time_reward_applicable(env.ledger().timestamp(), global.period_finish);
        let elapsed = applicable.saturating_sub(global.last_update_time);

        let current = rewards::compute_reward_per_unit(
            global.reward_per_unit_stored,
            global.reward_rate,
            elapsed,
            global.total_staked,
        )
        .ok_or(ContractError::Overflow)?;
        let streamed = rewards::emitted(global.reward_rate, elapsed, global.total_staked)
            .ok_or(ContractError::Overflow)?;

        Ok((current, streamed))
    }

    /// Flush the global accumulator up to now without touching any account.
    fn settle_global(env: &Env, global: &mut GlobalState) -> Result<(), ContractError> {
        let (current, streamed) = Self::advance(env, global)?;

        global.reward_per_unit_stored = current;
        global.reward_liability = global
            .reward_liability
            .checked_add(streamed)
            .ok_or(ContractError::Overflow)?;
        global.last_update_time =
            rewards::last_time_reward_applicable(env.ledger().timestamp(), global.period_finish);

        Ok(())
    }

    /// Full settlement for `account`.
    ///
    /// 1. Flush the global accumulator.
    /// 2. Snapshot everything the account earned since its last settlement.
    /// 3. Record the accumulator value the account has now been paid up to.
    ///
    /// Returns the updated position; the caller persists it with the global state.
    fn settle(
        env: &Env,
        global: &mut GlobalState,
        account: &Address,
    ) -> Result<Position, ContractError> {
        Self::settle_global(env, global)?;

        let mut p = position::load(env, account);
        let accrued = rewards::earned(
            p.staked,
            global.reward_per_unit_stored,
            p.reward_per_unit_paid,
            p.accrued_reward,
        )
        .ok_or(ContractError::Overflow)?;
        global.reward_credited = accrued
            .checked_sub(p.accrued_reward)
            .and_then(|credit| global.reward_credited.checked_add(credit))
            .ok_or(ContractError::Overflow)?;
        p.accrued_reward = accrued;
        p.reward_per_unit_paid = global.reward_per_unit_stored;

        Ok(p)
    }

    fn apply_withdraw(
        env: &Env,
        global: &mut GlobalState,
        staker: &Address,
        position: &mut Position,
        amount: i128,
    ) -> Result<(), ContractError> {
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if amount > position.staked {
            return Err(ContractError::InsufficientBalance);
        }

        position.staked = position
            .staked
            .checked_sub(amount)
            .ok_or(ContractError::Overflow)?;
        global.total_staked = global
            .total_staked
            .checked_sub(amount)
            .ok_or(ContractError::Overflow)?;
        if global.total_staked == 0 {
            // Every position is now empty and settled, so only credited
            // reward is still owed; uncredited dust is released to headroom.
            global.reward_liability = global.reward_credited;
        }
        state::store(env, global);
        position::store(env, staker, position);

        let stake_token = Self::get_stake_token(env.clone())?;
        Self::transfer(
            env,
            &stake_token,
            &env.current_contract_address(),
            staker,
            amount,
        )?;

        events::publish_withdrawn(env, staker.clone(), amount, global.total_staked);

        Ok(())
    }

    fn apply_claim(
        env: &Env,
        global: &mut GlobalState,
        staker: &Address,
        position: &mut Position,
    ) -> Result<i128, ContractError> {
        let reward = position.accrued_reward;

        if reward <= 0 {
            // Nothing to pay; still keep the settlement.
            state::store(env, global);
            position::store(env, staker, position);
            return Ok(0);
        }

        // Clear before paying so a repeated claim observes zero.
        position.accrued_reward = 0;
        global.reward_liability = global
            .reward_liability
            .checked_sub(reward)
            .ok_or(ContractError::Overflow)?;
        global.reward_credited = global
            .reward_credited
            .checked_sub(reward)
            .ok_or(ContractError::Overflow)?;
        state::store(env, global);
        position::store(env, staker, position);

        let reward_token = Self::get_reward_token(env.clone())?;
        Self::transfer(
            env,
            &reward_token,
            &env.current_contract_address(),
            staker,
            reward,
        )?;

        events::publish_reward_claimed(env, staker.clone(), reward);

        Ok(reward)
    }

    /// Reward tokens on hand that are not already owed for past streaming.
    fn reward_headroom(env: &Env, global: &GlobalState) -> Result<i128, ContractError> {
        let reward_token = Self::get_reward_token(env.clone())?;
        let balance = token::Client::new(env, &reward_token).balance(&env.current_contract_address());
        balance
            .checked_sub(global.reward_liability)
            .ok_or(ContractError::Overflow)
    }

    /// Move `amount` of `token`, reporting any token-side failure as
    /// `TransferFailed` so the whole call unwinds.
    fn transfer(
        env: &Env,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        match token::Client::new(env, token).try_transfer(from, to, &amount) {
            Ok(Ok(())) => Ok(()),
            _ => Err(ContractError::TransferFailed),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod test_admin;
