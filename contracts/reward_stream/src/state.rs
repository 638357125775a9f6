use soroban_sdk::{contracttype, symbol_short, Env, Symbol};

// ── Storage key constants ───────────────────────────────────────────────────

const GLOBAL: Symbol = symbol_short!("GLOBAL");

const INSTANCE_TTL_THRESHOLD: u32 = 518_400;
const INSTANCE_TTL_EXTEND_TO: u32 = 1_036_800;

// ── Types ───────────────────────────────────────────────────────────────────

/// Ledger-wide accrual and schedule state.
///
/// Held as one instance-storage record so every settlement reads and writes
/// a consistent snapshot.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GlobalState {
    /// Sum of every position's `staked`.
    pub total_staked: i128,
    /// Cumulative reward per unit of stake, scaled by `PRECISION`. Never decreases.
    pub reward_per_unit_stored: i128,
    /// Timestamp of the last settlement, never past `period_finish`.
    pub last_update_time: u64,
    /// Reward units emitted per second while the period is active.
    pub reward_rate: i128,
    /// Timestamp at which the current rate stops applying (0 = never started).
    pub period_finish: u64,
    /// Length of the next period started by an injection.
    pub rewards_duration: u64,
    /// Reward streamed into the accumulator but not yet claimed.
    pub reward_liability: i128,
    /// Part of `reward_liability` already credited to some position's
    /// `accrued_reward`. The rest is streamed reward not yet settled into any
    /// account, including truncation dust.
    pub reward_credited: i128,
}

// ── Storage helpers ─────────────────────────────────────────────────────────

/// Load the global state; absent before `initialize`.
pub fn load(env: &Env) -> Option<GlobalState> {
    env.storage().instance().get(&GLOBAL)
}

/// Persist the global state and keep the contract instance alive.
pub fn store(env: &Env, state: &GlobalState) {
    env.storage().instance().set(&GLOBAL, state);
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND_TO);
}
