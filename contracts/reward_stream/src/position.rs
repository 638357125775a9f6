use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

// ── Storage key constants ───────────────────────────────────────────────────

const POSITION: Symbol = symbol_short!("POS");

const TTL_THRESHOLD: u32 = 5_184_000;
const TTL_EXTEND_TO: u32 = 10_368_000;

// ── Types ───────────────────────────────────────────────────────────────────

/// A single account's stake and reward bookkeeping.
///
/// Created implicitly (all zero) the first time an account is touched and
/// never removed, only zeroed.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Position {
    /// Amount of stake token currently locked.
    pub staked: i128,
    /// Global accumulator value observed at the last settlement.
    pub reward_per_unit_paid: i128,
    /// Reward snapshotted at the last settlement and not yet claimed.
    pub accrued_reward: i128,
}

// ── Storage helpers ─────────────────────────────────────────────────────────

fn position_key(account: &Address) -> (Symbol, Address) {
    (POSITION, account.clone())
}

/// Load the position for `account`, defaulting to an empty one.
pub fn load(env: &Env, account: &Address) -> Position {
    let key = position_key(account);
    let position: Option<Position> = env.storage().persistent().get(&key);
    match position {
        Some(p) => {
            env.storage()
                .persistent()
                .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
            p
        }
        None => Position::default(),
    }
}

/// Persist `position` for `account` and keep the entry alive.
pub fn store(env: &Env, account: &Address, position: &Position) {
    let key = position_key(account);
    env.storage().persistent().set(&key, position);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}
