use soroban_sdk::{symbol_short, Address, Env, Symbol};

// ── Storage Keys ─────────────────────────────────────────────────────────────

const ADMIN: Symbol = symbol_short!("ADMIN");
const PENDING_ADMIN: Symbol = symbol_short!("PEND_ADM");

// ── Core Functions ───────────────────────────────────────────────────────────

/// Records `admin` as the single administrator of the calling contract.
/// Only callable internally; callers must verify authorization beforehand.
pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&ADMIN, admin);
}

/// Returns the current administrator, if one has been set.
pub fn get_admin(env: &Env) -> Option<Address> {
    env.storage().instance().get(&ADMIN)
}

/// Capability check used at the top of every administrative entry point.
///
/// Returns `false` when no administrator exists or `caller` is someone else.
/// The caller must already have been authenticated via `require_auth()`.
pub fn is_admin(env: &Env, caller: &Address) -> bool {
    match get_admin(env) {
        Some(admin) => admin == *caller,
        None => false,
    }
}

// ── Two-step Handover ────────────────────────────────────────────────────────

/// Stores `proposed` as the pending administrator.
///
/// Returns `false` if `caller` is not the current administrator.
pub fn propose_admin(env: &Env, caller: &Address, proposed: &Address) -> bool {
    if !is_admin(env, caller) {
        return false;
    }
    env.storage().instance().set(&PENDING_ADMIN, proposed);
    true
}

/// Returns the pending administrator, if a handover is in flight.
pub fn get_pending_admin(env: &Env) -> Option<Address> {
    env.storage().instance().get(&PENDING_ADMIN)
}

/// Completes a handover started by [`propose_admin`].
///
/// Returns the previous administrator on success, or `None` if `caller`
/// is not the pending administrator (or nothing is pending).
pub fn accept_admin(env: &Env, caller: &Address) -> Option<Address> {
    let pending = get_pending_admin(env)?;
    if pending != *caller {
        return None;
    }
    let previous = get_admin(env)?;
    set_admin(env, caller);
    env.storage().instance().remove(&PENDING_ADMIN);
    Some(previous)
}

/// Drops a pending handover.
///
/// Returns the address that had been proposed, or `None` if `caller` is not
/// the administrator or nothing was pending.
pub fn cancel_admin_transfer(env: &Env, caller: &Address) -> Option<Address> {
    if !is_admin(env, caller) {
        return None;
    }
    let pending = get_pending_admin(env)?;
    env.storage().instance().remove(&PENDING_ADMIN);
    Some(pending)
}
