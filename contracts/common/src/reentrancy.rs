use soroban_sdk::{symbol_short, Env, Symbol};

const LOCKED: Symbol = symbol_short!("LOCKED");

/// Non-reentrant critical section spanning one contract invocation.
///
/// Entering sets a lock flag in instance storage; dropping the guard clears
/// it. Any nested attempt to enter while the flag is set is refused, so a
/// token contract called mid-operation cannot drive a second mutating call
/// into the same ledger.
///
/// If the invocation fails, the host discards the flag together with every
/// other write made by the call.
pub struct ReentrancyGuard {
    env: Env,
}

impl ReentrancyGuard {
    /// Takes the lock, or returns `None` when it is already held.
    pub fn enter(env: &Env) -> Option<Self> {
        if is_locked(env) {
            return None;
        }
        env.storage().instance().set(&LOCKED, &true);
        Some(Self { env: env.clone() })
    }
}

impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        self.env.storage().instance().remove(&LOCKED);
    }
}

/// Whether some invocation currently holds the lock.
pub fn is_locked(env: &Env) -> bool {
    env.storage().instance().get(&LOCKED).unwrap_or(false)
}
