use soroban_sdk::contracttype;

use crate::rewards::PRECISION;

// ── Types ───────────────────────────────────────────────────────────────────

/// Lifecycle of the distribution period.
///
/// `Idle` → `Active` on the first injection, `Active` → `Expired` once the
/// ledger clock reaches `period_finish`, and back to `Active` on the next
/// injection.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum PeriodState {
    /// No period has ever been scheduled.
    Idle = 0,
    /// The current rate is being paid out.
    Active = 1,
    /// The last period ran out; the accumulator no longer advances.
    Expired = 2,
}

/// Classify the period at `now`.
pub fn period_state(now: u64, period_finish: u64) -> PeriodState {
    if period_finish == 0 {
        PeriodState::Idle
    } else if now < period_finish {
        PeriodState::Active
    } else {
        PeriodState::Expired
    }
}

/// Reward still owed at the current rate over `[now, period_finish)`.
///
/// Zero once the period has run out. Returns `None` on overflow.
pub fn remaining_reward(now: u64, period_finish: u64, reward_rate: i128) -> Option<i128> {
    if now >= period_finish {
        return Some(0);
    }
    let left = period_finish - now;
    i128::from(left).checked_mul(reward_rate)
}

/// Rate for a freshly (re)started period.
///
/// ```text
/// rate = (remaining + amount) / duration
/// ```
///
/// The undistributed remainder of the running period is merged with the new
/// amount and spread evenly over a whole new duration. Division truncates;
/// the remainder is dust that is never paid out. Returns `None` on overflow
/// or a zero duration.
pub fn renewed_rate(remaining: i128, amount: i128, duration: u64) -> Option<i128> {
    if duration == 0 {
        return None;
    }
    remaining.checked_add(amount)?.checked_div(i128::from(duration))
}

/// Total the ledger commits to paying out over one full period.
pub fn reward_for_duration(reward_rate: i128, duration: u64) -> Option<i128> {
    reward_rate.checked_mul(i128::from(duration))
}

/// Whether a full period at `reward_rate` can be settled without overflow.
///
/// Settlement scales `rate × elapsed` by `PRECISION`, and `elapsed` never
/// exceeds the period length, so bounding the scaled commitment bounds every
/// later accumulator step and every account's earned reward.
pub fn settles_within_precision(reward_rate: i128, duration: u64) -> bool {
    reward_for_duration(reward_rate, duration)
        .and_then(|total| total.checked_mul(PRECISION))
        .is_some()
}

/// Whether the period cadence may be changed at `now`.
///
/// Allowed before the first period and strictly after the running one ends.
pub fn duration_change_allowed(now: u64, period_finish: u64) -> bool {
    period_finish == 0 || now > period_finish
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;

    #[test]
    fn period_state_transitions() {
        assert_eq!(period_state(0, 0), PeriodState::Idle);
        assert_eq!(period_state(500, 0), PeriodState::Idle);
        assert_eq!(period_state(99, 100), PeriodState::Active);
        assert_eq!(period_state(100, 100), PeriodState::Expired);
        assert_eq!(period_state(101, 100), PeriodState::Expired);
    }

    #[test]
    fn remaining_is_zero_after_period_end() {
        assert_eq!(remaining_reward(100, 100, 7), Some(0));
        assert_eq!(remaining_reward(200, 100, 7), Some(0));
        assert_eq!(remaining_reward(40, 100, 7), Some(420));
    }

    #[test]
    fn renewal_merges_remaining_and_new_amount() {
        // 60s left at 100/s = 6_000, plus 4_000 new over 100s → 100/s
        let remaining = remaining_reward(40, 100, 100).unwrap();
        assert_eq!(renewed_rate(remaining, 4_000, 100), Some(100));
    }

    #[test]
    fn renewal_truncates_rate() {
        // 1_000 over 3s → 333/s, 1 unit of dust
        assert_eq!(renewed_rate(0, 1_000, 3), Some(333));
        assert_eq!(reward_for_duration(333, 3), Some(999));
    }

    #[test]
    fn renewal_rejects_zero_duration() {
        assert_eq!(renewed_rate(0, 1_000, 0), None);
    }

    #[test]
    fn settlement_bound_covers_scaled_commitment() {
        let limit = i128::MAX / PRECISION;
        assert!(settles_within_precision(limit / 100, 100));
        assert!(!settles_within_precision(limit / 100 + 1, 100));
        assert!(settles_within_precision(0, u64::MAX));
    }

    #[test]
    fn duration_change_window() {
        assert!(duration_change_allowed(0, 0));
        assert!(!duration_change_allowed(50, 100));
        assert!(!duration_change_allowed(100, 100));
        assert!(duration_change_allowed(101, 100));
    }
}
