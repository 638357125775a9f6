/// Fixed-point scaling factor.
///
/// All reward-per-unit values are multiplied by this constant before storage
/// to preserve sub-unit precision without floating-point arithmetic.
/// 10^12 leaves room for stake and reward amounts well past 10^18 at 7-decimal
/// token precision before any intermediate product nears `i128::MAX`.
pub const PRECISION: i128 = 1_000_000_000_000;

// ── Core reward engine ──────────────────────────────────────────────────────

/// The instant up to which the current rate is still being paid out.
///
/// Rewards stop accruing at `period_finish`; before any period has been
/// scheduled (`period_finish == 0`) nothing is applicable.
pub fn last_time_reward_applicable(now: u64, period_finish: u64) -> u64 {
    now.min(period_finish)
}

/// Advance the global `reward_per_unit_stored` accumulator.
///
/// This is the O(1) accumulation step:
///
/// ```text
/// Δr = reward_rate × elapsed × PRECISION / total_staked
/// new_r = stored + Δr
/// ```
///
/// When `total_staked` is zero `stored` is returned unchanged: no stakers
/// means nothing is distributed for that stretch of time.
///
/// Every product is formed before the division and the division truncates,
/// so stakers can only ever be under-paid by rounding dust. Returns `None`
/// on overflow.
///
/// # Arguments
/// * `stored`       – current `reward_per_unit_stored` (scaled by PRECISION)
/// * `reward_rate`  – reward units emitted per second across *all* stakers
/// * `elapsed`      – seconds since the last settlement, already clamped to the period
/// * `total_staked` – sum of all active stakes
pub fn compute_reward_per_unit(
    stored: i128,
    reward_rate: i128,
    elapsed: u64,
    total_staked: i128,
) -> Option<i128> {
    if total_staked <= 0 {
        return Some(stored);
    }

    let delta = reward_rate
        .checked_mul(i128::from(elapsed))?
        .checked_mul(PRECISION)?
        .checked_div(total_staked)?;

    stored.checked_add(delta)
}

/// Total reward earned by a single staker.
///
/// ```text
/// earned = staked × (current − paid) / PRECISION + accrued
/// ```
///
/// The subtraction `current − paid` isolates only the accumulation since the
/// staker's last settlement, so earlier snapshots are never double-counted.
/// Returns `None` on overflow.
///
/// # Arguments
/// * `staked`  – staker's current position size
/// * `current` – latest global accumulator value
/// * `paid`    – accumulator value recorded at the staker's last settlement
/// * `accrued` – reward already snapshotted and not yet claimed
pub fn earned(staked: i128, current: i128, paid: i128, accrued: i128) -> Option<i128> {
    let fresh = staked
        .checked_mul(current.checked_sub(paid)?)?
        .checked_div(PRECISION)?;

    accrued.checked_add(fresh)
}

/// Reward units streamed into the accumulator over `elapsed` seconds.
///
/// Zero when nobody is staked, matching [`compute_reward_per_unit`].
pub fn emitted(reward_rate: i128, elapsed: u64, total_staked: i128) -> Option<i128> {
    if total_staked <= 0 {
        return Some(0);
    }
    reward_rate.checked_mul(i128::from(elapsed))
}

// ── Unit tests ──────────────────────────────────────────────────────────────
// Pure-math tests with no Soroban environment dependency.
