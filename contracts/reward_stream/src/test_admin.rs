extern crate std;

use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env,
};

use common::{reentrancy, ReentrancyGuard};

use crate::{ContractError, RewardStreamContract, RewardStreamContractClient};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn setup() -> (
    Env,
    RewardStreamContractClient<'static>,
    Address, // admin
    Address, // stake_token
    Address, // reward_token
) {
    let env = Env::default();
    env.mock_all_auths();

    let stake_token = env.register_stellar_asset_contract_v2(Address::generate(&env));
    let reward_token = env.register_stellar_asset_contract_v2(Address::generate(&env));

    let contract_id = env.register(RewardStreamContract, ());
    let client = RewardStreamContractClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    client.initialize(
        &admin,
        &stake_token.address(),
        &reward_token.address(),
        &100,
    );

    (env, client, admin, stake_token.address(), reward_token.address())
}

// ── Pause ────────────────────────────────────────────────────────────────────

#[test]
fn test_pause_blocks_only_new_stake() {
    let (env, client, admin, stake_token, _) = setup();
    let staker = Address::generate(&env);
    StellarAssetClient::new(&env, &stake_token).mint(&staker, &1_000);

    client.stake(&staker, &500);
    client.pause(&admin);
    assert!(client.is_paused());

    match client.try_stake(&staker, &500) {
        Err(Ok(e)) => assert_eq!(e, ContractError::Paused),
        _ => unreachable!("Expected Paused error"),
    }

    // Stakers can always leave.
    client.withdraw(&staker, &200);
    assert_eq!(client.claim(&staker), 0);
    assert_eq!(client.get_staked(&staker), 300);

    client.unpause(&admin);
    assert!(!client.is_paused());
    client.stake(&staker, &500);
    assert_eq!(client.get_total_staked(), 800);
}

#[test]
fn test_pause_by_non_admin_fails() {
    let (env, client, _admin, _, _) = setup();
    let intruder = Address::generate(&env);

    match client.try_pause(&intruder) {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
    assert!(!client.is_paused());
}

// ── Token recovery ───────────────────────────────────────────────────────────

#[test]
fn test_recover_foreign_token() {
    let (env, client, admin, _, _) = setup();
    let stray = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    StellarAssetClient::new(&env, &stray).mint(&client.address, &750);

    client.recover_token(&admin, &stray, &750);

    assert_eq!(TokenClient::new(&env, &stray).balance(&admin), 750);
    assert_eq!(TokenClient::new(&env, &stray).balance(&client.address), 0);
}

#[test]
fn test_recover_stake_token_fails() {
    let (env, client, admin, stake_token, _) = setup();
    let staker = Address::generate(&env);
    StellarAssetClient::new(&env, &stake_token).mint(&staker, &1_000);
    client.stake(&staker, &1_000);

    match client.try_recover_token(&admin, &stake_token, &1) {
        Err(Ok(e)) => assert_eq!(e, ContractError::CannotRecoverStakeToken),
        _ => unreachable!("Expected CannotRecoverStakeToken error"),
    }
}

#[test]
fn test_recover_reward_token_limited_to_surplus() {
    let (env, client, admin, stake_token, reward_token) = setup();
    let staker = Address::generate(&env);
    StellarAssetClient::new(&env, &stake_token).mint(&staker, &100);
    StellarAssetClient::new(&env, &reward_token).mint(&client.address, &12_000);

    client.inject_reward(&admin, &10_000);
    client.stake(&staker, &100);

    // 3_000 earned, 7_000 still owed over the period, 2_000 spare.
    env.ledger().set_timestamp(30);
    match client.try_recover_token(&admin, &reward_token, &2_001) {
        Err(Ok(e)) => assert_eq!(e, ContractError::InsufficientRewardBalance),
        _ => unreachable!("Expected InsufficientRewardBalance error"),
    }

    client.recover_token(&admin, &reward_token, &2_000);
    assert_eq!(TokenClient::new(&env, &reward_token).balance(&admin), 2_000);

    // Stakers still get paid in full.
    env.ledger().set_timestamp(100);
    assert_eq!(client.claim(&staker), 10_000);
}

#[test]
fn test_recover_by_non_admin_fails() {
    let (env, client, _admin, _, reward_token) = setup();
    let intruder = Address::generate(&env);

    match client.try_recover_token(&intruder, &reward_token, &1) {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
}

// ── Admin transfer (two-step) ────────────────────────────────────────────────

#[test]
fn test_admin_handover() {
    let (env, client, admin, _, _) = setup();
    let next = Address::generate(&env);

    client.propose_admin(&admin, &next);
    assert_eq!(client.get_pending_admin(), Some(next.clone()));
    // Nothing changes until the proposed admin accepts.
    assert_eq!(client.get_admin(), admin);

    client.accept_admin(&next);
    assert_eq!(client.get_admin(), next);
    assert_eq!(client.get_pending_admin(), None);

    // The old admin lost its capability.
    match client.try_set_rewards_duration(&admin, &10) {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
    client.set_rewards_duration(&next, &10);
    assert_eq!(client.get_rewards_duration(), 10);
}

#[test]
fn test_accept_by_wrong_address_fails() {
    let (env, client, admin, _, _) = setup();
    let next = Address::generate(&env);
    let intruder = Address::generate(&env);

    client.propose_admin(&admin, &next);

    match client.try_accept_admin(&intruder) {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
    assert_eq!(client.get_admin(), admin);
}

#[test]
fn test_propose_by_non_admin_fails() {
    let (env, client, _admin, _, _) = setup();
    let intruder = Address::generate(&env);

    match client.try_propose_admin(&intruder, &intruder) {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
    assert_eq!(client.get_pending_admin(), None);
}

#[test]
fn test_cancel_admin_transfer() {
    let (env, client, admin, _, _) = setup();
    let next = Address::generate(&env);

    match client.try_cancel_admin_transfer(&admin) {
        Err(Ok(e)) => assert_eq!(e, ContractError::NoPendingAdmin),
        _ => unreachable!("Expected NoPendingAdmin error"),
    }

    client.propose_admin(&admin, &next);
    client.cancel_admin_transfer(&admin);
    assert_eq!(client.get_pending_admin(), None);

    match client.try_accept_admin(&next) {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
}

// ── Critical section ─────────────────────────────────────────────────────────

#[test]
fn test_mutating_calls_refused_while_lock_held() {
    let (env, client, admin, stake_token, _) = setup();
    let staker = Address::generate(&env);
    StellarAssetClient::new(&env, &stake_token).mint(&staker, &1_000);
    client.stake(&staker, &500);

    // An operation that never released the lock.
    env.as_contract(&client.address, || {
        std::mem::forget(ReentrancyGuard::enter(&env));
    });

    match client.try_stake(&staker, &100) {
        Err(Ok(e)) => assert_eq!(e, ContractError::Reentrant),
        _ => unreachable!("Expected Reentrant error"),
    }
    match client.try_withdraw(&staker, &100) {
        Err(Ok(e)) => assert_eq!(e, ContractError::Reentrant),
        _ => unreachable!("Expected Reentrant error"),
    }
    match client.try_claim(&staker) {
        Err(Ok(e)) => assert_eq!(e, ContractError::Reentrant),
        _ => unreachable!("Expected Reentrant error"),
    }
    match client.try_inject_reward(&admin, &0) {
        Err(Ok(e)) => assert_eq!(e, ContractError::Reentrant),
        _ => unreachable!("Expected Reentrant error"),
    }

    // Views stay available and nothing moved.
    assert_eq!(client.get_staked(&staker), 500);
    assert_eq!(TokenClient::new(&env, &stake_token).balance(&staker), 500);
}

#[test]
fn test_lock_released_after_each_call() {
    let (env, client, _admin, stake_token, _) = setup();
    let staker = Address::generate(&env);
    StellarAssetClient::new(&env, &stake_token).mint(&staker, &1_000);

    client.stake(&staker, &500);
    assert!(!env.as_contract(&client.address, || reentrancy::is_locked(&env)));

    // A failed call unwinds the lock with everything else.
    match client.try_withdraw(&staker, &501) {
        Err(Ok(e)) => assert_eq!(e, ContractError::InsufficientBalance),
        _ => unreachable!("Expected InsufficientBalance error"),
    }
    assert!(!env.as_contract(&client.address, || reentrancy::is_locked(&env)));
    client.withdraw(&staker, &500);
}
