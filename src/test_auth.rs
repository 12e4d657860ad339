#![cfg(test)]
use soroban_sdk::{testutils::Address as _, token, Address, Env};

use crate::{GatedRewardLedger, GatedRewardLedgerClient, LedgerError};

const GATING_ID: u32 = 1;

fn make_client(env: &Env) -> (GatedRewardLedgerClient<'_>, Address) {
    let id = env.register_contract(None, GatedRewardLedger);
    (GatedRewardLedgerClient::new(env, &id), id)
}

/// Initialize without mocking any auth; returns (admin, reward token).
fn init_ledger(env: &Env, client: &GatedRewardLedgerClient) -> (Address, Address) {
    let admin = Address::generate(env);
    let reward_token = env.register_stellar_asset_contract(Address::generate(env));
    client.initialize(&admin, &reward_token, &GATING_ID, &10, &0);
    (admin, reward_token)
}

// ── missing signatures ────────────────────────────────────────

#[test]
fn mint_missing_auth_no_mutation() {
    let env = Env::default();
    let (client, _id) = make_client(&env);
    let (admin, _reward_token) = init_ledger(&env, &client);
    let holder = Address::generate(&env);

    assert!(client.try_mint(&admin, &holder, &5).is_err());
    assert_eq!(client.balance(&holder, &GATING_ID), 0);
    assert_eq!(client.get_holder_count(), 0);
}

#[test]
fn burn_missing_auth_no_mutation() {
    let env = Env::default();
    let (client, _id) = make_client(&env);
    let (admin, _reward_token) = init_ledger(&env, &client);
    let holder = Address::generate(&env);
    client.mock_all_auths().mint(&admin, &holder, &5);

    assert!(client.try_burn(&admin, &holder, &5).is_err());
    assert_eq!(client.balance(&holder, &GATING_ID), 5);
    assert!(client.is_holder(&holder));
}

#[test]
fn transfer_missing_auth_no_mutation() {
    let env = Env::default();
    let (client, _id) = make_client(&env);
    let (admin, _reward_token) = init_ledger(&env, &client);
    let alice = Address::generate(&env);
    let bob = Address::generate(&env);
    client.mock_all_auths().mint(&admin, &alice, &5);

    assert!(client.try_transfer(&alice, &bob, &GATING_ID, &5).is_err());
    assert!(client.is_holder(&alice));
    assert!(!client.is_holder(&bob));
}

#[test]
fn distribute_missing_auth_no_mutation() {
    let env = Env::default();
    let (client, id) = make_client(&env);
    let (admin, reward_token) = init_ledger(&env, &client);
    let holder = Address::generate(&env);
    client.mock_all_auths().mint(&admin, &holder, &5);
    token::StellarAssetClient::new(&env, &reward_token)
        .mock_all_auths()
        .mint(&id, &1_000);

    assert!(client.try_distribute(&admin).is_err());
    assert_eq!(client.balance(&holder, &GATING_ID), 5);
    assert_eq!(client.get_reward_pool_balance(), 1_000);
}

#[test]
fn set_base_fee_missing_auth_no_mutation() {
    let env = Env::default();
    let (client, _id) = make_client(&env);
    let (admin, _reward_token) = init_ledger(&env, &client);

    assert!(client.try_set_base_fee(&admin, &99).is_err());
    assert_eq!(client.get_base_fee(), 10);
}

#[test]
fn set_reward_token_missing_auth_no_mutation() {
    let env = Env::default();
    let (client, _id) = make_client(&env);
    let (admin, reward_token) = init_ledger(&env, &client);
    let other = Address::generate(&env);

    assert!(client.try_set_reward_token(&admin, &other).is_err());
    assert_eq!(client.get_reward_token(), reward_token);
}

#[test]
fn withdraw_missing_auth_no_mutation() {
    let env = Env::default();
    let (client, id) = make_client(&env);
    let (admin, reward_token) = init_ledger(&env, &client);
    token::StellarAssetClient::new(&env, &reward_token)
        .mock_all_auths()
        .mint(&id, &400);

    assert!(client.try_withdraw_reward_pool(&admin).is_err());
    assert_eq!(client.get_reward_pool_balance(), 400);
}

// ── wrong caller ──────────────────────────────────────────────

#[test]
fn mint_by_non_admin_is_rejected() {
    let env = Env::default();
    env.mock_all_auths();
    let (client, _id) = make_client(&env);
    let (_admin, _reward_token) = init_ledger(&env, &client);
    let attacker = Address::generate(&env);

    assert_eq!(
        client.try_mint(&attacker, &attacker, &5),
        Err(Ok(LedgerError::NotAuthorized))
    );
    assert_eq!(client.balance(&attacker, &GATING_ID), 0);
}

#[test]
fn burn_by_non_admin_is_rejected() {
    let env = Env::default();
    env.mock_all_auths();
    let (client, _id) = make_client(&env);
    let (admin, _reward_token) = init_ledger(&env, &client);
    let holder = Address::generate(&env);
    let attacker = Address::generate(&env);
    client.mint(&admin, &holder, &5);

    assert_eq!(
        client.try_burn(&attacker, &holder, &5),
        Err(Ok(LedgerError::NotAuthorized))
    );
    assert_eq!(client.balance(&holder, &GATING_ID), 5);
}

#[test]
fn distribute_by_non_admin_is_rejected() {
    let env = Env::default();
    env.mock_all_auths();
    let (client, id) = make_client(&env);
    let (admin, reward_token) = init_ledger(&env, &client);
    let holder = Address::generate(&env);
    let attacker = Address::generate(&env);
    client.mint(&admin, &holder, &5);
    token::StellarAssetClient::new(&env, &reward_token).mint(&id, &1_000);

    assert_eq!(
        client.try_distribute(&attacker),
        Err(Ok(LedgerError::NotAuthorized))
    );
    assert_eq!(client.balance(&holder, &GATING_ID), 5);
    assert_eq!(client.get_reward_pool_balance(), 1_000);
}

#[test]
fn admin_setters_reject_non_admin() {
    let env = Env::default();
    env.mock_all_auths();
    let (client, id) = make_client(&env);
    let (_admin, reward_token) = init_ledger(&env, &client);
    let attacker = Address::generate(&env);
    let other_token = env.register_stellar_asset_contract(Address::generate(&env));
    token::StellarAssetClient::new(&env, &reward_token).mint(&id, &50);

    assert_eq!(
        client.try_set_base_fee(&attacker, &1),
        Err(Ok(LedgerError::NotAuthorized))
    );
    assert_eq!(
        client.try_set_reward_token(&attacker, &other_token),
        Err(Ok(LedgerError::NotAuthorized))
    );
    assert_eq!(
        client.try_withdraw_reward_pool(&attacker),
        Err(Ok(LedgerError::NotAuthorized))
    );
    assert_eq!(client.get_base_fee(), 10);
    assert_eq!(client.get_reward_token(), reward_token);
    assert_eq!(client.get_reward_pool_balance(), 50);
}

#[test]
fn transfer_by_holder_needs_no_admin() {
    let env = Env::default();
    env.mock_all_auths();
    let (client, _id) = make_client(&env);
    let (admin, _reward_token) = init_ledger(&env, &client);
    let alice = Address::generate(&env);
    let bob = Address::generate(&env);
    client.mint(&admin, &alice, &5);

    client.transfer(&alice, &bob, &GATING_ID, &5);
    assert!(client.is_holder(&bob));
}
