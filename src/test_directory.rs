#![cfg(test)]
//! Holder directory invariants under randomized sequences of balance-changing calls,
//! distribution included.

use std::vec::Vec as StdVec;

use arbitrary::{Arbitrary, Unstructured};
use soroban_sdk::{testutils::Address as _, token, vec, Address, Env, Vec};

use crate::{DataKey, GatedRewardLedger, GatedRewardLedgerClient};

const GATING_ID: u32 = 3;
const OTHER_ID: u32 = 4;
const ACTORS: usize = 6;
const HOLDER_LIMIT: u32 = 4;
const POOL: i128 = 1_000_000;

#[derive(Arbitrary, Debug)]
enum Op {
    Mint { to: u8, amount: u8 },
    Burn { from: u8, amount: u8 },
    Transfer { from: u8, to: u8, amount: u8 },
    MintOther { to: u8, amount: u8 },
    TransferOther { from: u8, to: u8, amount: u8 },
    SelfTransfer { who: u8, amount: u8 },
    TransferBatch { from: u8, to: u8, first: u8, second: u8, repeat: bool },
    BurnBatch { from: u8, first: u8, second: u8, repeat: bool },
    Distribute,
}

fn setup() -> (Env, GatedRewardLedgerClient<'static>, Address, Address) {
    let env = Env::default();
    env.mock_all_auths();
    env.budget().reset_unlimited();
    let contract_id = env.register_contract(None, GatedRewardLedger);
    let client = GatedRewardLedgerClient::new(&env, &contract_id);
    let admin = Address::generate(&env);
    let reward_token = env.register_stellar_asset_contract(Address::generate(&env));
    client.initialize(&admin, &reward_token, &GATING_ID, &1, &HOLDER_LIMIT);
    token::StellarAssetClient::new(&env, &reward_token).mint(&contract_id, &POOL);
    (env, client, admin, contract_id)
}

fn actors(env: &Env) -> StdVec<Address> {
    (0..ACTORS).map(|_| Address::generate(env)).collect()
}

/// Deterministic byte stream (xorshift) to feed `Unstructured`.
fn seed_bytes(seed: u64, len: usize) -> StdVec<u8> {
    let mut state = seed.max(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state & 0xff) as u8
        })
        .collect()
}

/// Second id of a two-entry batch: the gating id again, or an unrelated id.
fn batch_ids(env: &Env, repeat: bool) -> Vec<u32> {
    let second = if repeat { GATING_ID } else { OTHER_ID };
    vec![env, GATING_ID, second]
}

// Failures (short balance, zero amount, full directory, nothing to pay) are part of the sequence.
fn apply(env: &Env, client: &GatedRewardLedgerClient, admin: &Address, actors: &[Address], op: &Op) {
    let pick = move |i: u8| &actors[i as usize % actors.len()];
    let amount_of = |a: u8| i128::from(a % 8);
    match *op {
        Op::Mint { to, amount } => {
            let _ = client.try_mint(admin, pick(to), &amount_of(amount));
        }
        Op::Burn { from, amount } => {
            let _ = client.try_burn(admin, pick(from), &amount_of(amount));
        }
        Op::Transfer { from, to, amount } => {
            let _ = client.try_transfer(pick(from), pick(to), &GATING_ID, &amount_of(amount));
        }
        Op::MintOther { to, amount } => {
            let _ = client.try_mint_batch(
                admin,
                pick(to),
                &vec![env, OTHER_ID],
                &vec![env, amount_of(amount)],
            );
        }
        Op::TransferOther { from, to, amount } => {
            let _ = client.try_transfer(pick(from), pick(to), &OTHER_ID, &amount_of(amount));
        }
        Op::SelfTransfer { who, amount } => {
            let _ = client.try_transfer(pick(who), pick(who), &GATING_ID, &amount_of(amount));
        }
        Op::TransferBatch {
            from,
            to,
            first,
            second,
            repeat,
        } => {
            let _ = client.try_transfer_batch(
                pick(from),
                pick(to),
                &batch_ids(env, repeat),
                &vec![env, amount_of(first), amount_of(second)],
            );
        }
        Op::BurnBatch {
            from,
            first,
            second,
            repeat,
        } => {
            let _ = client.try_burn_batch(
                admin,
                pick(from),
                &batch_ids(env, repeat),
                &vec![env, amount_of(first), amount_of(second)],
            );
        }
        Op::Distribute => {
            let _ = client.try_distribute(admin);
        }
    }
}

fn assert_consistent(
    env: &Env,
    client: &GatedRewardLedgerClient,
    ledger: &Address,
    actors: &[Address],
) {
    let mut positive = 0_u32;
    for actor in actors {
        let holds = client.balance(actor, &GATING_ID) > 0;
        assert_eq!(client.is_holder(actor), holds);
        if holds {
            positive += 1;
        }
    }
    let count = client.get_holder_count();
    assert_eq!(count, positive);
    assert!(count <= HOLDER_LIMIT);

    // Every slot points back at itself and holds a distinct address.
    env.as_contract(ledger, || {
        let storage = env.storage().persistent();
        let mut seen: StdVec<Address> = StdVec::new();
        for slot in 0..count {
            let holder: Address = storage.get(&DataKey::HolderAt(slot)).unwrap();
            let back: u32 = storage.get(&DataKey::HolderSlot(holder.clone())).unwrap();
            assert_eq!(back, slot);
            assert!(!seen.contains(&holder));
            seen.push(holder);
        }
        assert!(!storage.has(&DataKey::HolderAt(count)));
    });
}

#[test]
fn directory_tracks_positive_balances_under_random_ops() {
    for seed in 1..=8_u64 {
        let (env, client, admin, ledger) = setup();
        let actors = actors(&env);
        let bytes = seed_bytes(seed, 1024);
        let mut u = Unstructured::new(&bytes);

        for _ in 0..60 {
            let Ok(op) = Op::arbitrary(&mut u) else {
                break;
            };
            apply(&env, &client, &admin, &actors, &op);
            assert_consistent(&env, &client, &ledger, &actors);
        }
    }
}

#[test]
fn removal_moves_last_entry_into_freed_slot() {
    let (env, client, admin, _ledger) = setup();
    let a = Address::generate(&env);
    let b = Address::generate(&env);
    let c = Address::generate(&env);
    client.mint(&admin, &a, &1);
    client.mint(&admin, &b, &1);
    client.mint(&admin, &c, &1);

    client.burn(&admin, &a, &1);

    let (page, _) = client.get_holders_page(&0, &10);
    assert_eq!(page.len(), 2);
    assert_eq!(page.get(0).unwrap(), c);
    assert_eq!(page.get(1).unwrap(), b);
}

#[test]
fn removing_last_entry_just_truncates() {
    let (env, client, admin, _ledger) = setup();
    let a = Address::generate(&env);
    let b = Address::generate(&env);
    client.mint(&admin, &a, &1);
    client.mint(&admin, &b, &1);

    client.burn(&admin, &b, &1);

    let (page, _) = client.get_holders_page(&0, &10);
    assert_eq!(page.len(), 1);
    assert_eq!(page.get(0).unwrap(), a);
}

#[test]
fn capacity_rejection_leaves_directory_intact() {
    let (env, client, admin, ledger) = setup();
    let actors = actors(&env);
    for actor in actors.iter().take(HOLDER_LIMIT as usize) {
        client.mint(&admin, actor, &2);
    }
    let newcomer = &actors[HOLDER_LIMIT as usize];

    assert!(client.try_mint(&admin, newcomer, &1).is_err());
    assert!(client
        .try_transfer(&actors[0], newcomer, &GATING_ID, &1)
        .is_err());

    assert_eq!(client.get_holder_count(), HOLDER_LIMIT);
    assert_consistent(&env, &client, &ledger, &actors);
}

#[test]
fn batch_repeating_gating_id_moves_holder_once() {
    let (env, client, admin, ledger) = setup();
    let a = Address::generate(&env);
    let b = Address::generate(&env);
    client.mint(&admin, &a, &5);

    client.transfer_batch(
        &a,
        &b,
        &vec![&env, GATING_ID, GATING_ID],
        &vec![&env, 3, 2],
    );

    assert!(!client.is_holder(&a));
    assert!(client.is_holder(&b));
    assert_eq!(client.balance(&b, &GATING_ID), 5);
    assert_eq!(client.get_holder_count(), 1);
    assert_consistent(&env, &client, &ledger, &[a, b]);
}

#[test]
fn distribution_empties_directory() {
    let (env, client, admin, ledger) = setup();
    let actors = actors(&env);
    for actor in actors.iter().take(HOLDER_LIMIT as usize) {
        client.mint(&admin, actor, &3);
    }

    assert_eq!(client.distribute(&admin), 3 * i128::from(HOLDER_LIMIT));
    assert_eq!(client.get_holder_count(), 0);
    assert_consistent(&env, &client, &ledger, &actors);

    client.mint(&admin, &actors[HOLDER_LIMIT as usize], &1);
    assert_consistent(&env, &client, &ledger, &actors);
}
