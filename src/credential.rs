//! Multi-id fungible credential balances.
//!
//! Every mutation writes balances first and then notifies a [`BalanceObserver`] with the
//! same `(from, to, ids, amounts)` it applied. A failing observer fails the whole call,
//! and the host discards the balance writes together with everything else.

use soroban_sdk::{vec, Address, Env, Vec};

use crate::{DataKey, LedgerError, EVENT_BURN, EVENT_MINT, EVENT_TRANSFER};

/// Post-mutation hook. `from` is `None` for mints, `to` is `None` for burns.
pub trait BalanceObserver {
    fn on_balance_changed(
        &self,
        env: &Env,
        from: Option<&Address>,
        to: Option<&Address>,
        ids: &Vec<u32>,
        amounts: &Vec<i128>,
    ) -> Result<(), LedgerError>;
}

pub fn balance_of(env: &Env, holder: &Address, id: u32) -> i128 {
    let key = DataKey::Balance(holder.clone(), id);
    env.storage().persistent().get(&key).unwrap_or(0)
}

// Zero balances are removed rather than stored.
fn write_balance(env: &Env, holder: &Address, id: u32, amount: i128) {
    let key = DataKey::Balance(holder.clone(), id);
    if amount == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &amount);
    }
}

fn require_valid_batch(ids: &Vec<u32>, amounts: &Vec<i128>) -> Result<(), LedgerError> {
    if ids.len() != amounts.len() {
        return Err(LedgerError::LengthMismatch);
    }
    if ids.is_empty() {
        return Err(LedgerError::InvalidAmount);
    }
    for amount in amounts.iter() {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }
    }
    Ok(())
}

pub struct CredentialStore<'a, O: BalanceObserver> {
    env: &'a Env,
    observer: &'a O,
}

impl<'a, O: BalanceObserver> CredentialStore<'a, O> {
    pub fn new(env: &'a Env, observer: &'a O) -> Self {
        Self { env, observer }
    }

    pub fn mint(&self, to: &Address, id: u32, amount: i128) -> Result<(), LedgerError> {
        self.mint_batch(to, &vec![self.env, id], &vec![self.env, amount])
    }

    pub fn burn(&self, from: &Address, id: u32, amount: i128) -> Result<(), LedgerError> {
        self.burn_batch(from, &vec![self.env, id], &vec![self.env, amount])
    }

    pub fn transfer(
        &self,
        from: &Address,
        to: &Address,
        id: u32,
        amount: i128,
    ) -> Result<(), LedgerError> {
        self.transfer_batch(from, to, &vec![self.env, id], &vec![self.env, amount])
    }

    pub fn mint_batch(
        &self,
        to: &Address,
        ids: &Vec<u32>,
        amounts: &Vec<i128>,
    ) -> Result<(), LedgerError> {
        require_valid_batch(ids, amounts)?;
        for (id, amount) in ids.iter().zip(amounts.iter()) {
            let updated = balance_of(self.env, to, id)
                .checked_add(amount)
                .ok_or(LedgerError::ArithmeticOverflow)?;
            write_balance(self.env, to, id, updated);
            self.env
                .events()
                .publish((EVENT_MINT, to.clone(), id), amount);
        }
        self.observer
            .on_balance_changed(self.env, None, Some(to), ids, amounts)
    }

    pub fn burn_batch(
        &self,
        from: &Address,
        ids: &Vec<u32>,
        amounts: &Vec<i128>,
    ) -> Result<(), LedgerError> {
        require_valid_batch(ids, amounts)?;
        for (id, amount) in ids.iter().zip(amounts.iter()) {
            let current = balance_of(self.env, from, id);
            if current < amount {
                return Err(LedgerError::InsufficientBalance);
            }
            write_balance(self.env, from, id, current - amount);
            self.env
                .events()
                .publish((EVENT_BURN, from.clone(), id), amount);
        }
        self.observer
            .on_balance_changed(self.env, Some(from), None, ids, amounts)
    }

    pub fn transfer_batch(
        &self,
        from: &Address,
        to: &Address,
        ids: &Vec<u32>,
        amounts: &Vec<i128>,
    ) -> Result<(), LedgerError> {
        require_valid_batch(ids, amounts)?;
        for (id, amount) in ids.iter().zip(amounts.iter()) {
            let from_balance = balance_of(self.env, from, id);
            if from_balance < amount {
                return Err(LedgerError::InsufficientBalance);
            }
            write_balance(self.env, from, id, from_balance - amount);

            // Read after the debit so a self-transfer nets to zero.
            let to_balance = balance_of(self.env, to, id)
                .checked_add(amount)
                .ok_or(LedgerError::ArithmeticOverflow)?;
            write_balance(self.env, to, id, to_balance);

            self.env
                .events()
                .publish((EVENT_TRANSFER, from.clone(), to.clone(), id), amount);
        }
        self.observer
            .on_balance_changed(self.env, Some(from), Some(to), ids, amounts)
    }
}
