//! Directory of current gating-credential holders.
//!
//! Entries live in a dense array (`HolderAt(0..HolderCount)`) with a reverse index
//! (`HolderSlot(address)`). Removal moves the last entry into the freed slot, so both
//! admission and removal touch a fixed number of storage keys.

use soroban_sdk::{Address, Env, Vec};

use crate::credential::{self, BalanceObserver};
use crate::{admin, DataKey, LedgerError, EVENT_HOLDER_ADDED, EVENT_HOLDER_REMOVED};

pub struct HolderDirectory {
    gating_id: u32,
    limit: u32,
}

impl HolderDirectory {
    pub fn load(env: &Env) -> Result<Self, LedgerError> {
        Ok(Self {
            gating_id: admin::read_gating_id(env)?,
            limit: admin::read_holder_limit(env)?,
        })
    }

    pub fn gating_id(&self) -> u32 {
        self.gating_id
    }

    pub fn count(env: &Env) -> u32 {
        env.storage()
            .persistent()
            .get(&DataKey::HolderCount)
            .unwrap_or(0)
    }

    pub fn contains(env: &Env, holder: &Address) -> bool {
        env.storage()
            .persistent()
            .has(&DataKey::HolderSlot(holder.clone()))
    }

    pub fn at(env: &Env, slot: u32) -> Option<Address> {
        env.storage().persistent().get(&DataKey::HolderAt(slot))
    }

    /// Entries in `start..start + limit`, plus the cursor of the next page if any.
    pub fn page(env: &Env, start: u32, limit: u32) -> (Vec<Address>, Option<u32>) {
        let count = Self::count(env);
        if start >= count {
            return (Vec::new(env), None);
        }

        let end = core::cmp::min(start.saturating_add(limit), count);
        let mut results = Vec::new(env);
        for slot in start..end {
            if let Some(holder) = Self::at(env, slot) {
                results.push_back(holder);
            }
        }

        let next_cursor = if end < count { Some(end) } else { None };
        (results, next_cursor)
    }

    fn insert(&self, env: &Env, holder: &Address) -> Result<(), LedgerError> {
        let count = Self::count(env);
        if count >= self.limit {
            return Err(LedgerError::HolderLimitReached);
        }

        let storage = env.storage().persistent();
        storage.set(&DataKey::HolderAt(count), holder);
        storage.set(&DataKey::HolderSlot(holder.clone()), &count);
        storage.set(&DataKey::HolderCount, &(count + 1));

        env.events()
            .publish((EVENT_HOLDER_ADDED, holder.clone()), count + 1);
        Ok(())
    }

    fn remove(&self, env: &Env, holder: &Address) -> Result<(), LedgerError> {
        let storage = env.storage().persistent();
        let slot_key = DataKey::HolderSlot(holder.clone());
        let Some(slot) = storage.get::<DataKey, u32>(&slot_key) else {
            return Ok(());
        };
        let count = Self::count(env);
        if slot >= count {
            return Err(LedgerError::DirectoryCorrupted);
        }
        let last = count - 1;

        if slot != last {
            let moved = Self::at(env, last).ok_or(LedgerError::DirectoryCorrupted)?;
            storage.set(&DataKey::HolderAt(slot), &moved);
            storage.set(&DataKey::HolderSlot(moved), &slot);
        }
        storage.remove(&DataKey::HolderAt(last));
        storage.remove(&slot_key);
        storage.set(&DataKey::HolderCount, &last);

        env.events()
            .publish((EVENT_HOLDER_REMOVED, holder.clone()), last);
        Ok(())
    }
}

impl BalanceObserver for HolderDirectory {
    fn on_balance_changed(
        &self,
        env: &Env,
        from: Option<&Address>,
        to: Option<&Address>,
        ids: &Vec<u32>,
        _amounts: &Vec<i128>,
    ) -> Result<(), LedgerError> {
        for id in ids.iter() {
            if id != self.gating_id {
                continue;
            }
            // Removal first: handing a whole balance to a newcomer must not trip the cap.
            if let Some(from) = from {
                if Self::contains(env, from) && credential::balance_of(env, from, id) == 0 {
                    self.remove(env, from)?;
                }
            }
            if let Some(to) = to {
                if !Self::contains(env, to) && credential::balance_of(env, to, id) > 0 {
                    self.insert(env, to)?;
                }
            }
        }
        Ok(())
    }
}
