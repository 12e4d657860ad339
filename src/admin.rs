use soroban_sdk::{Address, Env};

use crate::{DataKey, LedgerError, MAX_HOLDERS};

pub fn read_admin(env: &Env) -> Result<Address, LedgerError> {
    env.storage()
        .persistent()
        .get(&DataKey::Admin)
        .ok_or(LedgerError::NotInitialized)
}

/// Authenticate `caller` and check it is the administrator. Call before touching state.
pub fn require_admin(env: &Env, caller: &Address) -> Result<Address, LedgerError> {
    caller.require_auth();
    let admin = read_admin(env)?;
    if *caller != admin {
        return Err(LedgerError::NotAuthorized);
    }
    Ok(admin)
}

/// The ledger cannot hold its own pool, so its own address stands in for the null reference.
pub fn require_valid_reward_token(env: &Env, reward_token: &Address) -> Result<(), LedgerError> {
    if *reward_token == env.current_contract_address() {
        return Err(LedgerError::InvalidTokenAddress);
    }
    Ok(())
}

pub fn read_reward_token(env: &Env) -> Result<Address, LedgerError> {
    env.storage()
        .persistent()
        .get(&DataKey::RewardToken)
        .ok_or(LedgerError::NotInitialized)
}

pub fn read_base_fee(env: &Env) -> u64 {
    env.storage()
        .persistent()
        .get(&DataKey::BaseFee)
        .unwrap_or(0)
}

pub fn read_gating_id(env: &Env) -> Result<u32, LedgerError> {
    env.storage()
        .persistent()
        .get(&DataKey::GatingId)
        .ok_or(LedgerError::NotInitialized)
}

pub fn read_holder_limit(env: &Env) -> Result<u32, LedgerError> {
    env.storage()
        .persistent()
        .get(&DataKey::HolderLimit)
        .ok_or(LedgerError::NotInitialized)
}

/// 0 or anything above the hard cap means "use the hard cap".
pub fn resolve_holder_limit(limit: u32) -> u32 {
    if limit == 0 || limit > MAX_HOLDERS {
        MAX_HOLDERS
    } else {
        limit
    }
}
