#![no_std]
#![deny(unsafe_code)]
#![deny(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
#[cfg(test)]
extern crate std;

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, token, Address, Env,
    Symbol, Vec,
};

mod admin;
mod credential;
mod directory;
mod distribution;

use credential::CredentialStore;
use directory::HolderDirectory;

/// Centralized contract error codes. Missing signatures are signaled by host panic (require_auth).
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[repr(u32)]
pub enum LedgerError {
    /// Ledger has not been initialized (admin not set).
    NotInitialized = 1,
    /// `initialize` was already called.
    AlreadyInitialized = 2,
    /// Caller is not the ledger administrator.
    NotAuthorized = 3,
    /// Reward token reference is not usable (the ledger itself).
    InvalidTokenAddress = 4,
    /// Amount is zero or negative, or a batch is empty.
    InvalidAmount = 5,
    /// Batch ids and amounts differ in length.
    LengthMismatch = 6,
    /// Burn or transfer exceeds the credential balance.
    InsufficientBalance = 7,
    /// Holder directory is at capacity; a new holder cannot be admitted.
    HolderLimitReached = 8,
    /// Reward pool held by the ledger is empty.
    NoFundsAvailable = 9,
    /// No directory entry holds a positive gating balance.
    NoEligibleRecipients = 10,
    /// Reward pool cannot cover the proportional payout.
    InsufficientFunds = 11,
    /// Checked arithmetic overflowed.
    ArithmeticOverflow = 12,
    /// Holder directory storage is inconsistent (a slot below the count is empty).
    DirectoryCorrupted = 13,
}

// ── Event symbols ────────────────────────────────────────────
const EVENT_INIT: Symbol = symbol_short!("init");
const EVENT_MINT: Symbol = symbol_short!("mint");
const EVENT_BURN: Symbol = symbol_short!("burn");
const EVENT_TRANSFER: Symbol = symbol_short!("transfer");
const EVENT_HOLDER_ADDED: Symbol = symbol_short!("hold_add");
const EVENT_HOLDER_REMOVED: Symbol = symbol_short!("hold_rem");
const EVENT_DISTRIBUTED: Symbol = symbol_short!("dist");
const EVENT_DISTRIBUTION_DONE: Symbol = symbol_short!("dist_done");
const EVENT_REWARD_TOKEN_SET: Symbol = symbol_short!("rwd_set");
const EVENT_BASE_FEE_SET: Symbol = symbol_short!("fee_set");
const EVENT_POOL_WITHDRAWN: Symbol = symbol_short!("pool_wd");

// ── Data structures ──────────────────────────────────────────
/// Contract version identifier. Bumped when storage or semantics change.
pub const CONTRACT_VERSION: u32 = 1;

/// Hard cap on the number of directory entries. `distribute` pays every holder in one
/// invocation, and a full directory must fit the default host budget.
pub const MAX_HOLDERS: u32 = 40;

/// Maximum number of holders returned in a single page.
const MAX_PAGE_LIMIT: u32 = 50;

/// One eligible recipient of a distribution.
#[contracttype]
#[derive(Clone, Debug, PartialEq)]
pub struct Payout {
    pub holder: Address,
    /// Gating credential balance that will be burned.
    pub balance: i128,
    /// Reward units paid: `balance * base_fee`.
    pub amount: i128,
}

/// Result of the validation phase of a distribution. Nothing here is persisted.
#[contracttype]
#[derive(Clone, Debug, PartialEq)]
pub struct DistributionPlan {
    pub base_fee: u64,
    pub pool_balance: i128,
    pub total_required: i128,
    /// Eligible holders in directory order.
    pub payouts: Vec<Payout>,
}

/// Storage keys. Configuration lives under singleton keys, credential balances under
/// `Balance(holder, id)`, and the holder directory is an array (`HolderAt`) with a
/// reverse index (`HolderSlot`) so membership changes touch a constant number of keys.
#[contracttype]
pub enum DataKey {
    /// Ledger administrator; fixed at initialization.
    Admin,
    /// Token contract the reward pool is held in.
    RewardToken,
    /// Reward units paid per unit of gating credential.
    BaseFee,
    /// Credential id whose holders are tracked and paid.
    GatingId,
    /// Directory capacity, at most MAX_HOLDERS.
    HolderLimit,
    /// Credential balance for (holder, credential id).
    Balance(Address, u32),
    /// Number of directory entries.
    HolderCount,
    /// Directory entry at a slot in `0..HolderCount`.
    HolderAt(u32),
    /// Slot currently occupied by a holder; present iff the address is a holder.
    HolderSlot(Address),
}

// ── Contract ─────────────────────────────────────────────────
#[contract]
pub struct GatedRewardLedger;

#[contractimpl]
impl GatedRewardLedger {
    /// Configure the ledger. Can only be called once.
    ///
    /// `holder_limit` of 0, or above MAX_HOLDERS, resolves to MAX_HOLDERS.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: admin is already set
    /// - `InvalidTokenAddress`: `reward_token` is the ledger itself
    pub fn initialize(
        env: Env,
        admin: Address,
        reward_token: Address,
        gating_id: u32,
        base_fee: u64,
        holder_limit: u32,
    ) -> Result<(), LedgerError> {
        if env.storage().persistent().has(&DataKey::Admin) {
            return Err(LedgerError::AlreadyInitialized);
        }
        admin::require_valid_reward_token(&env, &reward_token)?;
        let holder_limit = admin::resolve_holder_limit(holder_limit);

        let storage = env.storage().persistent();
        storage.set(&DataKey::Admin, &admin);
        storage.set(&DataKey::RewardToken, &reward_token);
        storage.set(&DataKey::GatingId, &gating_id);
        storage.set(&DataKey::BaseFee, &base_fee);
        storage.set(&DataKey::HolderLimit, &holder_limit);

        env.events().publish(
            (EVENT_INIT, admin),
            (reward_token, gating_id, base_fee, holder_limit),
        );
        Ok(())
    }

    // ── Credential issuance ───────────────────────────────────

    /// Mint `amount` of the gating credential to `to`. Admin only.
    /// Fails with `HolderLimitReached` if `to` is a new holder and the directory is full.
    pub fn mint(env: Env, caller: Address, to: Address, amount: i128) -> Result<(), LedgerError> {
        admin::require_admin(&env, &caller)?;
        let directory = HolderDirectory::load(&env)?;
        CredentialStore::new(&env, &directory).mint(&to, directory.gating_id(), amount)
    }

    /// Burn `amount` of the gating credential from `from`. Admin only.
    pub fn burn(env: Env, caller: Address, from: Address, amount: i128) -> Result<(), LedgerError> {
        admin::require_admin(&env, &caller)?;
        let directory = HolderDirectory::load(&env)?;
        CredentialStore::new(&env, &directory).burn(&from, directory.gating_id(), amount)
    }

    /// Mint several credential ids to `to` in one call. Admin only.
    /// Only the gating id affects the holder directory.
    pub fn mint_batch(
        env: Env,
        caller: Address,
        to: Address,
        ids: Vec<u32>,
        amounts: Vec<i128>,
    ) -> Result<(), LedgerError> {
        admin::require_admin(&env, &caller)?;
        let directory = HolderDirectory::load(&env)?;
        CredentialStore::new(&env, &directory).mint_batch(&to, &ids, &amounts)
    }

    /// Burn several credential ids from `from` in one call. Admin only.
    pub fn burn_batch(
        env: Env,
        caller: Address,
        from: Address,
        ids: Vec<u32>,
        amounts: Vec<i128>,
    ) -> Result<(), LedgerError> {
        admin::require_admin(&env, &caller)?;
        let directory = HolderDirectory::load(&env)?;
        CredentialStore::new(&env, &directory).burn_batch(&from, &ids, &amounts)
    }

    // ── Holder-to-holder transfers ────────────────────────────

    /// Move `amount` of credential `id` from `from` to `to`. `from` must authorize.
    pub fn transfer(
        env: Env,
        from: Address,
        to: Address,
        id: u32,
        amount: i128,
    ) -> Result<(), LedgerError> {
        from.require_auth();
        let directory = HolderDirectory::load(&env)?;
        CredentialStore::new(&env, &directory).transfer(&from, &to, id, amount)
    }

    /// Batch variant of `transfer`.
    pub fn transfer_batch(
        env: Env,
        from: Address,
        to: Address,
        ids: Vec<u32>,
        amounts: Vec<i128>,
    ) -> Result<(), LedgerError> {
        from.require_auth();
        let directory = HolderDirectory::load(&env)?;
        CredentialStore::new(&env, &directory).transfer_batch(&from, &to, &ids, &amounts)
    }

    /// Credential balance of `holder` for `id`.
    pub fn balance(env: Env, holder: Address, id: u32) -> i128 {
        credential::balance_of(&env, &holder, id)
    }

    // ── Distribution ──────────────────────────────────────────

    /// Pay every eligible holder `balance * base_fee` from the reward pool and burn
    /// their gating credential. Admin only. Returns the total paid.
    ///
    /// All checks run before any transfer or burn; if anything fails the
    /// invocation is rejected as a whole and no holder is paid or burned.
    ///
    /// # Errors
    /// - `NoFundsAvailable`: the pool is empty
    /// - `NoEligibleRecipients`: no holder has a positive gating balance
    /// - `InsufficientFunds`: the pool is smaller than the total payout
    /// - `ArithmeticOverflow`: a payout or the total overflowed i128
    pub fn distribute(env: Env, caller: Address) -> Result<i128, LedgerError> {
        let admin = admin::require_admin(&env, &caller)?;
        let reward_token = admin::read_reward_token(&env)?;
        let base_fee = admin::read_base_fee(&env);
        let directory = HolderDirectory::load(&env)?;

        let plan = distribution::plan(&env, &reward_token, directory.gating_id(), base_fee)?;
        let store = CredentialStore::new(&env, &directory);
        let total_paid =
            distribution::execute(&env, &reward_token, &store, directory.gating_id(), &plan)?;

        env.events().publish(
            (EVENT_DISTRIBUTION_DONE, admin),
            (total_paid, plan.payouts.len()),
        );
        Ok(total_paid)
    }

    /// Read-only: run the validation phase of `distribute` and return the payouts it
    /// would make. Fails with the same errors `distribute` would.
    pub fn simulate_distribution(env: Env) -> Result<DistributionPlan, LedgerError> {
        let reward_token = admin::read_reward_token(&env)?;
        let base_fee = admin::read_base_fee(&env);
        let gating_id = admin::read_gating_id(&env)?;
        distribution::plan(&env, &reward_token, gating_id, base_fee)
    }

    // ── Administrative controls ───────────────────────────────

    /// Replace the reward pool token. Admin only.
    pub fn set_reward_token(
        env: Env,
        caller: Address,
        reward_token: Address,
    ) -> Result<(), LedgerError> {
        let admin = admin::require_admin(&env, &caller)?;
        admin::require_valid_reward_token(&env, &reward_token)?;

        let previous = admin::read_reward_token(&env)?;
        env.storage()
            .persistent()
            .set(&DataKey::RewardToken, &reward_token);

        env.events()
            .publish((EVENT_REWARD_TOKEN_SET, admin), (previous, reward_token));
        Ok(())
    }

    /// Set reward units paid per unit of gating credential. Admin only.
    /// Applies from the next `distribute` call. Zero is allowed.
    pub fn set_base_fee(env: Env, caller: Address, base_fee: u64) -> Result<(), LedgerError> {
        let admin = admin::require_admin(&env, &caller)?;

        let previous = admin::read_base_fee(&env);
        env.storage().persistent().set(&DataKey::BaseFee, &base_fee);

        env.events()
            .publish((EVENT_BASE_FEE_SET, admin), (previous, base_fee));
        Ok(())
    }

    /// Transfer the whole reward pool to the administrator. Admin only.
    /// Returns the amount withdrawn; an empty pool withdraws 0 and emits nothing.
    pub fn withdraw_reward_pool(env: Env, caller: Address) -> Result<i128, LedgerError> {
        let admin = admin::require_admin(&env, &caller)?;
        let reward_token = admin::read_reward_token(&env)?;

        let ledger = env.current_contract_address();
        let pool = token::Client::new(&env, &reward_token);
        let amount = pool.balance(&ledger);
        if amount <= 0 {
            return Ok(0);
        }
        pool.transfer(&ledger, &admin, &amount);

        env.events()
            .publish((EVENT_POOL_WITHDRAWN, admin), (reward_token, amount));
        Ok(amount)
    }

    // ── Queries ───────────────────────────────────────────────

    /// Number of addresses currently holding the gating credential.
    pub fn get_holder_count(env: Env) -> u32 {
        HolderDirectory::count(&env)
    }

    /// Returns `true` if `holder` is in the holder directory.
    pub fn is_holder(env: Env, holder: Address) -> bool {
        HolderDirectory::contains(&env, &holder)
    }

    /// Return a page of holders. Limit capped at MAX_PAGE_LIMIT (50).
    /// Ordering follows directory slots, which change when a holder leaves.
    pub fn get_holders_page(env: Env, start: u32, limit: u32) -> (Vec<Address>, Option<u32>) {
        let effective_limit = if limit == 0 || limit > MAX_PAGE_LIMIT {
            MAX_PAGE_LIMIT
        } else {
            limit
        };
        HolderDirectory::page(&env, start, effective_limit)
    }

    pub fn get_reward_token(env: Env) -> Result<Address, LedgerError> {
        admin::read_reward_token(&env)
    }

    pub fn get_base_fee(env: Env) -> u64 {
        admin::read_base_fee(&env)
    }

    pub fn get_admin(env: Env) -> Option<Address> {
        admin::read_admin(&env).ok()
    }

    pub fn get_gating_id(env: Env) -> Result<u32, LedgerError> {
        admin::read_gating_id(&env)
    }

    pub fn get_holder_limit(env: Env) -> Result<u32, LedgerError> {
        admin::read_holder_limit(&env)
    }

    /// Reward pool balance held by the ledger.
    pub fn get_reward_pool_balance(env: Env) -> Result<i128, LedgerError> {
        let reward_token = admin::read_reward_token(&env)?;
        Ok(token::Client::new(&env, &reward_token).balance(&env.current_contract_address()))
    }

    /// Return the current contract version.
    pub fn get_version(env: Env) -> u32 {
        let _ = env;
        CONTRACT_VERSION
    }
}

mod test_auth;
mod test_directory;
