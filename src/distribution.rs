//! Proportional payout with burn, split into a read-only `plan` and an `execute` step
//! that only runs once the plan has passed every check.

use soroban_sdk::{token, Address, Env, Vec};

use crate::credential::{self, BalanceObserver, CredentialStore};
use crate::directory::HolderDirectory;
use crate::{DistributionPlan, LedgerError, Payout, EVENT_DISTRIBUTED};

/// Snapshot eligible holders and validate the pool. Writes nothing.
///
/// Directory entries whose live gating balance is zero are skipped.
pub fn plan(
    env: &Env,
    reward_token: &Address,
    gating_id: u32,
    base_fee: u64,
) -> Result<DistributionPlan, LedgerError> {
    let pool_balance =
        token::Client::new(env, reward_token).balance(&env.current_contract_address());
    if pool_balance <= 0 {
        return Err(LedgerError::NoFundsAvailable);
    }

    let fee = i128::from(base_fee);
    let mut total_required: i128 = 0;
    let mut payouts = Vec::new(env);
    for slot in 0..HolderDirectory::count(env) {
        let Some(holder) = HolderDirectory::at(env, slot) else {
            continue;
        };
        let balance = credential::balance_of(env, &holder, gating_id);
        if balance <= 0 {
            continue;
        }
        let amount = balance
            .checked_mul(fee)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        total_required = total_required
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        payouts.push_back(Payout {
            holder,
            balance,
            amount,
        });
    }

    if payouts.is_empty() {
        return Err(LedgerError::NoEligibleRecipients);
    }
    if pool_balance < total_required {
        return Err(LedgerError::InsufficientFunds);
    }

    Ok(DistributionPlan {
        base_fee,
        pool_balance,
        total_required,
        payouts,
    })
}

/// Pay and burn every entry of a validated plan, in plan order. Returns the total paid.
///
/// Burning goes through the credential store, so each recipient leaves the directory here.
pub fn execute<O: BalanceObserver>(
    env: &Env,
    reward_token: &Address,
    store: &CredentialStore<'_, O>,
    gating_id: u32,
    plan: &DistributionPlan,
) -> Result<i128, LedgerError> {
    let pool = token::Client::new(env, reward_token);
    let ledger = env.current_contract_address();

    let mut total_paid: i128 = 0;
    for payout in plan.payouts.iter() {
        if payout.amount > 0 {
            pool.transfer(&ledger, &payout.holder, &payout.amount);
        }
        store.burn(&payout.holder, gating_id, payout.balance)?;
        total_paid = total_paid
            .checked_add(payout.amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        env.events().publish(
            (EVENT_DISTRIBUTED, payout.holder.clone()),
            (payout.amount, payout.balance),
        );
    }
    Ok(total_paid)
}
