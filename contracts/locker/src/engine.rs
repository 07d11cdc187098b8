use cosmwasm_std::{attr, Addr, Attribute, Uint128};

use crate::asset::AssetTransfer;
use crate::deposit::DepositAccount;
use crate::epoch::{EpochTimeline, SupplyDelta, EPOCH_DURATION, LOCK_DURATION};
use crate::error::ContractError;
use crate::state::Authorizer;

#[derive(Clone, Debug, PartialEq)]
pub enum LockerEvent {
    Locked {
        beneficiary: Addr,
        amount: Uint128,
        epoch_index: u32,
    },
    Withdrawn {
        caller: Addr,
        amount: Uint128,
        epoch_index: u32,
    },
    Recovered {
        token: Addr,
        recipient: Addr,
        amount: Uint128,
    },
}

impl LockerEvent {
    pub fn attributes(&self) -> Vec<Attribute> {
        match self {
            LockerEvent::Locked {
                beneficiary,
                amount,
                epoch_index,
            } => vec![
                attr("action", "lock"),
                attr("beneficiary", beneficiary),
                attr("amount", amount.to_string()),
                attr("epoch_index", epoch_index.to_string()),
            ],
            LockerEvent::Withdrawn {
                caller,
                amount,
                epoch_index,
            } => vec![
                attr("action", "withdraw"),
                attr("caller", caller),
                attr("amount", amount.to_string()),
                attr("epoch_index", epoch_index.to_string()),
            ],
            LockerEvent::Recovered {
                token,
                recipient,
                amount,
            } => vec![
                attr("action", "recover_cw20"),
                attr("token", token),
                attr("recipient", recipient),
                attr("amount", amount.to_string()),
            ],
        }
    }
}

/// Aggregate locked supply and its weekly history.
///
/// `locked_supply` always equals the supply of the latest epoch once a
/// mutating call returns.
#[derive(Clone, Debug, PartialEq)]
pub struct Ledger {
    pub locked_supply: Uint128,
    pub timeline: EpochTimeline,
}

/// Changes computed by an operation, applied only after every fallible step
/// succeeded.
struct Staged {
    ledger: Ledger,
    account: DepositAccount,
    event: LockerEvent,
}

impl Staged {
    fn commit(self, ledger: &mut Ledger, account: &mut DepositAccount) -> LockerEvent {
        *ledger = self.ledger;
        *account = self.account;
        self.event
    }
}

impl Ledger {
    pub fn new(genesis_time: u64) -> Self {
        Ledger {
            locked_supply: Uint128::zero(),
            timeline: EpochTimeline::new(genesis_time),
        }
    }

    /// Backfills the timeline up to `target` and books `delta` on the latest
    /// epoch.
    fn checkpoint(&mut self, target: u64, delta: SupplyDelta) -> Result<u32, ContractError> {
        self.locked_supply = match delta {
            SupplyDelta::Increase(amount) => self.locked_supply.checked_add(amount)?,
            SupplyDelta::Decrease(amount) => self.locked_supply.checked_sub(amount)?,
        };
        self.timeline.advance_to(target);
        self.timeline.apply(delta)
    }

    fn stage_lock(
        &self,
        account: &DepositAccount,
        beneficiary: &Addr,
        amount: Uint128,
        now: u64,
    ) -> Result<Staged, ContractError> {
        if amount.is_zero() {
            return Err(ContractError::InvalidAmount {});
        }

        let mut ledger = self.clone();
        // a lock starts counting in the epoch after the current one
        let epoch_index = ledger.checkpoint(
            now.saturating_add(EPOCH_DURATION),
            SupplyDelta::Increase(amount),
        )?;

        let mut account = account.clone();
        account.append(amount, now.saturating_add(LOCK_DURATION));

        Ok(Staged {
            ledger,
            account,
            event: LockerEvent::Locked {
                beneficiary: beneficiary.clone(),
                amount,
                epoch_index,
            },
        })
    }

    /// Pulls `amount` from `source` into custody and credits it to
    /// `beneficiary` for `LOCK_DURATION`.
    pub fn lock<A: AssetTransfer>(
        &mut self,
        account: &mut DepositAccount,
        asset: &mut A,
        source: &Addr,
        beneficiary: &Addr,
        amount: Uint128,
        now: u64,
    ) -> Result<LockerEvent, ContractError> {
        let staged = self.stage_lock(account, beneficiary, amount, now)?;

        let custody = asset.custody().clone();
        asset.transfer_from(source, &custody, amount)?;

        Ok(staged.commit(self, account))
    }

    /// Credits a lock for funds that already sit in custody.
    pub fn record_lock(
        &mut self,
        account: &mut DepositAccount,
        beneficiary: &Addr,
        amount: Uint128,
        now: u64,
    ) -> Result<LockerEvent, ContractError> {
        let staged = self.stage_lock(account, beneficiary, amount, now)?;
        Ok(staged.commit(self, account))
    }

    /// Releases `amount` of unlocked funds to `caller`, oldest deposits first.
    pub fn withdraw<A: AssetTransfer>(
        &mut self,
        account: &mut DepositAccount,
        asset: &mut A,
        caller: &Addr,
        amount: Uint128,
        now: u64,
    ) -> Result<LockerEvent, ContractError> {
        if amount.is_zero() {
            return Err(ContractError::InvalidAmount {});
        }

        let mut staged_account = account.clone();
        staged_account.debit_fifo(amount, now)?;

        let mut ledger = self.clone();
        let epoch_index = ledger.checkpoint(now, SupplyDelta::Decrease(amount))?;

        asset.transfer(caller, amount)?;

        let staged = Staged {
            ledger,
            account: staged_account,
            event: LockerEvent::Withdrawn {
                caller: caller.clone(),
                amount,
                epoch_index,
            },
        };
        Ok(staged.commit(self, account))
    }
}

/// Sends tokens mistakenly held by the locker to an authorized caller. The
/// locking token itself can never leave this way.
pub fn recover<U: Authorizer, A: AssetTransfer>(
    authorizer: &U,
    locking_token: &Addr,
    asset: &mut A,
    caller: &Addr,
    token: &Addr,
    amount: Uint128,
) -> Result<LockerEvent, ContractError> {
    if !authorizer.is_authorized(caller) {
        return Err(ContractError::Unauthorized {});
    }
    if token == locking_token {
        return Err(ContractError::ForbiddenAsset {});
    }
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {});
    }

    asset.transfer(caller, amount)?;

    Ok(LockerEvent::Recovered {
        token: token.clone(),
        recipient: caller.clone(),
        amount,
    })
}
