use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Api, StdResult, Storage, Uint128};
use cw_storage_plus::{Item, Map};

use crate::deposit::DepositAccount;
use crate::engine::Ledger;
use crate::epoch::EpochTimeline;

#[cw_serde]
pub struct Config {
    pub owner: Addr,
    /// cw20 contract accepted for locking
    pub locking_token: Addr,
}

/// Decides who may run administrative operations.
pub trait Authorizer {
    fn is_authorized(&self, caller: &Addr) -> bool;
}

impl Authorizer for Config {
    fn is_authorized(&self, caller: &Addr) -> bool {
        self.owner == *caller
    }
}

pub const CONFIG: Item<Config> = Item::new("config");
pub const LOCKED_SUPPLY: Item<Uint128> = Item::new("locked_supply");
pub const EPOCHS: Item<EpochTimeline> = Item::new("epochs");
pub const DEPOSITS: Map<&Addr, DepositAccount> = Map::new("deposits");

pub fn load_ledger(store: &dyn Storage) -> StdResult<Ledger> {
    Ok(Ledger {
        locked_supply: LOCKED_SUPPLY.load(store)?,
        timeline: EPOCHS.load(store)?,
    })
}

pub fn save_ledger(store: &mut dyn Storage, ledger: &Ledger) -> StdResult<()> {
    LOCKED_SUPPLY.save(store, &ledger.locked_supply)?;
    EPOCHS.save(store, &ledger.timeline)
}

pub fn load_account(store: &dyn Storage, address: &Addr) -> StdResult<DepositAccount> {
    Ok(DEPOSITS.may_load(store, address)?.unwrap_or_default())
}

pub fn maybe_addr(api: &dyn Api, human: Option<String>) -> StdResult<Option<Addr>> {
    human.map(|x| api.addr_validate(&x)).transpose()
}
