#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    from_binary, to_binary, Addr, Binary, Deps, DepsMut, Env, MessageInfo, Response, Uint128,
};

use crate::asset::Cw20Asset;
use crate::engine::{recover, Ledger};
use crate::error::ContractError;
use crate::msg::{
    BalanceResponse, ConfigResponse, DepositInfo, DepositsResponse, EpochCountResponse,
    EpochIndexResponse, EpochResponse, EpochsResponse, ExecuteMsg, InstantiateMsg, QueryMsg,
    ReceiveMsg, SupplyResponse,
};
use crate::state::{
    load_account, load_ledger, maybe_addr, save_ledger, Config, CONFIG, DEPOSITS, EPOCHS,
    LOCKED_SUPPLY,
};

use cw2::set_contract_version;
use cw20::Cw20ReceiveMsg;

// version info for migration info
const CONTRACT_NAME: &str = "crates.io:cw-disper-locker";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 30;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let owner = maybe_addr(deps.api, msg.owner)?.unwrap_or(info.sender);
    let config = Config {
        owner,
        locking_token: deps.api.addr_validate(&msg.locking_token)?,
    };
    CONFIG.save(deps.storage, &config)?;

    // genesis epoch
    save_ledger(deps.storage, &Ledger::new(env.block.time.seconds()))?;

    let res = Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("owner", config.owner)
        .add_attribute("locking_token", config.locking_token);
    Ok(res)
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Lock {
            amount,
            beneficiary,
        } => execute_lock(deps, env, info, amount, beneficiary),
        ExecuteMsg::Withdraw { amount } => execute_withdraw(deps, env, info, amount),
        ExecuteMsg::RecoverCw20 { token, amount } => {
            execute_recover_cw20(deps, env, info, token, amount)
        }
        ExecuteMsg::Receive(msg) => execute_receive(deps, env, info, msg),
    }
}

pub fn execute_lock(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    amount: Uint128,
    beneficiary: Option<String>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let beneficiary = maybe_addr(deps.api, beneficiary)?.unwrap_or_else(|| info.sender.clone());

    let mut ledger = load_ledger(deps.storage)?;
    let mut account = load_account(deps.storage, &beneficiary)?;
    let mut asset = Cw20Asset::new(
        deps.querier,
        env.block.clone(),
        config.locking_token,
        env.contract.address,
    );

    let event = ledger.lock(
        &mut account,
        &mut asset,
        &info.sender,
        &beneficiary,
        amount,
        env.block.time.seconds(),
    )?;

    save_ledger(deps.storage, &ledger)?;
    DEPOSITS.save(deps.storage, &beneficiary, &account)?;

    let res = Response::new()
        .add_messages(asset.into_messages())
        .add_attributes(event.attributes());
    Ok(res)
}

pub fn execute_receive(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    wrapper: Cw20ReceiveMsg,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    // only the locking token can call the hook
    if info.sender != config.locking_token {
        return Err(ContractError::InvalidToken {
            token: info.sender.into(),
        });
    }

    let msg: ReceiveMsg = from_binary(&wrapper.msg)?;
    let sender = deps.api.addr_validate(&wrapper.sender)?;
    match msg {
        ReceiveMsg::Lock { beneficiary } => {
            let beneficiary = maybe_addr(deps.api, beneficiary)?.unwrap_or(sender);
            lock_received(deps, env, beneficiary, wrapper.amount)
        }
    }
}

fn lock_received(
    deps: DepsMut,
    env: Env,
    beneficiary: Addr,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let mut ledger = load_ledger(deps.storage)?;
    let mut account = load_account(deps.storage, &beneficiary)?;

    let event = ledger.record_lock(
        &mut account,
        &beneficiary,
        amount,
        env.block.time.seconds(),
    )?;

    save_ledger(deps.storage, &ledger)?;
    DEPOSITS.save(deps.storage, &beneficiary, &account)?;

    Ok(Response::new().add_attributes(event.attributes()))
}

pub fn execute_withdraw(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    let mut ledger = load_ledger(deps.storage)?;
    let mut account = load_account(deps.storage, &info.sender)?;
    let mut asset = Cw20Asset::new(
        deps.querier,
        env.block.clone(),
        config.locking_token,
        env.contract.address,
    );

    let event = ledger.withdraw(
        &mut account,
        &mut asset,
        &info.sender,
        amount,
        env.block.time.seconds(),
    )?;

    save_ledger(deps.storage, &ledger)?;
    DEPOSITS.save(deps.storage, &info.sender, &account)?;

    let res = Response::new()
        .add_messages(asset.into_messages())
        .add_attributes(event.attributes());
    Ok(res)
}

pub fn execute_recover_cw20(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    token: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let token = deps.api.addr_validate(&token)?;

    let mut asset = Cw20Asset::new(
        deps.querier,
        env.block,
        token.clone(),
        env.contract.address,
    );
    let event = recover(
        &config,
        &config.locking_token,
        &mut asset,
        &info.sender,
        &token,
        amount,
    )?;

    let res = Response::new()
        .add_messages(asset.into_messages())
        .add_attributes(event.attributes());
    Ok(res)
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> Result<Binary, ContractError> {
    let res = match msg {
        QueryMsg::Config {} => to_binary(&query_config(deps)?),
        QueryMsg::TotalSupply {} => to_binary(&query_total_supply(deps)?),
        QueryMsg::TotalSupplyAt { epoch } => to_binary(&query_total_supply_at(deps, epoch)?),
        QueryMsg::Balance { address } => to_binary(&query_balance(deps, address)?),
        QueryMsg::WithdrawableBalance { address } => {
            to_binary(&query_withdrawable_balance(deps, env, address)?)
        }
        QueryMsg::EpochCount {} => to_binary(&query_epoch_count(deps)?),
        QueryMsg::Epoch { index } => to_binary(&query_epoch(deps, index)?),
        QueryMsg::Epochs { start_after, limit } => {
            to_binary(&query_epochs(deps, start_after, limit)?)
        }
        QueryMsg::EpochIndexAt { time } => to_binary(&query_epoch_index_at(deps, time)?),
        QueryMsg::Deposits {
            address,
            start_after,
            limit,
        } => to_binary(&query_deposits(deps, address, start_after, limit)?),
    };
    Ok(res?)
}

fn query_config(deps: Deps) -> Result<ConfigResponse, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        owner: config.owner,
        locking_token: config.locking_token,
    })
}

fn query_total_supply(deps: Deps) -> Result<SupplyResponse, ContractError> {
    let supply = LOCKED_SUPPLY.load(deps.storage)?;
    Ok(SupplyResponse { supply })
}

fn query_total_supply_at(deps: Deps, epoch: u32) -> Result<SupplyResponse, ContractError> {
    let timeline = EPOCHS.load(deps.storage)?;
    let supply = timeline.total_supply_at(epoch)?;
    Ok(SupplyResponse { supply })
}

fn query_balance(deps: Deps, address: String) -> Result<BalanceResponse, ContractError> {
    let address = deps.api.addr_validate(&address)?;
    let account = load_account(deps.storage, &address)?;
    Ok(BalanceResponse {
        balance: account.balance(),
    })
}

fn query_withdrawable_balance(
    deps: Deps,
    env: Env,
    address: String,
) -> Result<BalanceResponse, ContractError> {
    let address = deps.api.addr_validate(&address)?;
    let account = load_account(deps.storage, &address)?;
    Ok(BalanceResponse {
        balance: account.withdrawable(env.block.time.seconds()),
    })
}

fn query_epoch_count(deps: Deps) -> Result<EpochCountResponse, ContractError> {
    let timeline = EPOCHS.load(deps.storage)?;
    Ok(EpochCountResponse {
        count: timeline.len(),
    })
}

fn query_epoch(deps: Deps, index: u32) -> Result<EpochResponse, ContractError> {
    let timeline = EPOCHS.load(deps.storage)?;
    let epoch = timeline.get(index)?;
    Ok(EpochResponse {
        index,
        supply: epoch.supply,
        date: epoch.date,
    })
}

fn query_epochs(
    deps: Deps,
    start_after: Option<u32>,
    limit: Option<u32>,
) -> Result<EpochsResponse, ContractError> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let timeline = EPOCHS.load(deps.storage)?;
    let epochs = timeline
        .range(start_after, limit)
        .into_iter()
        .map(|(index, epoch)| EpochResponse {
            index,
            supply: epoch.supply,
            date: epoch.date,
        })
        .collect();
    Ok(EpochsResponse { epochs })
}

fn query_epoch_index_at(deps: Deps, time: u64) -> Result<EpochIndexResponse, ContractError> {
    let timeline = EPOCHS.load(deps.storage)?;
    Ok(EpochIndexResponse {
        index: timeline.index_at(time),
    })
}

fn query_deposits(
    deps: Deps,
    address: String,
    start_after: Option<u32>,
    limit: Option<u32>,
) -> Result<DepositsResponse, ContractError> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(|i| (i as usize).saturating_add(1)).unwrap_or(0);

    let address = deps.api.addr_validate(&address)?;
    let account = load_account(deps.storage, &address)?;
    let deposits = account
        .records()
        .iter()
        .enumerate()
        .skip(start)
        .take(limit)
        .map(|(index, record)| DepositInfo {
            index: index as u32,
            amount: record.amount,
            withdrawn_amount: record.withdrawn_amount,
            unlock_time: record.unlock_time,
        })
        .collect();
    Ok(DepositsResponse { deposits })
}
