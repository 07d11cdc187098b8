use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Uint128};
use cw20::Cw20ReceiveMsg;

#[cw_serde]
pub struct InstantiateMsg {
    /// cw20 contract whose tokens are locked
    pub locking_token: String,
    /// Allowed to recover stray tokens, defaults to the sender
    pub owner: Option<String>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Lock tokens previously approved to this contract
    Lock {
        amount: Uint128,
        beneficiary: Option<String>,
    },
    /// Withdraw unlocked tokens, oldest deposits first
    Withdraw { amount: Uint128 },
    /// Owner only. Send back any cw20 other than the locking token
    RecoverCw20 { token: String, amount: Uint128 },
    /// This accepts a properly-encoded ReceiveMsg from a cw20 contract
    Receive(Cw20ReceiveMsg),
}

#[cw_serde]
pub enum ReceiveMsg {
    Lock { beneficiary: Option<String> },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},
    /// Current locked supply
    #[returns(SupplyResponse)]
    TotalSupply {},
    /// Locked supply recorded for an epoch
    #[returns(SupplyResponse)]
    TotalSupplyAt { epoch: u32 },
    /// Everything still owed to the address, locked or not
    #[returns(BalanceResponse)]
    Balance { address: String },
    /// Portion of the balance that can be withdrawn now
    #[returns(BalanceResponse)]
    WithdrawableBalance { address: String },
    #[returns(EpochCountResponse)]
    EpochCount {},
    #[returns(EpochResponse)]
    Epoch { index: u32 },
    #[returns(EpochsResponse)]
    Epochs {
        start_after: Option<u32>,
        limit: Option<u32>,
    },
    /// Epoch whose window contains the given unix time
    #[returns(EpochIndexResponse)]
    EpochIndexAt { time: u64 },
    #[returns(DepositsResponse)]
    Deposits {
        address: String,
        start_after: Option<u32>,
        limit: Option<u32>,
    },
}

#[cw_serde]
pub struct ConfigResponse {
    pub owner: Addr,
    pub locking_token: Addr,
}

#[cw_serde]
pub struct SupplyResponse {
    pub supply: Uint128,
}

#[cw_serde]
pub struct BalanceResponse {
    pub balance: Uint128,
}

#[cw_serde]
pub struct EpochCountResponse {
    pub count: u32,
}

#[cw_serde]
pub struct EpochResponse {
    pub index: u32,
    pub supply: Uint128,
    pub date: u64,
}

#[cw_serde]
pub struct EpochsResponse {
    pub epochs: Vec<EpochResponse>,
}

#[cw_serde]
pub struct EpochIndexResponse {
    pub index: Option<u32>,
}

#[cw_serde]
pub struct DepositInfo {
    pub index: u32,
    pub amount: Uint128,
    pub withdrawn_amount: Uint128,
    pub unlock_time: u64,
}

#[cw_serde]
pub struct DepositsResponse {
    pub deposits: Vec<DepositInfo>,
}
