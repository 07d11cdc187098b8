use cosmwasm_std::{OverflowError, StdError, Uint128};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("Unauthorized")]
    Unauthorized {},

    #[error("Amount must be greater than zero")]
    InvalidAmount {},

    #[error("Cannot withdraw {requested}, only {available} is unlocked")]
    InsufficientWithdrawable {
        requested: Uint128,
        available: Uint128,
    },

    #[error("Locking token cannot be recovered")]
    ForbiddenAsset {},

    #[error("Token {token} is not accepted for locking")]
    InvalidToken { token: String },

    #[error("Asset transfer failed: {reason}")]
    TransferFailed { reason: String },

    #[error("Epoch {index} out of range ({count} recorded)")]
    OutOfRange { index: u32, count: u32 },
}
