pub mod asset;
pub mod contract;
pub mod deposit;
pub mod engine;
pub mod epoch;
mod error;
mod mock;
pub mod msg;
pub mod state;

pub use crate::error::ContractError;
