#![cfg(test)]

use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;

use cosmwasm_std::testing::{MockApi, MockStorage};
use cosmwasm_std::{
    from_binary, from_slice, to_binary, Binary, ContractResult, Empty, OwnedDeps, Querier,
    QuerierResult, QueryRequest, SystemError, SystemResult, Uint128, WasmQuery,
};
use cw20::{AllowanceResponse, BalanceResponse, Cw20QueryMsg, Expiration};

pub fn mock_dependencies_cw20() -> OwnedDeps<MockStorage, MockApi, Cw20Querier> {
    OwnedDeps {
        storage: MockStorage::default(),
        api: MockApi::default(),
        querier: Cw20Querier::default(),
        custom_query_type: PhantomData,
    }
}

/// Answers cw20 `Balance` and `Allowance` smart queries for any number of
/// token contracts. Unknown holders have a zero balance; a token becomes
/// known once a balance or allowance is set on it.
#[derive(Default)]
pub struct Cw20Querier {
    tokens: HashSet<String>,
    balances: HashMap<(String, String), Uint128>,
    allowances: HashMap<(String, String, String), AllowanceResponse>,
}

impl Cw20Querier {
    pub fn set_balance(&mut self, token: &str, holder: &str, amount: u128) {
        self.tokens.insert(token.to_string());
        self.balances
            .insert((token.to_string(), holder.to_string()), Uint128::new(amount));
    }

    pub fn set_allowance(
        &mut self,
        token: &str,
        owner: &str,
        spender: &str,
        amount: u128,
        expires: Expiration,
    ) {
        self.tokens.insert(token.to_string());
        self.allowances.insert(
            (token.to_string(), owner.to_string(), spender.to_string()),
            AllowanceResponse {
                allowance: Uint128::new(amount),
                expires,
            },
        );
    }

    fn query_cw20(&self, token: &str, msg: Cw20QueryMsg) -> QuerierResult {
        if !self.tokens.contains(token) {
            return SystemResult::Err(SystemError::NoSuchContract {
                addr: token.to_string(),
            });
        }
        let res = match msg {
            Cw20QueryMsg::Balance { address } => {
                let balance = self
                    .balances
                    .get(&(token.to_string(), address))
                    .copied()
                    .unwrap_or_default();
                to_binary(&BalanceResponse { balance })
            }
            Cw20QueryMsg::Allowance { owner, spender } => {
                let allowance = self
                    .allowances
                    .get(&(token.to_string(), owner, spender))
                    .cloned()
                    .unwrap_or(AllowanceResponse {
                        allowance: Uint128::zero(),
                        expires: Expiration::Never {},
                    });
                to_binary(&allowance)
            }
            _ => {
                return SystemResult::Err(SystemError::UnsupportedRequest {
                    kind: "cw20 query".to_string(),
                })
            }
        };
        SystemResult::Ok(res.into())
    }
}

impl Querier for Cw20Querier {
    fn raw_query(&self, bin_request: &[u8]) -> QuerierResult {
        let request: QueryRequest<Empty> = match from_slice(bin_request) {
            Ok(v) => v,
            Err(e) => {
                return SystemResult::Err(SystemError::InvalidRequest {
                    error: format!("Parsing query request: {}", e),
                    request: Binary::from(bin_request),
                })
            }
        };
        match request {
            QueryRequest::Wasm(WasmQuery::Smart { contract_addr, msg }) => {
                match from_binary::<Cw20QueryMsg>(&msg) {
                    Ok(query) => self.query_cw20(&contract_addr, query),
                    Err(e) => SystemResult::Ok(ContractResult::Err(e.to_string())),
                }
            }
            _ => SystemResult::Err(SystemError::UnsupportedRequest {
                kind: "non-wasm query".to_string(),
            }),
        }
    }
}
