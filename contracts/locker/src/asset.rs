use cosmwasm_std::{
    to_binary, Addr, BlockInfo, CosmosMsg, QuerierWrapper, StdError, StdResult, Uint128,
    WasmMsg,
};
use cw20::{AllowanceResponse, BalanceResponse, Cw20ExecuteMsg, Cw20QueryMsg};

use crate::error::ContractError;

/// Moves one fungible asset in and out of the locker's custody.
pub trait AssetTransfer {
    /// Address holding the locked funds
    fn custody(&self) -> &Addr;

    fn transfer_from(
        &mut self,
        source: &Addr,
        destination: &Addr,
        amount: Uint128,
    ) -> Result<(), ContractError>;

    /// Sends `amount` out of custody.
    fn transfer(&mut self, destination: &Addr, amount: Uint128) -> Result<(), ContractError>;

    fn balance_of(&self, address: &Addr) -> Result<Uint128, ContractError>;
}

/// cw20 binding: checks balances and allowances up front, then queues the
/// transfer messages for the response.
pub struct Cw20Asset<'a> {
    querier: QuerierWrapper<'a>,
    block: BlockInfo,
    token: Addr,
    custody: Addr,
    outgoing: Uint128,
    messages: Vec<CosmosMsg>,
}

impl<'a> Cw20Asset<'a> {
    pub fn new(querier: QuerierWrapper<'a>, block: BlockInfo, token: Addr, custody: Addr) -> Self {
        Cw20Asset {
            querier,
            block,
            token,
            custody,
            outgoing: Uint128::zero(),
            messages: vec![],
        }
    }

    pub fn into_messages(self) -> Vec<CosmosMsg> {
        self.messages
    }

    fn execute(&mut self, msg: &Cw20ExecuteMsg) -> StdResult<()> {
        let exec = WasmMsg::Execute {
            contract_addr: self.token.to_string(),
            msg: to_binary(msg)?,
            funds: vec![],
        };
        self.messages.push(exec.into());
        Ok(())
    }

    fn allowance(&self, owner: &Addr) -> Result<AllowanceResponse, ContractError> {
        self.querier
            .query_wasm_smart(
                self.token.to_string(),
                &Cw20QueryMsg::Allowance {
                    owner: owner.to_string(),
                    spender: self.custody.to_string(),
                },
            )
            .map_err(|e| query_failed(&self.token, e))
    }
}

/// An unreachable or non-cw20 token is a failed transfer, not a host error.
fn query_failed(token: &Addr, err: StdError) -> ContractError {
    ContractError::TransferFailed {
        reason: format!("querying {}: {}", token, err),
    }
}

impl<'a> AssetTransfer for Cw20Asset<'a> {
    fn custody(&self) -> &Addr {
        &self.custody
    }

    fn transfer_from(
        &mut self,
        source: &Addr,
        destination: &Addr,
        amount: Uint128,
    ) -> Result<(), ContractError> {
        let allowance = self.allowance(source)?;
        if allowance.expires.is_expired(&self.block) {
            return Err(ContractError::TransferFailed {
                reason: format!("allowance from {} has expired", source),
            });
        }
        if allowance.allowance < amount {
            return Err(ContractError::TransferFailed {
                reason: format!(
                    "allowance from {} is {}, need {}",
                    source, allowance.allowance, amount
                ),
            });
        }

        let balance = self.balance_of(source)?;
        if balance < amount {
            return Err(ContractError::TransferFailed {
                reason: format!("balance of {} is {}, need {}", source, balance, amount),
            });
        }

        self.execute(&Cw20ExecuteMsg::TransferFrom {
            owner: source.to_string(),
            recipient: destination.to_string(),
            amount,
        })?;
        Ok(())
    }

    fn transfer(&mut self, destination: &Addr, amount: Uint128) -> Result<(), ContractError> {
        let balance = self.balance_of(&self.custody)?;
        let outgoing = self.outgoing.checked_add(amount)?;
        if balance < outgoing {
            return Err(ContractError::TransferFailed {
                reason: format!(
                    "custody holds {} of {}, need {}",
                    balance, self.token, outgoing
                ),
            });
        }

        self.execute(&Cw20ExecuteMsg::Transfer {
            recipient: destination.to_string(),
            amount,
        })?;
        self.outgoing = outgoing;
        Ok(())
    }

    fn balance_of(&self, address: &Addr) -> Result<Uint128, ContractError> {
        let res: BalanceResponse = self
            .querier
            .query_wasm_smart(
                self.token.to_string(),
                &Cw20QueryMsg::Balance {
                    address: address.to_string(),
                },
            )
            .map_err(|e| query_failed(&self.token, e))?;
        Ok(res.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::mock_dependencies_cw20;
    use cosmwasm_std::testing::{mock_env, MOCK_CONTRACT_ADDR};
    use cosmwasm_std::{from_binary, Timestamp};
    use cw20::Expiration;

    const TOKEN: &str = "token";

    fn execute_msg(msg: &CosmosMsg) -> Cw20ExecuteMsg {
        match msg {
            CosmosMsg::Wasm(WasmMsg::Execute {
                contract_addr, msg, ..
            }) => {
                assert_eq!(TOKEN, contract_addr);
                from_binary(msg).unwrap()
            }
            m => panic!("unexpected message: {:?}", m),
        }
    }

    #[test]
    fn transfer_from_queues_message() {
        let mut deps = mock_dependencies_cw20();
        deps.querier.set_balance(TOKEN, "alice", 500);
        deps.querier
            .set_allowance(TOKEN, "alice", MOCK_CONTRACT_ADDR, 300, Expiration::Never {});

        let env = mock_env();
        let custody = env.contract.address.clone();
        let mut asset = Cw20Asset::new(
            deps.as_ref().querier,
            env.block,
            Addr::unchecked(TOKEN),
            custody.clone(),
        );
        asset
            .transfer_from(&Addr::unchecked("alice"), &custody, Uint128::new(300))
            .unwrap();

        let messages = asset.into_messages();
        assert_eq!(1, messages.len());
        assert_eq!(
            Cw20ExecuteMsg::TransferFrom {
                owner: "alice".into(),
                recipient: MOCK_CONTRACT_ADDR.into(),
                amount: Uint128::new(300),
            },
            execute_msg(&messages[0])
        );
    }

    #[test]
    fn transfer_from_rejects_short_or_expired_allowance() {
        let mut deps = mock_dependencies_cw20();
        deps.querier.set_balance(TOKEN, "alice", 500);
        deps.querier
            .set_allowance(TOKEN, "alice", MOCK_CONTRACT_ADDR, 100, Expiration::Never {});
        deps.querier.set_allowance(
            TOKEN,
            "bob",
            MOCK_CONTRACT_ADDR,
            1000,
            Expiration::AtTime(Timestamp::from_seconds(1)),
        );
        deps.querier.set_balance(TOKEN, "bob", 1000);

        let env = mock_env();
        let custody = env.contract.address.clone();
        let mut asset = Cw20Asset::new(
            deps.as_ref().querier,
            env.block,
            Addr::unchecked(TOKEN),
            custody.clone(),
        );

        let err = asset
            .transfer_from(&Addr::unchecked("alice"), &custody, Uint128::new(300))
            .unwrap_err();
        assert!(matches!(err, ContractError::TransferFailed { .. }));

        let err = asset
            .transfer_from(&Addr::unchecked("bob"), &custody, Uint128::new(300))
            .unwrap_err();
        assert!(matches!(err, ContractError::TransferFailed { .. }));

        assert!(asset.into_messages().is_empty());
    }

    #[test]
    fn transfer_from_rejects_short_balance() {
        let mut deps = mock_dependencies_cw20();
        deps.querier.set_balance(TOKEN, "alice", 10);
        deps.querier
            .set_allowance(TOKEN, "alice", MOCK_CONTRACT_ADDR, 300, Expiration::Never {});

        let env = mock_env();
        let custody = env.contract.address.clone();
        let mut asset = Cw20Asset::new(
            deps.as_ref().querier,
            env.block,
            Addr::unchecked(TOKEN),
            custody.clone(),
        );
        let err = asset
            .transfer_from(&Addr::unchecked("alice"), &custody, Uint128::new(300))
            .unwrap_err();
        assert!(matches!(err, ContractError::TransferFailed { .. }));
    }

    #[test]
    fn unknown_token_is_a_failed_transfer() {
        let deps = mock_dependencies_cw20();
        let env = mock_env();
        let custody = env.contract.address.clone();
        let mut asset = Cw20Asset::new(
            deps.as_ref().querier,
            env.block,
            Addr::unchecked("notacw20"),
            custody.clone(),
        );

        let err = asset
            .transfer_from(&Addr::unchecked("alice"), &custody, Uint128::new(1))
            .unwrap_err();
        assert!(matches!(err, ContractError::TransferFailed { .. }));
        let err = asset
            .transfer(&Addr::unchecked("alice"), Uint128::new(1))
            .unwrap_err();
        assert!(matches!(err, ContractError::TransferFailed { .. }));
        assert!(asset.into_messages().is_empty());
    }

    #[test]
    fn transfer_counts_queued_outflows() {
        let mut deps = mock_dependencies_cw20();
        deps.querier.set_balance(TOKEN, MOCK_CONTRACT_ADDR, 100);

        let env = mock_env();
        let mut asset = Cw20Asset::new(
            deps.as_ref().querier,
            env.block,
            Addr::unchecked(TOKEN),
            env.contract.address,
        );
        asset
            .transfer(&Addr::unchecked("alice"), Uint128::new(60))
            .unwrap();
        let err = asset
            .transfer(&Addr::unchecked("bob"), Uint128::new(60))
            .unwrap_err();
        assert!(matches!(err, ContractError::TransferFailed { .. }));

        let messages = asset.into_messages();
        assert_eq!(1, messages.len());
        assert_eq!(
            Cw20ExecuteMsg::Transfer {
                recipient: "alice".into(),
                amount: Uint128::new(60),
            },
            execute_msg(&messages[0])
        );
    }
}
