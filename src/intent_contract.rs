use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};

sol! {
    /// The subset of the IntelliVaultStaker contract used by the agent.
    interface IIntelliVaultStaker {
        function stake() external payable;
        function transferBDAG(address to, uint256 amount) external;
    }
}

/// A call against the staking contract, before gas and nonce are chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    /// `stake()` carrying `value` wei.
    Stake { value: U256 },
    /// `transferBDAG(to, amount)`, no value attached.
    TransferBdag { to: Address, amount: U256 },
}

impl ContractCall {
    /// ABI-encoded calldata including the selector.
    pub fn calldata(&self) -> Bytes {
        match self {
            ContractCall::Stake { .. } => IIntelliVaultStaker::stakeCall {}.abi_encode().into(),
            ContractCall::TransferBdag { to, amount } => IIntelliVaultStaker::transferBDAGCall {
                to: *to,
                amount: *amount,
            }
            .abi_encode()
            .into(),
        }
    }

    /// Native value sent with the call.
    pub fn value(&self) -> U256 {
        match self {
            ContractCall::Stake { value } => *value,
            ContractCall::TransferBdag { .. } => U256::ZERO,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ContractCall::Stake { .. } => "stake",
            ContractCall::TransferBdag { .. } => "transferBDAG",
        }
    }
}
