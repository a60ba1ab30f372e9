use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use anyhow::{anyhow, Result};
use clap::Args;
use std::time::Duration;

use crate::confirmation::{DEFAULT_CONFIRMATION_TIMEOUT, DEFAULT_WATCH_HORIZON};
use crate::gas_policy::{
    GasPolicy, DEFAULT_LIMIT_BUMP_PERCENT, DEFAULT_PRICE_BUMP_PERCENT, FALLBACK_GAS_LIMIT,
    FALLBACK_GAS_PRICE_GWEI,
};

/// Tunables of the execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub gas_policy: GasPolicy,
    pub confirmation_timeout: Duration,
    pub watch_horizon: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gas_policy: GasPolicy::default(),
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            watch_horizon: DEFAULT_WATCH_HORIZON,
        }
    }
}

/// Chain connection settings. Falls back to the same environment variables as the `.env` file.
#[derive(Debug, Clone, Args)]
pub struct ChainArgs {
    /// Chain JSON-RPC URL
    #[arg(long, env = "RPC_URL", default_value = "http://127.0.0.1:8545")]
    pub rpc_url: String,

    /// Signer private key (hex string, with or without 0x prefix)
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// IntelliVaultStaker contract address
    #[arg(long, env = "CONTRACT_ADDRESS")]
    pub contract_address: Option<String>,

    /// Receipt polling interval in milliseconds (must be positive)
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub receipt_poll_interval_ms: u64,
}

impl ChainArgs {
    pub fn signer(&self) -> Result<PrivateKeySigner> {
        let normalized = self.private_key.trim().trim_start_matches("0x");
        normalized
            .parse::<PrivateKeySigner>()
            .map_err(|e| anyhow!("Invalid private key: {}", e))
    }

    /// Contract address, or the zero address for commands that never touch the contract.
    pub fn contract(&self) -> Result<Address> {
        match self.contract_address.as_deref() {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| anyhow!("Invalid contract address {}: {}", raw, e)),
            None => Ok(Address::ZERO),
        }
    }

    pub fn require_contract(&self) -> Result<Address> {
        if self.contract_address.is_none() {
            return Err(anyhow!(
                "No contract address provided. Use --contract-address or CONTRACT_ADDRESS"
            ));
        }
        self.contract()
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }
}

/// Engine settings exposed on the command line.
#[derive(Debug, Clone, Args)]
pub struct EngineArgs {
    /// Gas price bump in percent of the network price
    #[arg(long, default_value_t = DEFAULT_PRICE_BUMP_PERCENT)]
    pub gas_price_bump: u128,

    /// Gas limit bump in percent of the estimate
    #[arg(long, default_value_t = DEFAULT_LIMIT_BUMP_PERCENT)]
    pub gas_limit_bump: u128,

    /// Gas limit used when estimation fails
    #[arg(long, default_value_t = FALLBACK_GAS_LIMIT)]
    pub fallback_gas_limit: u64,

    /// Gas price in gwei used when the node reports none
    #[arg(long, default_value_t = FALLBACK_GAS_PRICE_GWEI)]
    pub fallback_gas_price_gwei: u128,

    /// How long to wait for one confirmation, in milliseconds
    #[arg(long, default_value = "30000")]
    pub confirmation_timeout_ms: u64,

    /// How long an abandoned confirmation watch keeps polling, in seconds
    #[arg(long, default_value = "600")]
    pub watch_horizon_secs: u64,
}

impl From<&EngineArgs> for EngineConfig {
    fn from(args: &EngineArgs) -> Self {
        Self {
            gas_policy: GasPolicy {
                price_bump_percent: args.gas_price_bump,
                limit_bump_percent: args.gas_limit_bump,
                fallback_gas_limit: args.fallback_gas_limit,
                fallback_gas_price_gwei: args.fallback_gas_price_gwei,
            },
            confirmation_timeout: Duration::from_millis(args.confirmation_timeout_ms),
            watch_horizon: Duration::from_secs(args.watch_horizon_secs),
        }
    }
}
