use alloy_consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_network::{ReceiptResponse, TxSigner};
use alloy_primitives::{
    utils::{format_ether, format_units},
    Address, Bytes, TxHash, TxKind, U256,
};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::ChainError;
use crate::intent_contract::ContractCall;

/// Per-transaction fields chosen by the agent rather than the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOverrides {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
}

/// Chain access used by the execution engine.
///
/// Every call is a fallible remote call; implementations do not retry.
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync {
    /// Address of the signing identity.
    fn signer_address(&self) -> Address;

    /// Transaction count of the signer at the `pending` block tag.
    async fn pending_nonce(&self) -> Result<u64, ChainError>;

    /// Current gas price in wei, `None` when the node has no fee data.
    async fn gas_price(&self) -> Result<Option<u128>, ChainError>;

    /// Gas estimate for `call` sent from the signer.
    async fn estimate_gas(&self, call: &ContractCall) -> Result<u64, ChainError>;

    /// Sign and broadcast `call`. Resolves once the node accepted the transaction.
    async fn send(&self, call: &ContractCall, overrides: TxOverrides)
        -> Result<TxHash, ChainError>;

    /// Resolve once `tx_hash` is included in at least one block.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<(), ChainError>;
}

/// Gas and fee figures for a plain native transfer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeFeeEstimate {
    pub gas_price: String,
    pub estimated_gas: String,
    pub estimated_fee: String,
}

/// [`ChainClient`] backed by an alloy HTTP provider and a local private key.
pub struct AlloyChainClient {
    provider: DynProvider,
    signer: PrivateKeySigner,
    contract_address: Address,
    chain_id: u64,
    receipt_poll_interval: Duration,
}

impl AlloyChainClient {
    /// Connect to `rpc_url` and cache the chain id.
    pub async fn connect(
        rpc_url: &str,
        signer: PrivateKeySigner,
        contract_address: Address,
        receipt_poll_interval: Duration,
    ) -> Result<Self, ChainError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| ChainError::Other(format!("Invalid RPC URL {}: {}", rpc_url, e)))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();

        let chain_id = provider.get_chain_id().await?;
        info!("🔗 Connected to chain {} as 0x{:x}", chain_id, signer.address());

        Ok(Self {
            provider,
            signer,
            contract_address,
            chain_id,
            receipt_poll_interval,
        })
    }

    /// Fee estimate for sending `value` wei from the signer to itself.
    pub async fn native_transfer_fee_estimate(
        &self,
        value: U256,
    ) -> Result<NativeFeeEstimate, ChainError> {
        let from = self.signer_address();
        let gas_price = self.provider.get_gas_price().await?;
        let estimated_gas = self
            .provider
            .estimate_gas(TransactionRequest {
                from: Some(from),
                to: Some(from.into()),
                value: Some(value),
                ..Default::default()
            })
            .await?;

        let fee = U256::from(gas_price) * U256::from(estimated_gas);
        Ok(NativeFeeEstimate {
            gas_price: format!(
                "{} Gwei",
                format_units(U256::from(gas_price), "gwei").map_err(units_error)?
            ),
            estimated_gas: estimated_gas.to_string(),
            estimated_fee: format!("{} BDAG", format_ether(fee)),
        })
    }

    /// Send `value` wei to `to` and wait for the receipt.
    pub async fn send_native(&self, to: Address, value: U256) -> Result<TxHash, ChainError> {
        let from = self.signer_address();
        let nonce = self.pending_nonce().await?;
        let gas_price = self.provider.get_gas_price().await?;
        let gas_limit = self
            .provider
            .estimate_gas(TransactionRequest {
                from: Some(from),
                to: Some(to.into()),
                value: Some(value),
                ..Default::default()
            })
            .await?;

        let tx = TxLegacy {
            chain_id: Some(self.chain_id),
            nonce,
            gas_price,
            gas_limit,
            to: TxKind::Call(to),
            value,
            input: Bytes::new(),
        };
        let tx_hash = self.sign_and_broadcast(tx).await?;
        self.wait_for_receipt(tx_hash).await?;
        Ok(tx_hash)
    }

    fn call_request(&self, call: &ContractCall) -> TransactionRequest {
        TransactionRequest {
            from: Some(self.signer_address()),
            to: Some(self.contract_address.into()),
            input: call.calldata().into(),
            value: Some(call.value()),
            ..Default::default()
        }
    }

    async fn sign_and_broadcast(&self, mut tx: TxLegacy) -> Result<TxHash, ChainError> {
        let signature = self
            .signer
            .sign_transaction(&mut tx)
            .await
            .map_err(|e| ChainError::Signing(e.to_string()))?;

        let envelope = TxEnvelope::Legacy(tx.into_signed(signature));
        let pending = self
            .provider
            .send_raw_transaction(&envelope.encoded_2718())
            .await?;

        Ok(*pending.tx_hash())
    }
}

fn units_error(err: impl std::fmt::Display) -> ChainError {
    ChainError::Other(format!("Unit conversion failed: {}", err))
}

#[async_trait::async_trait]
impl ChainClient for AlloyChainClient {
    fn signer_address(&self) -> Address {
        self.signer.address()
    }

    async fn pending_nonce(&self) -> Result<u64, ChainError> {
        let nonce = self
            .provider
            .get_transaction_count(self.signer_address())
            .pending()
            .await?;
        Ok(nonce)
    }

    async fn gas_price(&self) -> Result<Option<u128>, ChainError> {
        let price = self.provider.get_gas_price().await?;
        // Some dev nodes report zero when they have no fee market
        Ok((price > 0).then_some(price))
    }

    async fn estimate_gas(&self, call: &ContractCall) -> Result<u64, ChainError> {
        Ok(self.provider.estimate_gas(self.call_request(call)).await?)
    }

    async fn send(
        &self,
        call: &ContractCall,
        overrides: TxOverrides,
    ) -> Result<TxHash, ChainError> {
        let tx = TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: overrides.nonce,
            gas_price: overrides.gas_price,
            gas_limit: overrides.gas_limit,
            to: TxKind::Call(self.contract_address),
            value: call.value(),
            input: call.calldata(),
        };
        self.sign_and_broadcast(tx).await
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<(), ChainError> {
        loop {
            if let Some(receipt) = self.provider.get_transaction_receipt(tx_hash).await? {
                debug!(
                    "Receipt for 0x{:x} in block {:?}",
                    tx_hash,
                    receipt.block_number()
                );
                if !receipt.status() {
                    return Err(ChainError::Reverted(format!("0x{:x}", tx_hash)));
                }
                return Ok(());
            }
            tokio::time::sleep(self.receipt_poll_interval).await;
        }
    }
}
