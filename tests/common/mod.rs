#![allow(dead_code)]

use alloy_primitives::{Address, TxHash, B256};
use intellivault_agent::{ChainClient, ChainError, ContractCall, TxOverrides};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const SIGNER: &str = "0x1234567890123456789012345678901234567890";
pub const RECIPIENT: &str = "0x000000000000000000000000000000000000dEaD";

/// How the mock answers `wait_for_receipt`.
#[derive(Debug, Clone, Copy)]
pub enum ReceiptBehavior {
    Immediate,
    After(Duration),
    Never,
    Reverted,
}

#[derive(Debug, Clone)]
pub struct SentTx {
    pub call: ContractCall,
    pub overrides: TxOverrides,
    pub hash: TxHash,
}

/// Scripted in-memory chain.
pub struct MockChain {
    address: Address,
    pending_nonce: Result<u64, String>,
    gas_price: Result<Option<u128>, String>,
    estimate: Result<u64, String>,
    send_failures: HashMap<u64, String>,
    receipt: ReceiptBehavior,
    pub sent: Mutex<Vec<SentTx>>,
    pub send_attempts: Mutex<Vec<u64>>,
    pub estimate_calls: AtomicUsize,
    pub gas_price_calls: AtomicUsize,
    pub receipts_seen: AtomicUsize,
}

impl MockChain {
    pub fn new(pending_nonce: u64) -> Self {
        Self {
            address: Address::from_str(SIGNER).unwrap(),
            pending_nonce: Ok(pending_nonce),
            gas_price: Ok(Some(1_000_000_000)),
            estimate: Ok(50_000),
            send_failures: HashMap::new(),
            receipt: ReceiptBehavior::Immediate,
            sent: Mutex::new(Vec::new()),
            send_attempts: Mutex::new(Vec::new()),
            estimate_calls: AtomicUsize::new(0),
            gas_price_calls: AtomicUsize::new(0),
            receipts_seen: AtomicUsize::new(0),
        }
    }

    pub fn with_nonce_error(mut self, message: &str) -> Self {
        self.pending_nonce = Err(message.to_string());
        self
    }

    pub fn with_gas_price(mut self, price: Option<u128>) -> Self {
        self.gas_price = Ok(price);
        self
    }

    pub fn with_gas_price_error(mut self, message: &str) -> Self {
        self.gas_price = Err(message.to_string());
        self
    }

    pub fn with_estimate_error(mut self, message: &str) -> Self {
        self.estimate = Err(message.to_string());
        self
    }

    /// Reject the send that uses `nonce` with an RPC error carrying `message`.
    pub fn fail_send_at(mut self, nonce: u64, message: &str) -> Self {
        self.send_failures.insert(nonce, message.to_string());
        self
    }

    pub fn with_receipt(mut self, receipt: ReceiptBehavior) -> Self {
        self.receipt = receipt;
        self
    }

    pub fn sent(&self) -> Vec<SentTx> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_nonces(&self) -> Vec<u64> {
        self.sent().iter().map(|tx| tx.overrides.nonce).collect()
    }

    pub fn attempted_nonces(&self) -> Vec<u64> {
        self.send_attempts.lock().unwrap().clone()
    }
}

pub fn tx_hash_for(nonce: u64) -> TxHash {
    B256::left_padding_from(&nonce.to_be_bytes())
}

fn rpc_error(message: &str) -> ChainError {
    ChainError::Rpc {
        code: -32000,
        message: message.to_string(),
    }
}

#[async_trait::async_trait]
impl ChainClient for MockChain {
    fn signer_address(&self) -> Address {
        self.address
    }

    async fn pending_nonce(&self) -> Result<u64, ChainError> {
        self.pending_nonce.clone().map_err(|m| rpc_error(&m))
    }

    async fn gas_price(&self) -> Result<Option<u128>, ChainError> {
        self.gas_price_calls.fetch_add(1, Ordering::SeqCst);
        self.gas_price.clone().map_err(|m| rpc_error(&m))
    }

    async fn estimate_gas(&self, _call: &ContractCall) -> Result<u64, ChainError> {
        self.estimate_calls.fetch_add(1, Ordering::SeqCst);
        self.estimate.clone().map_err(|m| rpc_error(&m))
    }

    async fn send(
        &self,
        call: &ContractCall,
        overrides: TxOverrides,
    ) -> Result<TxHash, ChainError> {
        self.send_attempts.lock().unwrap().push(overrides.nonce);
        if let Some(message) = self.send_failures.get(&overrides.nonce) {
            return Err(rpc_error(message));
        }

        let hash = tx_hash_for(overrides.nonce);
        self.sent.lock().unwrap().push(SentTx {
            call: call.clone(),
            overrides,
            hash,
        });
        Ok(hash)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<(), ChainError> {
        match self.receipt {
            ReceiptBehavior::Immediate => {}
            ReceiptBehavior::After(delay) => tokio::time::sleep(delay).await,
            ReceiptBehavior::Never => std::future::pending::<()>().await,
            ReceiptBehavior::Reverted => {
                return Err(ChainError::Reverted(format!("0x{:x}", tx_hash)));
            }
        }
        self.receipts_seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
