use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::chain_client::ChainClient;
use crate::confirmation::ConfirmationWaiter;
use crate::config::EngineConfig;
use crate::error::IntentError;
use crate::gas_policy::GasPolicy;
use crate::intent_types::{ExecutionResult, Intent};
use crate::transaction_submitter::TransactionSubmitter;

/// Response body of one batch: one row per intent, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub summary: Vec<ExecutionResult>,
}

/// Runs a batch of intents strictly in order against one signing identity.
///
/// The nonce cursor lives only for the duration of [`process`](Self::process).
/// Running two batches for the same signer at once is not supported.
pub struct IntentBatchProcessor {
    chain: Arc<dyn ChainClient>,
    gas_policy: GasPolicy,
    submitter: TransactionSubmitter,
}

impl IntentBatchProcessor {
    pub fn new(chain: Arc<dyn ChainClient>, config: &EngineConfig) -> Self {
        let waiter = ConfirmationWaiter::new(
            chain.clone(),
            config.confirmation_timeout,
            config.watch_horizon,
        );
        let submitter = TransactionSubmitter::new(chain.clone(), config.gas_policy, waiter);

        Self {
            chain,
            gas_policy: config.gas_policy,
            submitter,
        }
    }

    /// Execute `intents` and return the ordered summary.
    ///
    /// Every intent consumes exactly one nonce, whatever its outcome. If the
    /// starting nonce cannot be fetched the summary holds a single `failed` row.
    pub async fn process(&self, intents: &[Intent]) -> BatchSummary {
        info!("📥 Processing batch of {} intents", intents.len());
        let mut summary = Vec::with_capacity(intents.len());

        let mut nonce = match self.chain.pending_nonce().await {
            Ok(nonce) => nonce,
            Err(e) => {
                error!("❌ Fatal error before processing batch: {}", e);
                summary.push(ExecutionResult::failed(None, e.message()));
                return BatchSummary { summary };
            }
        };

        for intent in intents {
            info!(
                "🚀 Processing intent → action: {}, token: {}, amount: {}, to: {} (nonce {})",
                intent.action,
                intent.token,
                intent.amount.as_deref().unwrap_or("-"),
                intent.to.as_deref().unwrap_or("-"),
                nonce
            );

            let result = match self.execute_one(intent, nonce).await {
                Ok(result) => result,
                Err(e) => {
                    error!("❌ Error in action {}: {}", intent.action, e);
                    ExecutionResult::failed(Some(intent.action.clone()), e.to_string())
                }
            };
            summary.push(result);
            nonce += 1;
        }

        info!("📦 Batch done: {} results", summary.len());
        BatchSummary { summary }
    }

    async fn execute_one(
        &self,
        intent: &Intent,
        nonce: u64,
    ) -> Result<ExecutionResult, IntentError> {
        // Unsupported intents never reach the chain, not even for fee data.
        let gas_price = if intent.is_supported() {
            self.gas_policy.gas_price(self.chain.as_ref()).await?
        } else {
            0
        };
        self.submitter.submit(intent, nonce, gas_price).await
    }
}
