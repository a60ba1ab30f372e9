use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::chain_client::{ChainClient, TxOverrides};
use crate::confirmation::ConfirmationWaiter;
use crate::error::IntentError;
use crate::error_classifier::{classify, result_for_send_error, FailureKind};
use crate::gas_policy::GasPolicy;
use crate::intent_contract::ContractCall;
use crate::intent_types::{Action, ExecutionResult, GasQuote, Intent};

pub const MISSING_RECIPIENT: &str = "Missing recipient address (to)";
pub const UNSUPPORTED_INTENT: &str = "Unsupported action or token";

/// Builds, sends and confirms the transaction for one intent.
///
/// Never retries. Send failures come back as classified summary rows; an `Err`
/// means the intent could not be turned into a transaction at all.
pub struct TransactionSubmitter {
    chain: Arc<dyn ChainClient>,
    gas_policy: GasPolicy,
    waiter: ConfirmationWaiter,
}

impl TransactionSubmitter {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        gas_policy: GasPolicy,
        waiter: ConfirmationWaiter,
    ) -> Self {
        Self {
            chain,
            gas_policy,
            waiter,
        }
    }

    /// Submit `intent` with the given nonce and (already bumped) gas price.
    pub async fn submit(
        &self,
        intent: &Intent,
        nonce: u64,
        gas_price: u128,
    ) -> Result<ExecutionResult, IntentError> {
        let action = intent.action.clone();

        let call = match (&intent.action, intent.is_native()) {
            (Action::Stake, true) => ContractCall::Stake {
                value: intent.amount_wei()?,
            },
            (Action::Transfer, true) => {
                let Some(to) = intent.recipient()? else {
                    warn!("❌ Transfer intent without recipient (nonce {})", nonce);
                    return Ok(ExecutionResult::failed(Some(action), MISSING_RECIPIENT));
                };
                info!("📤 Transferring to: 0x{:x}", to);
                ContractCall::TransferBdag {
                    to,
                    amount: intent.amount_wei()?,
                }
            }
            _ => {
                warn!(
                    "Unsupported intent: action {}, token {}",
                    intent.action, intent.token
                );
                return Ok(ExecutionResult::invalid(action, UNSUPPORTED_INTENT));
            }
        };

        let quote = GasQuote {
            price: gas_price,
            limit: self
                .gas_policy
                .estimate_limit(self.chain.estimate_gas(&call))
                .await,
        };
        debug!(
            "⛽ {} gas quote: price {} wei, limit {}",
            call.name(),
            quote.price,
            quote.limit
        );

        let overrides = TxOverrides {
            nonce,
            gas_price: quote.price,
            gas_limit: quote.limit,
        };

        let tx_hash = match self.chain.send(&call, overrides).await {
            Ok(tx_hash) => tx_hash,
            Err(e) => {
                match classify(&e) {
                    FailureKind::Duplicate => {
                        warn!("⚠️ TX already known (nonce {}). Skipping.", nonce)
                    }
                    kind => error!(
                        "❌ {} TX failed (nonce {}, {}): {}",
                        call.name(),
                        nonce,
                        kind,
                        e
                    ),
                }
                return Ok(result_for_send_error(action, &e));
            }
        };

        info!("📤 {} TX sent: 0x{:x} (nonce {})", call.name(), tx_hash, nonce);

        // A timed out wait is still a success: the transaction may land later.
        let confirmation = self.waiter.await_one_confirmation(tx_hash).await;
        debug!("0x{:x} confirmed within window: {}", tx_hash, confirmation.confirmed);

        Ok(ExecutionResult::success(action, format!("0x{:x}", tx_hash)))
    }
}
