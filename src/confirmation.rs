use alloy_primitives::TxHash;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::chain_client::ChainClient;

/// How long a caller waits for one confirmation by default.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_millis(30_000);
/// How long an abandoned watch may keep polling in the background.
pub const DEFAULT_WATCH_HORIZON: Duration = Duration::from_secs(600);

/// Result of waiting for a transaction.
///
/// `confirmed == false` does not mean the transaction failed; it may still be mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub confirmed: bool,
}

/// Waits for one confirmation of a submitted transaction, bounded by a timeout.
#[derive(Clone)]
pub struct ConfirmationWaiter {
    chain: Arc<dyn ChainClient>,
    timeout: Duration,
    watch_horizon: Duration,
}

impl ConfirmationWaiter {
    pub fn new(chain: Arc<dyn ChainClient>, timeout: Duration, watch_horizon: Duration) -> Self {
        Self {
            chain,
            timeout,
            watch_horizon: watch_horizon.max(timeout),
        }
    }

    /// Race the receipt watch against the timeout.
    ///
    /// The watch runs as its own task. If the timer fires first the task is
    /// detached, not cancelled: it keeps polling until the receipt lands or the
    /// watch horizon passes, and only ever logs its outcome.
    pub async fn await_one_confirmation(&self, tx_hash: TxHash) -> Confirmation {
        let chain = self.chain.clone();
        let horizon = self.watch_horizon;
        let mut watch = tokio::spawn(async move {
            match tokio::time::timeout(horizon, chain.wait_for_receipt(tx_hash)).await {
                Ok(Ok(())) => true,
                Ok(Err(e)) => {
                    debug!("Confirmation watch for 0x{:x} ended with error: {}", tx_hash, e);
                    false
                }
                Err(_) => {
                    debug!("Gave up watching 0x{:x} after {:?}", tx_hash, horizon);
                    false
                }
            }
        });

        tokio::select! {
            joined = &mut watch => {
                let confirmed = match joined {
                    Ok(confirmed) => confirmed,
                    Err(e) => {
                        debug!("Confirmation watch task for 0x{:x} aborted: {}", tx_hash, e);
                        false
                    }
                };
                if confirmed {
                    info!("✅ TX confirmed: 0x{:x}", tx_hash);
                } else {
                    warn!("⚠️ Could not confirm 0x{:x}. Might still be mined.", tx_hash);
                }
                Confirmation { confirmed }
            }
            _ = tokio::time::sleep(self.timeout) => {
                warn!(
                    "⚠️ Confirmation wait for 0x{:x} timed out after {:?}. Might still be mined.",
                    tx_hash, self.timeout
                );
                Confirmation { confirmed: false }
            }
        }
    }
}
