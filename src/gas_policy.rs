use alloy_primitives::U256;
use std::future::Future;
use tracing::{debug, warn};

use crate::chain_client::ChainClient;
use crate::error::ChainError;

/// Default bump applied to the network gas price (percent).
pub const DEFAULT_PRICE_BUMP_PERCENT: u128 = 125;
/// Bump applied to a successful gas estimate (percent).
pub const DEFAULT_LIMIT_BUMP_PERCENT: u128 = 130;
/// Gas limit used when estimation fails.
pub const FALLBACK_GAS_LIMIT: u64 = 300_000;
/// Gas price used when the node reports none, in gwei.
pub const FALLBACK_GAS_PRICE_GWEI: u128 = 50;

const WEI_PER_GWEI: u128 = 1_000_000_000;

/// `floor(base * percent / 100)`, clamped to `u128::MAX`.
///
/// The product is taken in 256 bits so the floor stays exact for any input.
pub fn bump(base: u128, percent: u128) -> u128 {
    let bumped = U256::from(base) * U256::from(percent) / U256::from(100u8);
    u128::try_from(bumped).unwrap_or(u128::MAX)
}

/// Gas price and gas limit policy for outgoing transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPolicy {
    pub price_bump_percent: u128,
    pub limit_bump_percent: u128,
    pub fallback_gas_limit: u64,
    pub fallback_gas_price_gwei: u128,
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self {
            price_bump_percent: DEFAULT_PRICE_BUMP_PERCENT,
            limit_bump_percent: DEFAULT_LIMIT_BUMP_PERCENT,
            fallback_gas_limit: FALLBACK_GAS_LIMIT,
            fallback_gas_price_gwei: FALLBACK_GAS_PRICE_GWEI,
        }
    }
}

impl GasPolicy {
    /// Bumped gas price for the next transaction, in wei.
    ///
    /// Falls back to `fallback_gas_price_gwei` when the node has no fee data.
    /// A failing fee lookup is returned to the caller.
    pub async fn gas_price(&self, chain: &dyn ChainClient) -> Result<u128, ChainError> {
        let base = match chain.gas_price().await? {
            Some(price) => price,
            None => {
                debug!(
                    "No gas price from node, using fallback of {} gwei",
                    self.fallback_gas_price_gwei
                );
                self.fallback_gas_price_gwei.saturating_mul(WEI_PER_GWEI)
            }
        };
        Ok(bump(base, self.price_bump_percent))
    }

    /// Run `estimate` and bump the result; any failure yields the fallback limit.
    pub async fn estimate_limit<F>(&self, estimate: F) -> u64
    where
        F: Future<Output = Result<u64, ChainError>>,
    {
        match estimate.await {
            Ok(gas) => {
                let bumped = bump(u128::from(gas), self.limit_bump_percent);
                u64::try_from(bumped).unwrap_or(u64::MAX)
            }
            Err(e) => {
                warn!(
                    "⛽ Gas estimation failed ({}), using fallback limit {}",
                    e, self.fallback_gas_limit
                );
                self.fallback_gas_limit
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_is_integer_floor() {
        assert_eq!(bump(100, 125), 125);
        assert_eq!(bump(21_000, 130), 27_300);
        assert_eq!(bump(3, 125), 3);
        assert_eq!(bump(7, 130), 9);
        assert_eq!(bump(0, 125), 0);
    }

    #[test]
    fn test_bump_is_exact_past_u128_product() {
        // base * percent overflows u128 but the result still fits.
        let base = u128::MAX / 2;
        assert_eq!(bump(base, 150), base / 2 * 3 + 1);
        assert_eq!(bump(u128::MAX, 100), u128::MAX);
        assert_eq!(bump(u128::MAX, 125), u128::MAX);
    }

    #[tokio::test]
    async fn test_estimate_limit_bumps_successful_estimate() {
        let policy = GasPolicy::default();
        let limit = policy.estimate_limit(async { Ok(50_000) }).await;
        assert_eq!(limit, 65_000);
    }

    #[tokio::test]
    async fn test_estimate_limit_falls_back_on_error() {
        let policy = GasPolicy::default();
        let limit = policy
            .estimate_limit(async {
                Err(ChainError::Rpc {
                    code: 3,
                    message: "execution reverted".to_string(),
                })
            })
            .await;
        assert_eq!(limit, 300_000);
    }
}
