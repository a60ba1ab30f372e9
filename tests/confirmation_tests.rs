mod common;

use common::{tx_hash_for, MockChain, ReceiptBehavior};
use intellivault_agent::ConfirmationWaiter;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn waiter(chain: &Arc<MockChain>, timeout: Duration) -> ConfirmationWaiter {
    ConfirmationWaiter::new(chain.clone(), timeout, Duration::from_secs(600))
}

#[tokio::test(start_paused = true)]
async fn test_receipt_before_timeout_is_confirmed() {
    let chain = Arc::new(
        MockChain::new(0).with_receipt(ReceiptBehavior::After(Duration::from_secs(2))),
    );
    let confirmation = waiter(&chain, Duration::from_secs(30))
        .await_one_confirmation(tx_hash_for(0))
        .await;

    assert!(confirmation.confirmed);
    assert_eq!(chain.receipts_seen.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_reports_unconfirmed() {
    let chain = Arc::new(MockChain::new(0).with_receipt(ReceiptBehavior::Never));
    let started = tokio::time::Instant::now();

    let confirmation = waiter(&chain, Duration::from_millis(30_000))
        .await_one_confirmation(tx_hash_for(0))
        .await;

    assert!(!confirmation.confirmed);
    assert!(started.elapsed() >= Duration::from_millis(30_000));
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_watch_keeps_running_after_timeout() {
    let chain = Arc::new(
        MockChain::new(0).with_receipt(ReceiptBehavior::After(Duration::from_secs(45))),
    );

    let confirmation = waiter(&chain, Duration::from_secs(30))
        .await_one_confirmation(tx_hash_for(0))
        .await;
    assert!(!confirmation.confirmed);
    assert_eq!(chain.receipts_seen.load(Ordering::SeqCst), 0);

    // The detached watch was not cancelled and observes the late receipt.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(chain.receipts_seen.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_watch_is_bounded_by_horizon() {
    let chain = Arc::new(
        MockChain::new(0).with_receipt(ReceiptBehavior::After(Duration::from_secs(120))),
    );
    let waiter = ConfirmationWaiter::new(
        chain.clone(),
        Duration::from_secs(1),
        Duration::from_secs(10),
    );

    let confirmation = waiter.await_one_confirmation(tx_hash_for(0)).await;
    assert!(!confirmation.confirmed);

    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(chain.receipts_seen.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_watch_error_is_not_confirmed() {
    let chain = Arc::new(MockChain::new(0).with_receipt(ReceiptBehavior::Reverted));
    let confirmation = waiter(&chain, Duration::from_secs(30))
        .await_one_confirmation(tx_hash_for(0))
        .await;

    assert!(!confirmation.confirmed);
}
