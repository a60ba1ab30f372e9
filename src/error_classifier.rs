use std::fmt;

use crate::error::ChainError;
use crate::intent_types::{Action, ExecutionResult};

/// Message reported for a submission the node already holds in its pool.
pub const DUPLICATE_MESSAGE: &str = "Transaction already known to network";

/// Coarse category of a submission or confirmation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Same transaction already accepted under this nonce. Not a failure.
    Duplicate,
    NonceConflict,
    GasRelated,
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Duplicate => "duplicate_submission",
            FailureKind::NonceConflict => "nonce_conflict",
            FailureKind::GasRelated => "gas_related_failure",
            FailureKind::Other => "network_or_other_failure",
        };
        f.write_str(label)
    }
}

/// Classify an error message. Checked in order: already known, nonce, gas.
pub fn classify_message(message: &str) -> FailureKind {
    let lower = message.to_ascii_lowercase();
    if lower.contains("already known") {
        FailureKind::Duplicate
    } else if lower.contains("nonce") {
        FailureKind::NonceConflict
    } else if lower.contains("gas") {
        FailureKind::GasRelated
    } else {
        FailureKind::Other
    }
}

/// Classify a chain error by its message text.
pub fn classify(err: &ChainError) -> FailureKind {
    match err {
        ChainError::Signing(_) => FailureKind::Other,
        err => classify_message(&err.message()),
    }
}

/// Summary row for a failed send.
pub fn result_for_send_error(action: Action, err: &ChainError) -> ExecutionResult {
    let message = err.message();
    match classify(err) {
        FailureKind::Duplicate => ExecutionResult::duplicate(action, DUPLICATE_MESSAGE),
        FailureKind::NonceConflict => {
            ExecutionResult::failed(Some(action), format!("Nonce error: {}", message))
        }
        FailureKind::GasRelated => {
            ExecutionResult::failed(Some(action), format!("Gas error: {}", message))
        }
        FailureKind::Other => ExecutionResult::failed(Some(action), message),
    }
}
