use alloy_transport::TransportError;
use thiserror::Error;

/// Errors raised by a [`ChainClient`](crate::chain_client::ChainClient).
#[derive(Error, Debug)]
pub enum ChainError {
    /// The node answered with a JSON-RPC error object.
    #[error("{message}")]
    Rpc { code: i64, message: String },

    /// The request never produced a JSON-RPC answer (connection, timeout, decoding).
    #[error("transport error: {0}")]
    Transport(String),

    /// Signing the transaction locally failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The transaction was mined but reverted.
    #[error("transaction {0} reverted")]
    Reverted(String),

    #[error("{0}")]
    Other(String),
}

impl ChainError {
    /// Message text used for classification and for the summary row.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<TransportError> for ChainError {
    fn from(err: TransportError) -> Self {
        match err.as_error_resp() {
            Some(payload) => ChainError::Rpc {
                code: payload.code,
                message: payload.message.to_string(),
            },
            None => ChainError::Transport(err.to_string()),
        }
    }
}

/// Errors that abort processing of a single intent.
///
/// These never escape the batch: the processor turns them into a `failed` row.
#[derive(Error, Debug)]
pub enum IntentError {
    #[error("Missing amount")]
    MissingAmount,

    #[error("Invalid amount {amount}: {reason}")]
    InvalidAmount { amount: String, reason: String },

    #[error("Invalid recipient address {to}: {reason}")]
    InvalidRecipient { to: String, reason: String },

    #[error(transparent)]
    Chain(#[from] ChainError),
}
