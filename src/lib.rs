pub mod chain_client;
pub mod config;
pub mod confirmation;
pub mod error;
pub mod error_classifier;
pub mod gas_policy;
pub mod intent_contract;
pub mod intent_processor;
pub mod intent_types;
pub mod transaction_submitter;

pub use chain_client::{AlloyChainClient, ChainClient, TxOverrides};
pub use config::EngineConfig;
pub use confirmation::{Confirmation, ConfirmationWaiter};
pub use error::{ChainError, IntentError};
pub use error_classifier::FailureKind;
pub use gas_policy::GasPolicy;
pub use intent_contract::ContractCall;
pub use intent_processor::{BatchSummary, IntentBatchProcessor};
pub use intent_types::{Action, ExecutionResult, ExecutionStatus, GasQuote, Intent};
pub use transaction_submitter::TransactionSubmitter;
