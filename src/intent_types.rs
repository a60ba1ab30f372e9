use alloy_primitives::{
    utils::{parse_units, ParseUnits},
    Address, U256,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::IntentError;

/// Token symbol of the chain's native asset. The only token the contract handles.
pub const NATIVE_TOKEN: &str = "BDAG";

/// What an intent asks the agent to do.
///
/// Unknown actions are kept verbatim so they can be echoed back in the
/// summary as `invalid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    Stake,
    Transfer,
    Other(String),
}

impl From<String> for Action {
    fn from(value: String) -> Self {
        match value.as_str() {
            "stake" => Action::Stake,
            "transfer" => Action::Transfer,
            _ => Action::Other(value),
        }
    }
}

impl From<&str> for Action {
    fn from(value: &str) -> Self {
        Action::from(value.to_string())
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.to_string()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Stake => f.write_str("stake"),
            Action::Transfer => f.write_str("transfer"),
            Action::Other(other) => f.write_str(other),
        }
    }
}

/// A caller-supplied request to stake or transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub action: Action,
    #[serde(default)]
    pub token: String,
    /// Decimal amount in whole native units. Callers send either `"1.5"` or `1.5`.
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl Intent {
    pub fn new(action: impl Into<Action>, token: &str, amount: &str) -> Self {
        Self {
            action: action.into(),
            token: token.to_string(),
            amount: Some(amount.to_string()),
            to: None,
        }
    }

    pub fn with_recipient(mut self, to: &str) -> Self {
        self.to = Some(to.to_string());
        self
    }

    /// Whether this intent targets the native token.
    pub fn is_native(&self) -> bool {
        self.token == NATIVE_TOKEN
    }

    /// Whether the agent knows how to execute this `(action, token)` pair.
    pub fn is_supported(&self) -> bool {
        self.is_native() && matches!(self.action, Action::Stake | Action::Transfer)
    }

    /// Amount converted to wei (18 decimals).
    pub fn amount_wei(&self) -> Result<U256, IntentError> {
        let raw = self.amount.as_deref().ok_or(IntentError::MissingAmount)?;
        parse_amount_wei(raw)
    }

    /// Recipient parsed as a checksummed-or-lowercase address, if present.
    pub fn recipient(&self) -> Result<Option<Address>, IntentError> {
        match self.to.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<Address>()
                .map(Some)
                .map_err(|e| IntentError::InvalidRecipient {
                    to: raw.to_string(),
                    reason: e.to_string(),
                }),
        }
    }
}

/// Parse a decimal BDAG amount into wei (18 decimals). Negative amounts are rejected.
pub fn parse_amount_wei(raw: &str) -> Result<U256, IntentError> {
    let invalid = |reason: String| IntentError::InvalidAmount {
        amount: raw.to_string(),
        reason,
    };

    match parse_units(raw.trim(), "ether").map_err(|e| invalid(e.to_string()))? {
        ParseUnits::U256(wei) => Ok(wei),
        ParseUnits::I256(_) => Err(invalid("amount must not be negative".to_string())),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(serde_json::Number),
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawAmount>::deserialize(deserializer)?;
    Ok(raw.map(|amount| match amount {
        RawAmount::Text(text) => text,
        RawAmount::Number(number) => number.to_string(),
    }))
}

/// Outcome category of one intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failed,
    Duplicate,
    Invalid,
}

/// One row of the batch summary. Produced once per intent, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    /// Absent only on the trailing row of a batch that failed before its loop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ExecutionResult {
    pub fn success(action: Action, tx_hash: String) -> Self {
        Self {
            status: ExecutionStatus::Success,
            action: Some(action),
            tx_hash: Some(tx_hash),
            error: None,
            message: None,
        }
    }

    pub fn failed(action: Option<Action>, error: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::Failed,
            action,
            tx_hash: None,
            error: Some(error.into()),
            message: None,
        }
    }

    pub fn duplicate(action: Action, message: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::Duplicate,
            action: Some(action),
            tx_hash: None,
            error: None,
            message: Some(message.into()),
        }
    }

    pub fn invalid(action: Action, message: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::Invalid,
            action: Some(action),
            tx_hash: None,
            error: None,
            message: Some(message.into()),
        }
    }
}

/// Gas parameters for one transaction. Computed per intent, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasQuote {
    /// Gas price in wei.
    pub price: u128,
    pub limit: u64,
}
