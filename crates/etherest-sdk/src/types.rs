//! SDK types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::value::{is_truthy, plain_string};
use crate::SdkError;

/// Gas limit applied when a transaction does not set one
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;

/// Gas price (gwei) applied when a transaction does not set one
pub const DEFAULT_GAS_PRICE: u64 = 20;

/// Options record submitted with a transaction
///
/// Serialized with the gateway's field names (`from`, `privateKey`, `value`,
/// `gasPrice`, `gasLimit`). Unknown fields are carried in `extra` and sent
/// along unchanged.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOptions {
    /// Sender address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Private key of the sender, signed server-side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    /// Ether to send with the transaction (1 = 1.0 Ether), number or string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Gas price in gwei, number or string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<Value>,
    /// Maximum gas the transaction may use, number or string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<Value>,
    /// Any further fields, forwarded verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TxOptions {
    /// Create an empty options record
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an options record from a loosely typed value (`null` means empty)
    pub fn from_value(value: Value) -> Result<Self, SdkError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Set the sender address
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Set the sender's private key
    pub fn private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = Some(key.into());
        self
    }

    /// Set the value to transfer
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the gas price
    pub fn gas_price(mut self, price: impl Into<Value>) -> Self {
        self.gas_price = Some(price.into());
        self
    }

    /// Set the gas limit
    pub fn gas_limit(mut self, limit: impl Into<Value>) -> Self {
        self.gas_limit = Some(limit.into());
        self
    }

    /// Set an arbitrary extra field
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Fill in gas defaults.
    ///
    /// Any value that is not truthy (`0`, `""`, `null`, `false`) is treated
    /// as unset and replaced, the same as a missing value.
    pub fn with_defaults(mut self) -> Self {
        self.gas_limit = Some(
            self.gas_limit
                .filter(is_truthy)
                .unwrap_or_else(|| Value::from(DEFAULT_GAS_LIMIT)),
        );
        self.gas_price = Some(
            self.gas_price
                .filter(is_truthy)
                .unwrap_or_else(|| Value::from(DEFAULT_GAS_PRICE)),
        );
        self
    }

    /// Flatten into form fields for the POST body
    pub fn to_form(&self) -> Result<Vec<(String, String)>, SdkError> {
        let map: Map<String, Value> = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            other => {
                return Err(SdkError::Serialization(format!(
                    "transaction options must serialize to an object, got {}",
                    other
                )))
            }
        };

        Ok(map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), plain_string(v)))
            .collect())
    }
}

impl fmt::Debug for TxOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxOptions")
            .field("from", &self.from)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("value", &self.value)
            .field("gas_price", &self.gas_price)
            .field("gas_limit", &self.gas_limit)
            .field("extra", &self.extra)
            .finish()
    }
}
