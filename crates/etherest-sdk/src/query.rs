//! Query: one encoded contract invocation
//!
//! A query holds a method name, an ordered parameter list and an optional
//! return type. It renders itself into the gateway's path encoding
//!
//! ```text
//! <method>[:<returnType>[,<returnType>...]]/[<paramType>:]<paramValue>/...
//! ```
//!
//! and executes as a read-only call or a transaction against an
//! [`Address`](crate::Address).

use serde_json::Value;
use std::fmt;

use crate::address::Address;
use crate::types::TxOptions;
use crate::value::{is_truthy, plain_string};
use crate::SdkError;

/// One positional parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Parameter value, rendered by its plain string form
    pub value: Value,
    /// Declared type, rendered as a `type:` prefix when present
    pub ty: Option<String>,
}

impl Param {
    /// Parameter without a declared type
    pub fn untyped(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            ty: None,
        }
    }

    /// Parameter with a declared type
    pub fn typed(value: impl Into<Value>, ty: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ty: Some(ty.into()),
        }
    }

    fn declared_type(&self) -> Option<&str> {
        self.ty.as_deref().filter(|t| !t.is_empty())
    }
}

impl From<Value> for Param {
    /// A `{value, type}` record with a non-empty `value` is taken as is;
    /// anything else becomes an untyped parameter wrapping the whole value.
    fn from(value: Value) -> Self {
        if let Value::Object(record) = &value {
            if let Some(inner) = record.get("value").filter(|v| is_truthy(v)) {
                let ty = match record.get("type") {
                    Some(Value::String(t)) => Some(t.clone()),
                    _ => None,
                };
                return Param {
                    value: inner.clone(),
                    ty,
                };
            }
        }
        Param::untyped(value)
    }
}

/// Declared return type of a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    /// A single return value
    Single(String),
    /// Several return values, rendered comma-separated
    Multiple(Vec<String>),
}

impl ReturnType {
    fn is_set(&self) -> bool {
        match self {
            ReturnType::Single(ty) => !ty.is_empty(),
            ReturnType::Multiple(_) => true,
        }
    }

    fn render(&self) -> String {
        match self {
            ReturnType::Single(ty) => ty.clone(),
            ReturnType::Multiple(types) => types.join(","),
        }
    }
}

impl From<&str> for ReturnType {
    fn from(ty: &str) -> Self {
        ReturnType::Single(ty.to_string())
    }
}

impl From<String> for ReturnType {
    fn from(ty: String) -> Self {
        ReturnType::Single(ty)
    }
}

impl From<Vec<String>> for ReturnType {
    fn from(types: Vec<String>) -> Self {
        ReturnType::Multiple(types)
    }
}

impl From<Vec<&str>> for ReturnType {
    fn from(types: Vec<&str>) -> Self {
        ReturnType::Multiple(types.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ReturnType {
    fn from(types: [&str; N]) -> Self {
        ReturnType::Multiple(types.iter().map(|t| t.to_string()).collect())
    }
}

/// A single interaction with the ledger, executable as a call or a transaction
#[derive(Debug, Clone)]
pub struct Query<'a> {
    address: Option<&'a Address<'a>>,
    method: String,
    params: Vec<Param>,
    returns: Option<ReturnType>,
}

impl Query<'static> {
    /// Unbound query with no parameters
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            address: None,
            method: method.into(),
            params: Vec::new(),
            returns: None,
        }
    }

    /// Unbound query from a list of raw values and/or `{value, type}` records
    pub fn from_params(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self::from_typed(method, params.into_iter().map(Param::from).collect())
    }

    /// Unbound query from already-typed parameters
    pub fn from_typed(method: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            address: None,
            method: method.into(),
            params,
            returns: None,
        }
    }
}

impl<'a> Query<'a> {
    pub(crate) fn for_address(address: &'a Address<'a>, method: impl Into<String>) -> Self {
        Self {
            address: Some(address),
            method: method.into(),
            params: Vec::new(),
            returns: None,
        }
    }

    /// Bind this query to an address handle
    pub fn bind<'b>(self, address: &'b Address<'b>) -> Query<'b> {
        Query {
            address: Some(address),
            method: self.method,
            params: self.params,
            returns: self.returns,
        }
    }

    /// Append a parameter, optionally with its declared type
    pub fn param(mut self, value: impl Into<Value>, ty: Option<&str>) -> Self {
        self.push_param(Param {
            value: value.into(),
            ty: ty.map(String::from),
        });
        self
    }

    pub(crate) fn push_param(&mut self, param: Param) {
        self.params.push(param);
    }

    /// Set the declared return type
    pub fn returns(mut self, ty: impl Into<ReturnType>) -> Self {
        self.returns = Some(ty.into());
        self
    }

    /// Method name
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Parameters in positional order
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Declared return type
    pub fn return_type(&self) -> Option<&ReturnType> {
        self.returns.as_ref()
    }

    /// Bound address handle
    pub fn address(&self) -> Option<&'a Address<'a>> {
        self.address
    }

    /// Render the path segment for this query, without leading slash
    pub fn encode(&self) -> String {
        let mut encoded = self.method.clone();
        if let Some(returns) = self.returns.as_ref().filter(|r| r.is_set()) {
            encoded.push(':');
            encoded.push_str(&returns.render());
        }
        encoded.push('/');

        for param in &self.params {
            if let Some(ty) = param.declared_type() {
                encoded.push_str(ty);
                encoded.push(':');
            }
            encoded.push_str(&plain_string(&param.value));
            encoded.push('/');
        }

        encoded
    }

    /// Execute as a read-only call against `target`, or the bound address
    pub async fn call(&self, target: Option<&Address<'_>>) -> Result<Value, SdkError> {
        let address = match target {
            Some(address) => address,
            None => self.address.ok_or_else(|| {
                SdkError::MissingTarget("no address provided to execute call using".to_string())
            })?,
        };

        address.call(&self.encode()).await
    }

    /// Submit as a transaction to `target`, or the bound address
    pub async fn send_transaction(
        &self,
        target: Option<&Address<'_>>,
        options: TxOptions,
    ) -> Result<Value, SdkError> {
        let address = match target {
            Some(address) => address,
            None => self.address.ok_or_else(|| {
                SdkError::MissingTarget(
                    "no address provided to send transaction with".to_string(),
                )
            })?,
        };

        address.send_transaction(&self.encode(), options).await
    }
}

impl fmt::Display for Query<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use crate::{Config, EtherestClient};
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_encode_method_only() {
        assert_eq!(Query::new("totalSupply").encode(), "totalSupply/");
    }

    #[test]
    fn test_encode_typed_and_untyped() {
        let query = Query::new("transfer")
            .returns("uint256")
            .param("0xabc", Some("address"))
            .param(100, None);
        assert_eq!(query.encode(), "transfer:uint256/address:0xabc/100/");
        assert_eq!(query.to_string(), query.encode());
    }

    #[test]
    fn test_encode_multi_return() {
        let query = Query::new("getPair").returns(["uint256", "bool"]);
        assert_eq!(query.encode(), "getPair:uint256,bool/");
    }

    #[test]
    fn test_encode_empty_return_types() {
        assert_eq!(Query::new("ping").returns("").encode(), "ping/");
        assert_eq!(Query::new("ping").returns(Vec::<String>::new()).encode(), "ping:/");
    }

    #[test]
    fn test_empty_type_renders_untyped() {
        let query = Query::from_typed("f", vec![Param::typed(1, "")]);
        assert_eq!(query.encode(), "f/1/");
    }

    #[test]
    fn test_from_params_normalization() {
        let query = Query::from_params(
            "f",
            vec![
                json!("raw"),
                json!({"value": "0xabc", "type": "address"}),
                json!({"value": 0, "type": "uint8"}),
                json!({"other": 1}),
                json!(7),
            ],
        );

        assert_eq!(
            query.params(),
            &[
                Param::untyped("raw"),
                Param::typed("0xabc", "address"),
                Param::untyped(json!({"value": 0, "type": "uint8"})),
                Param::untyped(json!({"other": 1})),
                Param::untyped(7),
            ]
        );
    }

    #[test]
    fn test_record_without_type_is_untyped() {
        let param = Param::from(json!({"value": "x"}));
        assert_eq!(param, Param::untyped("x"));
    }

    #[tokio::test]
    async fn test_call_without_address_is_missing_target() {
        let result = Query::new("balanceOf").call(None).await;
        assert!(matches!(result, Err(SdkError::MissingTarget(_))));
    }

    #[tokio::test]
    async fn test_send_transaction_without_address_is_missing_target() {
        let result = Query::new("transfer")
            .send_transaction(None, TxOptions::new())
            .await;
        assert!(matches!(result, Err(SdkError::MissingTarget(_))));
    }

    #[tokio::test]
    async fn test_call_with_explicit_address() {
        let transport = MockTransport::new();
        transport.set_response("http://gw/main/0xabc/balanceOf/address:0xme/", json!("5"));
        let client = EtherestClient::with_transport(
            Config::default().with_server("http://gw/"),
            transport,
        );
        let address = client.address("0xabc", None);

        let result = Query::new("balanceOf")
            .param("0xme", Some("address"))
            .call(Some(&address))
            .await
            .unwrap();
        assert_eq!(result, json!("5"));
    }

    #[tokio::test]
    async fn test_explicit_address_overrides_bound() {
        let transport = MockTransport::new();
        let observer = transport.clone();
        transport.set_response("http://gw/main/0xother/f/", json!(true));
        let client = EtherestClient::with_transport(
            Config::default().with_server("http://gw/"),
            transport,
        );
        let bound = client.address("0xabc", None);
        let other = client.address("0xother", None);

        bound.query("f").call(Some(&other)).await.unwrap();
        assert_eq!(observer.last_request().unwrap().url, "http://gw/main/0xother/f/");
    }

    proptest! {
        #[test]
        fn prop_encoding_preserves_order(values in prop::collection::vec("[a-zA-Z0-9]{1,12}", 0..8)) {
            let params = values.iter().map(|v| json!(v)).collect();
            let encoded = Query::from_params("m", params).encode();

            let expected: String = std::iter::once("m".to_string())
                .chain(values.iter().cloned())
                .map(|s| s + "/")
                .collect();
            prop_assert_eq!(encoded, expected);
        }

        #[test]
        fn prop_typed_param_rendering(value in "[a-zA-Z0-9]{1,12}", ty in "[a-z]{1,7}[0-9]{0,3}") {
            let typed = Query::new("m").param(value.clone(), Some(ty.as_str())).encode();
            prop_assert_eq!(typed, format!("m/{}:{}/", ty, value));

            let untyped = Query::new("m").param(value.clone(), None).encode();
            prop_assert_eq!(untyped, format!("m/{}/", value));
        }
    }
}
