//! Address handle: one on-ledger entity bound to a client
//!
//! A handle turns method names and raw arguments into [`Query`] values and
//! dispatches them through its [`EtherestClient`] under the
//! `<network>/<address>/` prefix. Operations synthesized from an ABI are kept
//! in a name-to-[`Operation`] map and invoked through [`Address::invoke`] or
//! the [`BoundOperation`] returned when they are defined.

use serde_json::Value;
use std::collections::HashMap;

use crate::abi::AbiEntry;
use crate::client::EtherestClient;
use crate::query::{Param, Query, ReturnType};
use crate::types::TxOptions;
use crate::value::is_truthy;
use crate::SdkError;

/// Network used when none is given
pub const DEFAULT_NETWORK: &str = "main";

/// How an installed operation executes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Builds a query; the caller decides how to execute it
    Method,
    /// Executes immediately as a read-only call
    Call,
    /// Executes immediately as a transaction, last argument being the options
    Transaction,
}

/// An operation installed on an address handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    name: String,
    kind: OperationKind,
    param_types: Vec<String>,
    returns: Option<ReturnType>,
}

impl Operation {
    /// Operation name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execution mode
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Declared parameter types in positional order
    pub fn param_types(&self) -> &[String] {
        &self.param_types
    }

    /// Declared return type
    pub fn returns(&self) -> Option<&ReturnType> {
        self.returns.as_ref()
    }
}

/// An operation together with the handle it runs against
#[derive(Debug, Clone)]
pub struct BoundOperation<'a> {
    address: &'a Address<'a>,
    operation: Operation,
}

impl<'a> BoundOperation<'a> {
    /// The installed operation
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Build the query for these positional arguments.
    ///
    /// Each declared type is paired with the argument at the same index.
    /// Arguments past the declared list are dropped; missing ones render as
    /// `null`.
    pub fn query(&self, args: &[Value]) -> Query<'a> {
        let mut query = self.address.query(self.operation.name.as_str());
        if let Some(returns) = &self.operation.returns {
            query = query.returns(returns.clone());
        }

        for (index, ty) in self.operation.param_types.iter().enumerate() {
            let value = args.get(index).cloned().unwrap_or(Value::Null);
            query.push_param(Param::typed(value, ty.as_str()));
        }

        query
    }

    /// Execute according to the operation's kind
    pub async fn invoke(&self, mut args: Vec<Value>) -> Result<Value, SdkError> {
        match self.operation.kind {
            OperationKind::Method => Err(SdkError::NotInvocable(self.operation.name.clone())),
            OperationKind::Call => self.query(&args).call(None).await,
            OperationKind::Transaction => {
                let options = TxOptions::from_value(args.pop().unwrap_or(Value::Null))?;
                self.query(&args).send_transaction(None, options).await
            }
        }
    }
}

/// Represents an address on the ledger
#[derive(Debug, Clone)]
pub struct Address<'c> {
    client: Option<&'c EtherestClient>,
    address: String,
    network: String,
    operations: HashMap<String, Operation>,
}

impl Address<'static> {
    /// Handle without a client; bind one with [`Address::bind`] before executing
    pub fn unbound(address: impl Into<String>) -> Self {
        Self {
            client: None,
            address: address.into(),
            network: DEFAULT_NETWORK.to_string(),
            operations: HashMap::new(),
        }
    }
}

impl<'c> Address<'c> {
    /// Handle on the default network
    pub fn new(client: &'c EtherestClient, address: impl Into<String>) -> Self {
        Self {
            client: Some(client),
            address: address.into(),
            network: DEFAULT_NETWORK.to_string(),
            operations: HashMap::new(),
        }
    }

    /// Use another network (e.g. `ropsten`)
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    /// Attach a client, keeping address, network and operations
    pub fn bind<'b>(self, client: &'b EtherestClient) -> Address<'b> {
        Address {
            client: Some(client),
            address: self.address,
            network: self.network,
            operations: self.operations,
        }
    }

    /// Ledger address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Network identifier
    pub fn network(&self) -> &str {
        &self.network
    }

    /// Owning client, if bound
    pub fn client(&self) -> Option<&'c EtherestClient> {
        self.client
    }

    /// Empty query bound to this handle
    pub fn query<'s>(&'s self, method: impl Into<String>) -> Query<'s> {
        Query::for_address(self, method)
    }

    /// Query bound to this handle with untyped positional parameters
    pub fn method<'s>(&'s self, name: impl Into<String>, args: Vec<Value>) -> Query<'s> {
        let mut query = self.query(name);
        for arg in args {
            query.push_param(Param::untyped(arg));
        }
        query
    }

    /// Install an operation that builds a typed query
    pub fn define_method<I, S>(
        &mut self,
        name: impl Into<String>,
        param_types: I,
        returns: Option<ReturnType>,
    ) -> BoundOperation<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.install(name.into(), OperationKind::Method, param_types, returns)
    }

    /// Install an operation that executes as a read-only call
    pub fn define_call<I, S>(
        &mut self,
        name: impl Into<String>,
        param_types: I,
        returns: Option<ReturnType>,
    ) -> BoundOperation<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.install(name.into(), OperationKind::Call, param_types, returns)
    }

    /// Install an operation that executes as a transaction.
    ///
    /// When invoked, the last argument is the options record and is never
    /// encoded as a parameter.
    pub fn define_transaction<I, S>(
        &mut self,
        name: impl Into<String>,
        param_types: I,
    ) -> BoundOperation<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.install(name.into(), OperationKind::Transaction, param_types, None)
    }

    fn install<I, S>(
        &mut self,
        name: String,
        kind: OperationKind,
        param_types: I,
        returns: Option<ReturnType>,
    ) -> BoundOperation<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let operation = Operation {
            name,
            kind,
            param_types: param_types.into_iter().map(Into::into).collect(),
            returns,
        };

        tracing::debug!(
            address = %self.address,
            operation = %operation.name,
            kind = ?operation.kind,
            "installing operation"
        );

        // Last definition wins
        self.operations
            .insert(operation.name.clone(), operation.clone());

        BoundOperation {
            address: self,
            operation,
        }
    }

    /// Installed operation by name
    pub fn operation(&self, name: &str) -> Option<BoundOperation<'_>> {
        self.operations.get(name).map(|operation| BoundOperation {
            address: self,
            operation: operation.clone(),
        })
    }

    /// Whether an operation is installed under `name`
    pub fn has_operation(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// All installed operations, in no particular order
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    /// Build the query an installed operation would send
    pub fn prepare(&self, name: &str, args: &[Value]) -> Result<Query<'_>, SdkError> {
        self.operation(name)
            .map(|op| op.query(args))
            .ok_or_else(|| SdkError::UnknownOperation(name.to_string()))
    }

    /// Invoke an installed operation by name
    pub async fn invoke(&self, name: &str, args: Vec<Value>) -> Result<Value, SdkError> {
        let operation = self
            .operation(name)
            .ok_or_else(|| SdkError::UnknownOperation(name.to_string()))?;
        operation.invoke(args).await
    }

    /// Install an operation for every function in the ABI.
    ///
    /// Constant functions become calls returning their output types,
    /// everything else becomes a transaction. Non-function members are
    /// ignored.
    pub fn abi(&mut self, entries: &[AbiEntry]) -> &mut Self {
        for entry in entries.iter().filter(|e| e.is_function()) {
            let name = match entry.name.as_deref() {
                Some(name) if !name.is_empty() => name,
                _ => {
                    tracing::warn!(address = %self.address, "skipping unnamed ABI function");
                    continue;
                }
            };

            if entry.is_constant() {
                self.define_call(
                    name,
                    entry.input_types(),
                    Some(ReturnType::Multiple(entry.output_types())),
                );
            } else {
                self.define_transaction(name, entry.input_types());
            }
        }

        self
    }

    /// Apply an ABI given as JSON
    pub fn abi_json(&mut self, abi: Value) -> Result<&mut Self, SdkError> {
        let entries: Vec<AbiEntry> = serde_json::from_value(abi)?;
        Ok(self.abi(&entries))
    }

    /// Fetch the ABI the gateway publishes for this address and apply it.
    ///
    /// A response without an `abi` payload leaves the handle unchanged.
    pub async fn load_abi(&mut self) -> Result<&mut Self, SdkError> {
        let response = self.call("").await?;

        match response.get("abi") {
            Some(abi) if is_truthy(abi) => self.abi_json(abi.clone()),
            _ => Ok(self),
        }
    }

    /// Path of this address relative to the gateway root
    pub fn url_encode(&self, suffix: &str) -> String {
        format!("{}/{}/{}", self.network, self.address, suffix)
    }

    /// Read-only call at `path` relative to this address
    pub async fn call(&self, path: &str) -> Result<Value, SdkError> {
        let client = self.bound_client()?;
        client.call(&self.url_encode(path)).await
    }

    /// Transaction to `path` relative to this address
    pub async fn send_transaction(
        &self,
        path: &str,
        options: TxOptions,
    ) -> Result<Value, SdkError> {
        let client = self.bound_client()?;
        client.send_transaction(&self.url_encode(path), options).await
    }

    fn bound_client(&self) -> Result<&'c EtherestClient, SdkError> {
        self.client
            .ok_or_else(|| SdkError::Unbound(self.address.clone()))
    }
}
