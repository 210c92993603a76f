//! Contract interface descriptors
//!
//! Only the parts of a Solidity JSON ABI needed to synthesize operations are
//! modelled: member kind, name, mutability and the type tag of each input and
//! output. Types are not validated beyond being present.

use serde::{Deserialize, Serialize};

/// One parameter of an ABI member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParam {
    /// Parameter name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Solidity type tag (e.g. `uint256`)
    #[serde(rename = "type")]
    pub ty: String,
}

impl AbiParam {
    /// Unnamed parameter of the given type
    pub fn new(ty: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            ty: ty.into(),
        }
    }
}

/// One member of a contract ABI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiEntry {
    /// Member kind: `function`, `event`, `constructor`, `fallback`, ...
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    /// Member name
    #[serde(default)]
    pub name: Option<String>,
    /// Legacy read-only marker
    #[serde(default)]
    pub constant: bool,
    /// `pure`, `view`, `nonpayable` or `payable`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
    /// Input parameters
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    /// Output parameters
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
}

// Solidity omits `type` for functions in some older ABI dumps.
fn default_kind() -> String {
    "function".to_string()
}

impl AbiEntry {
    /// Function descriptor
    pub fn function(
        name: impl Into<String>,
        inputs: &[&str],
        outputs: &[&str],
        constant: bool,
    ) -> Self {
        Self {
            kind: "function".to_string(),
            name: Some(name.into()),
            constant,
            state_mutability: None,
            inputs: inputs.iter().map(|t| AbiParam::new(*t)).collect(),
            outputs: outputs.iter().map(|t| AbiParam::new(*t)).collect(),
        }
    }

    /// Whether this member is a function
    pub fn is_function(&self) -> bool {
        self.kind == "function"
    }

    /// Whether calling this member leaves ledger state untouched
    pub fn is_constant(&self) -> bool {
        self.constant
            || matches!(self.state_mutability.as_deref(), Some("view") | Some("pure"))
    }

    /// Input type tags in order
    pub fn input_types(&self) -> Vec<String> {
        self.inputs.iter().map(|p| p.ty.clone()).collect()
    }

    /// Output type tags in order
    pub fn output_types(&self) -> Vec<String> {
        self.outputs.iter().map(|p| p.ty.clone()).collect()
    }
}

/// Standard ERC-20 token interface
pub fn erc20() -> Vec<AbiEntry> {
    vec![
        AbiEntry::function("name", &[], &["string"], true),
        AbiEntry::function("symbol", &[], &["string"], true),
        AbiEntry::function("decimals", &[], &["uint8"], true),
        AbiEntry::function("totalSupply", &[], &["uint256"], true),
        AbiEntry::function("balanceOf", &["address"], &["uint256"], true),
        AbiEntry::function("allowance", &["address", "address"], &["uint256"], true),
        AbiEntry::function("transfer", &["address", "uint256"], &["bool"], false),
        AbiEntry::function("approve", &["address", "uint256"], &["bool"], false),
        AbiEntry::function(
            "transferFrom",
            &["address", "address", "uint256"],
            &["bool"],
            false,
        ),
    ]
}
