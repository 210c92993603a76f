//! # etherest-sdk
//!
//! Rust SDK for calling contract methods through an Etherest REST gateway.
//!
//! ## Features
//!
//! - **EtherestClient**: gateway client (base endpoint, API key, dispatch)
//! - **Address**: handle for one on-ledger address, with ABI-driven operations
//! - **Query**: a single invocation encoded as a gateway path
//! - **ABI**: contract interface descriptors consumed by [`Address::abi`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use etherest_sdk::{Config, EtherestClient, TxOptions};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EtherestClient::new(Config::default().with_api_key("my-key"));
//!
//!     // Build and run a query by hand: main/0x.../balanceOf:uint256/address:0x.../
//!     let token = client.address("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", None);
//!     let balance = token
//!         .query("balanceOf")
//!         .returns("uint256")
//!         .param("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d", Some("address"))
//!         .call(None)
//!         .await?;
//!     println!("Balance: {}", balance);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Contract Interaction
//!
//! ```rust,no_run
//! use etherest_sdk::{abi, Config, EtherestClient};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EtherestClient::new(Config::from_env());
//!
//!     let mut token = client.address("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", None);
//!     token.abi(&abi::erc20());
//!
//!     // Constant functions execute as calls
//!     let supply = token.invoke("totalSupply", vec![]).await?;
//!     println!("Supply: {}", supply);
//!
//!     // Everything else is a transaction; the last argument holds the options
//!     let txid = token
//!         .invoke(
//!             "transfer",
//!             vec![json!("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d"), json!(100), json!({"from": "0xme"})],
//!         )
//!         .await?;
//!     println!("Transaction: {}", txid);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
mod address;
mod client;
mod config;
mod error;
mod query;
mod transport;
mod types;
pub mod value;

// Re-export main types
pub use address::{Address, BoundOperation, Operation, OperationKind, DEFAULT_NETWORK};
pub use client::{EtherestClient, API_KEY_HEADER};
pub use config::{Config, API_KEY_ENV, DEFAULT_SERVER, SERVER_ENV};
pub use error::SdkError;
pub use query::{Param, Query, ReturnType};
pub use types::{TxOptions, DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE};

/// Re-export Transport trait for custom implementations
pub use transport::{HttpMethod, MockTransport, Transport, TransportRequest};

#[cfg(feature = "http")]
pub use transport::HttpTransport;
