//! Query an ERC-20 balance through the gateway
//!
//! ```text
//! ETHEREST_API_KEY=... RUST_LOG=etherest_sdk=debug \
//!     cargo run --example erc20_balance -- <token> <owner> [network]
//! ```

use etherest_sdk::{abi, Config, EtherestClient};
use serde_json::json;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let mut args = std::env::args().skip(1);
    let (token, owner) = match (args.next(), args.next()) {
        (Some(token), Some(owner)) => (token, owner),
        _ => return Err("usage: erc20_balance <token> <owner> [network]".into()),
    };
    let network = args.next();

    let client = EtherestClient::new(Config::from_env());
    let mut contract = client.address(token, network.as_deref());
    contract.abi(&abi::erc20());

    let balance = contract.invoke("balanceOf", vec![json!(owner)]).await?;
    tracing::info!(%balance, "balance fetched");
    println!("{}", balance);

    Ok(())
}
