//! Accounts command handler.

use anyhow::{Context, Result};
use orax_core::config::Config;
use orax_core::provider::NodeClient;

/// Lists the node's accounts, marking the configured sender.
pub async fn run(config: &Config) -> Result<()> {
    let client = NodeClient::new(&config.rpc_url, config.request_timeout())?;
    let accounts = client.accounts().await.context("fetch accounts")?;

    if accounts.is_empty() {
        println!("The node returned no accounts.");
        return Ok(());
    }

    for (index, account) in accounts.iter().enumerate() {
        let marker = if index == config.account_index {
            "*"
        } else {
            " "
        };
        println!("{marker} [{index}] {account}");
    }
    Ok(())
}
