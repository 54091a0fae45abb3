/// Ledger Mock Node
///
/// Serves the wallet and ledger contract JSON-RPC surface from memory.
/// Designed for local development and end-to-end tests.

use anyhow::{Context, Result};
use std::env;

use alloy_primitives::Address;
use ledger_mock::{run_server, MockChain, MockChainConfig};

#[derive(Debug)]
struct Config {
    // Chain
    chain_id: Option<u64>,
    accounts: Option<Vec<Address>>,
    contract_address: Option<Address>,

    // Server
    server_host: String,
    server_port: u16,
}

impl Config {
    fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let chain_id = env::var("CHAIN_ID")
            .ok()
            .map(|id| id.parse::<u64>().context("Invalid CHAIN_ID"))
            .transpose()?;

        let accounts = env::var("MOCK_ACCOUNTS")
            .ok()
            .map(|list| {
                list.split(',')
                    .map(|account| {
                        account
                            .trim()
                            .parse::<Address>()
                            .with_context(|| format!("Invalid account in MOCK_ACCOUNTS: {}", account))
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        let contract_address = env::var("LEDGER_CONTRACT_ADDRESS")
            .ok()
            .map(|address| address.parse::<Address>().context("Invalid LEDGER_CONTRACT_ADDRESS"))
            .transpose()?;

        let server_host = env::var("SERVER_HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8545".to_string())
            .parse()
            .context("Invalid SERVER_PORT")?;

        Ok(Self {
            chain_id,
            accounts,
            contract_address,
            server_host,
            server_port,
        })
    }

    fn chain_config(&self) -> MockChainConfig {
        let mut config = MockChainConfig::default();
        if let Some(chain_id) = self.chain_id {
            config.chain_id = chain_id;
        }
        if let Some(accounts) = &self.accounts {
            config.accounts = accounts.clone();
        }
        if let Some(address) = self.contract_address {
            config.contract_address = address;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    log::info!("Starting Ledger Mock Node...");

    // Load configuration
    let config = Config::from_env()
        .context("Failed to load configuration")?;

    log::info!("Server will listen on {}:{}", config.server_host, config.server_port);

    let chain = MockChain::new(config.chain_config());

    run_server(chain, config.server_host, config.server_port)
        .await
        .context("Server error")?;

    Ok(())
}
