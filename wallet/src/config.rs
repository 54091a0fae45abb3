/// Application configuration from environment variables
///
/// Controls which wallet endpoint the store talks to, where the ledger
/// contract lives, and where the GIF search goes. Defaults target a local
/// development node.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use transfer_ledger::{Address, ConfirmationPolicy, DEFAULT_CONTRACT_ADDRESS};

/// Public search endpoint used when `GIPHY_SEARCH_URL` is unset
pub const DEFAULT_GIF_SEARCH_URL: &str = "https://api.giphy.com/v1/gifs/search";

/// Hardhat artifact path relative to the project root
///
/// The artifact must be compiled from a contract with a `payable`
/// `addToBlockchain`; the non-payable build reverts calls carrying value.
pub const DEFAULT_ARTIFACT_PATH: &str = "artifacts/contracts/Transactions.sol/Transactions.json";

#[derive(Clone, Debug)]
pub struct WalletConfig {
    /// Wallet JSON-RPC endpoint; `None` means no wallet in this environment
    pub wallet_rpc_url: Option<String>,
    /// Deployed ledger contract
    pub contract_address: Address,
    pub gif_api_key: String,
    pub gif_search_url: String,
    /// Directory holding the persisted key-value file
    pub storage_path: PathBuf,
    pub confirmation: ConfirmationPolicy,
}

impl WalletConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `WALLET_RPC_URL`: wallet endpoint (unset: wallet unavailable)
    /// - `LEDGER_CONTRACT_ADDRESS`: ledger contract (default: first local deployment)
    /// - `GIPHY_API_KEY`, `GIPHY_SEARCH_URL`: GIF search
    /// - `STORAGE_PATH`: persisted state directory (default `./.ledger`)
    /// - `CONFIRMATION_POLL_MS`, `CONFIRMATION_MAX_ATTEMPTS`: receipt polling
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Against the local mock node
    /// WALLET_RPC_URL=http://localhost:8545 cargo run --bin ledger-wallet
    /// ```
    pub fn from_env() -> Self {
        dotenv::dotenv().ok(); // Load .env file if present
        let defaults = Self::default();

        let wallet_rpc_url = env::var("WALLET_RPC_URL").ok().filter(|url| !url.is_empty());
        match &wallet_rpc_url {
            Some(url) => log::info!("🔗 Wallet RPC URL: {}", url),
            None => log::warn!("⚠️  WALLET_RPC_URL not set, no wallet available"),
        }

        let contract_address = match env::var("LEDGER_CONTRACT_ADDRESS") {
            Ok(raw) => raw.parse::<Address>().unwrap_or_else(|e| {
                log::warn!(
                    "⚠️  Invalid LEDGER_CONTRACT_ADDRESS '{}' ({}), using {}",
                    raw,
                    e,
                    DEFAULT_CONTRACT_ADDRESS
                );
                DEFAULT_CONTRACT_ADDRESS
            }),
            Err(_) => DEFAULT_CONTRACT_ADDRESS,
        };
        log::info!("📒 Ledger contract: {}", contract_address);

        let gif_api_key = env::var("GIPHY_API_KEY").unwrap_or_default();
        if gif_api_key.is_empty() {
            log::warn!("⚠️  GIPHY_API_KEY not set, GIF lookups will use the fallback image");
        }
        let gif_search_url =
            env::var("GIPHY_SEARCH_URL").unwrap_or_else(|_| defaults.gif_search_url.clone());

        let storage_path = env::var("STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_path);
        log::info!("💾 Storage path: {}", storage_path.display());

        let mut confirmation = defaults.confirmation;
        if let Some(ms) = parse_var::<u64>("CONFIRMATION_POLL_MS") {
            confirmation.poll_interval = Duration::from_millis(ms);
        }
        if let Some(attempts) = parse_var::<u32>("CONFIRMATION_MAX_ATTEMPTS") {
            confirmation.max_attempts = Some(attempts);
        }

        Self {
            wallet_rpc_url,
            contract_address,
            gif_api_key,
            gif_search_url,
            storage_path,
            confirmation,
        }
    }
}

impl Default for WalletConfig {
    /// Local development: no wallet, default contract, fallback GIFs
    fn default() -> Self {
        Self {
            wallet_rpc_url: None,
            contract_address: DEFAULT_CONTRACT_ADDRESS,
            gif_api_key: String::new(),
            gif_search_url: DEFAULT_GIF_SEARCH_URL.to_string(),
            storage_path: PathBuf::from("./.ledger"),
            confirmation: ConfirmationPolicy::default(),
        }
    }
}

/// Settings for the `deploy` binary
#[derive(Clone, Debug)]
pub struct DeployConfig {
    pub rpc_url: String,
    pub private_key: String,
    pub artifact_path: PathBuf,
}

impl DeployConfig {
    /// Environment variables:
    /// - `PRIVATE_KEY`: hex deployer key (required)
    /// - `DEPLOY_RPC_URL`: node endpoint, or
    /// - `INFURA_API_KEY`: key for the hosted Sepolia endpoint
    /// - `CONTRACT_ARTIFACT`: artifact JSON path
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let private_key =
            env::var("PRIVATE_KEY").context("PRIVATE_KEY environment variable not set")?;

        let rpc_url = match (env::var("DEPLOY_RPC_URL"), env::var("INFURA_API_KEY")) {
            (Ok(url), _) if !url.is_empty() => url,
            (_, Ok(key)) if !key.is_empty() => sepolia_url(&key),
            _ => bail!("Set DEPLOY_RPC_URL or INFURA_API_KEY"),
        };

        let artifact_path = env::var("CONTRACT_ARTIFACT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_ARTIFACT_PATH));

        Ok(Self {
            rpc_url,
            private_key,
            artifact_path,
        })
    }
}

/// Hosted Sepolia endpoint for an API key
pub fn sepolia_url(api_key: &str) -> String {
    format!("https://eth-sepolia.g.alchemy.com/v2/{}", api_key)
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("⚠️  Ignoring invalid {}: '{}'", name, raw);
            None
        }
    }
}
