//! Deploy the ledger contract and print its address
//!
//! ```bash
//! PRIVATE_KEY=... INFURA_API_KEY=... cargo run --bin deploy
//! ```
//!
//! The wallet sends the transfer value with the `addToBlockchain` call, so
//! the artifact must come from a `Transactions` contract whose
//! `addToBlockchain` is `payable`. A build of the older non-payable contract
//! reverts every transfer and is refused here; rebuild it (`npx hardhat
//! compile`) after making the function payable.

use anyhow::Context;
use ledger_wallet::DeployConfig;
use transfer_ledger::{ContractArtifact, Deployer, Deployment, HttpProvider, LocalSigner};

/// Ledger call that carries the transfer value
const PAYABLE_ENTRY_POINT: &str = "addToBlockchain";

async fn run() -> anyhow::Result<Deployment> {
    let config = DeployConfig::from_env()?;

    let artifact = ContractArtifact::load(&config.artifact_path)
        .context("Failed to load contract artifact")?;
    anyhow::ensure!(
        artifact.is_payable(PAYABLE_ENTRY_POINT),
        "{} in {} is not payable; rebuild the contract artifact",
        PAYABLE_ENTRY_POINT,
        config.artifact_path.display()
    );
    let signer = LocalSigner::from_hex(&config.private_key).context("Invalid PRIVATE_KEY")?;
    log::info!("Deploying {} from {}", artifact.contract_name, signer.address());

    let deployer = Deployer::new(HttpProvider::new(config.rpc_url), signer);
    deployer.deploy(&artifact).await.context("Deployment failed")
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run().await {
        Ok(deployment) => {
            println!("Transaction deployed to: {}", deployment.address);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    }
}
