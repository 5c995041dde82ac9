// src/main.rs - point-deploy: deploy and wire the Point token on a Klaytn node

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use point_token::config::{DEFAULT_ACCOUNT_INFO, DEFAULT_BUILD_DIR, DEFAULT_OUTPUT, DEFAULT_RPC_URL};
use point_token::{
    deploy_point_token, verify_deployment, AccountInfo, ArtifactStore, DeployConfig, Keyring,
    KlaytnRpc, Result,
};

#[derive(Parser)]
#[command(name = "point-deploy")]
#[command(about = "Deploy the Point KIP-7 token (proxy, storages, logic) and record its addresses")]
#[command(version)]
struct Cli {
    /// Operator private key, hex with or without 0x
    #[arg(env = "POINT_PRIVATE_KEY", hide_env_values = true)]
    private_key: String,

    /// Klaytn JSON-RPC endpoint
    #[arg(long, env = "POINT_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// Directory holding the compiled contract artifacts
    #[arg(long, env = "POINT_BUILD_DIR", default_value = DEFAULT_BUILD_DIR)]
    build_dir: PathBuf,

    /// JSON file with the Minter and Burner addresses
    #[arg(long, env = "POINT_ACCOUNT_INFO", default_value = DEFAULT_ACCOUNT_INFO)]
    account_info: PathBuf,

    /// Where the deployed addresses are written
    #[arg(short, long, env = "POINT_OUTPUT", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Read the wiring back from the chain before writing the output
    #[arg(long)]
    verify: bool,
}

impl Cli {
    fn into_config(self) -> (String, bool, DeployConfig) {
        let config = DeployConfig {
            rpc_url: self.rpc_url,
            build_dir: self.build_dir,
            account_info: self.account_info,
            output: self.output,
            ..DeployConfig::default()
        };
        (self.private_key, self.verify, config)
    }
}

async fn run(private_key: &str, verify: bool, config: &DeployConfig) -> Result<()> {
    let accounts = AccountInfo::load(&config.account_info)?;
    let keyring = Keyring::from_private_key(private_key)?;
    let operator = keyring.address();
    let chain = KlaytnRpc::new(&config.rpc_url, keyring, config.rpc.clone())?;
    let artifacts = ArtifactStore::new(&config.build_dir);

    info!(
        %operator,
        rpc = %config.rpc_url,
        minter = %accounts.minter,
        burner = %accounts.burner,
        "starting Point token deployment"
    );

    let deployed = deploy_point_token(&chain, &artifacts, operator, &accounts, config).await?;
    if verify {
        verify_deployment(&chain, &deployed, operator, &accounts, config).await?;
    }
    deployed.write(&config.output)?;

    info!(
        proxy = %deployed.proxy,
        primary_storage = %deployed.primary_storage,
        kip7_logic = %deployed.kip7_logic,
        kip7_storage = %deployed.kip7_storage,
        "deployment complete"
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {e}");
    }

    let (private_key, verify, config) = Cli::parse().into_config();
    if let Err(e) = run(&private_key, verify, &config).await {
        error!(error = %e, "deployment failed");
        std::process::exit(e.exit_code());
    }
}
