//! Deployment network resolver CLI.
//!
//! ```text
//! networks.toml ──▶ NetworkRegistry ──select──▶ ProviderFactory ──build──▶ provider summary
//!                                                      ▲
//!                                      wallet.json ────┘ (derived-key networks only)
//!
//! --discover-accounts ──▶ custodial service (own task, logged, never blocks)
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use deploy_resolver::config::{load_config, DeployConfig};
use deploy_resolver::credentials::{source_for_profile, CredentialSource, MnemonicFileSource};
use deploy_resolver::deployment::Deployment;
use deploy_resolver::discovery::{join_discovery, AccountDiscovery, DISCOVERY_JOIN_WAIT};
use deploy_resolver::network::NetworkRegistry;
use deploy_resolver::observability::init_logging;
use deploy_resolver::provider::NetworkProvider;

#[derive(Parser)]
#[command(name = "deploy-resolver")]
#[command(about = "Resolve deployment networks to signing providers", long_about = None)]
struct Cli {
    /// Registry document.
    #[arg(short, long, default_value = "networks.toml")]
    config: PathBuf,

    /// Log level override (else RUST_LOG, else the config).
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured networks in order
    List,
    /// Build the provider for one network
    Resolve {
        network: String,

        /// Mnemonic file to use instead of the configured one
        #[arg(long)]
        wallet_file: Option<PathBuf>,

        /// Query the node for its chain id and accounts
        #[arg(long)]
        check: bool,

        /// Also list custodial accounts in the background
        #[arg(long)]
        discover_accounts: bool,
    },
    /// List custodial accounts
    Discover,
}

#[derive(Serialize)]
struct NetworkSummary<'a> {
    name: &'a str,
    kind: String,
    transport: Option<String>,
    network_id: String,
    gas_price: Option<u128>,
}

#[derive(Serialize)]
struct ProviderSummary<'a> {
    network: &'a str,
    kind: String,
    endpoint: &'a str,
    network_id: String,
    gas_price: Option<u128>,
    signers: Vec<String>,
    compiler: Option<&'a str>,
}

impl<'a> ProviderSummary<'a> {
    fn new(provider: &'a NetworkProvider, config: &'a DeployConfig) -> Self {
        Self {
            network: provider.network(),
            kind: provider.kind().to_string(),
            endpoint: provider.endpoint().as_str(),
            network_id: provider.chain().to_string(),
            gas_price: provider.gas_price(),
            signers: provider
                .signer_addresses()
                .iter()
                .map(ToString::to_string)
                .collect(),
            compiler: config.compiler_version(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.observability.log_level.clone());
    init_logging(&level)?;

    tracing::info!(
        config = %cli.config.display(),
        networks = config.networks.len(),
        solc = config.compiler_version().unwrap_or("unpinned"),
        "deploy-resolver v0.1.0 starting"
    );

    let registry = NetworkRegistry::from_config(&config)?;

    match cli.command {
        Commands::List => {
            let networks: Vec<_> = registry
                .iter()
                .map(|profile| NetworkSummary {
                    name: profile.name(),
                    kind: profile.kind().to_string(),
                    transport: profile.transport().map(ToString::to_string),
                    network_id: profile.chain().to_string(),
                    gas_price: profile.gas_price(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&networks)?);
        }
        Commands::Resolve {
            network,
            wallet_file,
            check,
            discover_accounts,
        } => {
            let discovery = (discover_accounts || config.custodial.enabled)
                .then(|| AccountDiscovery::from_config(&config.custodial).spawn());

            let mut run = Deployment::new(&registry);
            let profile = run.select(&network)?;
            let source: Box<dyn CredentialSource> = match wallet_file {
                Some(path) => {
                    let source = MnemonicFileSource::new(path);
                    tracing::info!(wallet_file = %source.path().display(), "Using wallet file override");
                    Box::new(source)
                }
                None => source_for_profile(profile),
            };
            let provider = run.build(source.as_ref())?;

            println!(
                "{}",
                serde_json::to_string_pretty(&ProviderSummary::new(provider, &config))?
            );

            if check {
                let chain_id = provider.verify_chain_id().await?;
                let accounts = provider.accounts().await?;
                tracing::info!(
                    network = provider.network(),
                    chain_id,
                    accounts = ?accounts,
                    "Node check passed"
                );
            }

            if let Some(handle) = discovery {
                join_discovery(handle, DISCOVERY_JOIN_WAIT).await;
            }
        }
        Commands::Discover => {
            let outcome = AccountDiscovery::from_config(&config.custodial).run().await;
            if let Some(accounts) = outcome.accounts() {
                println!("{}", serde_json::to_string_pretty(accounts)?);
            }
        }
    }

    Ok(())
}
