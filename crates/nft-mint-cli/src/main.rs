mod config;
mod rpc;

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use nft_mint::{bytes_to_address, mint_nft, Keypair};
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::MintConfig;
use crate::rpc::RpcLedger;

#[derive(Parser, Debug)]
#[command(name = "nft-mint", version, about = "Mint a single-edition NFT on Solana")]
struct Cli {
    /// Mint configuration (JSON)
    #[arg(short, long, default_value = "mint.json")]
    config: PathBuf,

    /// JSON-RPC endpoint, overrides the config file
    #[arg(short = 'u', long)]
    rpc_url: Option<String>,

    /// Creator keypair file, overrides the config file
    #[arg(short, long)]
    keypair: Option<PathBuf>,

    /// Recipient wallet address, overrides the config file
    #[arg(short, long)]
    recipient: Option<String>,

    /// Log filter: trace, debug, info, warn, error, or an EnvFilter directive
    #[arg(short, long)]
    log_level: Option<String>,
}

fn setup_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::from_str(level).map_err(|_| {
            anyhow!(
                "Invalid log level: {level:?}. Valid levels are: trace, debug, info, warn, error."
            )
        })?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("install tracing subscriber")?;
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level.as_deref())?;

    let mut config = MintConfig::load(&cli.config)?;
    if let Some(url) = cli.rpc_url {
        config.rpc_url = url;
    }
    if let Some(path) = cli.keypair {
        config.keypair = Some(path);
    }
    if let Some(recipient) = cli.recipient {
        config.recipient = recipient;
    }

    let creator = match &config.keypair {
        Some(path) => Keypair::read_from_file(path)
            .with_context(|| format!("load keypair {}", path.display()))?,
        None => {
            let keypair = Keypair::generate();
            warn!(
                creator = %bytes_to_address(&keypair.pubkey()),
                "no keypair configured, generated a fresh one; it must be funded to pay fees"
            );
            keypair
        }
    };

    let recipient = config.recipient()?;
    let programs = config.program_ids()?;
    let request = config.mint_request(&creator.pubkey())?;

    info!(rpc_url = %config.rpc_url, commitment = %config.commitment, "connecting");
    let ledger = RpcLedger::new(config.rpc_url.clone(), config.commitment.clone())?;

    let outcome = mint_nft(&ledger, &creator, &recipient, request, &programs)
        .await
        .context("mint failed")?;

    println!("signature:          {}", outcome.signature);
    println!("mint:               {}", bytes_to_address(&outcome.mint));
    println!("token account:      {}", bytes_to_address(&outcome.associated_account));
    println!("metadata:           {}", bytes_to_address(&outcome.metadata));
    println!("master edition:     {}", bytes_to_address(&outcome.master_edition));
    Ok(())
}
