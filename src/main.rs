use std::path::PathBuf;
use std::time::Duration;

use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use eyre::{eyre, WrapErr};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sbt_mint_flow::config::AppConfig;
use sbt_mint_flow::manifest;
use sbt_mint_flow::rpc_bridge::RpcWalletBridge;
use sbt_mint_flow::{
    host_page_props, resolve_target_chain, MintCallbacks, MintFlow, MintStep, SdkHandle, CHAINS,
};

// 连接、切换、铸造最多需要的轮数
const MAX_ROUNDS: usize = 4;

#[derive(Parser)]
#[command(author, version, about = "Soulbound token mint flow for mini-app hosts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the mini-app manifest at /.well-known/farcaster.json
    Serve,
    /// Connect the custodial wallet and mint a soulbound token
    Mint {
        #[arg(long, env = "RPC_URL")]
        rpc_url: String,
        #[arg(long, env = "PRIV_KEY_PATH")]
        priv_key_path: PathBuf,
        /// Defaults to the placeholder zero address used by the host page
        #[arg(long, env = "SBT_CONTRACT_ADDRESS")]
        contract: Option<String>,
        #[arg(long, env = "SBT_NETWORK", default_value = "base")]
        network: String,
        #[arg(long, env = "RECEIPT_POLL_MS", default_value_t = 2000)]
        poll_ms: u64,
    },
    /// List recognized network names
    Chains,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve => serve().await?,
        Commands::Mint {
            rpc_url,
            priv_key_path,
            contract,
            network,
            poll_ms,
        } => mint(rpc_url, priv_key_path, contract, network, poll_ms).await?,
        Commands::Chains => list_chains(),
    }
    Ok(())
}

async fn serve() -> eyre::Result<()> {
    let config = AppConfig::from_env()?;
    let app = manifest::router(&config);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .wrap_err_with(|| format!("cannot bind {}", config.bind))?;
    info!(addr = %config.bind, url = %config.app_url, "serving mini-app manifest");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn mint(
    rpc_url: String,
    priv_key_path: PathBuf,
    contract: Option<String>,
    network: String,
    poll_ms: u64,
) -> eyre::Result<()> {
    let mut props = host_page_props().network(network);
    if let Some(contract) = contract {
        props.contract_address = contract
            .parse::<Address>()
            .map_err(|err| eyre!("invalid contract address {contract}: {err}"))?;
    }

    // 默认在目标链上连接
    let target = resolve_target_chain(&props.network);
    let bridge = RpcWalletBridge::new(priv_key_path, target.id, rpc_url)
        .poll_interval(Duration::from_millis(poll_ms));
    let callbacks = MintCallbacks::new()
        .on_mint_success(|hash| info!(tx = %hash, "SBT minted successfully"))
        .on_mint_error(|message| error!(%message, "SBT mint failed"));
    let mut flow = MintFlow::new(props, bridge, SdkHandle::new(true), callbacks);

    flow.initiate()?;
    for _ in 0..MAX_ROUNDS {
        let step = flow.settle().await;
        info!(%step, title = flow.view().title, "sheet updated");
        match step {
            MintStep::Success => return Ok(()),
            MintStep::Error => {
                let message = flow.error().unwrap_or("mint failed").to_string();
                return Err(eyre!(message));
            }
            MintStep::Idle => {
                if let Some(err) = flow.last_switch_failure() {
                    return Err(eyre!("network switch failed: {err}"));
                }
                // 依次完成连接、切换网络、铸造
                flow.submit()?;
            }
            other => return Err(eyre!("mint flow stopped at unexpected step {other}")),
        }
    }
    Err(eyre!("mint flow did not finish after {MAX_ROUNDS} rounds"))
}

fn list_chains() {
    for chain in CHAINS {
        let aliases = chain.aliases.join(", ");
        println!("{:>10}  {:<16} {:<14} {}", chain.id, chain.name, chain.slug, aliases);
    }
}
