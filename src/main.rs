use alloy_primitives::{utils::parse_ether, Address};
use alloy_provider::{Provider, ProviderBuilder};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::io::Read;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use intellivault_agent::config::{ChainArgs, EngineArgs};
use intellivault_agent::intent_types::parse_amount_wei;
use intellivault_agent::{AlloyChainClient, EngineConfig, Intent, IntentBatchProcessor};

#[derive(Parser)]
#[command(name = "intellivault-agent")]
#[command(about = "IntelliVault relay agent - executes stake/transfer intents against the staking contract")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a batch of intents and print the summary
    Execute {
        #[command(flatten)]
        chain: ChainArgs,

        #[command(flatten)]
        engine: EngineArgs,

        /// Path to a JSON file with the intents, or "-" for stdin
        #[arg(long, default_value = "-")]
        intents: String,
    },

    /// Show current gas price and the fee of a small native transfer
    GasEstimate {
        #[command(flatten)]
        chain: ChainArgs,
    },

    /// Send native BDAG from the agent wallet back to a recipient
    Refund {
        #[command(flatten)]
        chain: ChainArgs,

        /// Recipient address
        #[arg(long)]
        recipient: String,

        /// Amount in BDAG
        #[arg(long)]
        amount: String,
    },

    /// Check the chain RPC connection
    TestRpc {
        /// Chain JSON-RPC URL
        #[arg(long, env = "RPC_URL", default_value = "http://127.0.0.1:8545")]
        rpc_url: String,
    },
}

/// Accepts `{"intents": [...]}` as well as a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum BatchRequest {
    Wrapped { intents: Vec<Intent> },
    Bare(Vec<Intent>),
}

impl BatchRequest {
    fn into_intents(self) -> Vec<Intent> {
        match self {
            BatchRequest::Wrapped { intents } => intents,
            BatchRequest::Bare(intents) => intents,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match &cli.command {
        Commands::Execute {
            chain,
            engine,
            intents,
        } => {
            let intents = read_intents(intents)?;
            let client = connect(chain, true).await?;
            let processor = IntentBatchProcessor::new(Arc::new(client), &EngineConfig::from(engine));

            let summary = processor.process(&intents).await;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Commands::GasEstimate { chain } => {
            let client = connect(chain, false).await?;
            let estimate = client
                .native_transfer_fee_estimate(parse_ether("0.01")?)
                .await?;
            println!("{}", serde_json::to_string_pretty(&estimate)?);
        }

        Commands::Refund {
            chain,
            recipient,
            amount,
        } => {
            let to: Address = recipient
                .parse()
                .map_err(|e| anyhow!("Invalid recipient address: {}", e))?;
            let value = parse_amount_wei(&amount)?;

            let client = connect(chain, false).await?;
            match client.send_native(to, value).await {
                Ok(tx_hash) => {
                    info!("✅ Refund confirmed: 0x{:x}", tx_hash);
                    println!(
                        "{}",
                        serde_json::json!({"status": "success", "txHash": format!("0x{:x}", tx_hash)})
                    );
                }
                Err(e) => {
                    error!("❌ Refund failed: {}", e);
                    println!(
                        "{}",
                        serde_json::json!({"status": "fail", "message": e.to_string()})
                    );
                    std::process::exit(1);
                }
            }
        }

        Commands::TestRpc { rpc_url } => {
            let url: url::Url = rpc_url
                .parse()
                .map_err(|e| anyhow!("Invalid URL: {}", e))?;
            let provider = ProviderBuilder::new().connect_http(url);
            match provider.get_block_number().await {
                Ok(block_number) => {
                    info!("✅ RPC connection successful! Latest block: {}", block_number);
                }
                Err(e) => {
                    error!("❌ RPC connection failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(json_logs: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "intellivault_agent=info".into());

    // stdout carries the command output, so logs go to stderr
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn connect(chain: &ChainArgs, needs_contract: bool) -> Result<AlloyChainClient> {
    let contract = if needs_contract {
        chain.require_contract()?
    } else {
        chain.contract()?
    };

    let client = AlloyChainClient::connect(
        &chain.rpc_url,
        chain.signer()?,
        contract,
        chain.receipt_poll_interval(),
    )
    .await?;
    Ok(client)
}

/// Read the batch from a file or stdin.
fn read_intents(source: &str) -> Result<Vec<Intent>> {
    let raw = if source == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(source)
            .map_err(|e| anyhow!("Failed to read intents file {}: {}", source, e))?
    };

    let request: BatchRequest =
        serde_json::from_str(&raw).map_err(|e| anyhow!("Invalid intents JSON: {}", e))?;
    let intents = request.into_intents();
    info!("📥 Received {} intents", intents.len());
    Ok(intents)
}
