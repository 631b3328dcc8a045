//! Bitcoin Test Agent CLI
//!
//! Runs the HTTP service, or performs a single agent, trade or tool action
//! from the command line.

use bitcoin_test_agent::api::{self, AppState};
use bitcoin_test_agent::llm::OpenAiGateway;
use bitcoin_test_agent::memory::MemoryStore;
use bitcoin_test_agent::trading::{self, Side};
use bitcoin_test_agent::{
    AgentRunner, Error, PolicyEngine, Result, Settings, ToolExecutor, TradeIntent, TradingEngine,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "btc-agent")]
#[command(about = "Policy-gated agent: LLM planning, workspace tools, paper trade evaluation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Address to bind the server to
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,

        /// Port to listen on
        #[arg(long, default_value = "8000")]
        port: u16,
    },

    /// Run one plan/review cycle for an objective
    Run {
        /// What the agent should accomplish
        objective: String,
    },

    /// Evaluate a trade intent against the loss limit
    Trade {
        /// Order side (buy, sell)
        #[arg(long, value_parser = parse_side)]
        side: Side,

        /// Quantity in BTC
        #[arg(long)]
        quantity_btc: f64,

        /// Limit price in USD
        #[arg(long)]
        price_usd: f64,

        /// Risk the trade carries in USD
        #[arg(long)]
        risk_usd: f64,
    },

    /// Run an allowlisted shell command in the workspace
    Shell {
        /// Command line, passed to `sh -c`
        command: String,

        /// Wall-clock limit in seconds
        #[arg(long, default_value = "60")]
        timeout_secs: u64,
    },

    /// Read a file relative to the workspace root
    Read {
        path: String,
    },

    /// Write a file relative to the workspace root
    Write {
        path: String,
        content: String,
    },

    /// Show current configuration (credential masked)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json);

    let settings = Settings::from_env()?;

    match cli.command {
        Commands::Serve { bind, port } => {
            let addr: SocketAddr = format!("{}:{}", bind, port)
                .parse()
                .map_err(|e| Error::Config(format!("invalid bind address: {}", e)))?;
            let listener = tokio::net::TcpListener::bind(addr).await?;
            let state = AppState::from_settings(settings)?;
            api::serve(listener, state).await?;
        }
        Commands::Run { objective } => {
            if !settings.has_api_key() {
                return Err(Error::Config("OPENAI_API_KEY is not configured".to_string()));
            }
            let llm = Arc::new(OpenAiGateway::from_settings(&settings)?);
            let mut runner = AgentRunner::new(llm, MemoryStore::new());
            print_json(&runner.run_once(&objective).await?)?;
        }
        Commands::Trade {
            side,
            quantity_btc,
            price_usd,
            risk_usd,
        } => {
            trading::warn_if_live(&settings.trading);
            let policy = PolicyEngine::new(settings.workspace_root.clone());
            let engine = TradingEngine::new(settings.trading.clone(), policy);
            let intent = TradeIntent {
                side,
                quantity_btc,
                price_usd,
                risk_usd,
            };
            print_json(&engine.evaluate_intent(&intent))?;
        }
        Commands::Shell {
            command,
            timeout_secs,
        } => {
            let executor = ToolExecutor::for_workspace(settings.workspace_root.clone());
            let result = executor
                .run_shell(&command, Duration::from_secs(timeout_secs))
                .await;
            print_json(&result)?;
        }
        Commands::Read { path } => {
            let executor = ToolExecutor::for_workspace(settings.workspace_root.clone());
            print_json(&executor.read_file(&path).await)?;
        }
        Commands::Write { path, content } => {
            let executor = ToolExecutor::for_workspace(settings.workspace_root.clone());
            print_json(&executor.write_file(&path, &content).await)?;
        }
        Commands::Config => {
            print_json(&settings.redacted())?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr so stdout stays clean for JSON results
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn parse_side(value: &str) -> std::result::Result<Side, String> {
    match value.to_ascii_lowercase().as_str() {
        "buy" => Ok(Side::Buy),
        "sell" => Ok(Side::Sell),
        other => Err(format!("unknown side '{}', expected buy or sell", other)),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
