//! `barrister` command line tool
//!
//! Inspects IDL files and talks to running Barrister services.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use barrister_client::{Client, ClientConfig, ClientError};
use barrister_idl::Contract;
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, info};

mod summary;

#[derive(Parser)]
#[command(name = "barrister")]
#[command(about = "Inspect Barrister IDL files and call Barrister services")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize an IDL JSON file and report unknown types
    Inspect {
        /// Path to the IDL JSON file
        file: PathBuf,
    },
    /// Fetch and summarize the contract of a running server
    Contract(RemoteArgs),
    /// Call a method on a running server
    Call {
        #[command(flatten)]
        remote: RemoteArgs,

        /// Qualified method name, e.g. `B.echo`
        method: String,

        /// Parameters as JSON; an array is passed positionally, anything
        /// else as the single parameter
        params: Option<String>,
    },
}

#[derive(Args)]
struct RemoteArgs {
    /// Server endpoint
    #[arg(long, default_value = "http://127.0.0.1:8000/rpc")]
    url: String,

    /// Request timeout in milliseconds
    #[arg(long, default_value = "30000")]
    timeout_ms: u64,

    /// Escape non-ASCII characters in requests
    #[arg(long)]
    force_ascii: bool,
}

impl RemoteArgs {
    fn client(&self) -> Result<Client> {
        let config = ClientConfig {
            timeout: Duration::from_millis(self.timeout_ms),
            force_ascii: self.force_ascii,
            ..ClientConfig::default()
        };
        Client::http_with_config(&self.url, &config)
            .with_context(|| format!("Failed to create client for {}", self.url))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { file } => inspect(&file),
        Commands::Contract(remote) => fetch_contract(&remote).await,
        Commands::Call {
            remote,
            method,
            params,
        } => call(&remote, &method, params.as_deref()).await,
    }
}

fn inspect(file: &Path) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let contract =
        Contract::parse(&bytes).with_context(|| format!("Failed to parse {}", file.display()))?;
    debug!("Parsed {} elements", contract.elements().len());

    print!("{}", summary::render(&contract));

    let unresolved = contract.unresolved_types();
    if !unresolved.is_empty() {
        eprint!("{}", summary::render_unresolved(&unresolved));
        bail!("{} has {} unknown type reference(s)", file.display(), unresolved.len());
    }
    Ok(())
}

async fn fetch_contract(remote: &RemoteArgs) -> Result<()> {
    info!("Fetching contract from {}", remote.url);
    let contract = remote
        .client()?
        .fetch_contract()
        .await
        .with_context(|| format!("Failed to fetch contract from {}", remote.url))?;

    print!("{}", summary::render(&contract));
    Ok(())
}

async fn call(remote: &RemoteArgs, method: &str, params: Option<&str>) -> Result<()> {
    let params = parse_params(params)?;
    debug!(method, count = params.len(), "Calling");

    match remote.client()?.call(method, params).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(ClientError::Rpc(err)) => {
            if let Some(data) = &err.data {
                eprintln!("{}", serde_json::to_string_pretty(data)?);
            }
            bail!("{}", err)
        }
        Err(err) => Err(err.into()),
    }
}

fn parse_params(params: Option<&str>) -> Result<Vec<Value>> {
    let Some(text) = params else {
        return Ok(Vec::new());
    };
    match serde_json::from_str::<Value>(text).context("Parameters are not valid JSON")? {
        Value::Array(items) => Ok(items),
        single => Ok(vec![single]),
    }
}
