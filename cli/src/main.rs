use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use filehash::storage::retry::{with_retry_if, RetryConfig};
use filehash::DigestEngine;
use reqwest::{Client, Method, Response, Url};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "filehash-cli")]
#[command(about = "Client for the file hash registry", long_about = None)]
pub struct Cli {
    #[arg(short, long, env = "FILEHASH_SERVER", default_value = "http://127.0.0.1:8000")]
    server_address: String,

    /// Attempts per request before giving up on an unreachable server
    #[arg(long, default_value_t = 3)]
    retries: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a file to the registry
    Upload {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Check a local file's digest against the registry copy of the same name
    Verify {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List indexed files
    List,

    /// Show one entry
    Get {
        #[arg(long)]
        hash: String,
    },

    /// Remove an entry from the registry
    Delete {
        #[arg(long)]
        hash: String,
    },

    /// Recompute ACTIVE/STALE status now
    Refresh,
}

struct RegistryClient {
    client: Client,
    base: Url,
    retry: RetryConfig,
}

impl RegistryClient {
    fn new(server_address: &str, retries: u32) -> anyhow::Result<Self> {
        let base = Url::parse(server_address).with_context(|| format!("invalid server address {}", server_address))?;
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            base,
            retry: RetryConfig::new(retries, Duration::from_millis(500)),
        })
    }

    fn url(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("server address cannot take a path: {}", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> anyhow::Result<String> {
        let retry_timeouts = retries_timeouts(&method);
        let response = with_retry_if(
            &self.retry,
            || {
                let mut request = self.client.request(method.clone(), url.clone());
                if let Some(body) = &body {
                    request = request.body(body.clone());
                }
                request.send()
            },
            |e: &reqwest::Error| e.is_connect() || (retry_timeouts && e.is_timeout()),
        )
        .await?;

        read_body(response).await
    }

    async fn upload_file(&self, file_path: &Path) -> anyhow::Result<String> {
        let file_name = file_name_of(file_path)?;
        let data = tokio::fs::read(file_path)
            .await
            .with_context(|| format!("cannot read {}", file_path.display()))?;

        let url = self.url(&["upload", file_name])?;
        self.send(Method::POST, url, Some(data)).await
    }

    async fn verify_file(&self, file_path: &Path) -> anyhow::Result<String> {
        let file_name = file_name_of(file_path)?;
        let data = tokio::fs::read(file_path)
            .await
            .with_context(|| format!("cannot read {}", file_path.display()))?;
        let file_hash = DigestEngine::digest_bytes(&data);

        let url = self.url(&["upload", "file", &file_hash, file_name])?;
        self.send(Method::POST, url, None).await
    }
}

/// A timed out POST may already have been applied by the server, so only
/// idempotent requests are resent after a timeout.
fn retries_timeouts(method: &Method) -> bool {
    method.is_idempotent()
}

fn file_name_of(file_path: &Path) -> anyhow::Result<&str> {
    file_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("invalid filename: {}", file_path.display()))
}

async fn read_body(response: Response) -> anyhow::Result<String> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        bail!("{}: {}", status, text);
    }

    // Pretty-print JSON bodies, pass anything else through.
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) => Ok(serde_json::to_string_pretty(&value)?),
        Err(_) => Ok(text),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    filehash::init_tracing("warn");

    let cli = Cli::parse();
    let registry = RegistryClient::new(&cli.server_address, cli.retries)?;

    let result = match cli.command {
        Commands::Upload { file } => registry.upload_file(&file).await?,
        Commands::Verify { file } => registry.verify_file(&file).await?,
        Commands::List => registry.send(Method::GET, registry.url(&["files"])?, None).await?,
        Commands::Get { hash } => registry.send(Method::GET, registry.url(&["files", &hash])?, None).await?,
        Commands::Delete { hash } => registry.send(Method::DELETE, registry.url(&["files", &hash])?, None).await?,
        Commands::Refresh => registry.send(Method::POST, registry.url(&["files", "refresh"])?, None).await?,
    };
    println!("{}", result);

    Ok(())
}
