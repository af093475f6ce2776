use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use filehash::config::DEFAULT_FILES_PATH;
use filehash::storage::disk::DiskStore;
use filehash::{DigestEngine, Entry, HashIndex, IndexConfig, Journal};

#[derive(Parser)]
#[command(name = "filehash")]
#[command(about = "Hash and index files in a storage directory", long_about = None)]
pub struct Cli {
    /// Directory file names are resolved against
    #[arg(short, long, env = "FILEHASH_FILES_PATH", default_value = DEFAULT_FILES_PATH)]
    pub files_path: PathBuf,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the digest and size of stored files
    Hash {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Index every file in the storage directory and print the entries as JSON
    Scan {
        /// Age in seconds after which entries are reported STALE
        #[arg(long, default_value_t = filehash::config::DEFAULT_STALE_AFTER_SECS)]
        stale_after_secs: u64,
    },
}

pub async fn execute_command(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Hash { names } => hash_files(&cli.files_path, names).await,
        Commands::Scan { stale_after_secs } => scan(&cli.files_path, *stale_after_secs).await,
    }
}

async fn hash_files(files_path: &Path, names: &[String]) -> anyhow::Result<()> {
    let engine = DigestEngine::new(files_path.to_path_buf(), Journal::new(names.len()));
    let mut failed = 0;

    for name in names {
        match engine.try_digest(name).await {
            Ok((file_hash, file_bytes)) => println!("{}  {:>10}  {}", file_hash, file_bytes, name),
            Err(e) => {
                eprintln!("{}: {}", name, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} files could not be hashed", failed, names.len());
    }
    Ok(())
}

async fn scan(files_path: &Path, stale_after_secs: u64) -> anyhow::Result<()> {
    if !files_path.is_dir() {
        bail!("{} is not a directory", files_path.display());
    }

    let store = DiskStore::new(files_path).await?;
    let index = HashIndex::with_config(IndexConfig {
        files_path: files_path.to_path_buf(),
        stale_after_secs,
        ..IndexConfig::default()
    });

    for name in store.list_files().await? {
        let entry = index.hash(Entry::new(name)).await;
        index.add(entry).await;
    }
    index.refresh().await;

    let entries = index.entries().await;
    let json = serde_json::to_string_pretty(&entries).context("failed to encode entries")?;
    println!("{}", json);
    Ok(())
}
