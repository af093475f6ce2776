use clap::Parser;

mod cli;

use cli::{Cli, execute_command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    filehash::init_tracing(if cli.verbose { "debug" } else { "warn" });

    execute_command(&cli).await?;

    Ok(())
}
