use clap::Parser;

mod cli;
mod commands;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockroom_observability::init();
    let cli = cli::Cli::parse();
    commands::run(cli).await
}
