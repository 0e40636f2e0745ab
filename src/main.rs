use anyhow::Result;
use clap::Parser;
use neobanco::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    neobanco::logging::init_tracing(cli.verbose);
    cli.run().await
}
