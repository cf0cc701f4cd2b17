//! HFED CLI - Command line tool for Canadian high-frequency electricity data.

use clap::Parser;
use log::debug;

#[derive(Parser)]
#[command(
    name = "hfed-cli",
    version,
    about = "Canadian high-frequency electricity data toolkit"
)]
struct Cli {
    #[command(flatten)]
    config: hfed_cmd::Config,

    #[command(subcommand)]
    command: hfed_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    debug!("{:?}", cli.config);
    hfed_cmd::run(cli.config, cli.command).await
}
