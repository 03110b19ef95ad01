use anyhow::Context;
use clap::Parser;
use weather_dataset_builder::cli::{init_logging, run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_file.as_deref()).context("failed to set up logging")?;

    run(cli).await.context("weather-dataset-builder failed")
}
