use anyhow::{Result, anyhow};
use clap::Parser;
use homescout_cli::{Cli, Commands, Config, build_router, run_console, run_ingest};

#[tokio::main]
async fn main() -> Result<()> {
    homescout_telemetry::init_telemetry("homescout").map_err(|e| anyhow!("{e}"))?;

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env(|key| std::env::var(key).ok());
    config.apply_cli(&cli);

    match &cli.command {
        None | Some(Commands::Chat) => {
            let router = build_router(&config).await?;
            run_console(&router).await
        }
        Some(Commands::Ingest { urls, output, .. }) => {
            let count = run_ingest(&config, urls, output).await?;
            println!("Wrote {count} listings to {}", output.display());
            Ok(())
        }
    }
}
