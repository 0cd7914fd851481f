use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "homescout")]
#[command(about = "Conversational real-estate assistant", long_about = None)]
pub struct Cli {
    /// TOML configuration file (defaults to ./homescout.toml when present)
    #[arg(long, global = true, env = "HOMESCOUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run without Azure OpenAI: local embeddings, keyword routing, no translation
    #[arg(
        long,
        global = true,
        env = "HOMESCOUT_OFFLINE",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub offline: bool,

    /// Listing JSON loaded at startup
    #[arg(long, global = true, env = "HOMESCOUT_LISTINGS")]
    pub listings: Option<PathBuf>,

    /// Role invocations allowed per turn
    #[arg(long, global = true, env = "HOMESCOUT_MAX_HOPS")]
    pub max_hops: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Interactive console (default if no command specified)
    Chat,

    /// Scrape listing pages into a JSON file
    Ingest {
        /// File with one listing URL per line
        #[arg(long, default_value = "input-urls.txt")]
        urls: PathBuf,

        /// Where to write the scraped listings
        #[arg(long, default_value = "property_listings.json")]
        output: PathBuf,

        /// WebDriver server URL
        #[arg(long)]
        webdriver_url: Option<String>,

        /// Seconds to wait between pages
        #[arg(long)]
        delay_secs: Option<u64>,

        /// Show the browser window
        #[arg(long)]
        headful: bool,
    },
}
