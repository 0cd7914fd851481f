//! # homescout-cli
//!
//! The `homescout` command.
//!
//! - `homescout` / `homescout chat` - interactive console over the listing store
//! - `homescout ingest` - scrape listing pages into `property_listings.json`
//!
//! Settings come from `homescout.toml`, then `AZURE_OPENAI_*` variables, then
//! flags. `--offline` runs with local embeddings and keyword routing.

pub mod app;
pub mod cli;
pub mod config;
pub mod console;

pub use app::{build_router, embedding_provider, run_ingest};
pub use cli::{Cli, Commands};
pub use config::Config;
pub use console::{TurnPrinter, run_console};
