//! Layered configuration: TOML file, then environment, then flags.

use crate::cli::{Cli, Commands};
use anyhow::{Context, Result, bail};
use homescout_agent::instructions::DEFAULT_TARGET_LANGUAGE;
use homescout_browser::BrowserConfig;
use homescout_model::AzureConfig;
use homescout_runner::DEFAULT_MAX_HOPS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "homescout.toml";
pub const DEFAULT_LISTINGS_FILE: &str = "property_listings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listings: PathBuf,
    pub offline: bool,
    pub max_hops: usize,
    pub top_k: usize,
    pub translation_language: String,
    pub azure: AzureSettings,
    pub browser: BrowserConfig,
}

/// Azure OpenAI connection settings. Unset values must come from the
/// environment unless running offline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureSettings {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub chat_deployment: Option<String>,
    pub embedding_deployment: Option<String>,
    pub api_version: Option<String>,
    /// Requested vector size for `text-embedding-3-*` deployments. Unset
    /// keeps the deployment's native size.
    pub embedding_dimensions: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listings: PathBuf::from(DEFAULT_LISTINGS_FILE),
            offline: false,
            max_hops: DEFAULT_MAX_HOPS,
            top_k: homescout_rag::DEFAULT_TOP_K,
            translation_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            azure: AzureSettings::default(),
            browser: BrowserConfig::default(),
        }
    }
}

impl Config {
    /// Read `path`, or `./homescout.toml` if it exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Overlay the `AZURE_OPENAI_*` variables. `lookup` is usually
    /// `|key| std::env::var(key).ok()`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let azure = &mut self.azure;
        for (key, slot) in [
            ("AZURE_OPENAI_ENDPOINT", &mut azure.endpoint),
            ("AZURE_OPENAI_API_KEY", &mut azure.api_key),
            ("AZURE_OPENAI_CHAT_DEPLOYMENT", &mut azure.chat_deployment),
            ("AZURE_OPENAI_EMBEDDING_DEPLOYMENT", &mut azure.embedding_deployment),
            ("AZURE_OPENAI_API_VERSION", &mut azure.api_version),
        ] {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *slot = Some(value);
            }
        }
        if let Some(value) = lookup("AZURE_OPENAI_EMBEDDING_DIMENSIONS") {
            match value.trim().parse::<usize>() {
                Ok(dimensions) if dimensions > 0 => azure.embedding_dimensions = Some(dimensions),
                _ if value.trim().is_empty() => {}
                _ => warn!(value = %value, "ignoring invalid AZURE_OPENAI_EMBEDDING_DIMENSIONS"),
            }
        }
    }

    /// Overlay command-line flags, which already include the `HOMESCOUT_*`
    /// variables through clap.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if cli.offline {
            self.offline = true;
        }
        if let Some(listings) = &cli.listings {
            self.listings = listings.clone();
        }
        if let Some(max_hops) = cli.max_hops {
            self.max_hops = max_hops;
        }
        if let Some(Commands::Ingest { webdriver_url, delay_secs, headful, .. }) = &cli.command {
            if let Some(url) = webdriver_url {
                self.browser.webdriver_url = url.clone();
            }
            if let Some(delay) = delay_secs {
                self.browser.page_delay_secs = *delay;
            }
            if *headful {
                self.browser.headless = false;
            }
        }
    }

    pub fn chat_azure(&self) -> Result<AzureConfig> {
        self.azure_config(self.azure.chat_deployment.as_deref(), "AZURE_OPENAI_CHAT_DEPLOYMENT")
    }

    pub fn embedding_azure(&self) -> Result<AzureConfig> {
        self.azure_config(
            self.azure.embedding_deployment.as_deref(),
            "AZURE_OPENAI_EMBEDDING_DEPLOYMENT",
        )
    }

    fn azure_config(&self, deployment: Option<&str>, deployment_var: &str) -> Result<AzureConfig> {
        let Some(endpoint) = self.azure.endpoint.as_deref() else {
            bail!("AZURE_OPENAI_ENDPOINT is not set (use --offline to run without Azure OpenAI)");
        };
        let Some(api_key) = self.azure.api_key.as_deref() else {
            bail!("AZURE_OPENAI_API_KEY is not set (use --offline to run without Azure OpenAI)");
        };
        let Some(deployment) = deployment else {
            bail!("{deployment_var} is not set");
        };
        let config = AzureConfig::new(endpoint, api_key, deployment);
        Ok(match self.azure.api_version.as_deref() {
            Some(version) => config.with_api_version(version),
            None => config,
        })
    }
}
