//! Browser and ingestion options.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options for the WebDriver session and the scrape loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// WebDriver server URL (e.g., "http://localhost:4444")
    pub webdriver_url: String,

    pub browser: BrowserType,

    /// Run without a visible window
    pub headless: bool,

    pub page_load_timeout_secs: u64,

    pub script_timeout_secs: u64,

    /// Selector that marks a listing page as rendered.
    pub ready_selector: String,

    pub ready_timeout_secs: u64,

    /// Pause between consecutive pages.
    pub page_delay_secs: u64,

    /// Extra browser command-line arguments
    pub browser_args: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    Chrome,
    Firefox,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            browser: BrowserType::Chrome,
            headless: true,
            page_load_timeout_secs: 60,
            script_timeout_secs: 30,
            ready_selector: "footer".to_string(),
            ready_timeout_secs: 30,
            page_delay_secs: 5,
            browser_args: vec!["--disable-blink-features=AutomationControlled".to_string()],
        }
    }
}

impl BrowserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.webdriver_url = url.into();
        self
    }

    pub fn browser(mut self, browser: BrowserType) -> Self {
        self.browser = browser;
        self
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn page_load_timeout(mut self, secs: u64) -> Self {
        self.page_load_timeout_secs = secs;
        self
    }

    pub fn ready_selector(mut self, selector: impl Into<String>) -> Self {
        self.ready_selector = selector.into();
        self
    }

    pub fn page_delay(mut self, secs: u64) -> Self {
        self.page_delay_secs = secs;
        self
    }

    pub fn add_arg(mut self, arg: impl Into<String>) -> Self {
        self.browser_args.push(arg.into());
        self
    }

    pub fn page_delay_duration(&self) -> Duration {
        Duration::from_secs(self.page_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BrowserConfig::default();
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert!(config.headless);
        assert_eq!(config.ready_selector, "footer");
        assert_eq!(config.page_delay_duration(), Duration::from_secs(5));
    }

    #[test]
    fn test_builder() {
        let config = BrowserConfig::new()
            .browser(BrowserType::Firefox)
            .headless(false)
            .page_delay(0)
            .ready_selector("main");

        assert_eq!(config.browser, BrowserType::Firefox);
        assert!(!config.headless);
        assert_eq!(config.page_delay_secs, 0);
        assert_eq!(config.ready_selector, "main");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: BrowserConfig =
            serde_json::from_str(r#"{"webdriver_url": "http://grid:4444", "browser": "firefox"}"#)
                .unwrap();
        assert_eq!(config.webdriver_url, "http://grid:4444");
        assert_eq!(config.browser, BrowserType::Firefox);
        assert_eq!(config.page_delay_secs, 5);
    }
}
