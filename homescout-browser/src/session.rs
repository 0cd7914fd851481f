//! WebDriver session used by the listing scraper.

use crate::config::{BrowserConfig, BrowserType};
use homescout_core::{Result, ScoutError};
use std::time::Duration;
use thirtyfour::prelude::*;
use tokio::sync::RwLock;

/// A lazily started WebDriver session.
///
/// The session is created on [`start`](Self::start) and reused for every page
/// until [`stop`](Self::stop).
pub struct BrowserSession {
    driver: RwLock<Option<WebDriver>>,
    config: BrowserConfig,
}

impl BrowserSession {
    pub fn new(config: BrowserConfig) -> Self {
        Self { driver: RwLock::new(None), config }
    }

    /// Connect to WebDriver. Does nothing if already connected.
    pub async fn start(&self) -> Result<()> {
        let mut driver_guard = self.driver.write().await;
        if driver_guard.is_some() {
            return Ok(());
        }

        let caps = self.build_capabilities()?;
        let driver = WebDriver::new(&self.config.webdriver_url, caps)
            .await
            .map_err(|e| ScoutError::Tool(format!("Failed to start browser: {e}")))?;

        driver
            .set_page_load_timeout(Duration::from_secs(self.config.page_load_timeout_secs))
            .await
            .map_err(|e| ScoutError::Tool(format!("Failed to set page load timeout: {e}")))?;
        driver
            .set_script_timeout(Duration::from_secs(self.config.script_timeout_secs))
            .await
            .map_err(|e| ScoutError::Tool(format!("Failed to set script timeout: {e}")))?;

        tracing::debug!(webdriver = %self.config.webdriver_url, "browser session started");
        *driver_guard = Some(driver);
        Ok(())
    }

    pub async fn stop(&self) -> Result<()> {
        let mut driver_guard = self.driver.write().await;
        if let Some(driver) = driver_guard.take() {
            driver
                .quit()
                .await
                .map_err(|e| ScoutError::Tool(format!("Failed to quit browser: {e}")))?;
        }
        Ok(())
    }

    pub async fn is_active(&self) -> bool {
        self.driver.read().await.is_some()
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub async fn navigate(&self, url: &str) -> Result<()> {
        let driver_guard = self.driver.read().await;
        let driver = started(&driver_guard)?;
        driver.goto(url).await.map_err(|e| ScoutError::Tool(format!("Navigation failed: {e}")))
    }

    pub async fn wait_for_element(&self, selector: &str, timeout_secs: u64) -> Result<()> {
        let driver_guard = self.driver.read().await;
        let driver = started(&driver_guard)?;
        driver
            .query(By::Css(selector))
            .wait(Duration::from_secs(timeout_secs), Duration::from_millis(100))
            .first()
            .await
            .map(|_| ())
            .map_err(|e| {
                ScoutError::Tool(format!(
                    "Timeout waiting for '{selector}' after {timeout_secs}s: {e}"
                ))
            })
    }

    /// Run `script` in the page and return its JSON result.
    pub async fn execute_script(&self, script: &str) -> Result<serde_json::Value> {
        let driver_guard = self.driver.read().await;
        let driver = started(&driver_guard)?;
        let result = driver
            .execute(script, Vec::new())
            .await
            .map_err(|e| ScoutError::Tool(format!("Script execution failed: {e}")))?;
        Ok(result.json().clone())
    }

    fn build_capabilities(&self) -> Result<Capabilities> {
        let caps = match self.config.browser {
            BrowserType::Chrome => {
                let mut caps = DesiredCapabilities::chrome();
                if self.config.headless {
                    caps.add_arg("--headless=new").map_err(|e| {
                        ScoutError::Tool(format!("Failed to add headless arg: {e}"))
                    })?;
                }
                for arg in ["--no-sandbox", "--disable-dev-shm-usage"] {
                    caps.add_arg(arg)
                        .map_err(|e| ScoutError::Tool(format!("Failed to add '{arg}': {e}")))?;
                }
                for arg in &self.config.browser_args {
                    caps.add_arg(arg)
                        .map_err(|e| ScoutError::Tool(format!("Failed to add '{arg}': {e}")))?;
                }
                caps.into()
            }
            BrowserType::Firefox => {
                let mut caps = DesiredCapabilities::firefox();
                if self.config.headless {
                    caps.add_arg("-headless")
                        .map_err(|e| ScoutError::Tool(format!("Failed to add headless: {e}")))?;
                }
                caps.into()
            }
        };
        Ok(caps)
    }
}

fn started(guard: &Option<WebDriver>) -> Result<&WebDriver> {
    guard.as_ref().ok_or_else(|| ScoutError::Tool("Browser session not started".to_string()))
}
