//! Extraction of listing fields from a rendered listing page.

use crate::session::BrowserSession;
use async_trait::async_trait;
use homescout_core::{Result, ScoutError};
use homescout_rag::ListingDetail;
use std::sync::Arc;

/// Reads one listing page. Every field is `null` when its element is missing.
pub const EXTRACT_LISTING_SCRIPT: &str = r#"
const text = (selector) => document.querySelector(selector)?.innerText ?? null;
return {
    title: text('.property-info-address'),
    rooms: document.querySelector('.property-info__primary-features')?.getAttribute('aria-label') ?? null,
    status: text('.property-info__footer-content p'),
    description: text('[data-testid=PropertyDescription]'),
    nearbySchools: Array.from(document.querySelectorAll('span.nearby-schools__name')).map((x) => x.innerText),
    agentName: text('.agent-info__contact-info a'),
    address: text('.sidebar-traffic-driver.contact-agent-panel__traffic-driver'),
};
"#;

/// Source of listing details, one page at a time.
#[async_trait]
pub trait ListingExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<ListingDetail>;

    /// Release whatever the extractor holds open.
    async fn finish(&self) -> Result<()> {
        Ok(())
    }
}

/// Scrapes listing pages through a shared [`BrowserSession`].
pub struct ListingScraper {
    session: Arc<BrowserSession>,
}

impl ListingScraper {
    pub fn new(session: Arc<BrowserSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl ListingExtractor for ListingScraper {
    async fn extract(&self, url: &str) -> Result<ListingDetail> {
        self.session.start().await?;
        self.session.navigate(url).await?;

        let config = self.session.config();
        self.session.wait_for_element(&config.ready_selector, config.ready_timeout_secs).await?;

        let value = self.session.execute_script(EXTRACT_LISTING_SCRIPT).await?;
        parse_extracted(value)
            .map_err(|e| ScoutError::Tool(format!("Unexpected listing data from {url}: {e}")))
    }

    async fn finish(&self) -> Result<()> {
        self.session.stop().await
    }
}

fn parse_extracted(value: serde_json::Value) -> serde_json::Result<ListingDetail> {
    serde_json::from_value(value)
}
