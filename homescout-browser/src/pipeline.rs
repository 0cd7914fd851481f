//! URL file in, listing JSON out.

use crate::scraper::ListingExtractor;
use homescout_core::{Result, ScoutError};
use homescout_rag::ListingDetail;
use homescout_telemetry::{info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Non-blank lines of a URL file, trimmed. Lines that are not absolute
/// http(s) URLs are rejected.
pub fn parse_urls(contents: &str) -> Result<Vec<String>> {
    contents
        .lines()
        .map(str::trim)
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(index, line)| {
            let url = url::Url::parse(line).map_err(|e| {
                ScoutError::Config(format!("line {}: '{line}' is not a URL: {e}", index + 1))
            })?;
            match url.scheme() {
                "http" | "https" => Ok(url.to_string()),
                other => Err(ScoutError::Config(format!(
                    "line {}: unsupported scheme '{other}'",
                    index + 1
                ))),
            }
        })
        .collect()
}

pub async fn read_url_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let contents = tokio::fs::read_to_string(path.as_ref()).await?;
    parse_urls(&contents)
}

pub async fn write_listings(path: impl AsRef<Path>, listings: &[ListingDetail]) -> Result<()> {
    let json = serde_json::to_string_pretty(listings)?;
    tokio::fs::write(path.as_ref(), json).await?;
    Ok(())
}

/// Scrapes each URL in turn, pausing between pages.
pub struct IngestPipeline {
    extractor: Arc<dyn ListingExtractor>,
    page_delay: Duration,
}

impl IngestPipeline {
    pub fn new(extractor: Arc<dyn ListingExtractor>) -> Self {
        Self { extractor, page_delay: Duration::from_secs(5) }
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// Extract every URL in order. The first failing page aborts the run.
    pub async fn scrape(&self, urls: &[String]) -> Result<Vec<ListingDetail>> {
        let mut listings = Vec::with_capacity(urls.len());
        for (index, url) in urls.iter().enumerate() {
            if index > 0 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
            let detail = self.extractor.extract(url).await?;
            log_listing(url, &detail);
            listings.push(detail);
        }
        Ok(listings)
    }

    /// Read `urls_path`, scrape every page, and write the results to
    /// `output_path` as a pretty-printed JSON array.
    pub async fn run(
        &self,
        urls_path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
    ) -> Result<Vec<ListingDetail>> {
        let urls = read_url_file(urls_path).await?;
        info!(pages = urls.len(), "starting listing ingestion");

        let scraped = self.scrape(&urls).await;
        if let Err(e) = self.extractor.finish().await {
            warn!(error = %e, "failed to close the browser session");
        }
        let listings = scraped?;

        write_listings(output_path.as_ref(), &listings).await?;
        info!(listings = listings.len(), output = %output_path.as_ref().display(), "ingestion complete");
        Ok(listings)
    }
}

fn log_listing(url: &str, detail: &ListingDetail) {
    let field = |value: &Option<String>| value.clone().unwrap_or_default();
    info!(
        url,
        title = %field(&detail.title),
        rooms = %field(&detail.rooms),
        status = %field(&detail.status),
        agent = %field(&detail.agent_name),
        address = %field(&detail.address),
        schools = ?detail.nearby_schools.as_deref().unwrap_or_default(),
        "scraped listing"
    );
}
