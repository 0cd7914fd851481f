//! # homescout-browser
//!
//! Listing ingestion for HomeScout: a WebDriver session, a scraper that reads
//! listing fields from rendered pages, and the pipeline that turns a file of
//! URLs into the listing JSON the chat console loads.
//!
//! A WebDriver server (chromedriver, geckodriver or Selenium) must be running:
//!
//! ```bash
//! chromedriver --port=4444
//! ```
//!
//! ```rust,ignore
//! let session = Arc::new(BrowserSession::new(BrowserConfig::default()));
//! let pipeline = IngestPipeline::new(Arc::new(ListingScraper::new(session)));
//! pipeline.run("input-urls.txt", "property_listings.json").await?;
//! ```

pub mod config;
pub mod pipeline;
pub mod scraper;
pub mod session;

pub use config::{BrowserConfig, BrowserType};
pub use pipeline::{IngestPipeline, parse_urls, read_url_file, write_listings};
pub use scraper::{EXTRACT_LISTING_SCRIPT, ListingExtractor, ListingScraper};
pub use session::BrowserSession;
