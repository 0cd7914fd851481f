//! Wires configuration into a router or an ingest run.

use crate::config::Config;
use anyhow::{Context, Result};
use homescout_agent::{
    CoordinatorRole, KeywordClassifier, LlmIntentClassifier, RetrievalRole, TranslationRole,
};
use homescout_browser::{BrowserSession, IngestPipeline, ListingScraper};
use homescout_core::Llm;
use homescout_model::OpenAIClient;
use homescout_rag::{
    AzureOpenAIEmbeddingProvider, EmbeddingProvider, HashingEmbeddingProvider, ListingStore,
    SearchListingsTool,
};
use homescout_runner::HandoffRouter;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the coordinator, retrieval and translation roles and the router
/// between them, loading the configured listings first.
pub async fn build_router(config: &Config) -> Result<HandoffRouter> {
    let embedder = embedding_provider(config)?;

    let store = Arc::new(ListingStore::in_memory(embedder).await?);
    load_listings(&store, &config.listings).await?;

    let search = Arc::new(SearchListingsTool::new(store).with_top_k(config.top_k));
    let (coordinator, translation) = if config.offline {
        info!("offline mode: keyword routing, translation unavailable");
        (
            CoordinatorRole::builder().classifier(Arc::new(KeywordClassifier::new())).build(),
            TranslationRole::unavailable().with_language(&config.translation_language),
        )
    } else {
        let model: Arc<dyn Llm> = Arc::new(OpenAIClient::azure(config.chat_azure()?)?);
        (
            CoordinatorRole::builder()
                .classifier(Arc::new(LlmIntentClassifier::new(model.clone())))
                .responder(model.clone())
                .build(),
            TranslationRole::new(model).with_language(&config.translation_language),
        )
    };

    let router = HandoffRouter::builder()
        .role(Arc::new(coordinator))
        .role(Arc::new(RetrievalRole::new(search)))
        .role(Arc::new(translation))
        .max_hops(config.max_hops)
        .build()?;
    Ok(router)
}

/// Local hashing embeddings offline, the Azure deployment otherwise.
pub fn embedding_provider(config: &Config) -> Result<Arc<dyn EmbeddingProvider>> {
    if config.offline {
        return Ok(Arc::new(HashingEmbeddingProvider::default()));
    }
    let mut provider = AzureOpenAIEmbeddingProvider::new(config.embedding_azure()?)?;
    if let Some(dimensions) = config.azure.embedding_dimensions {
        provider = provider.with_dimensions(dimensions);
    }
    Ok(Arc::new(provider))
}

async fn load_listings(store: &ListingStore, path: &Path) -> Result<()> {
    if !path.exists() {
        warn!(path = %path.display(), "listing file not found, starting with no listings");
        return Ok(());
    }
    store
        .load_json(path)
        .await
        .with_context(|| format!("failed to load listings from {}", path.display()))?;
    Ok(())
}

/// Scrape every URL in `urls` and write the listings to `output`.
/// Returns the number of listings written.
pub async fn run_ingest(config: &Config, urls: &Path, output: &Path) -> Result<usize> {
    let session = Arc::new(BrowserSession::new(config.browser.clone()));
    let pipeline = IngestPipeline::new(Arc::new(ListingScraper::new(session)))
        .with_page_delay(config.browser.page_delay_duration());
    let listings = pipeline
        .run(urls, output)
        .await
        .with_context(|| format!("ingest from {} failed", urls.display()))?;
    Ok(listings.len())
}
