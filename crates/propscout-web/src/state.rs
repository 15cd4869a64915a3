//! Shared application state for the web server.

use std::sync::Arc;
use tokio::sync::broadcast;

use propscout_common::http::SourceClient;
use propscout_config::ScoutConfig;
use propscout_db::{ListingStore, MemoryListingStore, PgListingStore};
use propscout_ingestion::{AggregationPipeline, FetchOrchestrator, SearchProgress};
use propscout_llm::OutreachGenerator;

/// State injected into every handler.
pub struct AppState {
    pub store: Arc<dyn ListingStore>,
    pub pipeline: AggregationPipeline,
    pub outreach: OutreachGenerator,
    /// Broadcast channel carrying pipeline progress events.
    pub progress_tx: broadcast::Sender<SearchProgress>,
}

impl AppState {
    /// Wire the full stack from one config value.
    pub async fn from_config(cfg: &ScoutConfig) -> anyhow::Result<Self> {
        let client = SourceClient::new(cfg.allowed_hosts())?;
        let orchestrator = FetchOrchestrator::from_config(&cfg.sources, &client);

        let store: Arc<dyn ListingStore> = match &cfg.database.url {
            Some(url) => {
                let pg = PgListingStore::connect(url).await?;
                pg.init().await?;
                Arc::new(pg)
            }
            None => Arc::new(MemoryListingStore::new()),
        };

        let (progress_tx, _) = broadcast::channel(256);
        let pipeline = AggregationPipeline::new(
            orchestrator,
            Arc::clone(&store),
            cfg.scoring.clone(),
            cfg.pipeline.clone(),
        )
        .with_progress(progress_tx.clone());

        Ok(Self {
            store,
            pipeline,
            outreach: OutreachGenerator::new(cfg.llm.clone()),
            progress_tx,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SearchProgress> {
        self.progress_tx.subscribe()
    }
}

pub type SharedState = Arc<AppState>;
