//! End-to-end pipeline test over mock sources and the in-memory store.
//! No network; the courtesy delay is zeroed so the run is instant.

use async_trait::async_trait;
use std::sync::Arc;

use propscout_common::entities::{OwnerStatus, RawListing, SearchFilter, SourceId};
use propscout_common::{Result, ScoutError};
use propscout_config::PipelineConfig;
use propscout_db::{ListingStore, MemoryListingStore};
use propscout_ingestion::sources::ListingSource;
use propscout_ingestion::{AggregationPipeline, FetchOrchestrator};
use propscout_scoring::ScoreWeights;

struct MockSource {
    id: SourceId,
    listings: Vec<RawListing>,
    fail: bool,
}

#[async_trait]
impl ListingSource for MockSource {
    fn id(&self) -> SourceId {
        self.id
    }

    async fn fetch(&self, zip_code: &str) -> Result<Vec<RawListing>> {
        if self.fail {
            return Err(ScoutError::UpstreamStatus(500));
        }
        Ok(self
            .listings
            .iter()
            .filter(|l| l.zip_code == zip_code)
            .cloned()
            .collect())
    }
}

fn raw(source: SourceId, address: &str, zip: &str, price: f64, dom: u32) -> RawListing {
    RawListing {
        source,
        source_listing_id: None,
        address: address.to_string(),
        zip_code: zip.to_string(),
        price,
        square_feet: 1200.0,
        days_on_market: dom,
        price_drops: 0,
        property_type: "single_family".to_string(),
        listing_agent: String::new(),
        tax_assessed_value: 0.0,
        owner_status: OwnerStatus::Unknown,
        pre_foreclosure: None,
    }
}

fn test_pipeline(store: Arc<MemoryListingStore>) -> AggregationPipeline {
    let zillow = MockSource {
        id: SourceId::Zillow,
        listings: vec![
            raw(SourceId::Zillow, "12 Oak St", "62704", 300000.0, 95),
            raw(SourceId::Zillow, "9 Elm Ave", "62704", 350000.0, 5),
            raw(SourceId::Zillow, "1 Lake Rd", "10001", 500000.0, 40),
        ],
        fail: false,
    };
    // overlaps on 12 Oak St with a lower price and shorter market time
    let redfin = MockSource {
        id: SourceId::Redfin,
        listings: vec![raw(SourceId::Redfin, "12 oak st", "62704", 295000.0, 20)],
        fail: false,
    };
    let broken = MockSource { id: SourceId::Realtor, listings: vec![], fail: true };

    let orchestrator =
        FetchOrchestrator::new(vec![Arc::new(zillow), Arc::new(redfin), Arc::new(broken)]);
    let cfg = PipelineConfig {
        courtesy_delay_min_secs: 0.0,
        courtesy_delay_max_secs: 0.0,
        max_comps: 5,
    };
    AggregationPipeline::new(orchestrator, store, ScoreWeights::default(), cfg)
}

#[tokio::test]
async fn test_run_merges_scores_and_ranks() {
    let store = Arc::new(MemoryListingStore::new());
    let pipeline = test_pipeline(store.clone());

    let filter = SearchFilter::for_zip_codes(["62704", "10001"]);
    let outcome = pipeline.run(&filter).await;

    // 12 Oak St deduplicated across the two sources; 3 distinct addresses
    assert_eq!(outcome.listings.len(), 3);
    assert_eq!(outcome.zip_codes_processed, 2);

    let oak = outcome
        .listings
        .iter()
        .find(|s| s.listing.address == "12 Oak St")
        .expect("merged record present");
    assert_eq!(oak.listing.price, 295000.0);
    assert_eq!(oak.listing.days_on_market, 95);

    // 95 days on market outranks the fresher listings
    assert_eq!(outcome.listings[0].listing.address, "12 Oak St");
    for pair in outcome.listings.windows(2) {
        assert!(pair[0].motivation_score >= pair[1].motivation_score);
    }

    // the broken source is reported per zip code, and broke nothing
    assert_eq!(outcome.source_errors.len(), 2);
    assert!(outcome.source_errors.iter().all(|e| e.contains("realtor")));

    // scores were written back to the store
    let row = store.get(oak.id).await.unwrap().unwrap();
    assert_eq!(row.motivation_score, Some(oak.motivation_score));
    assert_eq!(row.suggested_offer, Some(oak.suggested_offer));
}

#[tokio::test]
async fn test_run_applies_filter_predicates() {
    let store = Arc::new(MemoryListingStore::new());
    let pipeline = test_pipeline(store);

    let filter = SearchFilter {
        max_price: Some(300000.0),
        ..SearchFilter::for_zip_codes(["62704"])
    };
    let outcome = pipeline.run(&filter).await;

    assert_eq!(outcome.listings.len(), 1);
    assert_eq!(outcome.listings[0].listing.address, "12 Oak St");
}

#[tokio::test]
async fn test_rerun_is_an_upsert_not_a_duplicate() {
    let store = Arc::new(MemoryListingStore::new());
    let pipeline = test_pipeline(store.clone());

    let filter = SearchFilter::for_zip_codes(["62704"]);
    let first = pipeline.run(&filter).await;
    let second = pipeline.run(&filter).await;

    let first_oak = first.listings.iter().find(|s| s.listing.address == "12 Oak St").unwrap();
    let second_oak = second.listings.iter().find(|s| s.listing.address == "12 Oak St").unwrap();
    assert_eq!(first_oak.id, second_oak.id);
}
