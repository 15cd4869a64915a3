//! End-to-end aggregation pipeline.
//!
//! Drives the full flow for one search request:
//!   1. Fan out to every source for a postal code and join the results
//!   2. Merge per-address across sources
//!   3. Upsert merged records into the store
//!   4. Score each record against its comparables
//!   5. Repeat per postal code (with a courtesy pause in between)
//!   6. Filter the accumulated set, rank by motivation
//!
//! One postal code is fully merged and scored before the next begins; the
//! serialization is a deliberate politeness/throughput trade-off. The
//! pipeline never aborts a run for a single source or record failure —
//! partial results always beat a failed run.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use propscout_common::entities::{MergedListing, SearchFilter};
use propscout_config::PipelineConfig;
use propscout_db::ListingStore;
use propscout_scoring::{score_listing, ScoreWeights, ScoredListing};

use crate::fetch::FetchOrchestrator;
use crate::merge::merge;

// ── Progress events ───────────────────────────────────────────────────────────

/// Progress event emitted while a search runs (cloneable for broadcast).
#[derive(Debug, Clone, serde::Serialize)]
pub struct SearchProgress {
    pub zip_code: String,
    pub stage: String,
    pub message: String,
}

// ── Result summary ────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct SearchOutcome {
    /// Ranked, filtered listings — the payload callers care about.
    pub listings: Vec<ScoredListing>,
    /// Per-source failures, one line each. Informational only.
    pub source_errors: Vec<String>,
    pub zip_codes_processed: usize,
    pub duration_ms: u64,
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

pub struct AggregationPipeline {
    orchestrator: FetchOrchestrator,
    store: Arc<dyn ListingStore>,
    weights: ScoreWeights,
    cfg: PipelineConfig,
    progress_tx: Option<broadcast::Sender<SearchProgress>>,
}

impl AggregationPipeline {
    pub fn new(
        orchestrator: FetchOrchestrator,
        store: Arc<dyn ListingStore>,
        weights: ScoreWeights,
        cfg: PipelineConfig,
    ) -> Self {
        Self { orchestrator, store, weights, cfg, progress_tx: None }
    }

    /// Attach a progress channel; events are best-effort.
    pub fn with_progress(mut self, tx: broadcast::Sender<SearchProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    fn emit(&self, zip_code: &str, stage: &str, message: String) {
        if let Some(ref tx) = self.progress_tx {
            let _ = tx.send(SearchProgress {
                zip_code: zip_code.to_string(),
                stage: stage.to_string(),
                message,
            });
        }
    }

    #[instrument(skip(self, filter), fields(zips = filter.zip_codes.len()))]
    pub async fn run(&self, filter: &SearchFilter) -> SearchOutcome {
        let t0 = std::time::Instant::now();
        let mut accumulated: Vec<ScoredListing> = Vec::new();
        let mut source_errors: Vec<String> = Vec::new();

        for (index, zip_code) in filter.zip_codes.iter().enumerate() {
            // upstream courtesy: pause between postal codes, never before
            // the first or after the last
            if index > 0 {
                self.courtesy_pause().await;
            }

            self.emit(zip_code, "fetch", format!("fetching {zip_code} from all sources"));
            let outcome = self.orchestrator.fetch_all(zip_code).await;
            source_errors.extend(
                outcome
                    .failures
                    .iter()
                    .map(|f| format!("{} [{}]: {}", f.source, zip_code, f.reason)),
            );

            let merged = merge(&outcome.listings);
            self.emit(
                zip_code,
                "merge",
                format!("{} raw listings merged into {}", outcome.listings.len(), merged.len()),
            );

            let scored = self.persist_and_score(merged).await;
            self.emit(zip_code, "score", format!("{} listings scored", scored.len()));
            accumulated.extend(scored);
        }

        let mut listings = apply_predicates(accumulated, filter);
        // stable sort: equal scores keep their prior relative order
        listings.sort_by(|a, b| {
            b.motivation_score
                .partial_cmp(&a.motivation_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let result = SearchOutcome {
            listings,
            source_errors,
            zip_codes_processed: filter.zip_codes.len(),
            duration_ms: t0.elapsed().as_millis() as u64,
        };
        info!(
            listings = result.listings.len(),
            zips = result.zip_codes_processed,
            errors = result.source_errors.len(),
            duration_ms = result.duration_ms,
            "aggregation run complete"
        );
        result
    }

    /// Upsert each merged listing, then score it against its comps.
    /// Store hiccups degrade that one record, never the run.
    async fn persist_and_score(&self, merged: Vec<MergedListing>) -> Vec<ScoredListing> {
        let mut scored = Vec::with_capacity(merged.len());
        for listing in merged {
            let row = match self.store.upsert(&listing).await {
                Ok(row) => row,
                Err(e) => {
                    warn!(address = %listing.address, error = %e, "upsert failed, skipping record");
                    continue;
                }
            };

            let comps = match self
                .store
                .comps(row.id, &row.listing.zip_code, &row.listing.property_type, self.cfg.max_comps)
                .await
            {
                Ok(comps) => comps,
                Err(e) => {
                    warn!(id = %row.id, error = %e, "comps lookup failed, scoring without comps");
                    Vec::new()
                }
            };

            let s = score_listing(row.id, row.listing, &comps, &self.weights);
            if let Err(e) = self
                .store
                .set_scores(s.id, s.motivation_score, s.suggested_offer, s.estimated_roi)
                .await
            {
                warn!(id = %s.id, error = %e, "score persistence failed");
            }
            scored.push(s);
        }
        scored
    }

    async fn courtesy_pause(&self) {
        let max = self.cfg.courtesy_delay_max_secs;
        if max <= 0.0 {
            return;
        }
        let min = self.cfg.courtesy_delay_min_secs.clamp(0.0, max);
        let secs = {
            let mut rng = rand::thread_rng();
            rng.gen_range(min..=max)
        };
        tokio::time::sleep(Duration::from_secs_f64(secs)).await;
    }
}

// ── Filtering ─────────────────────────────────────────────────────────────────

/// Apply the non-zip predicates: exact property type, inclusive price
/// bounds, inclusive days-on-market ceiling.
fn apply_predicates(listings: Vec<ScoredListing>, filter: &SearchFilter) -> Vec<ScoredListing> {
    listings
        .into_iter()
        .filter(|s| {
            if let Some(ref pt) = filter.property_type {
                if &s.listing.property_type != pt {
                    return false;
                }
            }
            if let Some(min) = filter.min_price {
                if s.listing.price < min {
                    return false;
                }
            }
            if let Some(max) = filter.max_price {
                if s.listing.price > max {
                    return false;
                }
            }
            if let Some(max_dom) = filter.max_days_on_market {
                if s.listing.days_on_market > max_dom {
                    return false;
                }
            }
            true
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use propscout_common::entities::OwnerStatus;
    use uuid::Uuid;

    fn scored(price: f64, dom: u32, ptype: &str, motivation: f64) -> ScoredListing {
        ScoredListing {
            id: Uuid::new_v4(),
            listing: MergedListing {
                address: format!("{price} Main St"),
                zip_code: "62704".to_string(),
                price,
                square_feet: 0.0,
                days_on_market: dom,
                price_drops: 0,
                property_type: ptype.to_string(),
                listing_agent: String::new(),
                tax_assessed_value: 0.0,
                owner_status: OwnerStatus::Unknown,
                pre_foreclosure: None,
            },
            motivation_score: motivation,
            suggested_offer: 0.0,
            estimated_roi: 0.0,
        }
    }

    #[test]
    fn test_max_price_keeps_cheaper_listing_only() {
        let filter = SearchFilter {
            max_price: Some(300000.0),
            ..SearchFilter::for_zip_codes(["62704"])
        };
        let out = apply_predicates(
            vec![scored(250000.0, 0, "condo", 0.0), scored(350000.0, 0, "condo", 0.0)],
            &filter,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].listing.price, 250000.0);
    }

    #[test]
    fn test_bounds_are_inclusive_and_type_is_exact() {
        let filter = SearchFilter {
            property_type: Some("condo".to_string()),
            min_price: Some(100.0),
            max_price: Some(200.0),
            max_days_on_market: Some(30),
            ..SearchFilter::for_zip_codes(["62704"])
        };
        let out = apply_predicates(
            vec![
                scored(100.0, 30, "condo", 0.0),
                scored(200.0, 0, "condo", 0.0),
                scored(150.0, 31, "condo", 0.0),
                scored(150.0, 0, "single_family", 0.0),
            ],
            &filter,
        );
        assert_eq!(out.len(), 2);
    }
}
