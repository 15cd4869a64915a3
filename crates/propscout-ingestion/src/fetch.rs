//! Concurrent fan-out across all registered listing sources.

use futures::future;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use propscout_common::entities::{RawListing, SourceId};
use propscout_common::http::SourceClient;
use propscout_config::SourcesConfig;

use crate::sources::{build_sources, ListingSource};

/// One source's total failure for one postal code, captured as data.
#[derive(Debug, Clone)]
pub struct SourceFailure {
    pub source: SourceId,
    pub reason: String,
}

/// Everything a fan-out produced: the concatenated successes plus every
/// captured failure. Nothing escapes `fetch_all` as an error.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub listings: Vec<RawListing>,
    pub failures: Vec<SourceFailure>,
}

/// Fans one postal code out to every registered adapter concurrently and
/// joins the results. A single adapter's failure or timeout never cancels
/// or degrades its siblings.
pub struct FetchOrchestrator {
    sources: Vec<Arc<dyn ListingSource>>,
}

impl FetchOrchestrator {
    /// Construct from an explicit adapter list (tests inject mocks here).
    pub fn new(sources: Vec<Arc<dyn ListingSource>>) -> Self {
        Self { sources }
    }

    pub fn from_config(cfg: &SourcesConfig, client: &SourceClient) -> Self {
        Self::new(build_sources(cfg, client))
    }

    pub fn source_ids(&self) -> Vec<SourceId> {
        self.sources.iter().map(|s| s.id()).collect()
    }

    #[instrument(skip(self))]
    pub async fn fetch_all(&self, zip_code: &str) -> FetchOutcome {
        let calls = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            let zip = zip_code.to_string();
            async move {
                let result = source.fetch(&zip).await;
                (source.id(), result)
            }
        });

        let mut outcome = FetchOutcome::default();
        for (id, result) in future::join_all(calls).await {
            match result {
                Ok(listings) => {
                    info!(source = %id, count = listings.len(), "listings retrieved");
                    outcome.listings.extend(listings);
                }
                Err(e) => {
                    let e = e.into_unavailable(id.as_str());
                    warn!(source = %id, error = %e, "source failed, continuing");
                    outcome.failures.push(SourceFailure { source: id, reason: e.to_string() });
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use propscout_common::entities::OwnerStatus;
    use propscout_common::{Result, ScoutError};

    struct StaticSource {
        id: SourceId,
        addresses: Vec<&'static str>,
        fail: bool,
    }

    #[async_trait]
    impl ListingSource for StaticSource {
        fn id(&self) -> SourceId {
            self.id
        }

        async fn fetch(&self, zip_code: &str) -> Result<Vec<RawListing>> {
            if self.fail {
                return Err(ScoutError::UpstreamStatus(503));
            }
            Ok(self
                .addresses
                .iter()
                .map(|addr| RawListing {
                    source: self.id,
                    source_listing_id: None,
                    address: addr.to_string(),
                    zip_code: zip_code.to_string(),
                    price: 100000.0,
                    square_feet: 0.0,
                    days_on_market: 0,
                    price_drops: 0,
                    property_type: String::new(),
                    listing_agent: String::new(),
                    tax_assessed_value: 0.0,
                    owner_status: OwnerStatus::Unknown,
                    pre_foreclosure: None,
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_one_failing_source_does_not_poison_the_rest() {
        let orchestrator = FetchOrchestrator::new(vec![
            Arc::new(StaticSource { id: SourceId::Zillow, addresses: vec!["1 A St"], fail: false }),
            Arc::new(StaticSource { id: SourceId::Redfin, addresses: vec![], fail: true }),
            Arc::new(StaticSource {
                id: SourceId::Realtor,
                addresses: vec!["2 B St", "3 C St"],
                fail: false,
            }),
        ]);

        let outcome = orchestrator.fetch_all("62704").await;

        // successes concatenate in registration order
        let addresses: Vec<&str> =
            outcome.listings.iter().map(|l| l.address.as_str()).collect();
        assert_eq!(addresses, vec!["1 A St", "2 B St", "3 C St"]);

        // the failure is data, not a panic or an early return
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].source, SourceId::Redfin);
    }

    #[tokio::test]
    async fn test_empty_registry_yields_empty_outcome() {
        let orchestrator = FetchOrchestrator::new(vec![]);
        let outcome = orchestrator.fetch_all("62704").await;
        assert!(outcome.listings.is_empty());
        assert!(outcome.failures.is_empty());
    }
}
