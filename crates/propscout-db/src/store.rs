//! Storage interface for merged and scored listings.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use propscout_common::entities::MergedListing;

use crate::error::Result;

/// A listing as persisted: the merged record plus the store-assigned id,
/// the last computed deal metrics, and bookkeeping timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredListing {
    pub id: Uuid,
    #[serde(flatten)]
    pub listing: MergedListing,
    pub motivation_score: Option<f64>,
    pub suggested_offer: Option<f64>,
    pub estimated_roi: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Keyed record store with upsert-by-address semantics.
///
/// Comps ordering is store-defined (insertion order for the memory store,
/// primary-key order for postgres); callers only rely on the cap.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Insert or update by normalized address; returns the stored row.
    async fn upsert(&self, listing: &MergedListing) -> Result<StoredListing>;

    /// Persist computed deal metrics for an existing row.
    async fn set_scores(&self, id: Uuid, motivation: f64, offer: f64, roi: f64) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<StoredListing>>;

    /// Fetch rows for an explicit id list; unknown ids are skipped.
    async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<StoredListing>>;

    /// Comparable listings: same zip code and property type, excluding the
    /// subject itself, capped at `max`.
    async fn comps(
        &self,
        subject_id: Uuid,
        zip_code: &str,
        property_type: &str,
        max: usize,
    ) -> Result<Vec<MergedListing>>;
}
