//! In-memory store. Backs tests and credential-less local runs.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use propscout_common::entities::{normalize_address, MergedListing};

use crate::error::Result;
use crate::store::{ListingStore, StoredListing};

#[derive(Default)]
struct Inner {
    by_id: HashMap<Uuid, StoredListing>,
    id_by_address: HashMap<String, Uuid>,
    /// Insertion order; defines comps ordering for this store.
    order: Vec<Uuid>,
}

#[derive(Default)]
pub struct MemoryListingStore {
    inner: RwLock<Inner>,
}

impl MemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingStore for MemoryListingStore {
    async fn upsert(&self, listing: &MergedListing) -> Result<StoredListing> {
        let key = normalize_address(&listing.address);
        let mut inner = self.inner.write().await;

        if let Some(&id) = inner.id_by_address.get(&key) {
            let row = inner.by_id.get_mut(&id).expect("index and rows in sync");
            row.listing = listing.clone();
            row.updated_at = Some(Utc::now());
            return Ok(row.clone());
        }

        let row = StoredListing {
            id: Uuid::new_v4(),
            listing: listing.clone(),
            motivation_score: None,
            suggested_offer: None,
            estimated_roi: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        inner.id_by_address.insert(key, row.id);
        inner.order.push(row.id);
        inner.by_id.insert(row.id, row.clone());
        Ok(row)
    }

    async fn set_scores(&self, id: Uuid, motivation: f64, offer: f64, roi: f64) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(row) = inner.by_id.get_mut(&id) {
            row.motivation_score = Some(motivation);
            row.suggested_offer = Some(offer);
            row.estimated_roi = Some(roi);
            row.updated_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredListing>> {
        Ok(self.inner.read().await.by_id.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<StoredListing>> {
        let inner = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| inner.by_id.get(id).cloned()).collect())
    }

    async fn comps(
        &self,
        subject_id: Uuid,
        zip_code: &str,
        property_type: &str,
        max: usize,
    ) -> Result<Vec<MergedListing>> {
        let inner = self.inner.read().await;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.by_id.get(id))
            .filter(|row| {
                row.id != subject_id
                    && row.listing.zip_code == zip_code
                    && row.listing.property_type == property_type
            })
            .take(max)
            .map(|row| row.listing.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propscout_common::entities::OwnerStatus;

    fn listing(address: &str, zip: &str, ptype: &str, price: f64) -> MergedListing {
        MergedListing {
            address: address.to_string(),
            zip_code: zip.to_string(),
            price,
            square_feet: 1000.0,
            days_on_market: 0,
            price_drops: 0,
            property_type: ptype.to_string(),
            listing_agent: String::new(),
            tax_assessed_value: 0.0,
            owner_status: OwnerStatus::Unknown,
            pre_foreclosure: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_is_keyed_by_normalized_address() {
        let store = MemoryListingStore::new();
        let first = store.upsert(&listing("12 Oak St", "62704", "condo", 1.0)).await.unwrap();
        let second = store.upsert(&listing("  12 OAK ST ", "62704", "condo", 2.0)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.listing.price, 2.0);
        assert!(second.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_comps_exclude_subject_and_respect_cap() {
        let store = MemoryListingStore::new();
        let subject = store.upsert(&listing("1 A St", "62704", "condo", 1.0)).await.unwrap();
        for i in 0..10 {
            store
                .upsert(&listing(&format!("{i} B St"), "62704", "condo", 1.0))
                .await
                .unwrap();
        }
        store.upsert(&listing("9 C St", "62704", "single_family", 1.0)).await.unwrap();
        store.upsert(&listing("9 D St", "10001", "condo", 1.0)).await.unwrap();

        let comps = store.comps(subject.id, "62704", "condo", 5).await.unwrap();
        assert_eq!(comps.len(), 5);
        assert!(comps.iter().all(|c| c.address != "1 A St"));
        assert!(comps.iter().all(|c| c.zip_code == "62704" && c.property_type == "condo"));
    }

    #[tokio::test]
    async fn test_get_many_skips_unknown_ids() {
        let store = MemoryListingStore::new();
        let a = store.upsert(&listing("1 A St", "62704", "condo", 1.0)).await.unwrap();
        let rows = store.get_many(&[a.id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, a.id);
    }

    #[tokio::test]
    async fn test_set_scores_persists() {
        let store = MemoryListingStore::new();
        let a = store.upsert(&listing("1 A St", "62704", "condo", 1.0)).await.unwrap();
        store.set_scores(a.id, 55.0, 85000.0, 12.5).await.unwrap();
        let row = store.get(a.id).await.unwrap().unwrap();
        assert_eq!(row.motivation_score, Some(55.0));
        assert_eq!(row.suggested_offer, Some(85000.0));
        assert_eq!(row.estimated_roi, Some(12.5));
    }
}
