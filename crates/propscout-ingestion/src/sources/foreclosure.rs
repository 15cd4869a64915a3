//! Foreclosure/tax-deed feed adapter (RapidAPI gateway).
//!
//! Every record from this feed is in some stage of default, so the adapter
//! tags them `pre_foreclosure: Some(true)` and `Distressed`. The feed has
//! no market-activity fields; `days_on_market` and `price_drops` stay zero
//! and are filled in by other sources during the merge.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use propscout_common::entities::{OwnerStatus, RawListing, SourceId};
use propscout_common::http::SourceClient;
use propscout_common::{Result, ScoutError};
use propscout_config::ApiSourceConfig;

use super::{json_f64, json_str, ListingSource};

pub struct ForeclosureSource {
    client: SourceClient,
    cfg: ApiSourceConfig,
    api_key: SecretString,
}

impl ForeclosureSource {
    pub fn new(client: SourceClient, cfg: ApiSourceConfig, api_key: SecretString) -> Self {
        Self { client, cfg, api_key }
    }
}

#[async_trait]
impl ListingSource for ForeclosureSource {
    fn id(&self) -> SourceId {
        SourceId::Foreclosure
    }

    #[instrument(skip(self))]
    async fn fetch(&self, zip_code: &str) -> Result<Vec<RawListing>> {
        let url = format!("{}/search", self.cfg.base_url);
        let data = self
            .client
            .get_json(
                &url,
                &[("zipcode", zip_code), ("page", "1"), ("pagesize", "100")],
                &[
                    ("X-RapidAPI-Key", self.api_key.expose_secret()),
                    ("X-RapidAPI-Host", &self.cfg.api_host),
                ],
            )
            .await?;

        let items = data["properties"].as_array().cloned().unwrap_or_default();
        let mut listings = Vec::with_capacity(items.len());
        for item in &items {
            match parse_listing(item, zip_code) {
                Ok(listing) => listings.push(listing),
                Err(e) => warn!(error = %e, "skipping malformed foreclosure record"),
            }
        }
        debug!(count = listings.len(), "foreclosure feed returned listings");
        Ok(listings)
    }
}

fn parse_listing(item: &serde_json::Value, zip_code: &str) -> Result<RawListing> {
    let address = json_str(&item["address"]);
    if address.trim().is_empty() {
        return Err(ScoutError::Parse("listing has no address".into()));
    }

    Ok(RawListing {
        source: SourceId::Foreclosure,
        source_listing_id: item["id"].as_str().map(String::from),
        address,
        zip_code: zip_code.to_string(),
        price: json_f64(&item["estimatedValue"]),
        square_feet: json_f64(&item["squareFootage"]),
        days_on_market: 0,
        price_drops: 0,
        property_type: json_str(&item["propertyType"]).to_lowercase(),
        listing_agent: String::new(),
        tax_assessed_value: json_f64(&item["assessedValue"]),
        owner_status: OwnerStatus::Distressed,
        pre_foreclosure: Some(true),
    })
}
