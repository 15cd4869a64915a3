//! Realtor.com adapter (RapidAPI gateway).
//!
//! Endpoint: `GET /properties/v2/list-for-sale`, parameterized by postal
//! code, authenticated with the shared gateway credential.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use propscout_common::entities::{OwnerStatus, RawListing, SourceId};
use propscout_common::http::SourceClient;
use propscout_common::{Result, ScoutError};
use propscout_config::ApiSourceConfig;

use super::{json_f64, json_str, json_u32, ListingSource};

const PAGE_SIZE: &str = "100";

pub struct RealtorSource {
    client: SourceClient,
    cfg: ApiSourceConfig,
    api_key: SecretString,
}

impl RealtorSource {
    pub fn new(client: SourceClient, cfg: ApiSourceConfig, api_key: SecretString) -> Self {
        Self { client, cfg, api_key }
    }
}

#[async_trait]
impl ListingSource for RealtorSource {
    fn id(&self) -> SourceId {
        SourceId::Realtor
    }

    #[instrument(skip(self))]
    async fn fetch(&self, zip_code: &str) -> Result<Vec<RawListing>> {
        let url = format!("{}/properties/v2/list-for-sale", self.cfg.base_url);
        let data = self
            .client
            .get_json(
                &url,
                &[
                    ("postal_code", zip_code),
                    ("offset", "0"),
                    ("limit", PAGE_SIZE),
                    ("sort", "relevance"),
                ],
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
                Err(e) => warn!(error = %e, "skipping malformed realtor record"),
            }
        }
        debug!(count = listings.len(), "realtor API returned listings");
        Ok(listings)
    }
}

fn parse_listing(item: &serde_json::Value, zip_code: &str) -> Result<RawListing> {
    let line = json_str(&item["address"]["line"]);
    let city = json_str(&item["address"]["city"]);
    let address = match (line.is_empty(), city.is_empty()) {
        (true, _) => return Err(ScoutError::Parse("listing has no address line".into())),
        (false, true) => line,
        (false, false) => format!("{line}, {city}"),
    };

    // a single "Listed" entry means zero reductions
    let price_drops = item["price_history"]
        .as_array()
        .map(|h| (h.len() as u32).saturating_sub(1))
        .unwrap_or(0);

    Ok(RawListing {
        source: SourceId::Realtor,
        source_listing_id: item["property_id"].as_str().map(String::from),
        address,
        zip_code: zip_code.to_string(),
        price: json_f64(&item["price"]),
        square_feet: json_f64(&item["building_size"]["size"]),
        days_on_market: json_u32(&item["days_on_market"]),
        price_drops,
        property_type: json_str(&item["property_type"]).to_lowercase(),
        listing_agent: json_str(&item["agent"]["name"]),
        tax_assessed_value: json_f64(&item["tax_assessment"]),
        owner_status: OwnerStatus::Unknown,
        pre_foreclosure: Some(item["is_foreclosure"].as_bool().unwrap_or(false)),
    })
}
