//! Redfin search-page adapter.
//!
//! The page bootstraps its React app with an inline `JSONData: {...}` blob;
//! listings live under `homes`. Occupancy and foreclosure status are not
//! observable here, so records carry `Unknown` / `None` for those fields.

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};

use propscout_common::entities::{OwnerStatus, RawListing, SourceId};
use propscout_common::http::SourceClient;
use propscout_common::{Result, ScoutError};

use super::{json_f64, json_str, json_u32, ListingSource};

pub struct RedfinSource {
    client: SourceClient,
    base_url: String,
    blob_re: Regex,
}

impl RedfinSource {
    pub fn new(client: SourceClient, base_url: String) -> Self {
        Self {
            client,
            base_url,
            blob_re: Regex::new(r"JSONData:\s*(\{.*\})").expect("static regex"),
        }
    }
}

#[async_trait]
impl ListingSource for RedfinSource {
    fn id(&self) -> SourceId {
        SourceId::Redfin
    }

    #[instrument(skip(self))]
    async fn fetch(&self, zip_code: &str) -> Result<Vec<RawListing>> {
        let url = format!("{}/zipcode/{}", self.base_url, zip_code);
        let html = self.client.get_text(&url).await?;
        let listings = parse_search_page(&self.blob_re, &html, zip_code)?;
        debug!(count = listings.len(), "redfin search returned listings");
        Ok(listings)
    }
}

fn parse_search_page(blob_re: &Regex, html: &str, zip_code: &str) -> Result<Vec<RawListing>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script").expect("static selector");

    let data = document
        .select(&selector)
        .filter_map(|script| {
            let text: String = script.text().collect();
            if !text.contains("RF.reactBootstrap") {
                return None;
            }
            let captures = blob_re.captures(&text)?;
            serde_json::from_str::<serde_json::Value>(captures.get(1)?.as_str()).ok()
        })
        .next()
        .ok_or_else(|| ScoutError::SourceUnavailable {
            source_name: SourceId::Redfin.as_str().to_string(),
            reason: "bootstrap data blob not found".to_string(),
        })?;

    let homes = data["homes"].as_array().cloned().unwrap_or_default();

    let mut listings = Vec::with_capacity(homes.len());
    for home in &homes {
        match parse_listing(home, zip_code) {
            Ok(listing) => listings.push(listing),
            Err(e) => warn!(error = %e, "skipping malformed redfin record"),
        }
    }
    Ok(listings)
}

fn parse_listing(home: &serde_json::Value, zip_code: &str) -> Result<RawListing> {
    let address = json_str(&home["address"]);
    if address.trim().is_empty() {
        return Err(ScoutError::Parse("listing has no address".into()));
    }

    Ok(RawListing {
        source: SourceId::Redfin,
        source_listing_id: home["propertyId"].as_u64().map(|n| n.to_string()),
        address,
        zip_code: zip_code.to_string(),
        price: json_f64(&home["price"]),
        square_feet: json_f64(&home["sqFt"]),
        days_on_market: json_u32(&home["daysOnMarket"]),
        price_drops: json_u32(&home["priceDrops"]),
        property_type: json_str(&home["propertyType"]).to_lowercase(),
        listing_agent: json_str(&home["listingAgent"]),
        tax_assessed_value: json_f64(&home["taxAssessedValue"]),
        owner_status: OwnerStatus::Unknown,
        pre_foreclosure: None,
    })
}
