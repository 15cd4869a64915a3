//! Zillow search-page adapter.
//!
//! The search results page embeds its state as an `application/json` script
//! blob; listings live under `cat1.searchResults.listResults`. This is the
//! only source that observes both occupancy and pre-foreclosure status.

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};

use propscout_common::entities::{OwnerStatus, RawListing, SourceId};
use propscout_common::http::SourceClient;
use propscout_common::{Result, ScoutError};

use super::{json_f64, json_str, json_u32, ListingSource};

pub struct ZillowSource {
    client: SourceClient,
    base_url: String,
}

impl ZillowSource {
    pub fn new(client: SourceClient, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl ListingSource for ZillowSource {
    fn id(&self) -> SourceId {
        SourceId::Zillow
    }

    #[instrument(skip(self))]
    async fn fetch(&self, zip_code: &str) -> Result<Vec<RawListing>> {
        let url = format!("{}/homes/{}_rb/", self.base_url, zip_code);
        let html = self.client.get_text(&url).await?;
        let listings = parse_search_page(&html, zip_code)?;
        debug!(count = listings.len(), "zillow search returned listings");
        Ok(listings)
    }
}

/// Pull the embedded state blob out of the page and normalize its listings.
fn parse_search_page(html: &str, zip_code: &str) -> Result<Vec<RawListing>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"script[type="application/json"]"#)
        .expect("static selector");

    let state = document
        .select(&selector)
        .filter_map(|script| {
            let text: String = script.text().collect();
            if !text.contains("searchPageState") {
                return None;
            }
            serde_json::from_str::<serde_json::Value>(&text).ok()
        })
        .next()
        .ok_or_else(|| ScoutError::SourceUnavailable {
            source_name: SourceId::Zillow.as_str().to_string(),
            reason: "search page state blob not found".to_string(),
        })?;

    let results = state["cat1"]["searchResults"]["listResults"]
        .as_array()
        .cloned()
        .unwrap_or_default();

    let mut listings = Vec::with_capacity(results.len());
    for item in &results {
        match parse_listing(item, zip_code) {
            Ok(listing) => listings.push(listing),
            Err(e) => warn!(error = %e, "skipping malformed zillow record"),
        }
    }
    Ok(listings)
}

fn parse_listing(item: &serde_json::Value, zip_code: &str) -> Result<RawListing> {
    let address = json_str(&item["address"]);
    if address.trim().is_empty() {
        return Err(ScoutError::Parse("listing has no address".into()));
    }

    let price_drops = item["priceHistory"]
        .as_array()
        .map(|history| {
            history
                .iter()
                .filter(|event| event["event"].as_str() == Some("Price reduction"))
                .count() as u32
        })
        .unwrap_or(0);

    let owner_status = if item["isNonOwnerOccupied"].as_bool() == Some(true) {
        OwnerStatus::Absentee
    } else {
        OwnerStatus::OwnerOccupied
    };

    Ok(RawListing {
        source: SourceId::Zillow,
        source_listing_id: item["zpid"].as_str().map(String::from).or_else(|| {
            item["zpid"].as_u64().map(|n| n.to_string())
        }),
        address,
        zip_code: zip_code.to_string(),
        price: json_f64(&item["price"]),
        square_feet: json_f64(&item["livingArea"]),
        days_on_market: json_u32(&item["daysOnZillow"]),
        price_drops,
        property_type: json_str(&item["homeType"]).to_lowercase(),
        listing_agent: json_str(&item["brokerName"]),
        tax_assessed_value: json_f64(&item["taxAssessedValue"]),
        owner_status,
        pre_foreclosure: Some(item["isPreforeclosureAuction"].as_bool().unwrap_or(false)),
    })
}
