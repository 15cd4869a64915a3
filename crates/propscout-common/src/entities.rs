//! Core entity types shared by the ingestion, scoring, and storage crates.

use serde::{Deserialize, Serialize};

/// Address normalization used as the dedup/upsert key: case-insensitive,
/// surrounding whitespace trimmed.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

/// Invariant identity of an upstream listing source.
///
/// Downstream merge rules depend on knowing which source produced a record:
/// some sources observe occupancy or foreclosure status, others never do and
/// must report "unknown" rather than a false negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Zillow,
    Redfin,
    Realtor,
    Foreclosure,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Zillow      => "zillow",
            SourceId::Redfin      => "redfin",
            SourceId::Realtor     => "realtor",
            SourceId::Foreclosure => "foreclosure",
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Occupancy classification. `Unknown` is the gap value for merging:
/// a source that cannot observe occupancy must not claim `OwnerOccupied`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OwnerStatus {
    #[default]
    Unknown,
    OwnerOccupied,
    Absentee,
    Distressed,
}

impl OwnerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerStatus::Unknown       => "unknown",
            OwnerStatus::OwnerOccupied => "owner-occupied",
            OwnerStatus::Absentee      => "absentee",
            OwnerStatus::Distressed    => "distressed",
        }
    }

    /// Inverse of `as_str`; anything unrecognized degrades to `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "owner-occupied" => OwnerStatus::OwnerOccupied,
            "absentee"       => OwnerStatus::Absentee,
            "distressed"     => OwnerStatus::Distressed,
            _                => OwnerStatus::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, OwnerStatus::Unknown)
    }
}

/// One property's for-sale record as normalized by a single source adapter.
///
/// Any field may be missing or zero — upstream payloads are partially
/// populated. `pre_foreclosure: None` means the source cannot observe
/// foreclosure status at all, which is distinct from `Some(false)`.
/// Immutable once produced by an adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawListing {
    pub source: SourceId,
    pub source_listing_id: Option<String>,
    pub address: String,
    pub zip_code: String,
    pub price: f64,
    pub square_feet: f64,
    pub days_on_market: u32,
    pub price_drops: u32,
    pub property_type: String,
    pub listing_agent: String,
    pub tax_assessed_value: f64,
    pub owner_status: OwnerStatus,
    pub pre_foreclosure: Option<bool>,
}

/// Canonical per-address record produced by the merge engine.
///
/// For a fixed normalized address, at most one `MergedListing` exists per
/// aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedListing {
    pub address: String,
    pub zip_code: String,
    pub price: f64,
    pub square_feet: f64,
    pub days_on_market: u32,
    pub price_drops: u32,
    pub property_type: String,
    pub listing_agent: String,
    pub tax_assessed_value: f64,
    pub owner_status: OwnerStatus,
    pub pre_foreclosure: Option<bool>,
}

impl MergedListing {
    /// Seed a merge accumulator from the first record of a group.
    pub fn from_raw(raw: &RawListing) -> Self {
        Self {
            address: raw.address.clone(),
            zip_code: raw.zip_code.clone(),
            price: raw.price,
            square_feet: raw.square_feet,
            days_on_market: raw.days_on_market,
            price_drops: raw.price_drops,
            property_type: raw.property_type.clone(),
            listing_agent: raw.listing_agent.clone(),
            tax_assessed_value: raw.tax_assessed_value,
            owner_status: raw.owner_status,
            pre_foreclosure: raw.pre_foreclosure,
        }
    }
}

/// Search request: which postal codes to aggregate and which predicates to
/// apply to the scored result set. Bounds are inclusive; `property_type` is
/// an exact match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchFilter {
    pub zip_codes: Vec<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub max_days_on_market: Option<u32>,
}

impl SearchFilter {
    pub fn for_zip_codes<I, S>(zip_codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            zip_codes: zip_codes.into_iter().map(Into::into).collect(),
            property_type: None,
            min_price: None,
            max_price: None,
            max_days_on_market: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_round_trip() {
        for id in [SourceId::Zillow, SourceId::Redfin, SourceId::Realtor, SourceId::Foreclosure] {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
            let back: SourceId = serde_json::from_str(&json).unwrap();
            assert_eq!(back, id);
        }
    }

    #[test]
    fn test_owner_status_wire_form() {
        assert_eq!(
            serde_json::to_string(&OwnerStatus::OwnerOccupied).unwrap(),
            "\"owner-occupied\""
        );
        assert!(!OwnerStatus::Unknown.is_known());
        assert!(OwnerStatus::Distressed.is_known());
    }
}
