//! Upstream listing source adapters.

pub mod foreclosure;
pub mod realtor;
pub mod redfin;
pub mod zillow;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use propscout_common::entities::{RawListing, SourceId};
use propscout_common::http::SourceClient;
use propscout_common::Result;
use propscout_config::SourcesConfig;

/// Common interface for all listing source adapters.
///
/// `fetch` returns every listing the source has for a postal code,
/// normalized into `RawListing` and tagged with the adapter's identity.
/// A total source failure is an `Err` — the orchestrator captures it and
/// carries on with the remaining sources. A malformed individual record is
/// logged and skipped inside the adapter; siblings are unaffected.
#[async_trait]
pub trait ListingSource: Send + Sync {
    fn id(&self) -> SourceId;

    async fn fetch(&self, zip_code: &str) -> Result<Vec<RawListing>>;
}

/// Build the adapter registry from configuration.
///
/// API-backed sources without a credential are left unregistered rather
/// than registered-and-failing on every call.
pub fn build_sources(cfg: &SourcesConfig, client: &SourceClient) -> Vec<Arc<dyn ListingSource>> {
    let mut sources: Vec<Arc<dyn ListingSource>> = Vec::new();

    if cfg.zillow.enabled {
        sources.push(Arc::new(zillow::ZillowSource::new(
            client.clone(),
            cfg.zillow.base_url.clone(),
        )));
    }
    if cfg.redfin.enabled {
        sources.push(Arc::new(redfin::RedfinSource::new(
            client.clone(),
            cfg.redfin.base_url.clone(),
        )));
    }
    match &cfg.rapidapi_key {
        Some(key) => {
            if cfg.realtor.enabled {
                sources.push(Arc::new(realtor::RealtorSource::new(
                    client.clone(),
                    cfg.realtor.clone(),
                    key.clone(),
                )));
            }
            if cfg.foreclosure.enabled {
                sources.push(Arc::new(foreclosure::ForeclosureSource::new(
                    client.clone(),
                    cfg.foreclosure.clone(),
                    key.clone(),
                )));
            }
        }
        None => {
            if cfg.realtor.enabled || cfg.foreclosure.enabled {
                warn!("RAPIDAPI_KEY not set, API-backed sources disabled");
            }
        }
    }

    sources
}

// ── Payload helpers ───────────────────────────────────────────────────────────
//
// Upstream JSON is heterogeneous: numbers arrive as floats, integers, or
// numeric strings depending on the source and field.

pub(crate) fn json_f64(v: &serde_json::Value) -> f64 {
    match v {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().replace([',', '$'], "").parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

pub(crate) fn json_u32(v: &serde_json::Value) -> u32 {
    match v {
        serde_json::Value::Number(n) => n.as_u64().unwrap_or(0).min(u32::MAX as u64) as u32,
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

pub(crate) fn json_str(v: &serde_json::Value) -> String {
    v.as_str().unwrap_or("").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_f64_accepts_numbers_and_strings() {
        assert_eq!(json_f64(&json!(250000.5)), 250000.5);
        assert_eq!(json_f64(&json!(300000)), 300000.0);
        assert_eq!(json_f64(&json!("$1,250,000")), 1250000.0);
        assert_eq!(json_f64(&json!(null)), 0.0);
    }

    #[test]
    fn test_json_u32_clamps_garbage_to_zero() {
        assert_eq!(json_u32(&json!(42)), 42);
        assert_eq!(json_u32(&json!("17")), 17);
        assert_eq!(json_u32(&json!(-3)), 0);
        assert_eq!(json_u32(&json!({})), 0);
    }
}
