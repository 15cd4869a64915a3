//! Outreach message generation against an OpenAI-compatible chat endpoint.
//!
//! Generation is best-effort: a missing credential, a failed request, or a
//! malformed response all fall back to the deterministic template. Callers
//! always get a message, never an error.

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use propscout_common::entities::MergedListing;
use propscout_config::LlmConfig;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("no API credential configured")]
    MissingCredential,
    #[error("API error [{status}]: {message}")]
    ApiError { status: u16, message: String },
    #[error("empty completion")]
    EmptyCompletion,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

pub struct OutreachGenerator {
    client: reqwest::Client,
    cfg: LlmConfig,
}

impl OutreachGenerator {
    pub fn new(cfg: LlmConfig) -> Self {
        Self { client: reqwest::Client::new(), cfg }
    }

    /// Draft an outreach message for one property. Infallible by contract:
    /// any generation failure degrades to the deterministic template.
    pub async fn generate(&self, listing: &MergedListing) -> String {
        match self.complete(listing).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, address = %listing.address, "generation failed, using template");
                fallback_message(listing)
            }
        }
    }

    async fn complete(&self, listing: &MergedListing) -> Result<String, LlmError> {
        let key = self.cfg.api_key.as_ref().ok_or(LlmError::MissingCredential)?;

        let url = format!("{}/v1/chat/completions", self.cfg.base_url);
        let body = serde_json::json!({
            "model": self.cfg.model,
            "messages": [
                Message {
                    role: "system".to_string(),
                    content: "You are a professional real estate investor crafting an \
                              outreach message."
                        .to_string(),
                },
                Message { role: "user".to_string(), content: build_prompt(listing) },
            ],
        });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let json: serde_json::Value = resp.json().await?;
        if status >= 400 {
            let message = json["error"]["message"]
                .as_str()
                .or_else(|| json["message"].as_str())
                .unwrap_or("unknown API error")
                .to_string();
            return Err(LlmError::ApiError { status, message });
        }

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .trim()
            .to_string();
        if content.is_empty() {
            return Err(LlmError::EmptyCompletion);
        }
        debug!(model = %self.cfg.model, "outreach message generated");
        Ok(content)
    }
}

fn build_prompt(listing: &MergedListing) -> String {
    format!(
        "Generate a professional and empathetic outreach message for a property owner.\n\
         \n\
         Property Details:\n\
         - Address: {}\n\
         - Days on Market: {}\n\
         - Current Price: ${:.2}\n\
         - Price Drops: {}\n\
         \n\
         The message should be friendly, professional, and highlight our ability to \
         provide a quick, cash transaction.",
        listing.address, listing.days_on_market, listing.price, listing.price_drops
    )
}

/// Deterministic fallback used whenever generation is unavailable.
pub fn fallback_message(listing: &MergedListing) -> String {
    format!(
        "Hi there,\n\n\
         I noticed your property at {} has been on the market for {} days. I'm a local \
         real estate investor specializing in providing quick, hassle-free cash offers \
         for properties in your area.\n\n\
         Would you be interested in discussing a potential offer? I can close quickly \
         and handle all the paperwork.\n\n\
         Looking forward to your response.\n\n\
         Best regards,\n\
         PropScout",
        listing.address, listing.days_on_market
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use propscout_common::entities::OwnerStatus;

    fn listing() -> MergedListing {
        MergedListing {
            address: "12 Oak St".to_string(),
            zip_code: "62704".to_string(),
            price: 300000.0,
            square_feet: 1500.0,
            days_on_market: 95,
            price_drops: 2,
            property_type: "single_family".to_string(),
            listing_agent: String::new(),
            tax_assessed_value: 0.0,
            owner_status: OwnerStatus::Unknown,
            pre_foreclosure: None,
        }
    }

    #[tokio::test]
    async fn test_missing_credential_falls_back_to_template() {
        let generator = OutreachGenerator::new(LlmConfig::default());
        let message = generator.generate(&listing()).await;
        assert_eq!(message, fallback_message(&listing()));
    }

    #[test]
    fn test_fallback_is_deterministic_and_names_the_property() {
        let a = fallback_message(&listing());
        let b = fallback_message(&listing());
        assert_eq!(a, b);
        assert!(a.contains("12 Oak St"));
        assert!(a.contains("95 days"));
    }

    #[test]
    fn test_prompt_carries_the_pricing_signals() {
        let prompt = build_prompt(&listing());
        assert!(prompt.contains("12 Oak St"));
        assert!(prompt.contains("$300000.00"));
        assert!(prompt.contains("Price Drops: 2"));
    }
}
