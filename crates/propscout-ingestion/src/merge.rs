//! Cross-source merge and deduplication.
//!
//! Listings from different sources describing the same property are folded
//! into one canonical record per normalized address. The fold is
//! deterministic for a fixed input order: fill-gap fields are
//! order-insensitive when only one source supplies a value, while the
//! tie-break fields resolve the same way regardless of which source is
//! richer (lowest price, longest time on market, most observed drops).

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

use propscout_common::entities::{normalize_address, MergedListing, RawListing};

/// Fold raw listings into one `MergedListing` per distinct address.
///
/// Records with an empty (after trimming) address are dropped before
/// grouping: address is the dedup key, and a shared empty key would merge
/// unrelated properties into one spurious record.
pub fn merge(listings: &[RawListing]) -> Vec<MergedListing> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, MergedListing> = HashMap::new();
    let mut dropped = 0usize;

    for raw in listings {
        let key = normalize_address(&raw.address);
        if key.is_empty() {
            dropped += 1;
            continue;
        }
        match groups.entry(key) {
            Entry::Occupied(mut entry) => fold_into(entry.get_mut(), raw),
            Entry::Vacant(entry) => {
                order.push(entry.key().clone());
                entry.insert(MergedListing::from_raw(raw));
            }
        }
    }

    if dropped > 0 {
        debug!(dropped, "dropped address-less records before grouping");
    }

    order.into_iter().filter_map(|key| groups.remove(&key)).collect()
}

/// Reconcile one incoming record into the group accumulator.
fn fold_into(acc: &mut MergedListing, raw: &RawListing) {
    // fill-gap fields: adopt the incoming value only where the accumulator
    // has none
    if acc.zip_code.is_empty() && !raw.zip_code.is_empty() {
        acc.zip_code = raw.zip_code.clone();
    }
    if acc.property_type.is_empty() && !raw.property_type.is_empty() {
        acc.property_type = raw.property_type.clone();
    }
    if acc.listing_agent.is_empty() && !raw.listing_agent.is_empty() {
        acc.listing_agent = raw.listing_agent.clone();
    }
    if acc.tax_assessed_value == 0.0 && raw.tax_assessed_value != 0.0 {
        acc.tax_assessed_value = raw.tax_assessed_value;
    }
    if acc.square_feet == 0.0 && raw.square_feet != 0.0 {
        acc.square_feet = raw.square_feet;
    }
    if !acc.owner_status.is_known() && raw.owner_status.is_known() {
        acc.owner_status = raw.owner_status;
    }

    // lowest listed price across sources wins
    if raw.price > 0.0 && (acc.price == 0.0 || raw.price < acc.price) {
        acc.price = raw.price;
    }

    // longest observed time on market wins
    if raw.days_on_market > acc.days_on_market {
        acc.days_on_market = raw.days_on_market;
    }

    acc.price_drops = acc.price_drops.max(raw.price_drops);

    // a positive foreclosure observation from any source survives a
    // negative one from a source of unknown completeness
    acc.pre_foreclosure = match (acc.pre_foreclosure, raw.pre_foreclosure) {
        (None, incoming) => incoming,
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), _) => Some(false),
    };
}
