//! Motivation score, suggested offer, and ROI estimation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use propscout_common::entities::{MergedListing, OwnerStatus};

use crate::weights::ScoreWeights;

/// A merged listing with its computed deal metrics. Never mutated after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredListing {
    pub id: Uuid,
    #[serde(flatten)]
    pub listing: MergedListing,
    pub motivation_score: f64,
    pub suggested_offer: f64,
    pub estimated_roi: f64,
}

/// Heuristic 0–100 estimate of how likely the seller is to take a
/// below-market cash offer. Additive and order-independent; each signal
/// contributes independently and the total is clamped.
pub fn motivation_score(listing: &MergedListing, w: &ScoreWeights) -> f64 {
    let mut score = 0.0;

    let dom = listing.days_on_market;
    if dom > w.dom_long_threshold {
        score += w.dom_long_points;
    } else if dom > w.dom_medium_threshold {
        score += w.dom_medium_points;
    } else if dom > w.dom_short_threshold {
        score += w.dom_short_points;
    }

    if listing.price_drops > 0 {
        score += (listing.price_drops as f64 * w.price_drop_points).min(w.price_drop_cap);
    }

    // listed below assessed value; skipped entirely when no assessment exists
    if listing.tax_assessed_value > 0.0 && listing.price < listing.tax_assessed_value {
        let discount_pct = (listing.tax_assessed_value - listing.price)
            / listing.tax_assessed_value
            * 100.0;
        score += discount_pct.min(w.below_assessed_cap);
    }

    if listing.owner_status == OwnerStatus::Absentee {
        score += w.absentee_points;
    }

    if listing.pre_foreclosure == Some(true) {
        score += w.pre_foreclosure_points;
    }

    score.clamp(0.0, 100.0)
}

/// Cash offer suggestion.
///
/// With no usable comps this is exactly `price × offer_discount`. Otherwise
/// the average price-per-square-foot over comps with positive square
/// footage, discounted, times the subject's square footage.
pub fn suggested_offer(
    listing: &MergedListing,
    comps: &[MergedListing],
    w: &ScoreWeights,
) -> f64 {
    let fallback = listing.price * w.offer_discount;
    if comps.is_empty() {
        return fallback;
    }

    let mut total_ppsf = 0.0;
    let mut qualified = 0usize;
    for comp in comps {
        if comp.square_feet > 0.0 {
            total_ppsf += comp.price / comp.square_feet;
            qualified += 1;
        }
    }
    if qualified == 0 {
        return fallback;
    }

    let avg_ppsf = total_ppsf / qualified as f64;
    avg_ppsf * w.offer_discount * listing.square_feet
}

/// Percentage return on total investment (offer plus a flat per-sqft
/// rehab estimate) against the expected resale price. Zero total
/// investment yields 0.0 rather than a division by zero.
pub fn estimated_roi(
    listing: &MergedListing,
    offer_price: f64,
    comps: &[MergedListing],
    w: &ScoreWeights,
) -> f64 {
    let estimated_repairs = listing.square_feet * w.repair_cost_per_sqft;

    let resale_price = if comps.is_empty() {
        listing.price * w.resale_markup
    } else {
        comps.iter().map(|c| c.price).sum::<f64>() / comps.len() as f64
    };

    let total_investment = offer_price + estimated_repairs;
    if total_investment <= 0.0 {
        return 0.0;
    }

    (resale_price - total_investment) / total_investment * 100.0
}

/// Compute all three metrics for one stored listing.
pub fn score_listing(
    id: Uuid,
    listing: MergedListing,
    comps: &[MergedListing],
    w: &ScoreWeights,
) -> ScoredListing {
    let motivation = motivation_score(&listing, w);
    let offer = suggested_offer(&listing, comps, w);
    let roi = estimated_roi(&listing, offer, comps, w);
    ScoredListing {
        id,
        listing,
        motivation_score: motivation,
        suggested_offer: offer,
        estimated_roi: roi,
    }
}
