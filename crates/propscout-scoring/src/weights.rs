//! Tunable thresholds and point values for the motivation heuristic.

use serde::{Deserialize, Serialize};

/// Scoring knobs. The defaults are the expert priors the heuristic was
/// calibrated with; overrides come from configuration, never from code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Days-on-market tiers: strictly-greater-than thresholds.
    pub dom_short_threshold: u32,
    pub dom_medium_threshold: u32,
    pub dom_long_threshold: u32,
    pub dom_short_points: f64,
    pub dom_medium_points: f64,
    pub dom_long_points: f64,

    /// Points per observed price reduction, and the cap on the total.
    pub price_drop_points: f64,
    pub price_drop_cap: f64,

    /// Cap on the below-assessed-value discount contribution.
    pub below_assessed_cap: f64,

    pub absentee_points: f64,
    pub pre_foreclosure_points: f64,

    /// Offer = comp price-per-sqft average × discount × subject sqft.
    pub offer_discount: f64,
    /// Flat rehab estimate per square foot.
    pub repair_cost_per_sqft: f64,
    /// Resale estimate when no comps exist: list price × markup.
    pub resale_markup: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            dom_short_threshold:  30,
            dom_medium_threshold: 60,
            dom_long_threshold:   90,
            dom_short_points:     10.0,
            dom_medium_points:    15.0,
            dom_long_points:      20.0,

            price_drop_points: 10.0,
            price_drop_cap:    20.0,

            below_assessed_cap: 15.0,

            absentee_points:        25.0,
            pre_foreclosure_points: 30.0,

            offer_discount:       0.85,
            repair_cost_per_sqft: 20.0,
            resale_markup:        1.3,
        }
    }
}

impl ScoreWeights {
    /// Sanity-check a configured override.
    pub fn validate(&self) -> bool {
        self.dom_short_threshold < self.dom_medium_threshold
            && self.dom_medium_threshold < self.dom_long_threshold
            && self.offer_discount > 0.0
            && self.offer_discount <= 1.0
            && self.price_drop_cap >= 0.0
            && self.below_assessed_cap >= 0.0
            && self.repair_cost_per_sqft >= 0.0
            && self.resale_markup >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_validate() {
        assert!(ScoreWeights::default().validate());
    }

    #[test]
    fn test_inverted_dom_tiers_rejected() {
        let w = ScoreWeights { dom_short_threshold: 95, ..Default::default() };
        assert!(!w.validate());
    }

    #[test]
    fn test_weights_round_trip_through_toml_shaped_json() {
        let w = ScoreWeights::default();
        let json = serde_json::to_string(&w).unwrap();
        let back: ScoreWeights = serde_json::from_str(&json).unwrap();
        assert_eq!(back.offer_discount, w.offer_discount);
        assert_eq!(back.dom_long_threshold, w.dom_long_threshold);
    }
}
