//! Seller-motivation scoring and deal valuation.
//!
//! Pure functions over merged listings — no I/O. Tunable thresholds and
//! point values live in [`weights::ScoreWeights`].

pub mod scorer;
pub mod weights;

pub use scorer::{estimated_roi, motivation_score, score_listing, suggested_offer, ScoredListing};
pub use weights::ScoreWeights;
