//! Multi-source listing aggregation: source adapters, the concurrent fetch
//! orchestrator, the per-address merge engine, and the pipeline that drives
//! fetch → merge → persist → score for each requested postal code.

pub mod fetch;
pub mod merge;
pub mod pipeline;
pub mod sources;

pub use fetch::{FetchOrchestrator, FetchOutcome, SourceFailure};
pub use merge::merge;
pub use pipeline::{AggregationPipeline, SearchOutcome, SearchProgress};
