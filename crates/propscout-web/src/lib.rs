//! HTTP surface: thin request/response mapping over the aggregation
//! pipeline, the listing store, the CSV exporter, and outreach generation.

pub mod handlers;
pub mod router;
pub mod sse;
pub mod state;
