//! Listing persistence.
//!
//! Everything above this crate talks to the [`store::ListingStore`] trait;
//! the memory store backs tests and credential-less local runs, the
//! postgres store backs deployments.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::MemoryListingStore;
pub use postgres::PgListingStore;
pub use store::{ListingStore, StoredListing};
