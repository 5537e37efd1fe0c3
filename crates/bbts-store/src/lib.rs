//! Append-only CSV store for scraped listings.

pub mod error;
pub mod merge;

pub use error::StoreError;
pub use merge::{merge_into_store, MergeOutcome};
