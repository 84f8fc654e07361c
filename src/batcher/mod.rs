//! Request coalescing for price lookups

pub mod price_batcher;
pub mod query;

// Re-export for convenience
pub use price_batcher::{BatcherConfig, PriceLookup, PriceRequestBatcher};
pub use query::build_price_query;
