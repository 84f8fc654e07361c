//! Data models for price lookups

pub mod price;
pub mod product;

// Re-export for convenience
pub use price::{BackendPriceRange, PriceRange};
pub use product::{flatten_products, PriceMap, ProductItem, ProductsResponse};
