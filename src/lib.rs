//! Storefront Prices Library
//!
//! Batched, de-duplicated price lookups against a GraphQL commerce backend.

// Public modules - these are the API surface
pub mod batcher;
pub mod error;
pub mod models;
pub mod providers;
pub mod traits;
pub mod utils;

// Re-export commonly used items for easier access
pub use batcher::{BatcherConfig, PriceLookup, PriceRequestBatcher};
pub use error::PriceError;
pub use models::{PriceMap, PriceRange};
pub use providers::{HttpGraphqlTransport, HttpMethod, TransportConfig};
pub use traits::{GraphqlTransport, PriceProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias for library functions
pub type Result<T> = std::result::Result<T, anyhow::Error>;
