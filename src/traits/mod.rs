//! Core traits for the price integration

pub mod graphql_transport;
pub mod price_provider;

// Re-export for convenience
pub use graphql_transport::GraphqlTransport;
pub use price_provider::PriceProvider;
