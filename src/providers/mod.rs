//! Backend transports

pub mod http_transport;

// Re-export for convenience
pub use http_transport::{HttpGraphqlTransport, HttpMethod, TransportConfig};
