use async_trait::async_trait;
use serde_json::Value;

use crate::error::PriceError;

/// Executes a GraphQL query against the commerce backend.
///
/// Implementations own HTTP method, headers and auth. They must fail on a
/// non-2xx status and on a payload carrying an `errors` array.
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    /// Run a query and return the full response body
    async fn run_query(&self, query: &str) -> Result<Value, PriceError>;
}
