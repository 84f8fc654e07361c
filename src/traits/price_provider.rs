use async_trait::async_trait;

use crate::error::PriceError;
use crate::models::{PriceMap, PriceRange};

/// Trait for price lookups by SKU
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Get prices for a set of SKUs. Only requested SKUs appear in the map;
    /// SKUs the backend does not know are left out.
    async fn get_prices(
        &self,
        skus: &[String],
        include_variants: bool,
    ) -> Result<PriceMap, PriceError>;

    /// Get the price of a single SKU
    async fn get_price(&self, sku: &str) -> Result<Option<PriceRange>, PriceError> {
        let skus = [sku.to_string()];
        let mut prices = self.get_prices(&skus, false).await?;
        Ok(prices.remove(sku))
    }
}
