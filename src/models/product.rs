use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use super::price::{BackendPriceRange, PriceRange};
use crate::error::PriceError;

/// SKU → display price
pub type PriceMap = HashMap<String, PriceRange>;

/// Envelope of the `products` query
#[derive(Debug, Default, Deserialize)]
pub struct ProductsResponse {
    #[serde(default)]
    pub data: Option<ProductsData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductsData {
    #[serde(default)]
    pub products: Option<ProductList>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductList {
    #[serde(default)]
    pub items: Vec<ProductItem>,
}

/// One product price record; composite types carry child records
#[derive(Debug, Clone, Deserialize)]
pub struct ProductItem {
    pub sku: String,
    #[serde(rename = "__typename", default)]
    pub typename: Option<String>,
    #[serde(default)]
    pub price_range: Option<BackendPriceRange>,
    /// `ConfigurableProduct` variants
    #[serde(default)]
    pub variants: Option<Vec<ProductChild>>,
    /// `GroupedProduct` items
    #[serde(default)]
    pub items: Option<Vec<ProductChild>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductChild {
    #[serde(default)]
    pub product: Option<ChildProduct>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChildProduct {
    pub sku: String,
    #[serde(default)]
    pub price_range: Option<BackendPriceRange>,
}

impl ProductsResponse {
    /// Decode a raw GraphQL payload. A missing `data.products` is an empty list.
    pub fn from_value(value: Value) -> Result<Self, PriceError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn items(&self) -> &[ProductItem] {
        self.data
            .as_ref()
            .and_then(|d| d.products.as_ref())
            .map(|p| p.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn into_price_map(self) -> PriceMap {
        flatten_products(self.items())
    }
}

/// Flatten parents, configurable variants and grouped items into one map.
/// Records without a `price_range` are skipped.
pub fn flatten_products(items: &[ProductItem]) -> PriceMap {
    let mut prices = PriceMap::new();

    for item in items {
        if let Some(range) = &item.price_range {
            prices.insert(item.sku.clone(), PriceRange::from_backend(range));
        }

        let children = item
            .variants
            .iter()
            .flatten()
            .chain(item.items.iter().flatten())
            .filter_map(|child| child.product.as_ref());

        for child in children {
            if let Some(range) = &child.price_range {
                prices.insert(child.sku.clone(), PriceRange::from_backend(range));
            }
        }
    }

    prices
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn price(value: f64) -> Value {
        json!({
            "minimum_price": {
                "regular_price": { "value": value, "currency": "USD" },
                "final_price": { "value": value, "currency": "USD" },
                "discount": { "amount_off": 0, "percent_off": 0 }
            },
            "maximum_price": {
                "regular_price": { "value": value, "currency": "USD" },
                "final_price": { "value": value, "currency": "USD" },
                "discount": { "amount_off": 0, "percent_off": 0 }
            }
        })
    }

    #[test]
    fn grouped_items_are_flattened_next_to_parent() {
        let response = ProductsResponse::from_value(json!({
            "data": { "products": { "items": [{
                "__typename": "GroupedProduct",
                "sku": "sku-d",
                "price_range": price(14.0),
                "items": [
                    { "product": { "sku": "sku1", "price_range": price(14.0) } },
                    { "product": { "sku": "sku2", "price_range": price(17.0) } }
                ]
            }]}}
        }))
        .unwrap();

        let prices = response.into_price_map();
        assert_eq!(prices.len(), 3);
        assert_eq!(prices["sku1"].final_price, 14.0);
        assert_eq!(prices["sku2"].final_price, 17.0);
        assert!(prices.contains_key("sku-d"));
    }

    #[test]
    fn configurable_variants_are_flattened() {
        let response = ProductsResponse::from_value(json!({
            "data": { "products": { "items": [{
                "__typename": "ConfigurableProduct",
                "sku": "sku-b",
                "price_range": price(123.45),
                "variants": [
                    { "product": { "sku": "sku-b-red", "price_range": price(123.45) } },
                    { "product": null }
                ]
            }]}}
        }))
        .unwrap();

        let prices = response.into_price_map();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices["sku-b-red"].final_price, 123.45);
    }

    #[test]
    fn missing_products_yield_empty_map() {
        let response = ProductsResponse::from_value(json!({ "data": null })).unwrap();
        assert!(response.into_price_map().is_empty());
    }

    #[test]
    fn wrong_item_shape_is_a_decode_error() {
        let err = ProductsResponse::from_value(json!({
            "data": { "products": { "items": [{ "price_range": null }] } }
        }))
        .unwrap_err();
        assert!(matches!(err, PriceError::Decode(_)));
    }
}
