use serde::{Deserialize, Serialize};

use crate::utils::helper::{round_to_cents, same_cents};

/// `price_range` object as returned by the commerce backend
#[derive(Debug, Clone, Deserialize)]
pub struct BackendPriceRange {
    pub minimum_price: BackendProductPrice,
    #[serde(default)]
    pub maximum_price: Option<BackendProductPrice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendProductPrice {
    pub regular_price: Money,
    pub final_price: Money,
    #[serde(default)]
    pub discount: Option<ProductDiscount>,
}

/// Amount and currency; both nullable on the backend
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Money {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductDiscount {
    #[serde(default)]
    pub amount_off: Option<f64>,
    #[serde(default)]
    pub percent_off: Option<f64>,
}

impl ProductDiscount {
    fn amounts(discount: Option<&ProductDiscount>) -> (f64, f64) {
        discount
            .map(|d| (d.amount_off.unwrap_or(0.0), d.percent_off.unwrap_or(0.0)))
            .unwrap_or((0.0, 0.0))
    }
}

/// Flat display model of a product price
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub currency: String,
    pub regular_price: f64,
    pub final_price: f64,
    pub discount_amount: f64,
    pub discount_percent: f64,
    pub discounted: bool,
    pub range: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_price_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_price_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent_max: Option<f64>,
}

impl PriceRange {
    /// Normalize a backend `price_range` into the display model.
    ///
    /// The `*_max` fields are only filled in when the minimum and maximum
    /// final prices differ at cent precision.
    pub fn from_backend(price_range: &BackendPriceRange) -> Self {
        let min = &price_range.minimum_price;
        let (discount_amount, discount_percent) = ProductDiscount::amounts(min.discount.as_ref());
        let final_price = min.final_price.value.unwrap_or(0.0);

        let currency = min
            .final_price
            .currency
            .clone()
            .or_else(|| min.regular_price.currency.clone())
            .unwrap_or_default();

        let mut price = Self {
            currency,
            regular_price: min.regular_price.value.unwrap_or(0.0),
            final_price,
            discount_amount,
            discount_percent,
            discounted: discount_amount > 0.0,
            range: false,
            regular_price_max: None,
            final_price_max: None,
            discount_amount_max: None,
            discount_percent_max: None,
        };

        if let Some(max) = &price_range.maximum_price {
            let final_price_max = max.final_price.value.unwrap_or(final_price);
            if !same_cents(final_price, final_price_max) {
                let (amount_max, percent_max) = ProductDiscount::amounts(max.discount.as_ref());
                price.range = true;
                price.regular_price_max = max.regular_price.value;
                price.final_price_max = Some(final_price_max);
                price.discount_amount_max = Some(amount_max);
                price.discount_percent_max = Some(percent_max);
            }
        }

        price
    }

    /// Human readable price, e.g. `USD 118.00` or `USD 123.45 - USD 150.45`
    pub fn formatted(&self) -> String {
        let min = format!("{} {:.2}", self.currency, round_to_cents(self.final_price));
        match self.final_price_max {
            Some(max) if self.range => {
                format!("{} - {} {:.2}", min, self.currency, round_to_cents(max))
            }
            _ => min,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> BackendPriceRange {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn simple_price_is_not_a_range() {
        let backend = parse(json!({
            "minimum_price": {
                "regular_price": { "value": 118, "currency": "USD" },
                "final_price": { "value": 118, "currency": "USD" },
                "discount": { "amount_off": 0, "percent_off": 0 }
            },
            "maximum_price": {
                "regular_price": { "value": 118, "currency": "USD" },
                "final_price": { "value": 118, "currency": "USD" },
                "discount": { "amount_off": 0, "percent_off": 0 }
            }
        }));

        let price = PriceRange::from_backend(&backend);
        assert_eq!(price.currency, "USD");
        assert_eq!(price.final_price, 118.0);
        assert!(!price.range);
        assert!(!price.discounted);
        assert_eq!(price.final_price_max, None);
        assert_eq!(price.formatted(), "USD 118.00");
    }

    #[test]
    fn differing_final_prices_make_a_range() {
        let backend = parse(json!({
            "minimum_price": {
                "regular_price": { "value": 123.45, "currency": "USD" },
                "final_price": { "value": 123.45, "currency": "USD" },
                "discount": { "amount_off": 0, "percent_off": 0 }
            },
            "maximum_price": {
                "regular_price": { "value": 150.45, "currency": "USD" },
                "final_price": { "value": 150.45, "currency": "USD" },
                "discount": { "amount_off": 0, "percent_off": 0 }
            }
        }));

        let price = PriceRange::from_backend(&backend);
        assert!(price.range);
        assert_eq!(price.final_price, 123.45);
        assert_eq!(price.final_price_max, Some(150.45));
        assert_eq!(price.regular_price_max, Some(150.45));
        assert_eq!(price.formatted(), "USD 123.45 - USD 150.45");
    }

    #[test]
    fn sub_cent_difference_is_not_a_range() {
        let backend = parse(json!({
            "minimum_price": {
                "regular_price": { "value": 10.001, "currency": "EUR" },
                "final_price": { "value": 10.001, "currency": "EUR" }
            },
            "maximum_price": {
                "regular_price": { "value": 10.004, "currency": "EUR" },
                "final_price": { "value": 10.004, "currency": "EUR" }
            }
        }));

        let price = PriceRange::from_backend(&backend);
        assert!(!price.range);
        assert_eq!(price.discount_amount, 0.0);
    }

    #[test]
    fn discount_marks_price_discounted() {
        let backend = parse(json!({
            "minimum_price": {
                "regular_price": { "value": 20, "currency": "USD" },
                "final_price": { "value": 15, "currency": "USD" },
                "discount": { "amount_off": 5, "percent_off": 25 }
            }
        }));

        let price = PriceRange::from_backend(&backend);
        assert!(price.discounted);
        assert_eq!(price.discount_amount, 5.0);
        assert_eq!(price.discount_percent, 25.0);
        assert!(!price.range);
    }

    #[test]
    fn serializes_camel_case_without_empty_max_fields() {
        let backend = parse(json!({
            "minimum_price": {
                "regular_price": { "value": 14, "currency": "USD" },
                "final_price": { "value": 14, "currency": "USD" }
            }
        }));

        let value = serde_json::to_value(PriceRange::from_backend(&backend)).unwrap();
        assert_eq!(value["finalPrice"], json!(14.0));
        assert_eq!(value["regularPrice"], json!(14.0));
        assert!(value.get("finalPriceMax").is_none());
    }
}
