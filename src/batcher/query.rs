const PRICE_FIELDS: &str = "regular_price { value currency } \
     final_price { value currency } \
     discount { amount_off percent_off }";

fn price_range_selection() -> String {
    format!(
        "price_range {{ minimum_price {{ {fields} }} maximum_price {{ {fields} }} }}",
        fields = PRICE_FIELDS
    )
}

/// Build the `products` price query for a set of SKUs.
///
/// Grouped item prices are always selected; configurable variant prices
/// only when `include_variants` is set. `pageSize` matches the SKU count so
/// the backend's default page size never truncates the list.
pub fn build_price_query(skus: &[String], include_variants: bool) -> String {
    let sku_list = skus
        .iter()
        .map(|sku| serde_json::Value::String(sku.clone()).to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let price_range = price_range_selection();

    let variants = if include_variants {
        format!(
            " ... on ConfigurableProduct {{ variants {{ product {{ sku {} }} }} }}",
            price_range
        )
    } else {
        String::new()
    };

    format!(
        "query {{ products(filter: {{ sku: {{ in: [{skus}] }} }}, pageSize: {size}) {{ \
         items {{ __typename sku {price_range} \
         ... on GroupedProduct {{ items {{ product {{ sku {price_range} }} }} }}{variants} }} }} }}",
        skus = sku_list,
        size = skus.len(),
        price_range = price_range,
        variants = variants,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skus(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn query_lists_skus_and_page_size() {
        let query = build_price_query(&skus(&["sku-a", "sku-b"]), false);
        assert!(query.contains(r#"in: ["sku-a", "sku-b"]"#));
        assert!(query.contains("pageSize: 2"));
        assert!(query.contains("... on GroupedProduct"));
        assert!(!query.contains("ConfigurableProduct"));
    }

    #[test]
    fn variants_are_selected_on_request() {
        let query = build_price_query(&skus(&["sku-b"]), true);
        assert!(query.contains("... on ConfigurableProduct { variants"));
    }

    #[test]
    fn sku_literals_are_escaped() {
        let query = build_price_query(&skus(&[r#"odd"sku\"#]), false);
        assert!(query.contains(r#"["odd\"sku\\"]"#));
    }

    #[test]
    fn braces_are_balanced() {
        let query = build_price_query(&skus(&["a"]), true);
        let open = query.matches('{').count();
        let close = query.matches('}').count();
        assert_eq!(open, close);
    }
}
