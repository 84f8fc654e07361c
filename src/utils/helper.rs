use std::collections::HashSet;

/// Drop repeated SKUs, keeping first-occurrence order
pub fn dedupe_skus<S: AsRef<str>>(skus: &[S]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(skus.len());
    skus.iter()
        .map(AsRef::as_ref)
        .filter(|sku| seen.insert(*sku))
        .map(str::to_string)
        .collect()
}

/// Round an amount to 2 decimals
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whether two amounts are equal once rounded to cents
pub fn same_cents(a: f64, b: f64) -> bool {
    (a * 100.0).round() == (b * 100.0).round()
}

/// Truncate a string to a maximum number of characters
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_keeps_first_occurrence_order() {
        let skus = ["b", "a", "b", "c", "a"];
        assert_eq!(dedupe_skus(&skus[..]), vec!["b", "a", "c"]);
    }

    #[test]
    fn cents_comparison() {
        assert!(same_cents(10.001, 10.004));
        assert!(!same_cents(123.45, 150.45));
        assert_eq!(round_to_cents(1.005 * 100.0), 100.5);
    }

    #[test]
    fn truncate_long_strings() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("abcdefghij", 6), "abc...");
    }
}
