//! Product suggestion ranking for free-text queries

use serde::{Deserialize, Serialize};

use crate::models::{Product, StockedProduct};

/// Default cap on the number of suggestions shown under a line
pub const DEFAULT_SUGGESTION_LIMIT: usize = 15;

/// How a product matched a query, best first
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    ExactName,
    NamePrefix,
    NameContains,
    GenericName,
    Composition,
    Manufacturer,
    HsnCode,
    Tag,
    Category,
}

/// A ranked suggestion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductMatch {
    pub tier: MatchTier,
    #[serde(flatten)]
    pub product: StockedProduct,
}

fn contains(field: Option<&str>, needle: &str) -> bool {
    field.is_some_and(|value| value.to_lowercase().contains(needle))
}

/// Best tier at which a product matches the query, if any
pub fn match_tier(query: &str, product: &Product) -> Option<MatchTier> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let name = product.name.to_lowercase();
    if name == needle {
        return Some(MatchTier::ExactName);
    }
    if name.starts_with(&needle) {
        return Some(MatchTier::NamePrefix);
    }
    if name.contains(&needle) {
        return Some(MatchTier::NameContains);
    }
    if contains(product.generic_name.as_deref(), &needle) {
        return Some(MatchTier::GenericName);
    }
    if contains(product.composition.as_deref(), &needle) {
        return Some(MatchTier::Composition);
    }
    if contains(product.manufacturer.as_deref(), &needle) {
        return Some(MatchTier::Manufacturer);
    }

    let query_digits: String = needle.chars().filter(|c| c.is_ascii_digit()).collect();
    if !query_digits.is_empty()
        && product
            .hsn_code
            .as_deref()
            .is_some_and(|hsn| hsn.chars().filter(|c| c.is_ascii_digit()).collect::<String>().contains(&query_digits))
    {
        return Some(MatchTier::HsnCode);
    }

    if product.tags.iter().any(|tag| tag.to_lowercase().contains(&needle)) {
        return Some(MatchTier::Tag);
    }
    if contains(product.category.as_deref(), &needle) {
        return Some(MatchTier::Category);
    }

    None
}

/// Rank candidates for a query
///
/// Non-matching products are dropped. Within a tier, higher current stock
/// comes first, then name order.
pub fn rank_products(
    query: &str,
    candidates: impl IntoIterator<Item = StockedProduct>,
    limit: usize,
) -> Vec<ProductMatch> {
    let mut matches: Vec<ProductMatch> = candidates
        .into_iter()
        .filter_map(|product| {
            match_tier(query, &product.product).map(|tier| ProductMatch { tier, product })
        })
        .collect();

    matches.sort_by(|a, b| {
        a.tier
            .cmp(&b.tier)
            .then_with(|| b.product.stock.current_stock.cmp(&a.product.stock.current_stock))
            .then_with(|| a.product.product.name.cmp(&b.product.product.name))
    });
    matches.truncate(limit);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StockLevel;
    use uuid::Uuid;

    fn product(name: &str, stock: i64) -> StockedProduct {
        StockedProduct::new(
            Product::new(Uuid::new_v4(), name),
            StockLevel {
                current_stock: stock,
                min_stock: 0,
            },
        )
    }

    #[test]
    fn test_tier_order() {
        assert!(MatchTier::ExactName < MatchTier::NamePrefix);
        assert!(MatchTier::HsnCode < MatchTier::Tag);
        assert!(MatchTier::Tag < MatchTier::Category);
    }

    #[test]
    fn test_match_tier_fields() {
        let mut p = Product::new(Uuid::new_v4(), "Dolo 650");
        p.generic_name = Some("Paracetamol".to_string());
        p.composition = Some("Paracetamol 650mg".to_string());
        p.manufacturer = Some("Micro Labs".to_string());
        p.hsn_code = Some("3004.90".to_string());
        p.tags = vec!["Fever".to_string()];
        p.category = Some("Analgesic".to_string());

        assert_eq!(match_tier("dolo 650", &p), Some(MatchTier::ExactName));
        assert_eq!(match_tier("DOLO", &p), Some(MatchTier::NamePrefix));
        assert_eq!(match_tier("650", &p), Some(MatchTier::NameContains));
        assert_eq!(match_tier("paracet", &p), Some(MatchTier::GenericName));
        assert_eq!(match_tier("650mg", &p), Some(MatchTier::Composition));
        assert_eq!(match_tier("micro", &p), Some(MatchTier::Manufacturer));
        assert_eq!(match_tier("300490", &p), Some(MatchTier::HsnCode));
        assert_eq!(match_tier("fever", &p), Some(MatchTier::Tag));
        assert_eq!(match_tier("analges", &p), Some(MatchTier::Category));
        assert_eq!(match_tier("insulin", &p), None);
        assert_eq!(match_tier("   ", &p), None);
    }

    #[test]
    fn test_rank_prefers_tier_then_stock() {
        let ranked = rank_products(
            "cal",
            vec![
                product("Becosules Calcium", 50),
                product("Calpol", 5),
                product("Calcium Sandoz", 40),
                product("Cal", 0),
                product("Zinc", 100),
            ],
            DEFAULT_SUGGESTION_LIMIT,
        );

        let names: Vec<&str> = ranked.iter().map(|m| m.product.product.name.as_str()).collect();
        assert_eq!(names, vec!["Cal", "Calcium Sandoz", "Calpol", "Becosules Calcium"]);
    }

    #[test]
    fn test_rank_respects_limit() {
        let candidates = (0..30).map(|i| product(&format!("Vitamin {}", i), i));
        let ranked = rank_products("vitamin", candidates, 10);
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].product.stock.current_stock, 29);
    }

    #[test]
    fn test_no_candidates_is_empty() {
        assert!(rank_products("abc", Vec::new(), 10).is_empty());
    }
}
