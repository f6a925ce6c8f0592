//! Cache Keys and TTL Policy
//!
//! Every cached endpoint derives its key from its name and query parameters,
//! under a prefix that invalidation can target with a single glob.

use std::fmt::Display;

use chrono::NaiveDate;

/// Prefix patterns cleared after any inventory write.
pub const INVENTORY_PATTERNS: [&str; 5] = [
    "inventory:*",
    "low-stock:*",
    "rentals:*",
    "returns:*",
    "deliveries:*",
];

/// Pattern for the product catalog list.
pub const CATALOG_PATTERN: &str = "products:*";

pub const PRODUCT_LIST: &str = "products:list:all";
pub const CATEGORY_LIST: &str = "categories:list:all";

// == TTL Policy ==
/// Endpoint categories and how long their results stay cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    InventorySearch,
    LowStock,
    CurrentRentals,
    UpcomingReturns,
    DeliverySchedule,
    Catalog,
}

impl CachePolicy {
    /// TTL in seconds.
    pub const fn ttl(self) -> u64 {
        match self {
            CachePolicy::InventorySearch => 300,
            CachePolicy::LowStock => 600,
            CachePolicy::CurrentRentals => 300,
            CachePolicy::UpcomingReturns => 7200,
            CachePolicy::DeliverySchedule => 300,
            CachePolicy::Catalog => 3600,
        }
    }
}

// == Key Builders ==
pub fn inventory_search(term: &str, start: NaiveDate, end: NaiveDate) -> String {
    format!("inventory:search:{}:{}:{}", term, start, end)
}

pub fn low_stock(start: NaiveDate, end: NaiveDate, threshold: impl Display) -> String {
    format!("low-stock:{}:{}:{}", start, end, threshold)
}

pub fn current_rentals(today: NaiveDate) -> String {
    format!("rentals:current:{}", today)
}

pub fn delivery_schedule(date: NaiveDate) -> String {
    format!("deliveries:schedule:{}", date)
}

pub fn upcoming_returns(days_ahead: impl Display) -> String {
    format!("returns:upcoming:{}", days_ahead)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::pattern::glob_match;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_key_formats() {
        assert_eq!(
            inventory_search("tent", date("2024-01-01"), date("2024-12-31")),
            "inventory:search:tent:2024-01-01:2024-12-31"
        );
        assert_eq!(
            low_stock(date("2024-06-01"), date("2024-07-01"), 2),
            "low-stock:2024-06-01:2024-07-01:2"
        );
        assert_eq!(current_rentals(date("2024-06-01")), "rentals:current:2024-06-01");
        assert_eq!(
            delivery_schedule(date("2024-06-01")),
            "deliveries:schedule:2024-06-01"
        );
        assert_eq!(upcoming_returns(7), "returns:upcoming:7");
    }

    #[test]
    fn test_every_inventory_key_is_covered_by_a_pattern() {
        let d = date("2024-06-01");
        let keys = [
            inventory_search("", d, d),
            low_stock(d, d, 2),
            current_rentals(d),
            delivery_schedule(d),
            upcoming_returns(7),
        ];

        for key in &keys {
            let hits = INVENTORY_PATTERNS
                .iter()
                .filter(|p| glob_match(p, key))
                .count();
            assert_eq!(hits, 1, "{key} should match exactly one pattern");
        }
    }

    #[test]
    fn test_catalog_keys_are_not_inventory_keys() {
        for pattern in INVENTORY_PATTERNS {
            assert!(!glob_match(pattern, PRODUCT_LIST));
            assert!(!glob_match(pattern, CATEGORY_LIST));
        }
        assert!(glob_match(CATALOG_PATTERN, PRODUCT_LIST));
        assert!(!glob_match(CATALOG_PATTERN, CATEGORY_LIST));
    }

    #[test]
    fn test_ttl_policy() {
        assert_eq!(CachePolicy::InventorySearch.ttl(), 300);
        assert_eq!(CachePolicy::LowStock.ttl(), 600);
        assert_eq!(CachePolicy::CurrentRentals.ttl(), 300);
        assert_eq!(CachePolicy::UpcomingReturns.ttl(), 7200);
        assert_eq!(CachePolicy::DeliverySchedule.ttl(), 300);
        assert_eq!(CachePolicy::Catalog.ttl(), 3600);
    }
}
