//! Request DTOs for the inventory API
//!
//! Query strings and JSON bodies, plus the defaults each endpoint applies
//! when a parameter is omitted.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{de, Deserialize, Deserializer};

use crate::models::{NewProduct, QuantityChange};

/// Days covered by the low-availability window when no end date is given.
pub const LOW_AVAILABILITY_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_THRESHOLD: i64 = 2;
pub const DEFAULT_DAYS_AHEAD: i32 = 7;

/// Query for `GET /api/inventory/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search_term: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl SearchParams {
    /// Availability window, defaulting to the calendar year containing `today`.
    pub fn window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let year = today.year();
        let start = self
            .start_date
            .or_else(|| NaiveDate::from_ymd_opt(year, 1, 1))
            .unwrap_or(today);
        let end = self
            .end_date
            .or_else(|| NaiveDate::from_ymd_opt(year, 12, 31))
            .unwrap_or(today);
        (start, end)
    }
}

/// Query for `GET /api/inventory/low-availability`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LowAvailabilityParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub threshold: Option<i64>,
}

impl LowAvailabilityParams {
    /// Window defaulting to `today` through `today + 30 days`.
    pub fn window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = self.start_date.unwrap_or(today);
        let end = self
            .end_date
            .unwrap_or(today + Duration::days(LOW_AVAILABILITY_WINDOW_DAYS));
        (start, end)
    }

    pub fn threshold(&self) -> i64 {
        self.threshold.unwrap_or(DEFAULT_THRESHOLD)
    }
}

/// Query for `GET /api/deliveries/schedule`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleParams {
    pub date: Option<NaiveDate>,
}

/// Query for `GET /api/returns/upcoming`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReturnsParams {
    pub days_ahead: Option<i32>,
}

impl ReturnsParams {
    pub fn days_ahead(&self) -> i32 {
        self.days_ahead.unwrap_or(DEFAULT_DAYS_AHEAD)
    }
}

/// Body for `POST /api/products`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub quantity: Option<i32>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub category_id: Option<i64>,
}

impl CreateProductRequest {
    pub const MISSING_FIELDS: &'static str =
        "Missing required fields: name, quantity, category_id";

    /// Returns the product to insert, or None when a required field is
    /// missing. Empty names and zero quantity or category count as missing.
    pub fn into_new_product(self) -> Option<NewProduct> {
        let name = self.name.filter(|n| !n.is_empty())?;
        let quantity = self.quantity.filter(|&q| q != 0)?;
        let category_id = self.category_id.filter(|&c| c != 0)?;

        Some(NewProduct {
            name,
            quantity,
            description: self.description,
            category_id,
        })
    }
}

/// Body for `PATCH /api/products/:sku/quantity`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuantityRequest {
    #[serde(default, deserialize_with = "number_or_string")]
    pub quantity: Option<i32>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub adjustment: Option<i32>,
}

impl QuantityRequest {
    pub const MISSING_FIELDS: &'static str = "Must provide either quantity or adjustment";

    /// An absolute quantity wins over an adjustment when both are sent.
    pub fn change(&self) -> Option<QuantityChange> {
        match (self.quantity, self.adjustment) {
            (Some(quantity), _) => Some(QuantityChange::Set(quantity)),
            (None, Some(delta)) => Some(QuantityChange::Adjust(delta)),
            (None, None) => None,
        }
    }
}

/// Body for `POST /api/cache/invalidate`
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    #[serde(default = "match_all")]
    pub pattern: String,
}

impl Default for InvalidateRequest {
    fn default() -> Self {
        Self {
            pattern: match_all(),
        }
    }
}

fn match_all() -> String {
    "*".to_string()
}

/// Deserializes an optional number sent either as a JSON number or as a
/// numeric string (HTML form inputs post strings). `null` and blank strings
/// read as absent.
pub(crate) fn number_or_string<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Number(T),
        Text(String),
    }

    match Option::<Raw<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s.trim().parse().map(Some).map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_search_window_defaults_to_calendar_year() {
        let params = SearchParams::default();
        assert_eq!(
            params.window(date("2025-06-15")),
            (date("2025-01-01"), date("2025-12-31"))
        );

        let params = SearchParams {
            start_date: Some(date("2025-03-01")),
            ..Default::default()
        };
        assert_eq!(
            params.window(date("2025-06-15")),
            (date("2025-03-01"), date("2025-12-31"))
        );
    }

    #[test]
    fn test_low_availability_defaults() {
        let params = LowAvailabilityParams::default();
        assert_eq!(
            params.window(date("2024-06-01")),
            (date("2024-06-01"), date("2024-07-01"))
        );
        assert_eq!(params.threshold(), 2);
    }

    #[test]
    fn test_create_request_requires_fields() {
        let json = r#"{"name": "Tent A", "quantity": 5, "category_id": 1}"#;
        let req: CreateProductRequest = serde_json::from_str(json).unwrap();
        let product = req.into_new_product().unwrap();
        assert_eq!(product.name, "Tent A");
        assert_eq!(product.quantity, 5);
        assert!(product.description.is_none());

        let missing: CreateProductRequest =
            serde_json::from_str(r#"{"name": "Tent A", "quantity": 5}"#).unwrap();
        assert!(missing.into_new_product().is_none());

        let zero: CreateProductRequest =
            serde_json::from_str(r#"{"name": "Tent A", "quantity": 0, "category_id": 1}"#)
                .unwrap();
        assert!(zero.into_new_product().is_none());

        let blank: CreateProductRequest =
            serde_json::from_str(r#"{"name": "", "quantity": 1, "category_id": 1}"#).unwrap();
        assert!(blank.into_new_product().is_none());
    }

    #[test]
    fn test_numeric_fields_accept_form_strings() {
        let req: CreateProductRequest = serde_json::from_str(
            r#"{"name": "Tent A", "quantity": "5", "category_id": "1", "description": ""}"#,
        )
        .unwrap();
        assert_eq!(req.quantity, Some(5));
        assert_eq!(req.category_id, Some(1));

        let blank: QuantityRequest =
            serde_json::from_str(r#"{"quantity": "", "adjustment": null}"#).unwrap();
        assert_eq!(blank.change(), None);

        let bad = serde_json::from_str::<QuantityRequest>(r#"{"quantity": "lots"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_quantity_request_precedence() {
        let both: QuantityRequest =
            serde_json::from_str(r#"{"quantity": 3, "adjustment": -1}"#).unwrap();
        assert_eq!(both.change(), Some(QuantityChange::Set(3)));

        let adjust: QuantityRequest = serde_json::from_str(r#"{"adjustment": -1}"#).unwrap();
        assert_eq!(adjust.change(), Some(QuantityChange::Adjust(-1)));

        let neither: QuantityRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(neither.change(), None);
    }

    #[test]
    fn test_invalidate_pattern_defaults_to_everything() {
        let req: InvalidateRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.pattern, "*");
    }
}
