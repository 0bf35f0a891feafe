use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

use super::Product;

/// Structured filters applied by the catalog before ranking
///
/// Browser clients send unset fields as empty strings and prices as either
/// numbers or numeric strings, so deserialization is lenient about both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilters {
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_price",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_price: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_price",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_price: Option<f64>,
}

impl ProductFilters {
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.min_price.is_none() && self.max_price.is_none()
    }

    /// Whether a product satisfies every filter that is set
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(color) = &self.color {
            if product.color.as_deref() != Some(color.as_str()) {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if product.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.price > max {
                return false;
            }
        }
        true
    }
}

/// Human-readable summary, e.g. `color="Red", minPrice=10, maxPrice=100`
impl Display for ProductFilters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if let Some(color) = &self.color {
            parts.push(format!("color=\"{}\"", color));
        }
        if let Some(min) = self.min_price {
            parts.push(format!("minPrice={}", min));
        }
        if let Some(max) = self.max_price {
            parts.push(format!("maxPrice={}", max));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// Query parameters for catalog listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub subcategory: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient_price")]
    pub min_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_price")]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

pub const DEFAULT_PAGE_LIMIT: i64 = 50;

impl ProductQuery {
    pub fn filters(&self) -> ProductFilters {
        ProductFilters {
            color: self.color.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(0)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Number(f64),
        Text(String),
    }

    match Option::<RawPrice>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawPrice::Number(n)) => Ok(Some(n)),
        Some(RawPrice::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(RawPrice::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid price {:?}: {}", s, e))),
    }
}
