//! Query codec: maps [`BrowseQuery`] to and from URL-style parameters.
//!
//! Encoding is canonical. Parameters equal to their default are omitted so
//! reset URLs stay short, except `page` and `per_page`, which are always
//! written so pagination links are self-contained. Decoding never fails:
//! malformed values fall back to defaults.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::defaults;
use crate::models::{BrowseQuery, BrowseSort, ProductType};

/// Parameter names understood by the browse endpoint.
pub mod param {
    pub const QUERY: &str = "query";
    /// Form alias for [`QUERY`] accepted when decoding.
    pub const QUERY_ALIAS: &str = "q";
    pub const CATEGORY: &str = "category";
    pub const BRAND: &str = "brand";
    pub const CITY: &str = "city";
    pub const TYPE: &str = "type";
    pub const MIN_PRICE: &str = "min_price";
    pub const MAX_PRICE: &str = "max_price";
    pub const MIN_DURATION: &str = "min_duration";
    pub const MAX_DURATION: &str = "max_duration";
    pub const SORT: &str = "sort";
    pub const LANG: &str = "lang";
    pub const PAGE: &str = "page";
    pub const PER_PAGE: &str = "per_page";
}

// =============================================================================
// PARAMETER SET
// =============================================================================

/// Ordered multimap of string parameters, like a URL search string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter, keeping earlier values for the same key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Replace every value for `key` with a single one, keeping its position.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter().position(|(k, _)| k == key) {
            Some(idx) => {
                self.0[idx].1 = value;
                let mut seen_first = false;
                self.0.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    let keep = !seen_first;
                    seen_first = true;
                    keep
                });
            }
            None => self.0.push((key.to_string(), value)),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.0.retain(|(k, _)| k != key);
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Display for QueryParams {
    /// Percent-encoded `key=value&...` form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", urlencoding::encode(k), urlencoding::encode(v))?;
        }
        Ok(())
    }
}

// =============================================================================
// ENCODE
// =============================================================================

/// Format a decimal bound without a trailing `.0` for whole numbers.
fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Canonical parameter set for a query.
pub fn encode(query: &BrowseQuery) -> QueryParams {
    let mut params = QueryParams::new();

    if let Some(text) = &query.text_query {
        params.append(param::QUERY, text.as_str());
    }
    if let Some(category) = &query.category {
        params.append(param::CATEGORY, category.as_str());
    }
    if let Some(brand) = &query.brand {
        params.append(param::BRAND, brand.as_str());
    }
    if let Some(city) = &query.city {
        params.append(param::CITY, city.as_str());
    }
    if query.product_type != ProductType::Any {
        params.append(param::TYPE, query.product_type.as_str());
    }
    if let Some(min) = query.min_price {
        params.append(param::MIN_PRICE, format_decimal(min));
    }
    if let Some(max) = query.max_price {
        params.append(param::MAX_PRICE, format_decimal(max));
    }
    if let Some(min) = query.min_duration {
        params.append(param::MIN_DURATION, min.to_string());
    }
    if let Some(max) = query.max_duration {
        params.append(param::MAX_DURATION, max.to_string());
    }
    if query.sort != BrowseSort::PriceAsc {
        params.append(param::SORT, query.sort.as_str());
    }
    params.append(param::PAGE, query.page.to_string());
    params.append(param::PER_PAGE, query.per_page.to_string());

    params
}

/// Parameters for a pagination link to `page`, filters unchanged.
pub fn link_params(query: &BrowseQuery, page: u32) -> QueryParams {
    encode(&query.clone().with_page(page))
}

// =============================================================================
// DECODE
// =============================================================================

fn text_param(params: &QueryParams, key: &str) -> Option<String> {
    params
        .get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn decimal_param(params: &QueryParams, key: &str) -> Option<f64> {
    let raw = params.get(key)?.trim();
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
        _ => {
            if !raw.is_empty() {
                debug!(param = key, value = raw, "Ignoring invalid decimal parameter");
            }
            None
        }
    }
}

fn count_param(params: &QueryParams, key: &str) -> Option<u32> {
    let raw = params.get(key)?.trim();
    match raw.parse::<u32>() {
        Ok(v) => Some(v),
        Err(_) => {
            if !raw.is_empty() {
                debug!(param = key, value = raw, "Ignoring invalid integer parameter");
            }
            None
        }
    }
}

/// Positive integer or `default`, capped at `max`.
fn positive_param(params: &QueryParams, key: &str, default: u32, max: u32) -> u32 {
    match params.get(key).map(str::trim) {
        None | Some("") => default,
        Some(raw) => match raw.parse::<i64>() {
            Ok(v) if v >= 1 => u32::try_from(v).unwrap_or(max).min(max),
            _ => {
                debug!(param = key, value = raw, default, "Defaulting invalid pagination parameter");
                default
            }
        },
    }
}

/// Build a query from request parameters. Never fails.
pub fn decode(params: &QueryParams) -> BrowseQuery {
    let text_query =
        text_param(params, param::QUERY).or_else(|| text_param(params, param::QUERY_ALIAS));

    BrowseQuery {
        text_query,
        category: text_param(params, param::CATEGORY),
        brand: text_param(params, param::BRAND),
        city: text_param(params, param::CITY),
        product_type: params
            .get(param::TYPE)
            .map(ProductType::from_param)
            .unwrap_or_default(),
        min_price: decimal_param(params, param::MIN_PRICE),
        max_price: decimal_param(params, param::MAX_PRICE),
        min_duration: count_param(params, param::MIN_DURATION),
        max_duration: count_param(params, param::MAX_DURATION),
        page: positive_param(params, param::PAGE, defaults::PAGE, u32::MAX),
        per_page: positive_param(
            params,
            param::PER_PAGE,
            defaults::PER_PAGE,
            defaults::MAX_PER_PAGE,
        ),
        sort: params
            .get(param::SORT)
            .map(BrowseSort::from_param)
            .unwrap_or_default(),
    }
}
