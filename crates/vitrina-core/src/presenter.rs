//! Result presenter: price strings for catalog listings.

use crate::defaults;
use crate::models::CatalogItem;

/// Locale-aware number formatting seam.
///
/// The plain implementation groups thousands with a single space; a
/// locale-specific formatter can be swapped in by the rendering layer.
pub trait PriceFormatter: Send + Sync {
    /// Format an amount without currency.
    fn format_number(&self, amount: f64) -> String;

    /// Word prefixed to "starting at" prices.
    fn from_word(&self, locale: Option<&str>) -> &'static str {
        if is_serbian(locale) {
            "од"
        } else {
            "from"
        }
    }
}

/// Non-localized formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter;

impl PriceFormatter for PlainFormatter {
    fn format_number(&self, amount: f64) -> String {
        format_price(amount)
    }
}

fn is_serbian(locale: Option<&str>) -> bool {
    locale
        .and_then(|l| l.split(['-', '_']).next())
        .is_some_and(|primary| primary.eq_ignore_ascii_case("sr"))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(defaults::THOUSANDS_SEPARATOR);
        }
        out.push(c);
    }
    out
}

/// Group the integer part in threes; keep up to two decimals, trailing zeros
/// removed.
pub fn format_price(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }
    let fixed = format!("{:.2}", amount.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac.trim_end_matches('0');
    let is_zero = whole.bytes().all(|b| b == b'0') && frac.is_empty();
    let sign = if amount < 0.0 && !is_zero { "-" } else { "" };
    let whole = group_thousands(whole);

    if frac.is_empty() {
        format!("{}{}", sign, whole)
    } else {
        format!("{}{}.{}", sign, whole, frac)
    }
}

/// Price string for a listing using the plain formatter.
pub fn price_display(item: &CatalogItem, locale: Option<&str>) -> Option<String> {
    price_display_with(&PlainFormatter, item, locale)
}

/// Price string for a listing.
///
/// Services render "from min"; goods render the exact price when there is no
/// distinct upper bound, otherwise "min – max". Items without a minimum price
/// have no display.
pub fn price_display_with(
    formatter: &dyn PriceFormatter,
    item: &CatalogItem,
    locale: Option<&str>,
) -> Option<String> {
    let min = item.min_price?;
    let currency = item
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(defaults::CURRENCY);

    let amount = if item.is_service() {
        format!("{} {}", formatter.from_word(locale), formatter.format_number(min))
    } else {
        match item.max_price {
            Some(max) if max > min => format!(
                "{}{}{}",
                formatter.format_number(min),
                defaults::RANGE_SEPARATOR,
                formatter.format_number(max)
            ),
            _ => formatter.format_number(min),
        }
    };

    Some(format!("{} {}", amount, currency))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_grouping() {
        assert_eq!(format_price(0.0), "0");
        assert_eq!(format_price(999.0), "999");
        assert_eq!(format_price(1000.0), "1 000");
        assert_eq!(format_price(1234567.0), "1 234 567");
    }

    #[test]
    fn test_format_price_decimals() {
        assert_eq!(format_price(1500.5), "1 500.5");
        assert_eq!(format_price(1500.25), "1 500.25");
        assert_eq!(format_price(99.999), "100");
        assert_eq!(format_price(-1200.0), "-1 200");
        assert_eq!(format_price(-0.001), "0");
    }

    #[test]
    fn test_format_price_beyond_integer_range() {
        assert_eq!(format_price(1e20), "100 000 000 000 000 000 000");
        assert_eq!(format_price(2e17), "200 000 000 000 000 000");
    }

    #[test]
    fn test_good_exact_price() {
        let item = CatalogItem::good("p1", "Phone").with_prices(Some(1000.0), Some(1000.0));
        assert_eq!(price_display(&item, None).as_deref(), Some("1 000 RSD"));

        let item = CatalogItem::good("p2", "Phone").with_prices(Some(1000.0), None);
        assert_eq!(price_display(&item, None).as_deref(), Some("1 000 RSD"));
    }

    #[test]
    fn test_good_price_range() {
        let item = CatalogItem::good("p1", "Phone").with_prices(Some(1000.0), Some(2000.0));
        assert_eq!(price_display(&item, None).as_deref(), Some("1 000 – 2 000 RSD"));
    }

    #[test]
    fn test_inverted_range_uses_min() {
        let item = CatalogItem::good("p1", "Phone").with_prices(Some(2000.0), Some(1000.0));
        assert_eq!(price_display(&item, None).as_deref(), Some("2 000 RSD"));
    }

    #[test]
    fn test_service_always_from() {
        let item = CatalogItem::service("s1", "Haircut").with_prices(Some(1500.0), Some(1500.0));
        assert_eq!(price_display(&item, None).as_deref(), Some("from 1 500 RSD"));

        let item = CatalogItem::service("s2", "Repair").with_prices(Some(1500.0), Some(4000.0));
        assert_eq!(price_display(&item, Some("en")).as_deref(), Some("from 1 500 RSD"));
    }

    #[test]
    fn test_service_from_word_localized() {
        let item = CatalogItem::service("s1", "Šišanje").with_prices(Some(1500.0), None);
        assert_eq!(price_display(&item, Some("sr")).as_deref(), Some("од 1 500 RSD"));
        assert_eq!(price_display(&item, Some("sr-Latn")).as_deref(), Some("од 1 500 RSD"));
    }

    #[test]
    fn test_item_currency_overrides_default() {
        let mut item = CatalogItem::good("p1", "Phone").with_prices(Some(10.0), None);
        item.currency = Some("EUR".to_string());
        assert_eq!(price_display(&item, None).as_deref(), Some("10 EUR"));

        item.currency = Some(" ".to_string());
        assert_eq!(price_display(&item, None).as_deref(), Some("10 RSD"));
    }

    #[test]
    fn test_no_min_price_no_display() {
        let item = CatalogItem::good("p1", "Phone").with_prices(None, Some(10.0));
        assert_eq!(price_display(&item, None), None);
    }

    struct DotFormatter;

    impl PriceFormatter for DotFormatter {
        fn format_number(&self, amount: f64) -> String {
            format_price(amount).replace(' ', ".")
        }
    }

    #[test]
    fn test_custom_formatter() {
        let item = CatalogItem::good("p1", "TV").with_prices(Some(45000.0), Some(60000.0));
        assert_eq!(
            price_display_with(&DotFormatter, &item, None).as_deref(),
            Some("45.000 – 60.000 RSD")
        );
    }
}
