//! Listing normalization.
//!
//! Converts one source-specific raw record (loosely-typed key/value
//! map) into the canonical `Listing`. Field-presence duck-typing from
//! the scrapers is replaced here by explicit optional fields with
//! defined fallbacks; the only hard requirements are a title and a
//! url. A price that cannot be parsed is `None`, never an error: a
//! missing price must not abort processing, it only disables the
//! price signal for that listing.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::NormalizationError;
use crate::types::{Listing, RawRecord};

/// Accepted raw keys per canonical field. Sources deliver either the
/// English or the Portuguese spelling depending on the marketplace API.
const TITLE_KEYS: &[&str] = &["title", "titulo"];
const URL_KEYS: &[&str] = &["url", "permalink", "link"];
const PRICE_KEYS: &[&str] = &["price", "preco", "price_text", "preco_str"];
const SELLER_KEYS: &[&str] = &["seller", "vendedor"];
const LOCATION_KEYS: &[&str] = &["location", "localizacao", "cidade", "city"];
const DESCRIPTION_KEYS: &[&str] = &["description", "descricao"];

/// A canonical listing plus the free-text description, which is kept
/// out of `Listing` but folded into the feature-scoring text.
#[derive(Clone, Debug)]
pub struct Normalized {
    pub listing: Listing,
    pub description: Option<String>,
}

impl Normalized {
    /// Text the feature scorer should scan: title plus description.
    pub fn scoring_text(&self) -> String {
        match &self.description {
            Some(desc) => format!("{} {}", self.listing.title, desc),
            None => self.listing.title.clone(),
        }
    }
}

/// Normalize one raw record for `source`.
///
/// Pure: no I/O, no shared state. Errors only on a missing or empty
/// title/url; everything else degrades to an optional field.
pub fn normalize(
    source: &str,
    record: &RawRecord,
    search_term: &str,
    fetched_at: DateTime<Utc>,
) -> Result<Normalized, NormalizationError> {
    let title = required_string(record, TITLE_KEYS, "title")?;
    let url = required_string(record, URL_KEYS, "url")?;
    let (price, raw_price_text) = extract_price(record);

    let listing = Listing {
        source: source.to_string(),
        title,
        price,
        raw_price_text,
        url,
        seller: optional_string(record, SELLER_KEYS),
        location: optional_string(record, LOCATION_KEYS),
        search_term: search_term.to_string(),
        fetched_at,
    };

    Ok(Normalized {
        listing,
        description: optional_string(record, DESCRIPTION_KEYS),
    })
}

/// Parse a human-written price string into a whole-currency amount.
///
/// Strips currency symbols and whitespace, then disambiguates
/// separators: a trailing `,dd` with exactly two digits is a decimal
/// separator (cents are truncated), as is a trailing `.dd` when a
/// comma appears earlier as grouping; any other `,`/`.` is thousands
/// grouping. Zero, negative, and digit-free inputs are `None`.
pub fn parse_price_text(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let negative = cleaned.starts_with('-');
    let body = cleaned.trim_matches(|c| matches!(c, ',' | '.' | '-'));

    let integer_part = match split_decimal(body) {
        Some(head) => head,
        None => body,
    };
    let digits: String = integer_part
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return None;
    }
    // Overflow on absurdly long digit runs is treated as unparsable.
    let value: i64 = digits.parse().ok()?;
    if negative || value == 0 {
        None
    } else {
        Some(value)
    }
}

/// Return the integer part when the body ends in a decimal group.
fn split_decimal(body: &str) -> Option<&str> {
    if let Some(idx) = body.rfind(',') {
        let tail = &body[idx + 1..];
        if tail.len() == 2 && tail.bytes().all(|b| b.is_ascii_digit()) {
            return Some(&body[..idx]);
        }
    }
    if let Some(idx) = body.rfind('.') {
        let tail = &body[idx + 1..];
        if tail.len() == 2
            && tail.bytes().all(|b| b.is_ascii_digit())
            && body[..idx].contains(',')
        {
            return Some(&body[..idx]);
        }
    }
    None
}

fn required_string(
    record: &RawRecord,
    keys: &[&str],
    canonical: &'static str,
) -> Result<String, NormalizationError> {
    for key in keys {
        if let Some(value) = record.get(*key) {
            if let Some(s) = value.as_str() {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(NormalizationError::EmptyField(canonical));
                }
                return Ok(trimmed.to_string());
            }
        }
    }
    Err(NormalizationError::MissingField(canonical))
}

fn optional_string(record: &RawRecord, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Pull the price out of whichever key the source used. API sources
/// deliver JSON numbers, scraped sources deliver display strings.
fn extract_price(record: &RawRecord) -> (Option<i64>, String) {
    for key in PRICE_KEYS {
        match record.get(*key) {
            Some(Value::Number(n)) => {
                let raw = n.to_string();
                let price = n
                    .as_f64()
                    .map(|f| f.trunc() as i64)
                    .filter(|v| *v > 0);
                return (price, raw);
            }
            Some(Value::String(s)) => {
                return (parse_price_text(s), s.clone());
            }
            _ => continue,
        }
    }
    (None, String::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(fields: serde_json::Value) -> RawRecord {
        fields.as_object().cloned().expect("test record is an object")
    }

    fn now() -> DateTime<Utc> {
        "2025-01-15T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn brazilian_thousands_grouping_parses() {
        assert_eq!(parse_price_text("R$ 2.499"), Some(2499));
        assert_eq!(parse_price_text("R$ 12.350"), Some(12_350));
    }

    #[test]
    fn trailing_comma_two_digits_is_decimal() {
        assert_eq!(parse_price_text("R$ 2.499,90"), Some(2499));
        assert_eq!(parse_price_text("1.234,00"), Some(1234));
        // One trailing digit is grouping, not a decimal.
        assert_eq!(parse_price_text("3,5"), Some(35));
    }

    #[test]
    fn mixed_en_us_format_parses() {
        assert_eq!(parse_price_text("$1,299.99"), Some(1299));
    }

    #[test]
    fn unparsable_zero_and_negative_prices_are_none() {
        assert_eq!(parse_price_text("preço a combinar"), None);
        assert_eq!(parse_price_text("R$ 0"), None);
        assert_eq!(parse_price_text("-500"), None);
        assert_eq!(parse_price_text(""), None);
    }

    #[test]
    fn normalizes_api_style_record() {
        let rec = record(json!({
            "titulo": "Notebook ASUS ROG Zephyrus M16",
            "preco": 2499,
            "permalink": "https://example.com/MLB-123",
            "vendedor": "techstore_sp",
            "cidade": "São Paulo",
        }));
        let n = normalize("mercadolivre", &rec, "ASUS ROG Zephyrus M16", now()).unwrap();
        assert_eq!(n.listing.title, "Notebook ASUS ROG Zephyrus M16");
        assert_eq!(n.listing.price, Some(2499));
        assert_eq!(n.listing.url, "https://example.com/MLB-123");
        assert_eq!(n.listing.seller.as_deref(), Some("techstore_sp"));
        assert_eq!(n.listing.location.as_deref(), Some("São Paulo"));
        assert_eq!(n.listing.search_term, "ASUS ROG Zephyrus M16");
    }

    #[test]
    fn normalizes_scraped_string_price() {
        let rec = record(json!({
            "title": "ASUS ROG GU604 usado",
            "price_text": "R$ 2.499,00",
            "url": "https://example.com/item/9",
        }));
        let n = normalize("olx", &rec, "gu604", now()).unwrap();
        assert_eq!(n.listing.price, Some(2499));
        assert_eq!(n.listing.raw_price_text, "R$ 2.499,00");
        assert!(n.listing.seller.is_none());
    }

    #[test]
    fn price_on_request_becomes_none_not_error() {
        let rec = record(json!({
            "title": "ASUS ROG Zephyrus M16 AniMe Matrix",
            "price_text": "preço a combinar",
            "url": "https://example.com/item/10",
        }));
        let n = normalize("olx", &rec, "anime matrix", now()).unwrap();
        assert_eq!(n.listing.price, None);
        assert_eq!(n.listing.raw_price_text, "preço a combinar");
    }

    #[test]
    fn missing_title_is_an_error() {
        let rec = record(json!({ "url": "https://example.com/item/11" }));
        let err = normalize("olx", &rec, "gu604", now()).unwrap_err();
        assert!(matches!(err, NormalizationError::MissingField("title")));
    }

    #[test]
    fn empty_url_is_an_error() {
        let rec = record(json!({ "title": "ASUS ROG", "url": "  " }));
        let err = normalize("olx", &rec, "gu604", now()).unwrap_err();
        assert!(matches!(err, NormalizationError::EmptyField("url")));
    }

    #[test]
    fn description_feeds_scoring_text_only() {
        let rec = record(json!({
            "title": "Notebook gamer",
            "url": "https://example.com/item/12",
            "descricao": "ASUS ROG Zephyrus M16 com AniMe Matrix",
        }));
        let n = normalize("enjoei", &rec, "notebook gamer", now()).unwrap();
        assert!(n.scoring_text().contains("AniMe Matrix"));
        assert_eq!(n.listing.title, "Notebook gamer");
    }

    #[test]
    fn zero_numeric_price_is_none() {
        let rec = record(json!({
            "title": "ASUS ROG",
            "url": "https://example.com/item/13",
            "price": 0,
        }));
        let n = normalize("ebay", &rec, "asus rog", now()).unwrap();
        assert_eq!(n.listing.price, None);
    }
}
