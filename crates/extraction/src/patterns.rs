//! Deterministic pattern extraction.
//!
//! The floor of the pipeline: works with no model at all. Pulls the GSTIN,
//! a date, a quote/reference number and currency-like numeric tokens out of
//! raw OCR text. Amount tokens are ranked descending and assigned by rank:
//! largest → grand total, next → GST, next → subtotal. Line items are NOT
//! extracted here; free-text table reconstruction from OCR output proved
//! unreliable.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::QuoteDocument;

static GSTIN: LazyLock<Regex> = LazyLock::new(|| {
    // 2-digit state code, PAN, entity digit, 'Z', check character.
    Regex::new(r"\b\d{2}[A-Z]{5}\d{4}[A-Z][A-Z\d]Z[A-Z\d]\b").unwrap()
});

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2}[-/]\d{1,2}[-/]\d{2,4}|\d{4}-\d{2}-\d{2})\b").unwrap()
});

static QUOTE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:quotation|quote|ref(?:erence)?)\s*(?:no|number|#)?\s*[:.]?\s*([A-Za-z0-9][A-Za-z0-9/_-]*)")
        .unwrap()
});

static AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    // Currency-prefixed numbers, comma-grouped numbers, or bare decimals.
    Regex::new(
        r"(?i)(?:₹|rs\.?|inr)\s*([0-9][0-9,]*(?:\.[0-9]{1,2})?)|\b([0-9]{1,3}(?:,[0-9]{2,3})+(?:\.[0-9]{1,2})?)\b|\b([0-9]+\.[0-9]{1,2})\b",
    )
    .unwrap()
});

/// Extract what the patterns can find from raw OCR text.
pub fn extract_with_patterns(raw_text: &str) -> QuoteDocument {
    let mut doc = QuoteDocument {
        gstin: GSTIN.find(raw_text).map(|m| m.as_str().to_string()),
        quote_date: DATE.find(raw_text).map(|m| m.as_str().to_string()),
        quote_number: QUOTE_REF
            .captures(raw_text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string()),
        ..QuoteDocument::default()
    };

    let mut amounts: Vec<f64> = AMOUNT
        .captures_iter(raw_text)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
        .filter_map(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        .collect();
    amounts.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    amounts.dedup();

    doc.grand_total = amounts.first().copied();
    doc.gst_amount = amounts.get(1).copied();
    doc.subtotal = amounts.get(2).copied();
    doc
}
