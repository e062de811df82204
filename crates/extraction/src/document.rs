use serde::{Deserialize, Serialize};

/// One extracted quote line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteLineItem {
    pub description: String,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub amount: Option<f64>,
}

/// Structured quote data extracted from a document.
///
/// All fields are optional and default-able on purpose: model output is
/// parsed leniently, and the deterministic fallback fills in only what its
/// patterns can find.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteDocument {
    pub vendor_name: Option<String>,
    pub quote_number: Option<String>,
    pub quote_date: Option<String>,
    /// Indian tax registration identifier, extracted opportunistically.
    pub gstin: Option<String>,
    pub line_items: Vec<QuoteLineItem>,
    pub subtotal: Option<f64>,
    pub gst_amount: Option<f64>,
    pub grand_total: Option<f64>,
}

impl QuoteDocument {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
