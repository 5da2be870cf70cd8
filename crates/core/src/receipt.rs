use serde::{Deserialize, Serialize};

/// The three fields pulled out of one receipt, plus the OCR text they came from.
///
/// An empty string means the field was not found. Values are the substrings
/// exactly as they appeared in the text; the total in particular is never
/// reformatted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    date: String,
    merchant: String,
    total: String,
    raw: String,
}

impl ExtractionResult {
    pub fn new(
        date: impl Into<String>,
        merchant: impl Into<String>,
        total: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            merchant: merchant.into(),
            total: total.into(),
            raw: raw.into(),
        }
    }

    /// A result with nothing found.
    pub fn empty(raw: impl Into<String>) -> Self {
        Self { raw: raw.into(), ..Self::default() }
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn merchant(&self) -> &str {
        &self.merchant
    }

    pub fn total(&self) -> &str {
        &self.total
    }

    /// The OCR text the fields were extracted from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether at least one of date, merchant or total was found.
    pub fn has_any_field(&self) -> bool {
        !(self.date.is_empty() && self.merchant.is_empty() && self.total.is_empty())
    }
}
