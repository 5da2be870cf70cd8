use std::sync::OnceLock;

use slipscan_core::{ConfigError, ExtractionConfig, ExtractionResult};

use crate::date::extract_date;
use crate::merchant::MerchantExtractor;
use crate::normalize::normalize;
use crate::total::TotalExtractor;
use crate::types::ReceiptFields;

/// Turns raw OCR text into date, merchant and total.
///
/// An `Extractor` holds only compiled, read-only patterns; it can be shared
/// freely and every call is independent of the ones before it.
#[derive(Debug, Clone)]
pub struct Extractor {
    total: TotalExtractor,
    merchant: MerchantExtractor,
}

impl Extractor {
    pub fn with_config(config: &ExtractionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let total = TotalExtractor::new(&config.total_keywords)
            .map_err(|e| ConfigError::Invalid(format!("total_keywords: {e}")))?;
        let merchant = MerchantExtractor::new(config)
            .map_err(|e| ConfigError::Invalid(format!("merchant_deny_terms: {e}")))?;
        Ok(Self { total, merchant })
    }

    /// The extractor built from the default configuration.
    pub fn shared() -> &'static Extractor {
        static DEFAULT: OnceLock<Extractor> = OnceLock::new();
        DEFAULT.get_or_init(|| {
            Extractor::with_config(&ExtractionConfig::default())
                .expect("default extraction config is valid")
        })
    }

    /// Extract every field along with how it was found.
    pub fn analyze(&self, raw: &str) -> ReceiptFields {
        let text = normalize(raw);
        let fields = ReceiptFields {
            date: extract_date(&text.joined),
            merchant: self.merchant.extract(&text.lines),
            total: self.total.extract(&text.lines),
        };
        tracing::debug!(
            lines = text.lines.len(),
            date = ?fields.date.as_ref().map(|d| d.shape),
            total = ?fields.total.as_ref().map(|t| t.source),
            merchant_found = fields.merchant.is_some(),
            "receipt text analyzed"
        );
        fields
    }

    /// Extract structured fields from raw OCR text. Never fails: fields that
    /// cannot be found are empty strings.
    pub fn extract(&self, raw: &str) -> ExtractionResult {
        if raw.trim().is_empty() {
            return ExtractionResult::empty(raw);
        }
        self.analyze(raw).to_result(raw)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::shared().clone()
    }
}

/// [`Extractor::extract`] with the default configuration.
pub fn extract(raw: &str) -> ExtractionResult {
    Extractor::shared().extract(raw)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
