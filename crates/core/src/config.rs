use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Phrases that mark a line as carrying the receipt total.
pub const DEFAULT_TOTAL_KEYWORDS: &[&str] =
    &["grand total", "total amount", "amount due", "balance due", "total"];

/// Words that open boilerplate header lines (labels, banners, till info)
/// rather than the merchant's name.
pub const DEFAULT_MERCHANT_DENY_TERMS: &[&str] = &[
    "receipt", "invoice", "store", "market", "mart", "supermarket", "shop", "cashier",
    "transaction", "date", "time", "subtotal", "tax", "vat", "total", "amount", "phone",
    "tel", "address", "pos", "terminal", "card", "change", "cash", "credit", "debit",
];

pub const DEFAULT_MERCHANT_WINDOW: usize = 12;
pub const DEFAULT_MIN_ALPHA_RATIO: f64 = 0.3;
pub const DEFAULT_MIN_MERCHANT_LEN: usize = 2;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables of the extraction heuristics. Every field has a default, so a
/// config file only needs the keys it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub total_keywords: Vec<String>,
    pub merchant_deny_terms: Vec<String>,
    /// How many leading lines are considered for the merchant name.
    pub merchant_window: usize,
    /// Minimum share of ASCII letters for a merchant candidate line.
    pub min_alpha_ratio: f64,
    pub min_merchant_len: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            total_keywords: DEFAULT_TOTAL_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            merchant_deny_terms: DEFAULT_MERCHANT_DENY_TERMS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            merchant_window: DEFAULT_MERCHANT_WINDOW,
            min_alpha_ratio: DEFAULT_MIN_ALPHA_RATIO,
            min_merchant_len: DEFAULT_MIN_MERCHANT_LEN,
        }
    }
}

impl ExtractionConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_keywords.is_empty() {
            return Err(ConfigError::Invalid("total_keywords must not be empty".into()));
        }
        if self.merchant_deny_terms.is_empty() {
            return Err(ConfigError::Invalid("merchant_deny_terms must not be empty".into()));
        }
        if self.total_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::Invalid("total_keywords contains an empty entry".into()));
        }
        if self.merchant_deny_terms.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "merchant_deny_terms contains an empty entry".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_alpha_ratio) {
            return Err(ConfigError::Invalid(format!(
                "min_alpha_ratio must be within 0.0..=1.0, got {}",
                self.min_alpha_ratio
            )));
        }
        Ok(())
    }
}
