pub mod amount;
pub mod config;
pub mod receipt;

pub use amount::{parse_amount, CURRENCY_MARKERS};
pub use config::{
    ConfigError, ExtractionConfig, DEFAULT_MERCHANT_DENY_TERMS, DEFAULT_TOTAL_KEYWORDS,
};
pub use receipt::ExtractionResult;
