// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static ::regex::Regex {
            static R: ::std::sync::OnceLock<::regex::Regex> = ::std::sync::OnceLock::new();
            R.get_or_init(|| ::regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub mod date;
pub mod extract;
pub mod hash;
pub mod merchant;
pub mod normalize;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod total;
pub mod types;

pub use extract::{extract, Extractor};
pub use hash::{sha256_hex, ImageDigest};
pub use normalize::{normalize, NormalizedText};
pub use pipeline::{spawn_intake_watcher, PipelineError, ReceiptPipeline, ScanOutcome};
pub use preprocess::{is_supported_extension, prepare_for_ocr, PreprocessError};
pub use recognizer::{
    OcrBackend, OcrError, OcrProgress, PresetRecognizer, ProgressFn, UnavailableRecognizer,
};
pub use types::{DateMatch, DateShape, ReceiptFields, TotalMatch, TotalSource};
