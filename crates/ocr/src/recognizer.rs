use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available; build with the `tesseract` feature")]
    NotAvailable,
}

/// A progress report from a running recognition.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrProgress {
    pub status: String,
    /// Completion of the current stage, 0.0 to 1.0.
    pub progress: f32,
}

impl OcrProgress {
    pub fn new(status: impl Into<String>, progress: f32) -> Self {
        Self { status: status.into(), progress: progress.clamp(0.0, 1.0) }
    }
}

/// Shared progress callback handed to pipelines.
pub type ProgressFn = Arc<dyn Fn(OcrProgress) + Send + Sync>;

/// Abstraction over an OCR backend.
/// Implementations accept raw PNG/JPEG image bytes and return the recognized
/// text, reporting progress through `progress` as they go.
pub trait OcrBackend: Send + Sync {
    fn recognize(
        &self,
        image_bytes: &[u8],
        progress: &dyn Fn(OcrProgress),
    ) -> Result<String, OcrError>;
}

impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn recognize(
        &self,
        image_bytes: &[u8],
        progress: &dyn Fn(OcrProgress),
    ) -> Result<String, OcrError> {
        (**self).recognize(image_bytes, progress)
    }
}

// ── Preset backend (always available, used for tests) ─────────────────────────

/// Returns a pre-set string, for exercising the pipeline without
/// Tesseract installed.
pub struct PresetRecognizer {
    pub text: String,
}

impl PresetRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrBackend for PresetRecognizer {
    fn recognize(
        &self,
        _image_bytes: &[u8],
        progress: &dyn Fn(OcrProgress),
    ) -> Result<String, OcrError> {
        progress(OcrProgress::new("recognizing text", 1.0));
        Ok(self.text.clone())
    }
}

/// Stand-in used when the binary was built without an OCR engine.
pub struct UnavailableRecognizer;

impl OcrBackend for UnavailableRecognizer {
    fn recognize(
        &self,
        _image_bytes: &[u8],
        _progress: &dyn Fn(OcrProgress),
    ) -> Result<String, OcrError> {
        Err(OcrError::NotAvailable)
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError, OcrProgress};
    use leptess::LepTess;

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(
            &self,
            image_bytes: &[u8],
            progress: &dyn Fn(OcrProgress),
        ) -> Result<String, OcrError> {
            progress(OcrProgress::new("initializing tesseract", 0.0));
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            progress(OcrProgress::new("initializing tesseract", 1.0));
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            progress(OcrProgress::new("recognizing text", 0.0));
            let text = lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))?;
            progress(OcrProgress::new("recognizing text", 1.0));
            Ok(text)
        }
    }
}
