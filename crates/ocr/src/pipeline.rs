use std::path::{Path, PathBuf};
use std::sync::Arc;

use slipscan_core::ExtractionResult;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::extract::Extractor;
use crate::hash;
use crate::preprocess;
use crate::recognizer::{OcrBackend, OcrError, OcrProgress, ProgressFn};
use crate::types::ReceiptFields;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported file type: '{0}'")]
    UnsupportedFileType(String),
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] crate::preprocess::PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("OCR produced no text")]
    NoText,
}

/// The result of scanning one receipt image.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// SHA-256 hex digest of the original file.
    pub hash_hex: String,
    /// Extracted fields with provenance.
    pub fields: ReceiptFields,
    /// The flat record handed to presentation and export.
    pub result: ExtractionResult,
}

/// Orchestrates: validate → hash → preprocess → OCR → extract.
pub struct ReceiptPipeline<R: OcrBackend> {
    recognizer: Arc<R>,
    extractor: Extractor,
    progress: ProgressFn,
}

impl<R: OcrBackend + 'static> ReceiptPipeline<R> {
    pub fn new(recognizer: R, extractor: Extractor) -> Self {
        Self {
            recognizer: Arc::new(recognizer),
            extractor,
            progress: Arc::new(|_: OcrProgress| {}),
        }
    }

    /// Receive progress reports for every stage of every scan.
    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = progress;
        self
    }

    /// Process a file on disk.
    pub async fn process_file(&self, path: &Path) -> Result<ScanOutcome, PipelineError> {
        let ext = extension_of(path);
        if !preprocess::is_supported_extension(&ext) {
            return Err(PipelineError::UnsupportedFileType(ext));
        }
        let bytes = tokio::fs::read(path).await?;
        self.process_bytes(&bytes, &ext).await
    }

    /// Process raw image bytes (from a file read or a camera capture).
    pub async fn process_bytes(
        &self,
        data: &[u8],
        ext: &str,
    ) -> Result<ScanOutcome, PipelineError> {
        if !preprocess::is_supported_extension(ext) {
            return Err(PipelineError::UnsupportedFileType(ext.to_string()));
        }

        // 1. Content identity.
        let hash_hex = hash::sha256_hex(data);

        // 2. Preprocess image.
        self.report("preprocessing", 0.0);
        let image_bytes = preprocess::prepare_for_ocr(data)?;
        self.report("preprocessing", 1.0);

        // 3. Run OCR off the async runtime; engines block for seconds.
        let recognizer = Arc::clone(&self.recognizer);
        let progress = Arc::clone(&self.progress);
        let ocr_text = tokio::task::spawn_blocking(move || {
            recognizer.recognize(&image_bytes, &*progress)
        })
        .await
        .map_err(|e| OcrError::Engine(format!("recognizer task failed: {e}")))??;

        if ocr_text.trim().is_empty() {
            return Err(PipelineError::NoText);
        }

        // 4. Extract structured fields.
        self.report("extracting", 0.0);
        let fields = self.extractor.analyze(&ocr_text);
        let result = fields.to_result(&ocr_text);
        self.report("done", 1.0);

        tracing::info!(
            hash = %hash_hex,
            found_date = !result.date().is_empty(),
            found_merchant = !result.merchant().is_empty(),
            found_total = !result.total().is_empty(),
            "receipt scanned"
        );

        Ok(ScanOutcome { hash_hex, fields, result })
    }

    fn report(&self, status: &str, progress: f32) {
        (self.progress)(OcrProgress::new(status, progress));
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase()
}

// ── Watch-folder integration ──────────────────────────────────────────────────

/// Spawn a notify watcher on `watch_dir` that sends newly created receipt
/// images to `tx`. Returns the watcher, which must be kept alive for watching
/// to continue.
pub fn spawn_intake_watcher(
    watch_dir: &Path,
    tx: mpsc::Sender<PathBuf>,
) -> notify::Result<impl notify::Watcher> {
    use notify::{EventKind, RecursiveMode, Watcher};

    let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
        match event {
            Ok(ev) if matches!(ev.kind, EventKind::Create(_)) => {
                for path in ev.paths {
                    if !preprocess::is_supported_extension(&extension_of(&path)) {
                        tracing::debug!(path = %path.display(), "ignoring non-image file");
                        continue;
                    }
                    if let Err(e) = tx.try_send(path) {
                        tracing::warn!("Intake queue rejected file: {e}");
                    }
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Intake watcher error: {e}"),
        }
    })?;

    watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::PresetRecognizer;
    use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
    use std::io::Cursor;
    use std::sync::Mutex;

    fn tiny_png() -> Vec<u8> {
        let img: GrayImage = ImageBuffer::from_fn(4, 4, |_, _| Luma([200u8]));
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn pipeline(text: &str) -> ReceiptPipeline<PresetRecognizer> {
        ReceiptPipeline::new(PresetRecognizer::new(text), Extractor::default())
    }

    struct BrokenEngine;

    impl OcrBackend for BrokenEngine {
        fn recognize(&self, _: &[u8], _: &dyn Fn(OcrProgress)) -> Result<String, OcrError> {
            Err(OcrError::Engine("model file missing".into()))
        }
    }

    #[tokio::test]
    async fn process_bytes_extracts_fields() {
        let outcome = pipeline("STARBUCKS\n2024-01-15\nTotal $5.50\nVISA")
            .process_bytes(&tiny_png(), "png")
            .await
            .unwrap();

        assert_eq!(outcome.hash_hex.len(), 64);
        assert_eq!(outcome.result.merchant(), "STARBUCKS");
        assert_eq!(outcome.result.date(), "2024-01-15");
        assert_eq!(outcome.result.total(), "$5.50");
        assert_eq!(outcome.fields.to_result(outcome.result.raw()), outcome.result);
    }

    #[tokio::test]
    async fn same_image_same_hash() {
        let p = pipeline("irrelevant 1.00");
        let data = tiny_png();
        let a = p.process_bytes(&data, "png").await.unwrap();
        let b = p.process_bytes(&data, "PNG").await.unwrap();
        assert_eq!(a.hash_hex, b.hash_hex);
    }

    #[tokio::test]
    async fn unsupported_extension_is_rejected() {
        let err = pipeline("x").process_bytes(&tiny_png(), "pdf").await.unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFileType(ext) if ext == "pdf"));
    }

    #[tokio::test]
    async fn undecodable_image_is_a_preprocess_error() {
        let err = pipeline("x").process_bytes(b"not a png", "png").await.unwrap_err();
        assert!(matches!(err, PipelineError::Preprocess(_)));
    }

    #[tokio::test]
    async fn blank_ocr_output_is_no_text() {
        let err = pipeline(" \n\t\n").process_bytes(&tiny_png(), "png").await.unwrap_err();
        assert!(matches!(err, PipelineError::NoText));
    }

    #[tokio::test]
    async fn engine_failure_is_reported() {
        let p = ReceiptPipeline::new(BrokenEngine, Extractor::default());
        let err = p.process_bytes(&tiny_png(), "png").await.unwrap_err();
        assert!(matches!(err, PipelineError::Ocr(OcrError::Engine(_))));
    }

    #[tokio::test]
    async fn progress_ends_with_done() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let p = pipeline("Deli\nTotal 3.00").with_progress(Arc::new(move |p: OcrProgress| {
            sink.lock().unwrap().push(p.status)
        }));
        p.process_bytes(&tiny_png(), "png").await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.first().map(String::as_str), Some("preprocessing"));
        assert!(seen.iter().any(|s| s == "recognizing text"));
        assert_eq!(seen.last().map(String::as_str), Some("done"));
    }

    #[tokio::test]
    async fn process_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.PNG");
        std::fs::write(&path, tiny_png()).unwrap();

        let outcome = pipeline("Deli\nTotal 3.00").process_file(&path).await.unwrap();
        assert_eq!(outcome.result.total(), "3.00");

        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, "hello").unwrap();
        let err = pipeline("x").process_file(&txt).await.unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFileType(_)));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = pipeline("x")
            .process_file(&dir.path().join("gone.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
