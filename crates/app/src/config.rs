use anyhow::Context;
use serde::{Deserialize, Serialize};
use slipscan_core::{ConfigError, ExtractionConfig};
use slipscan_ocr::OcrBackend;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "slipscan.toml";

/// Contents of `slipscan.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub extraction: ExtractionConfig,
    pub ocr: OcrSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Tesseract language code(s), e.g. `eng` or `eng+deu`.
    pub language: String,
    /// Directory holding `*.traineddata`; the engine's default when unset.
    pub data_path: Option<PathBuf>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self { language: "eng".to_string(), data_path: None }
    }
}

impl AppConfig {
    /// Load the explicit config file if given, else the per-user one if it
    /// exists, else built-in defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.extraction.validate()?;
        Ok(config)
    }

    #[cfg(feature = "tesseract")]
    pub fn backend(&self) -> Box<dyn OcrBackend> {
        use slipscan_ocr::recognizer::tesseract_backend::TesseractRecognizer;

        let data_path = self.ocr.data_path.as_ref().map(|p| p.display().to_string());
        Box::new(TesseractRecognizer::new(data_path, &self.ocr.language))
    }

    #[cfg(not(feature = "tesseract"))]
    pub fn backend(&self) -> Box<dyn OcrBackend> {
        tracing::debug!(
            language = %self.ocr.language,
            data_path = ?self.ocr.data_path,
            "built without the `tesseract` feature; image OCR is unavailable"
        );
        Box::new(slipscan_ocr::UnavailableRecognizer)
    }
}

fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "slipscan", "slipscan")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}
