use anyhow::{bail, Context};
use clap::Args;
use slipscan_core::ExtractionResult;
use slipscan_export::{is_exportable, write_csv};
use slipscan_ocr::{
    sha256_hex, spawn_intake_watcher, Extractor, OcrBackend, OcrProgress, ReceiptFields,
    ReceiptPipeline,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::render;

#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Write the extracted record to this CSV file
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Print JSON instead of the text summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Receipt photo (PNG, JPEG, WEBP, BMP, TIFF, GIF)
    pub image: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// File holding OCR text; reads stdin when omitted or `-`
    pub input: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Folder to watch for new receipt photos
    pub dir: PathBuf,

    /// Folder receiving one CSV per scanned receipt
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,
}

fn log_progress(p: OcrProgress) {
    tracing::info!(status = %p.status, "{:.0}%", p.progress * 100.0);
}

fn build_pipeline(config: &AppConfig) -> anyhow::Result<ReceiptPipeline<Box<dyn OcrBackend>>> {
    let extractor = Extractor::with_config(&config.extraction)?;
    Ok(ReceiptPipeline::new(config.backend(), extractor).with_progress(Arc::new(log_progress)))
}

pub async fn scan(args: ScanArgs, config: &AppConfig) -> anyhow::Result<()> {
    let Some(image) = args.image else {
        bail!("no file selected");
    };
    let pipeline = build_pipeline(config)?;
    let outcome = pipeline
        .process_file(&image)
        .await
        .with_context(|| format!("Failed to scan {}", image.display()))?;

    present(&outcome.result, &outcome.fields, Some(&outcome.hash_hex), &args.output)
}

pub async fn parse(args: ParseArgs, config: &AppConfig) -> anyhow::Result<()> {
    let text = match args.input.as_deref() {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        _ => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read stdin")?;
            text
        }
    };
    if text.trim().is_empty() {
        tracing::warn!("input holds no text");
    }

    let extractor = Extractor::with_config(&config.extraction)?;
    let fields = extractor.analyze(&text);
    let result = fields.to_result(&text);
    present(&result, &fields, None, &args.output)
}

fn present(
    result: &ExtractionResult,
    fields: &ReceiptFields,
    hash: Option<&str>,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    if output.json {
        println!("{}", render::render_json(result, fields, hash)?);
    } else {
        print!("{}", render::render_text(result, fields));
    }
    if let Some(path) = &output.csv {
        export(result, path)?;
    }
    Ok(())
}

/// Write `result` as CSV unless nothing was extracted. Returns whether a
/// file was written.
fn export(result: &ExtractionResult, path: &Path) -> anyhow::Result<bool> {
    if !is_exportable(result) {
        tracing::warn!(path = %path.display(), "Nothing extracted; CSV export skipped");
        return Ok(false);
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(result, file).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "CSV exported");
    Ok(true)
}

// ── Watch folder ──────────────────────────────────────────────────────────────

pub async fn watch(args: WatchArgs, config: &AppConfig) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(&args.out)
        .await
        .with_context(|| format!("Failed to create {}", args.out.display()))?;
    let pipeline = build_pipeline(config)?;

    // The channel bridges the notify watcher thread and the async processor.
    let (tx, mut rx) = mpsc::channel::<PathBuf>(64);
    let _watcher = spawn_intake_watcher(&args.dir, tx)
        .with_context(|| format!("Failed to watch {}", args.dir.display()))?;
    tracing::info!("Watching intake folder: {}", args.dir.display());

    // Hashes of images already handled in this session.
    let mut seen = HashSet::new();
    loop {
        tokio::select! {
            next = rx.recv() => {
                let Some(path) = next else { break };
                // Creation fires before the writer is done with the file.
                tokio::time::sleep(Duration::from_millis(250)).await;
                match process_intake(&pipeline, &path, &args.out, &mut seen).await {
                    Ok(Some(csv)) => tracing::info!("Receipt exported: {}", csv.display()),
                    Ok(None) => {}
                    Err(e) => tracing::warn!("Receipt pipeline error for {}: {e:#}", path.display()),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping watcher");
                break;
            }
        }
    }
    Ok(())
}

/// Scan one dropped file and export it next to its siblings in `out_dir`.
/// Returns the CSV path, or `None` when the image was a duplicate or yielded
/// nothing to export.
async fn process_intake<R: OcrBackend + 'static>(
    pipeline: &ReceiptPipeline<R>,
    path: &Path,
    out_dir: &Path,
    seen: &mut HashSet<String>,
) -> anyhow::Result<Option<PathBuf>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let digest = sha256_hex(&bytes);
    if seen.contains(&digest) {
        tracing::info!("Skipping duplicate image: {}", path.display());
        return Ok(None);
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    // A failed scan is not remembered, so the same image can be retried.
    let outcome = pipeline.process_bytes(&bytes, ext).await?;
    seen.insert(digest);
    print!("{}", render::render_text(&outcome.result, &outcome.fields));

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(outcome.hash_hex.as_str());
    let csv = out_dir.join(format!("{stem}.csv"));
    Ok(export(&outcome.result, &csv)?.then_some(csv))
}
