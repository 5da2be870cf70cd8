use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat};
use std::io::Cursor;
use thiserror::Error;

/// Longest edge handed to the OCR engine.
const MAX_DIMENSION: u32 = 2800;

/// File extensions accepted as receipt photos.
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "webp", "bmp", "tif", "tiff", "gif"];

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(#[source] image::ImageError),
}

pub fn is_supported_extension(ext: &str) -> bool {
    let ext = ext.to_ascii_lowercase();
    SUPPORTED_EXTENSIONS.contains(&ext.as_str())
}

/// Decode a receipt photo and return grayscale, contrast-stretched PNG bytes.
/// The container format is sniffed from the bytes, not taken from the name.
pub fn prepare_for_ocr(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let format = image::guess_format(data)?;
    let img = image::load_from_memory_with_format(data, format)?;
    let gray = stretch_contrast(downscale(img).into_luma8());
    tracing::debug!(?format, width = gray.width(), height = gray.height(), "image prepared");
    encode_png(&gray)
}

fn downscale(img: DynamicImage) -> DynamicImage {
    if img.width().max(img.height()) <= MAX_DIMENSION {
        return img;
    }
    img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
}

/// Remap the darkest pixel to black and the brightest to white. Faded
/// thermal paper often spans only a narrow band of gray.
fn stretch_contrast(mut gray: GrayImage) -> GrayImage {
    let lo = gray.pixels().map(|p| p[0]).min().unwrap_or(0);
    let hi = gray.pixels().map(|p| p[0]).max().unwrap_or(0);
    if lo == hi {
        return gray;
    }

    let range = u32::from(hi - lo);
    let table: [u8; 256] = std::array::from_fn(|v| {
        let v = (v as u32).clamp(u32::from(lo), u32::from(hi));
        ((v - u32::from(lo)) * 255 / range) as u8
    });
    for p in gray.pixels_mut() {
        p[0] = table[usize::from(p[0])];
    }
    gray
}

fn encode_png(gray: &GrayImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    gray.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(PreprocessError::Encode)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    fn encoded(img: GrayImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .to_rgb8()
            .write_to(&mut Cursor::new(&mut buf), format)
            .unwrap();
        buf
    }

    #[test]
    fn supported_extensions_are_case_insensitive() {
        assert!(is_supported_extension("JPG"));
        assert!(is_supported_extension("png"));
        assert!(is_supported_extension("Tiff"));
        assert!(!is_supported_extension("pdf"));
        assert!(!is_supported_extension("txt"));
        assert!(!is_supported_extension(""));
    }

    #[test]
    fn faded_receipt_is_stretched_to_full_range() {
        // Ink at 120, paper at 180.
        let img = ImageBuffer::from_fn(8, 1, |x, _| Luma([if x % 2 == 0 { 120 } else { 180 }]));
        let gray = stretch_contrast(img);
        assert_eq!(gray.get_pixel(0, 0)[0], 0);
        assert_eq!(gray.get_pixel(1, 0)[0], 255);
    }

    #[test]
    fn midtones_keep_their_order() {
        let img = ImageBuffer::from_fn(3, 1, |x, _| Luma([[100u8, 150, 200][x as usize]]));
        let gray = stretch_contrast(img);
        let px: Vec<u8> = gray.pixels().map(|p| p[0]).collect();
        assert_eq!(px, vec![0, 127, 255]);
    }

    #[test]
    fn uniform_image_is_left_alone() {
        let img: GrayImage = ImageBuffer::from_pixel(10, 10, Luma([128]));
        assert_eq!(stretch_contrast(img.clone()), img);
    }

    #[test]
    fn jpeg_in_png_out() {
        let jpeg = encoded(ImageBuffer::from_pixel(4, 4, Luma([100])), ImageFormat::Jpeg);
        let result = prepare_for_ocr(&jpeg).unwrap();
        assert_eq!(&result[..4], b"\x89PNG");
    }

    #[test]
    fn non_images_are_rejected() {
        let err = prepare_for_ocr(b"definitely not an image").unwrap_err();
        assert!(matches!(err, PreprocessError::Load(_)));
    }

    #[test]
    fn oversized_photo_is_scaled_down() {
        let img = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(3000, 1200, Luma([200])));
        let small = downscale(img);
        assert_eq!(small.width(), MAX_DIMENSION);
        assert!(small.height() < 1200);
    }

    #[test]
    fn small_photo_keeps_its_size() {
        let img = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(640, 480, Luma([200])));
        let same = downscale(img);
        assert_eq!((same.width(), same.height()), (640, 480));
    }
}
