//! Height-map persistence.
//!
//! The interchange format is an 8-bit grayscale image, one sample per pixel in
//! row-major order, normalized between a caller-supplied min and max height.
//! Raw little-endian `f32` dumps are also accepted for lossless round trips.

use std::path::Path;

use image::{GrayImage, Luma};

use crate::{HeightField, HeightFieldError};

/// Load an 8-bit grayscale image and map `0..=255` onto `[min_height, max_height]`.
pub fn load_png(
    path: &Path,
    min_height: f32,
    max_height: f32,
) -> Result<HeightField, HeightFieldError> {
    let image = image::open(path)?.to_luma8();
    let (width, depth) = (image.width() as usize, image.height() as usize);
    if width != depth {
        return Err(HeightFieldError::NotSquare { width, depth });
    }

    let range = max_height - min_height;
    let heights = image
        .into_raw()
        .into_iter()
        .map(|v| min_height + (v as f32 / 255.0) * range)
        .collect();
    HeightField::from_heights(width, heights)
}

/// Save `field` as an 8-bit grayscale image normalized to its own min/max.
///
/// Returns the `(min, max)` pair needed to restore absolute heights.
pub fn save_png(field: &HeightField, path: &Path) -> Result<(f32, f32), HeightFieldError> {
    let (lo, hi) = field.min_max();
    let range = hi - lo;
    let size = field.size() as u32;

    let image = GrayImage::from_fn(size, size, |x, z| {
        let h = field.get(x as usize, z as usize);
        if range <= f32::EPSILON {
            Luma([0])
        } else {
            Luma([(((h - lo) / range) * 255.0).round().clamp(0.0, 255.0) as u8])
        }
    });
    image.save(path)?;
    Ok((lo, hi))
}

/// Parse a raw little-endian `f32` height dump.
pub fn decode_raw_f32(bytes: &[u8]) -> Result<HeightField, HeightFieldError> {
    if bytes.len() % 4 != 0 {
        return Err(HeightFieldError::NotWholeSamples { len: bytes.len() });
    }
    let samples = bytes.len() / 4;
    let size = (samples as f64).sqrt() as usize;
    if size * size != samples {
        return Err(HeightFieldError::NotPerfectSquare { samples });
    }

    let heights = bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    HeightField::from_heights(size, heights)
}

pub fn load_raw_f32(path: &Path) -> Result<HeightField, HeightFieldError> {
    decode_raw_f32(&std::fs::read(path)?)
}

pub fn save_raw_f32(field: &HeightField, path: &Path) -> Result<(), HeightFieldError> {
    let bytes: Vec<u8> = field
        .heights()
        .iter()
        .flat_map(|h| h.to_le_bytes())
        .collect();
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slope(size: usize) -> HeightField {
        let heights = (0..size * size).map(|i| (i % size) as f32 * 2.0).collect();
        HeightField::from_heights(size, heights).unwrap()
    }

    #[test]
    fn test_png_preserves_shape_within_quantization() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slope.png");
        let field = slope(17);

        let (lo, hi) = save_png(&field, &path).unwrap();
        assert_eq!((lo, hi), (0.0, 32.0));

        let loaded = load_png(&path, lo, hi).unwrap();
        assert_eq!(loaded.size(), 17);
        let step = (hi - lo) / 255.0;
        for (a, b) in field.heights().iter().zip(loaded.heights()) {
            assert!((a - b).abs() <= step, "{a} vs {b}");
        }
    }

    #[test]
    fn test_png_must_be_square() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        GrayImage::new(8, 4).save(&path).unwrap();
        assert!(matches!(
            load_png(&path, 0.0, 1.0),
            Err(HeightFieldError::NotSquare { width: 8, depth: 4 })
        ));
    }

    #[test]
    fn test_missing_png_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_png(&dir.path().join("nope.png"), 0.0, 1.0).is_err());
    }

    #[test]
    fn test_raw_roundtrip_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heights.r32");
        let field = slope(9);
        save_raw_f32(&field, &path).unwrap();
        assert_eq!(load_raw_f32(&path).unwrap(), field);
    }

    #[test]
    fn test_raw_rejects_partial_samples() {
        assert!(matches!(
            decode_raw_f32(&[0u8; 10]),
            Err(HeightFieldError::NotWholeSamples { len: 10 })
        ));
    }

    #[test]
    fn test_raw_rejects_non_square_sample_count() {
        assert!(matches!(
            decode_raw_f32(&[0u8; 4 * 12]),
            Err(HeightFieldError::NotPerfectSquare { samples: 12 })
        ));
    }
}
