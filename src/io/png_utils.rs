// Copyright @yucwang 2026

use image::{ImageBuffer, Rgb};

// Write an RGB24 buffer (row-major, top-left origin) as a PNG file.
pub fn write_png_to_file(
    pixels: &[u8],
    width: u32,
    height: u32,
    file_path: &str,
) -> Result<(), String> {
    log::info!("writing PNG image: {}.", file_path);

    let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_raw(width, height, pixels.to_vec())
            .ok_or_else(|| format!("pixel buffer does not match {}x{}", width, height))?;

    buffer
        .save(file_path)
        .map_err(|e| format!("failed to write {}: {}", file_path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatched_buffer_is_rejected() {
        let pixels = vec![0u8; 9];
        assert!(write_png_to_file(&pixels, 4, 4, "/tmp/never-written.png").is_err());
    }
}
