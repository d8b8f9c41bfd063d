use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::DynamicImage;
use std::io::Cursor;

use ib_core::ImageFormat;

use crate::error::OptimizeError;

/// Fixed JPEG quality for variants (1-100).
pub const JPEG_QUALITY: u8 = 85;

pub(crate) fn decode_image(data: &[u8], format: ImageFormat) -> Result<DynamicImage, OptimizeError> {
    let codec = match format {
        ImageFormat::Jpg => image::ImageFormat::Jpeg,
        ImageFormat::Png => image::ImageFormat::Png,
    };
    image::load_from_memory_with_format(data, codec)
        .map_err(|e| OptimizeError::Decode(format!("not a valid {format} image: {e}")))
}

pub(crate) fn encode_image(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, OptimizeError> {
    let mut buf = Cursor::new(Vec::new());

    match format {
        ImageFormat::Jpg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
            img.to_rgb8()
                .write_with_encoder(encoder)
                .map_err(|e| OptimizeError::Encode(format!("JPEG encode failed: {e}")))?;
        }
        ImageFormat::Png => {
            let encoder = PngEncoder::new(&mut buf);
            img.write_with_encoder(encoder)
                .map_err(|e| OptimizeError::Encode(format!("PNG encode failed: {e}")))?;
        }
    }

    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_jpeg_magic() {
        let img = DynamicImage::new_rgb8(10, 10);
        let data = encode_image(&img, ImageFormat::Jpg).unwrap();
        assert_eq!(&data[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn encode_png_magic() {
        let img = DynamicImage::new_rgba8(10, 10);
        let data = encode_image(&img, ImageFormat::Png).unwrap();
        assert_eq!(&data[0..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn decode_rejects_mismatched_format() {
        let img = DynamicImage::new_rgb8(10, 10);
        let png = encode_image(&img, ImageFormat::Png).unwrap();
        assert!(matches!(
            decode_image(&png, ImageFormat::Jpg),
            Err(OptimizeError::Decode(_))
        ));
        assert!(decode_image(&png, ImageFormat::Png).is_ok());
    }
}
