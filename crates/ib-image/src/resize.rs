use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, RgbImage, RgbaImage};

use crate::error::OptimizeError;

/// Downscale with a box (area-averaging) convolution.
///
/// Images with an alpha channel are resized as RGBA8, everything else as RGB8.
pub(crate) fn box_resize(
    img: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> Result<DynamicImage, OptimizeError> {
    if target_w == 0 || target_h == 0 {
        return Err(OptimizeError::Encode(format!(
            "scaled size {target_w}x{target_h} is empty (source {}x{})",
            img.width(),
            img.height()
        )));
    }

    let keep_alpha = img.color().has_alpha();
    let (raw, pixel_type) = if keep_alpha {
        (img.to_rgba8().into_raw(), PixelType::U8x4)
    } else {
        (img.to_rgb8().into_raw(), PixelType::U8x3)
    };

    let src_image = Image::from_vec_u8(img.width(), img.height(), raw, pixel_type)
        .map_err(|e| OptimizeError::Encode(format!("failed to create source image: {e}")))?;
    let mut dst_image = Image::new(target_w, target_h, pixel_type);

    let mut resizer = Resizer::new();
    resizer
        .resize(
            &src_image,
            &mut dst_image,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Box)),
        )
        .map_err(|e| OptimizeError::Encode(format!("resize failed: {e}")))?;

    let buffer = dst_image.into_vec();
    let resized = if keep_alpha {
        RgbaImage::from_raw(target_w, target_h, buffer).map(DynamicImage::ImageRgba8)
    } else {
        RgbImage::from_raw(target_w, target_h, buffer).map(DynamicImage::ImageRgb8)
    };

    resized.ok_or_else(|| OptimizeError::Encode("failed to convert resized image".into()))
}
