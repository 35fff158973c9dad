use rectrack_core::{GrayImage, ImageOrientation};

/// Re-raster `src` as it should be displayed for EXIF `orientation`.
///
/// Rotated orientations exchange width and height of the result.
pub fn orient_image(src: &GrayImage, orientation: ImageOrientation) -> GrayImage {
    let (w, h) = (src.width, src.height);
    if orientation == ImageOrientation::Up || w == 0 || h == 0 {
        return src.clone();
    }

    let (out_w, out_h) = if orientation.swaps_axes() {
        (h, w)
    } else {
        (w, h)
    };

    GrayImage::from_fn(out_w, out_h, |x, y| {
        let (sx, sy) = match orientation {
            ImageOrientation::Up => (x, y),
            ImageOrientation::UpMirrored => (w - 1 - x, y),
            ImageOrientation::Down => (w - 1 - x, h - 1 - y),
            ImageOrientation::DownMirrored => (x, h - 1 - y),
            ImageOrientation::LeftMirrored => (y, x),
            ImageOrientation::Right => (y, h - 1 - x),
            ImageOrientation::RightMirrored => (w - 1 - y, h - 1 - x),
            ImageOrientation::Left => (w - 1 - y, x),
        };
        src.data[sy * w + sx]
    })
}
