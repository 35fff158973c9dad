use rectrack_core::{sample_bilinear_u8, GrayImage, GrayImageView, Homography, Pixel, Point};

/// Resample `src` through `img_from_rect` into an `out_w x out_h` raster.
///
/// Each output pixel is sampled at its center; samples falling outside the
/// source replicate the nearest edge pixel.
pub fn warp_perspective_gray(
    src: &GrayImageView<'_>,
    img_from_rect: &Homography,
    out_w: usize,
    out_h: usize,
) -> GrayImage {
    let mut out = vec![0u8; out_w * out_h];

    for (y, row) in out.chunks_exact_mut(out_w.max(1)).enumerate().take(out_h) {
        for (x, px) in row.iter_mut().enumerate() {
            let pr = Point::<Pixel>::new(x as f32 + 0.5, y as f32 + 0.5);
            let pi = img_from_rect.apply(pr);
            *px = sample_bilinear_u8(src, pi.x, pi.y);
        }
    }

    GrayImage {
        width: out_w,
        height: out_h,
        data: out,
    }
}
