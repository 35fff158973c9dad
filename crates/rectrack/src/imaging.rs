//! Conversions between `image` rasters and the core image types.

use std::path::Path;

use rectrack_core::{FrameBuffer, GrayImage, GrayImageView, ImageBufferError};

/// Borrow an `image::GrayImage` as a core view.
pub fn gray_view(img: &::image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Owned core copy of an `image::GrayImage`.
pub fn to_core(img: &::image::GrayImage) -> GrayImage {
    GrayImage {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw().clone(),
    }
}

pub fn to_image(img: &GrayImage) -> Result<::image::GrayImage, ImageBufferError> {
    let invalid = ImageBufferError::InvalidDimensions {
        width: img.width,
        height: img.height,
    };
    let w = u32::try_from(img.width).map_err(|_| invalid.clone())?;
    let h = u32::try_from(img.height).map_err(|_| invalid.clone())?;
    ::image::GrayImage::from_raw(w, h, img.data.clone()).ok_or(ImageBufferError::InvalidLength {
        expected: img.width * img.height,
        got: img.data.len(),
    })
}

/// Decode any supported image file to 8-bit luma.
pub fn load_gray(path: impl AsRef<Path>) -> Result<::image::GrayImage, ::image::ImageError> {
    Ok(::image::open(path)?.to_luma8())
}

/// Load an image file as frame `index`.
pub fn load_frame(index: u64, path: impl AsRef<Path>) -> Result<FrameBuffer, ::image::ImageError> {
    let img = load_gray(path)?;
    Ok(FrameBuffer::new(index, to_core(&img)))
}
