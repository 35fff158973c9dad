use rectrack_core::{Frame, GrayImage, Normalized, Pixel, Point, Quad, Size, WarpTransform};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::error::{CornerName, RectifyError};
use crate::orient::orient_image;
use crate::params::RectifyParams;
use crate::warp::warp_perspective_gray;

/// A rectified crop plus the mapping that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Rectified {
    /// Fronto-parallel raster, already re-oriented.
    pub image: GrayImage,
    /// Mapping between the un-oriented output raster and the frame.
    pub warp: WarpTransform,
    /// Quad corners in frame pixels (TL, TR, BR, BL).
    pub corners_px: [Point<Pixel>; 4],
}

/// Stateless four-point perspective correction.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PerspectiveRectifier {
    params: RectifyParams,
}

impl PerspectiveRectifier {
    pub fn new(params: RectifyParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &RectifyParams {
        &self.params
    }

    /// Warp the region of `frame` bounded by `quad` into an upright rectangle.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(frame = frame.index))
    )]
    pub fn rectify(
        &self,
        frame: &Frame<'_>,
        quad: &Quad<Normalized>,
    ) -> Result<Rectified, RectifyError> {
        let src = &frame.image;
        if src.is_empty() {
            return Err(RectifyError::EmptyFrame);
        }

        let px = quad.to_pixels(src.size(), self.params.origin);
        let extent = src.extent();
        for (corner, p) in CornerName::ORDER.into_iter().zip(px.corners()) {
            if !p.is_finite() || !extent.contains_point(p) {
                return Err(RectifyError::CornerOutOfBounds {
                    corner,
                    x: p.x,
                    y: p.y,
                    width: src.width,
                    height: src.height,
                });
            }
        }
        if px.is_degenerate(self.params.degeneracy_tolerance) {
            return Err(RectifyError::Degenerate);
        }

        let (out_w, out_h) = output_size(&px, self.params.max_output_side);
        let warp = WarpTransform::for_quad(&px, Size::new(out_w as f32, out_h as f32))
            .ok_or(RectifyError::HomographyFailed)?;

        let raster = warp_perspective_gray(src, &warp.img_from_rect, out_w, out_h);
        let image = orient_image(&raster, self.params.output_orientation);
        log::debug!(
            "rectified frame {} to {}x{} ({:?})",
            frame.index,
            image.width,
            image.height,
            self.params.output_orientation
        );

        Ok(Rectified {
            image,
            warp,
            corners_px: px.corners(),
        })
    }
}

/// Longer of each pair of opposite edges, rounded, within `[1, max_side]`.
pub fn output_size(quad: &Quad<Pixel>, max_side: usize) -> (usize, usize) {
    let [top, right, bottom, left] = quad.edge_lengths();
    let max_side = max_side.max(1) as f32;
    let side = |len: f32| len.round().clamp(1.0, max_side) as usize;
    (side(top.max(bottom)), side(left.max(right)))
}
