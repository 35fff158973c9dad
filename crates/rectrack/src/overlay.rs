//! Normalized tracker output to on-screen preview coordinates.

use rectrack_core::{
    aspect_fit, scale_point, scale_rect, FrameDimensions, ImageOrientation, Normalized, Origin,
    Pixel, Point, Quad, Rect, Size,
};
use serde::{Deserialize, Serialize};

/// What the presentation side draws for a tracked target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    /// Outline in viewport pixels, TL, TR, BR, BL.
    pub polygon: [Point<Pixel>; 4],
    /// Axis-aligned bounds of `polygon`.
    pub bounding_box: Rect<Pixel>,
}

/// Maps quads from the detector's normalized space onto the preview viewport.
///
/// The video is aspect-fit into the viewport and centered horizontally; the
/// fitted size is computed once, from the capture-native frame size and the
/// orientation the preview shows it in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayMapper {
    dims: FrameDimensions,
    orientation: ImageOrientation,
    viewport: Size,
    origin: Origin,
    video_frame_size: Size,
}

impl OverlayMapper {
    pub fn new(
        dims: FrameDimensions,
        orientation: ImageOrientation,
        viewport: Size,
        origin: Origin,
    ) -> Self {
        let video_frame_size = aspect_fit(dims.display_aspect(orientation), viewport);
        Self {
            dims,
            orientation,
            viewport,
            origin,
            video_frame_size,
        }
    }

    #[inline]
    pub fn dims(&self) -> FrameDimensions {
        self.dims
    }

    #[inline]
    pub fn orientation(&self) -> ImageOrientation {
        self.orientation
    }

    #[inline]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Size of the video once aspect-fit into the viewport.
    #[inline]
    pub fn video_frame_size(&self) -> Size {
        self.video_frame_size
    }

    /// Horizontal centering offset of the fitted video, zero when it fills
    /// the viewport width.
    pub fn horizontal_offset(&self) -> f32 {
        ((self.viewport.width - self.video_frame_size.width) / 2.0).max(0.0)
    }

    /// Area of the viewport covered by video.
    pub fn video_rect(&self) -> Rect<Pixel> {
        Rect::from_size(self.video_frame_size).translated(self.horizontal_offset(), 0.0)
    }

    pub fn map_point(&self, p: Point<Normalized>) -> Point<Pixel> {
        scale_point(self.origin.to_top_left(p), self.video_frame_size)
            .translated(self.horizontal_offset(), 0.0)
    }

    pub fn map(&self, quad: &Quad<Normalized>) -> Overlay {
        let offset = self.horizontal_offset();
        let top_left = Quad::from_corners(
            quad.corners().map(|p| self.origin.to_top_left(p)),
            quad.confidence,
        );
        let polygon = top_left
            .corners()
            .map(|p| scale_point(p, self.video_frame_size).translated(offset, 0.0));
        let bounding_box =
            scale_rect(top_left.bounding_box(), self.video_frame_size).translated(offset, 0.0);
        Overlay {
            polygon,
            bounding_box,
        }
    }
}
