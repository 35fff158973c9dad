//! Frames handed over by the capture side.

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::geometry::Size;
use crate::image::{GrayImage, GrayImageView};
use crate::orientation::ImageOrientation;

/// Capture-native frame size, independent of how it is displayed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDimensions {
    pub width: u32,
    pub height: u32,
}

impl FrameDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    /// Aspect ratio of the frame as it appears on screen when shown in
    /// `orientation`: rotated orientations exchange the axes.
    pub fn display_aspect(&self, orientation: ImageOrientation) -> Size {
        if orientation.swaps_axes() {
            self.size().transposed()
        } else {
            self.size()
        }
    }
}

/// One captured frame, borrowed.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    /// Monotonic capture index.
    pub index: u64,
    pub image: GrayImageView<'a>,
    /// Which way is "up" in the raw buffer.
    pub orientation: ImageOrientation,
    /// Optional 3x3 camera intrinsic matrix delivered with the frame.
    pub intrinsics: Option<Matrix3<f32>>,
}

impl Frame<'_> {
    pub fn dimensions(&self) -> FrameDimensions {
        FrameDimensions::new(self.image.width as u32, self.image.height as u32)
    }
}

/// Owned frame, used to move a capture across threads.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    pub index: u64,
    pub image: GrayImage,
    pub orientation: ImageOrientation,
    pub intrinsics: Option<Matrix3<f32>>,
}

impl FrameBuffer {
    pub fn new(index: u64, image: GrayImage) -> Self {
        Self {
            index,
            image,
            orientation: ImageOrientation::Up,
            intrinsics: None,
        }
    }

    pub fn with_orientation(mut self, orientation: ImageOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_intrinsics(mut self, intrinsics: Matrix3<f32>) -> Self {
        self.intrinsics = Some(intrinsics);
        self
    }

    pub fn as_frame(&self) -> Frame<'_> {
        Frame {
            index: self.index,
            image: self.image.view(),
            orientation: self.orientation,
            intrinsics: self.intrinsics,
        }
    }
}
