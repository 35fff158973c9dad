//! Core types for live rectangle tracking and rectification.
//!
//! This crate is purely geometric: typed coordinate spaces, quadrilaterals,
//! orientation lookup, a 4-point homography solver and a small grayscale
//! raster. It knows nothing about detectors, trackers or presentation.

mod frame;
mod geometry;
mod homography;
mod image;
mod logger;
mod orientation;
mod quad;

pub use frame::{Frame, FrameBuffer, FrameDimensions};
pub use geometry::{
    aspect_fill, aspect_fit, scale_point, scale_rect, Normalized, Origin, Pixel, Point, Rect, Size,
};
pub use homography::{homography_from_4pt, Homography, WarpTransform};
pub use image::{sample_bilinear, sample_bilinear_u8, GrayImage, GrayImageView, ImageBufferError};
pub use orientation::{DisplayOrientation, ImageOrientation, ALL_ORIENTATIONS};
pub use quad::Quad;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_env, init_with_level, parse_level, LOG_ENV};
