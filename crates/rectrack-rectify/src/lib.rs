//! Perspective correction of a tracked quadrilateral into an upright raster.
//!
//! ```
//! use rectrack_core::{FrameBuffer, GrayImage, Quad, Rect};
//! use rectrack_rectify::PerspectiveRectifier;
//!
//! let frame = FrameBuffer::new(0, GrayImage::new(64, 48));
//! let quad = Quad::from_rect(Rect::new(0.25, 0.25, 0.5, 0.5), 1.0);
//! let out = PerspectiveRectifier::default()
//!     .rectify(&frame.as_frame(), &quad)
//!     .unwrap();
//! assert_eq!((out.image.width, out.image.height), (32, 24));
//! ```

mod error;
mod orient;
mod params;
mod rectifier;
mod warp;

pub use error::{CornerName, RectifyError};
pub use orient::orient_image;
pub use params::RectifyParams;
pub use rectifier::{output_size, PerspectiveRectifier, Rectified};
pub use warp::warp_perspective_gray;
