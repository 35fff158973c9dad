use rectrack_core::{ImageOrientation, Origin};
use serde::{Deserialize, Serialize};

/// Rectifier configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectifyParams {
    /// Vertical origin of the normalized quad corners.
    pub origin: Origin,
    /// Upper bound on either side of the rectified raster, in pixels.
    pub max_output_side: usize,
    /// Orientation applied to the raster after warping.
    pub output_orientation: ImageOrientation,
    /// Collinearity tolerance for rejecting quads, see `Quad::is_degenerate`.
    pub degeneracy_tolerance: f32,
}

impl Default for RectifyParams {
    fn default() -> Self {
        Self {
            origin: Origin::TopLeft,
            max_output_side: 4096,
            output_orientation: ImageOrientation::Up,
            degeneracy_tolerance: 1e-3,
        }
    }
}
