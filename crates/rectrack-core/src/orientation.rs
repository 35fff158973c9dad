//! Display and image orientation.
//!
//! [`DisplayOrientation`] is how the device presents a picture;
//! [`ImageOrientation`] tells a detector (or the rectifier) which way is "up"
//! in the raw capture buffer. The mapping between the two is a fixed 1:1
//! lookup over the eight rotation/mirror combinations.

use serde::{Deserialize, Serialize};

/// Orientation of a picture as presented on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayOrientation {
    #[default]
    Up,
    Down,
    Left,
    Right,
    UpMirrored,
    DownMirrored,
    LeftMirrored,
    RightMirrored,
}

/// Orientation of the image coordinate system, EXIF semantics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageOrientation {
    /// EXIF 1: row 0 at the top, column 0 at the left.
    #[default]
    Up,
    /// EXIF 2.
    UpMirrored,
    /// EXIF 3: rotated 180°.
    Down,
    /// EXIF 4.
    DownMirrored,
    /// EXIF 5.
    LeftMirrored,
    /// EXIF 6: rotated 90° clockwise for display.
    Right,
    /// EXIF 7.
    RightMirrored,
    /// EXIF 8: rotated 90° counter-clockwise for display.
    Left,
}

pub const ALL_ORIENTATIONS: [ImageOrientation; 8] = [
    ImageOrientation::Up,
    ImageOrientation::UpMirrored,
    ImageOrientation::Down,
    ImageOrientation::DownMirrored,
    ImageOrientation::LeftMirrored,
    ImageOrientation::Right,
    ImageOrientation::RightMirrored,
    ImageOrientation::Left,
];

impl From<DisplayOrientation> for ImageOrientation {
    fn from(o: DisplayOrientation) -> Self {
        match o {
            DisplayOrientation::Up => ImageOrientation::Up,
            DisplayOrientation::UpMirrored => ImageOrientation::UpMirrored,
            DisplayOrientation::Down => ImageOrientation::Down,
            DisplayOrientation::DownMirrored => ImageOrientation::DownMirrored,
            DisplayOrientation::Left => ImageOrientation::Left,
            DisplayOrientation::LeftMirrored => ImageOrientation::LeftMirrored,
            DisplayOrientation::Right => ImageOrientation::Right,
            DisplayOrientation::RightMirrored => ImageOrientation::RightMirrored,
        }
    }
}

impl ImageOrientation {
    /// EXIF orientation tag value (1..=8).
    pub fn exif_value(self) -> u8 {
        match self {
            ImageOrientation::Up => 1,
            ImageOrientation::UpMirrored => 2,
            ImageOrientation::Down => 3,
            ImageOrientation::DownMirrored => 4,
            ImageOrientation::LeftMirrored => 5,
            ImageOrientation::Right => 6,
            ImageOrientation::RightMirrored => 7,
            ImageOrientation::Left => 8,
        }
    }

    pub fn from_exif(value: u8) -> Option<Self> {
        ALL_ORIENTATIONS.get(usize::from(value).checked_sub(1)?).copied()
    }

    /// Whether displaying in this orientation exchanges width and height.
    pub fn swaps_axes(self) -> bool {
        matches!(
            self,
            ImageOrientation::Left
                | ImageOrientation::LeftMirrored
                | ImageOrientation::Right
                | ImageOrientation::RightMirrored
        )
    }

    pub fn is_mirrored(self) -> bool {
        matches!(
            self,
            ImageOrientation::UpMirrored
                | ImageOrientation::DownMirrored
                | ImageOrientation::LeftMirrored
                | ImageOrientation::RightMirrored
        )
    }
}
