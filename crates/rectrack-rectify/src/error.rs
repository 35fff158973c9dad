use std::fmt;

/// Corner role of a quad, for error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CornerName {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl CornerName {
    /// Roles in polygon order, matching `Quad::corners`.
    pub const ORDER: [CornerName; 4] = [
        CornerName::TopLeft,
        CornerName::TopRight,
        CornerName::BottomRight,
        CornerName::BottomLeft,
    ];
}

impl fmt::Display for CornerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CornerName::TopLeft => "top-left",
            CornerName::TopRight => "top-right",
            CornerName::BottomRight => "bottom-right",
            CornerName::BottomLeft => "bottom-left",
        };
        f.write_str(name)
    }
}

/// Errors returned by the perspective rectifier.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RectifyError {
    #[error("frame has no pixels")]
    EmptyFrame,
    #[error("{corner} corner ({x:.1}, {y:.1}) lies outside the {width}x{height} frame")]
    CornerOutOfBounds {
        corner: CornerName,
        x: f32,
        y: f32,
        width: usize,
        height: usize,
    },
    #[error("quadrilateral is degenerate")]
    Degenerate,
    #[error("homography estimation failed")]
    HomographyFailed,
}
