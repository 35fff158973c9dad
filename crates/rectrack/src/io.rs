//! JSON configuration helpers.

use std::{fs, path::Path};

use rectrack_core::{ImageOrientation, Origin, Size};
use rectrack_rectify::RectifyParams;
use rectrack_tracker::TrackerParams;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::classify::ClassifyParams;
use crate::session::PresentationMode;

#[derive(thiserror::Error, Debug)]
pub enum RectrackIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_viewport() -> Size {
    Size::new(375.0, 667.0)
}

/// Everything a [`Session`](crate::Session) is configured with.
///
/// Every field has a default, so `{}` is a valid config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RectrackConfig {
    #[serde(default)]
    pub tracker: TrackerParams,
    #[serde(default)]
    pub rectify: RectifyParams,
    #[serde(default)]
    pub classify: ClassifyParams,
    #[serde(default)]
    pub mode: PresentationMode,
    /// A reset also flips the presentation mode.
    #[serde(default)]
    pub toggle_mode_on_reset: bool,
    /// Preview viewport size in screen points.
    #[serde(default = "default_viewport")]
    pub viewport: Size,
    /// Orientation the preview shows the capture-native frames in.
    #[serde(default)]
    pub capture_orientation: ImageOrientation,
    /// Origin convention of detector output, used for the overlay.
    #[serde(default)]
    pub detector_origin: Origin,
}

impl Default for RectrackConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerParams::default(),
            rectify: RectifyParams::default(),
            classify: ClassifyParams::default(),
            mode: PresentationMode::default(),
            toggle_mode_on_reset: false,
            viewport: default_viewport(),
            capture_orientation: ImageOrientation::Up,
            detector_origin: Origin::TopLeft,
        }
    }
}

impl RectrackConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, RectrackIoError> {
        load_json(path)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), RectrackIoError> {
        write_json(self, path)
    }
}

pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, RectrackIoError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn write_json<T: Serialize + ?Sized>(
    value: &T,
    path: impl AsRef<Path>,
) -> Result<(), RectrackIoError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
