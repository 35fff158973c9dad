//! Commands for the presentation side.
//!
//! The session never touches UI state. It emits [`SinkCommand`]s; whoever
//! owns the display applies them, typically through a [`SinkState`].

use rectrack_core::GrayImage;

use crate::overlay::Overlay;

#[derive(Clone, Debug, PartialEq)]
pub enum SinkCommand {
    /// Draw or move the target outline.
    DrawOverlay(Overlay),
    /// Replace the rectified preview.
    ShowPreview(GrayImage),
    /// Remove the target outline; the preview is kept.
    ClearOverlay,
    /// Replace the classification label text.
    Labels(String),
    /// Drop everything shown for the current target.
    Reset,
}

/// Display state rebuilt from a command stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SinkState {
    pub overlay: Option<Overlay>,
    pub preview: Option<GrayImage>,
    pub labels: Option<String>,
}

impl SinkState {
    pub fn apply(&mut self, cmd: SinkCommand) {
        match cmd {
            SinkCommand::DrawOverlay(o) => self.overlay = Some(o),
            SinkCommand::ShowPreview(img) => self.preview = Some(img),
            SinkCommand::ClearOverlay => self.overlay = None,
            SinkCommand::Labels(text) => self.labels = Some(text),
            SinkCommand::Reset => *self = Self::default(),
        }
    }

    pub fn apply_all(&mut self, cmds: impl IntoIterator<Item = SinkCommand>) {
        for cmd in cmds {
            self.apply(cmd);
        }
    }

    pub fn is_clear(&self) -> bool {
        self.overlay.is_none() && self.preview.is_none() && self.labels.is_none()
    }
}
