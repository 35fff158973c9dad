//! Optional scene classifier collaborator.

use rectrack_core::Frame;
use rectrack_tracker::BackendError;
use serde::{Deserialize, Serialize};

/// One label reported by a classifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub confidence: f32,
}

impl Classification {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Opaque image classifier run on whole frames.
pub trait Classifier {
    fn classify(&mut self, frame: &Frame<'_>) -> Result<Vec<Classification>, BackendError>;
}

/// Which classifier results reach the label text.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyParams {
    pub max_labels: usize,
    /// Results must score strictly above this.
    pub min_confidence: f32,
}

impl Default for ClassifyParams {
    fn default() -> Self {
        Self {
            max_labels: 5,
            min_confidence: 0.3,
        }
    }
}

/// Label text: the most confident results, best first, joined by `", "`.
pub fn label_text(mut results: Vec<Classification>, params: &ClassifyParams) -> String {
    results.retain(|c| c.confidence.is_finite() && c.confidence > params.min_confidence);
    results.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    results
        .into_iter()
        .take(params.max_labels)
        .map(|c| c.label)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_top_five_above_threshold() {
        let results = vec![
            Classification::new("envelope", 0.31),
            Classification::new("notebook", 0.9),
            Classification::new("menu", 0.3),
            Classification::new("paper towel", 0.05),
            Classification::new("web site", 0.6),
            Classification::new("book jacket", 0.5),
            Classification::new("packet", 0.45),
            Classification::new("binder", 0.4),
        ];
        assert_eq!(
            label_text(results, &ClassifyParams::default()),
            "notebook, web site, book jacket, packet, binder"
        );
    }

    #[test]
    fn nothing_confident_gives_empty_text() {
        let results = vec![Classification::new("menu", 0.2)];
        assert_eq!(label_text(results, &ClassifyParams::default()), "");
    }
}
