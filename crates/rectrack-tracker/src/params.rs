use serde::{Deserialize, Serialize};

/// Settings handed to the rectangle detector collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Minimum rectangle size as a fraction of the shorter image side.
    #[serde(default = "default_minimum_size")]
    pub minimum_size: f32,
    /// Maximum number of candidates kept per frame. `0` keeps all.
    #[serde(default = "default_maximum_observations")]
    pub maximum_observations: usize,
}

fn default_minimum_size() -> f32 {
    0.1
}

fn default_maximum_observations() -> usize {
    1
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            minimum_size: default_minimum_size(),
            maximum_observations: default_maximum_observations(),
        }
    }
}

/// Which detector result wins while a target is locked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquirePolicy {
    /// Once locked, fresh detections are only used after the target is lost.
    #[default]
    LockOnFirstGoodFrame,
    /// A failed tracking pass hands over to this frame's best detection
    /// right away instead of holding the stale target.
    ContinuousReacquire,
}

/// Tracker configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackerParams {
    #[serde(default)]
    pub detector: DetectorConfig,
    /// Minimum detector confidence for a candidate to be considered.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
    /// Minimum confidence of a tracking-pass result.
    #[serde(default = "default_min_tracking_confidence")]
    pub min_tracking_confidence: f32,
    /// Consecutive failed tracking passes tolerated while locked.
    ///
    /// The target is dropped on the failure that exceeds this budget, so `0`
    /// drops it on the first miss.
    #[serde(default = "default_retry_budget")]
    pub retry_budget: u32,
    /// Collinearity tolerance (sine of the enclosed angle) for rejecting
    /// degenerate quads.
    #[serde(default = "default_degeneracy_tolerance")]
    pub degeneracy_tolerance: f32,
    #[serde(default)]
    pub policy: AcquirePolicy,
}

fn default_min_confidence() -> f32 {
    0.5
}

fn default_min_tracking_confidence() -> f32 {
    0.3
}

fn default_retry_budget() -> u32 {
    3
}

fn default_degeneracy_tolerance() -> f32 {
    1e-3
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            min_confidence: default_min_confidence(),
            min_tracking_confidence: default_min_tracking_confidence(),
            retry_budget: default_retry_budget(),
            degeneracy_tolerance: default_degeneracy_tolerance(),
            policy: AcquirePolicy::default(),
        }
    }
}
