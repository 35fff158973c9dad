use std::cmp::Ordering;

use rectrack_core::{Normalized, Quad};

use crate::params::TrackerParams;

/// Drop weak, small and degenerate candidates, rank the rest and cap the count.
///
/// Ranking is by confidence, ties broken by the larger bounding box.
pub fn filter_candidates(
    raw: Vec<Quad<Normalized>>,
    params: &TrackerParams,
) -> Vec<Quad<Normalized>> {
    let min_side = params.detector.minimum_size;
    let mut kept: Vec<Quad<Normalized>> = raw
        .into_iter()
        .filter(|q| q.confidence.is_finite() && q.confidence >= params.min_confidence)
        .filter(|q| {
            let bb = q.bounding_box();
            bb.size.width.min(bb.size.height) >= min_side
        })
        .filter(|q| !q.is_degenerate(params.degeneracy_tolerance))
        .collect();

    kept.sort_by(rank);

    let cap = params.detector.maximum_observations;
    if cap > 0 {
        kept.truncate(cap);
    }
    kept
}

fn rank(a: &Quad<Normalized>, b: &Quad<Normalized>) -> Ordering {
    b.confidence.total_cmp(&a.confidence).then_with(|| {
        b.bounding_box()
            .area()
            .total_cmp(&a.bounding_box().area())
    })
}
