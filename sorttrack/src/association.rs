//! Detection-to-track association by IoU with optimal assignment

use crate::bbox::{ious, Bbox};
use crate::hungarian::HungarianSolver;

/// Outcome of matching one frame's detections against the predicted tracks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Association {
    /// Matched (detection_idx, track_idx) pairs
    pub matches: Vec<(usize, usize)>,
    pub unmatched_detections: Vec<usize>,
    pub unmatched_trackers: Vec<usize>,
}

/// Assign detections to tracked objects, both given as boxes
///
/// Pairs with an IoU below `iou_threshold` are never matched, and among the
/// remaining pairs the matching with the largest summed IoU is chosen.
pub fn associate_detections_to_trackers(
    detections: &[Bbox<f32>],
    trackers: &[Bbox<f32>],
    iou_threshold: f32,
) -> Association {
    if trackers.is_empty() {
        return Association {
            matches: Vec::new(),
            unmatched_detections: (0..detections.len()).collect(),
            unmatched_trackers: Vec::new(),
        };
    }

    let mut iou_matrix = ious(detections, trackers);
    iou_matrix.mapv_inplace(|iou| if iou < iou_threshold { 0.0 } else { iou });

    // Zero-IoU pairs are left out by the solver
    let result = HungarianSolver::maximize(iou_matrix.view());

    Association {
        matches: result.assignments,
        unmatched_detections: result.unassigned_rows,
        unmatched_trackers: result.unassigned_cols,
    }
}
