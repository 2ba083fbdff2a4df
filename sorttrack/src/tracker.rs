//! SORT (Simple Online and Realtime Tracking) multi-object tracker
//!
//! Each call to [`Sort::update`] is one frame: every live track is predicted
//! forward, the predictions are matched to the frame's detections by IoU,
//! matched tracks are corrected, unmatched detections start new tracks and
//! tracks that have coasted for longer than `max_age` frames are dropped.

use crate::association::associate_detections_to_trackers;
use crate::bbox::{Bbox, Detection};
use crate::box_tracker::{KalmanBoxTracker, KalmanBoxTrackerParams};
use crate::config::SortConfig;
use crate::error::{Result, TrackerError};
use ndarray::{Array2, ArrayView2};
use std::collections::BTreeMap;

/// A reported track for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedObject {
    pub bbox: Bbox<f32>,
    /// Track id, starting at 1
    pub id: u32,
}

impl TrackedObject {
    /// Row form [x1, y1, x2, y2, id]
    pub fn to_row(&self) -> [f32; 5] {
        [
            self.bbox.xmin,
            self.bbox.ymin,
            self.bbox.xmax,
            self.bbox.ymax,
            self.id as f32,
        ]
    }
}

/// SORT tracker; one instance per video stream
#[derive(Debug, Clone)]
pub struct Sort {
    config: SortConfig,
    next_track_id: u32,
    /// Live tracks keyed by id, so iteration follows creation order
    tracklets: BTreeMap<u32, KalmanBoxTracker>,
    frame_count: u32,
}

impl Sort {
    /// Create a tracker, rejecting out-of-range configuration
    pub fn new(config: SortConfig) -> Result<Self> {
        config.validate()?;
        log::info!(
            "SORT tracker created (max_age={}, min_hits={}, iou_threshold={})",
            config.max_age,
            config.min_hits,
            config.iou_threshold
        );
        Ok(Sort {
            config,
            next_track_id: 1,
            tracklets: BTreeMap::new(),
            frame_count: 0,
        })
    }

    /// Process one frame of detections and return the tracks to report
    ///
    /// Must be called for every frame in order, including frames without
    /// detections.
    pub fn update(&mut self, detections: &[Detection]) -> Vec<TrackedObject> {
        self.frame_count += 1;

        let (track_ids, track_boxes) = self.predict_tracklets();

        // Degenerate detections can neither be matched nor start a track
        let valid_dets: Vec<&Detection> = detections
            .iter()
            .enumerate()
            .filter_map(|(det_idx, det)| match det.bbox.to_z() {
                Ok(_) => Some(det),
                Err(e) => {
                    log::warn!(
                        "Frame {}: skipping detection {}: {}",
                        self.frame_count,
                        det_idx,
                        e
                    );
                    None
                }
            })
            .collect();
        let det_boxes: Vec<Bbox<f32>> = valid_dets.iter().map(|det| det.bbox).collect();

        let association =
            associate_detections_to_trackers(&det_boxes, &track_boxes, self.config.iou_threshold);

        for &(det_idx, track_idx) in &association.matches {
            let track_id = track_ids[track_idx];
            if let Some(tracklet) = self.tracklets.get_mut(&track_id) {
                match tracklet.update(&det_boxes[det_idx]) {
                    Ok(()) => log::trace!(
                        "Frame {}: track {} corrected with {}",
                        self.frame_count,
                        track_id,
                        det_boxes[det_idx]
                    ),
                    // Only on a corrupted covariance; the track coasts
                    Err(e) => log::warn!(
                        "Frame {}: track {} correction failed: {}",
                        self.frame_count,
                        track_id,
                        e
                    ),
                }
            }
        }

        let created = self.create_tracklets(
            association
                .unmatched_detections
                .iter()
                .map(|&det_idx| valid_dets[det_idx]),
        );
        let removed = self.remove_stale_tracklets();
        let tracked = self.reportable_tracks();

        log::debug!(
            "Frame {}: {} detections ({} valid), {} matched, {} created, {} removed, {} live, {} reported",
            self.frame_count,
            detections.len(),
            valid_dets.len(),
            association.matches.len(),
            created,
            removed,
            self.tracklets.len(),
            tracked.len()
        );

        tracked
    }

    /// Array form of [`Sort::update`]
    ///
    /// Takes an Nx5 array of [x1, y1, x2, y2, score] rows (extra columns are
    /// ignored) and returns an Mx5 array of [x1, y1, x2, y2, track_id] rows.
    pub fn update_array(&mut self, detection_boxes: ArrayView2<f32>) -> Result<Array2<f32>> {
        if detection_boxes.nrows() > 0 && detection_boxes.ncols() < 5 {
            return Err(TrackerError::input(format!(
                "expected at least 5 columns [x1, y1, x2, y2, score], got {}",
                detection_boxes.ncols()
            )));
        }

        let detections: Vec<Detection> = detection_boxes
            .outer_iter()
            .map(|row| Detection::new(row[0], row[1], row[2], row[3], row[4]))
            .collect();

        let tracked = self.update(&detections);

        let mut out = Array2::zeros((tracked.len(), 5));
        for (mut row, obj) in out.outer_iter_mut().zip(&tracked) {
            for (cell, value) in row.iter_mut().zip(obj.to_row()) {
                *cell = value;
            }
        }
        Ok(out)
    }

    /// Advance every tracklet one step and collect the usable predictions
    ///
    /// Tracklets whose prediction is not finite stay alive but sit out this
    /// frame's matching.
    fn predict_tracklets(&mut self) -> (Vec<u32>, Vec<Bbox<f32>>) {
        let mut track_ids = Vec::with_capacity(self.tracklets.len());
        let mut track_boxes = Vec::with_capacity(self.tracklets.len());

        for (&track_id, tracklet) in self.tracklets.iter_mut() {
            let predicted = tracklet.predict();
            if predicted.is_finite() {
                track_ids.push(track_id);
                track_boxes.push(predicted);
            } else {
                log::warn!(
                    "Frame {}: track {} has a non-finite prediction {}, excluded from matching",
                    self.frame_count,
                    track_id,
                    predicted
                );
            }
        }

        (track_ids, track_boxes)
    }

    /// Start a tracklet for every detection passing `init_tracker_min_score`, if set
    fn create_tracklets<'a>(&mut self, detections: impl Iterator<Item = &'a Detection>) -> usize {
        let mut created = 0;
        for det in detections {
            if let Some(min_score) = self.config.init_tracker_min_score {
                if !(det.score >= min_score) {
                    continue;
                }
            }
            let params = KalmanBoxTrackerParams {
                id: self.next_track_id,
                bbox: det.bbox,
                meas_var: Some(self.config.measurement_noise),
                proc_var: Some(self.config.process_noise),
            };
            match KalmanBoxTracker::new(params) {
                Ok(tracklet) => {
                    self.tracklets.insert(self.next_track_id, tracklet);
                    self.next_track_id += 1;
                    created += 1;
                }
                Err(e) => log::warn!("Frame {}: cannot start track: {}", self.frame_count, e),
            }
        }
        created
    }

    /// Drop tracklets that have coasted for more than `max_age` frames
    fn remove_stale_tracklets(&mut self) -> usize {
        let before = self.tracklets.len();
        let max_age = self.config.max_age;
        self.tracklets
            .retain(|_, tracklet| tracklet.time_since_update <= max_age);
        before - self.tracklets.len()
    }

    /// Tracks updated this frame that are confirmed or still in the warm-up frames
    fn reportable_tracks(&self) -> Vec<TrackedObject> {
        self.tracklets
            .values()
            .filter(|tracklet| tracklet.is_reportable(self.config.min_hits, self.frame_count))
            .map(|tracklet| TrackedObject {
                bbox: tracklet.bbox(),
                id: tracklet.id,
            })
            .collect()
    }

    /// Live tracks in creation order, including coasting ones
    pub fn tracks(&self) -> impl Iterator<Item = &KalmanBoxTracker> {
        self.tracklets.values()
    }

    pub fn track(&self, track_id: u32) -> Option<&KalmanBoxTracker> {
        self.tracklets.get(&track_id)
    }

    pub fn num_tracks(&self) -> usize {
        self.tracklets.len()
    }

    /// Number of frames processed so far
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    /// Forget all tracks and start over as a fresh session
    pub fn clear(&mut self) {
        self.tracklets.clear();
        self.next_track_id = 1;
        self.frame_count = 0;
    }

    /// Remove specific track, returning it if it was live
    pub fn remove_track(&mut self, track_id: u32) -> Option<KalmanBoxTracker> {
        self.tracklets.remove(&track_id)
    }
}
