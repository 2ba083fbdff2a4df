//! SORT: simple online and realtime multi-object tracking of bounding boxes
//!
//! Each tracked object carries a constant-velocity Kalman filter over its box
//! geometry. Every frame, predictions are matched to the detections with an
//! optimal IoU assignment, matched tracks are corrected and unmatched
//! detections start new tracks.
//!
//! ```rust,ignore
//! use sorttrack::{Detection, Sort, SortConfig};
//!
//! let mut tracker = Sort::new(SortConfig::default())?;
//! for frame in frames {
//!     let detections: Vec<Detection> = detect(frame);
//!     for obj in tracker.update(&detections) {
//!         println!("{} {}", obj.id, obj.bbox);
//!     }
//! }
//! ```

pub mod association;
pub mod bbox;
pub mod box_tracker;
pub mod config;
pub mod error;
pub mod hungarian; // Hungarian algorithm for optimal assignment
pub mod kalman;
pub mod tracker;

pub use association::{associate_detections_to_trackers, Association};
pub use bbox::{calculate_iou, ious, Bbox, Detection};
pub use box_tracker::{KalmanBoxTracker, KalmanBoxTrackerParams, TrackState};
pub use config::SortConfig;
pub use error::{Result, TrackerError};
pub use hungarian::{AssignmentResult, HungarianSolver};
pub use tracker::{Sort, TrackedObject};
