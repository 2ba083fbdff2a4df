//! Single-object bounding box tracker built on a constant-velocity Kalman filter

use crate::bbox::Bbox;
use crate::error::Result;
use crate::kalman::{KalmanFilter, KalmanFilterParams};
use nalgebra::{SMatrix, SVector, Vector4};

/// State: [center_x, center_y, area, aspect_ratio, vel_x, vel_y, vel_area]
pub const DIM_X: usize = 7;
/// Measurement: [center_x, center_y, area, aspect_ratio]
pub const DIM_Z: usize = 4;

/// Default diagonal of the measurement noise covariance
pub const DEFAULT_MEAS_VAR: [f32; DIM_Z] = [1.0, 1.0, 10.0, 10.0];
/// Default diagonal of the process noise covariance
pub const DEFAULT_PROC_VAR: [f32; DIM_X] = [1.0, 1.0, 1.0, 1.0, 0.01, 0.01, 0.0001];
/// Diagonal of the initial state covariance, very uncertain about velocities
const INITIAL_STATE_VAR: [f32; DIM_X] = [10.0, 10.0, 10.0, 10.0, 10000.0, 10000.0, 10000.0];

#[derive(Debug, Clone)]
pub struct KalmanBoxTrackerParams {
    pub id: u32,
    pub bbox: Bbox<f32>,
    /// Diagonal of the measurement noise covariance matrix
    /// i.e. uncertainties of (x, y, s, r) measurements
    /// default = [1., 1., 10., 10.]
    pub meas_var: Option<[f32; DIM_Z]>,
    /// Diagonal of the process noise covariance matrix
    /// i.e. uncertainties of (x, y, s, r, dx, dy, ds) during transition
    /// default = [1., 1., 1., 1., 0.01, 0.01, 0.0001]
    pub proc_var: Option<[f32; DIM_X]>,
}

/// Lifecycle stage of a track as seen by the multi-object tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    /// Updated this frame but not yet confirmed
    Tentative,
    /// Updated this frame with a long enough hit streak, or inside the warm-up frames
    Confirmed,
    /// Predicted without a matching detection
    Coasting,
}

#[derive(Debug, Clone)]
pub struct KalmanBoxTracker {
    /// track id
    pub id: u32,
    /// Kalman filter tracking bbox state
    kf: KalmanFilter<DIM_X, DIM_Z>,
    /// number of steps tracker has been run for (each predict() is one step)
    pub age: u32,
    /// number of steps with matching detection box
    pub hits: u32,
    /// number of consecutive steps with matched box
    pub hit_streak: u32,
    /// number of consecutive steps predicted without receiving box
    pub time_since_update: u32,
    /// predicted boxes since the last update
    history: Vec<Bbox<f32>>,
}

impl KalmanBoxTracker {
    /// Create new Kalman filter-based bbox tracker
    ///
    /// Fails when the initial box is degenerate.
    pub fn new(p: KalmanBoxTrackerParams) -> Result<Self> {
        let meas_var = p.meas_var.unwrap_or(DEFAULT_MEAS_VAR);
        let proc_var = p.proc_var.unwrap_or(DEFAULT_PROC_VAR);

        let z = p.bbox.to_z()?;
        let mut x = SVector::<f32, DIM_X>::zeros();
        x.fixed_rows_mut::<DIM_Z>(0).copy_from(&Vector4::from(z));

        // Constant velocity: position and area accumulate their velocities
        let mut f = SMatrix::<f32, DIM_X, DIM_X>::identity();
        f[(0, 4)] = 1.0;
        f[(1, 5)] = 1.0;
        f[(2, 6)] = 1.0;

        let params = KalmanFilterParams {
            x,
            p: SMatrix::from_diagonal(&SVector::from(INITIAL_STATE_VAR)),
            f,
            h: SMatrix::<f32, DIM_Z, DIM_X>::identity(),
            r: SMatrix::from_diagonal(&SVector::from(meas_var)),
            q: SMatrix::from_diagonal(&SVector::from(proc_var)),
        };

        Ok(KalmanBoxTracker {
            id: p.id,
            kf: KalmanFilter::new(params),
            age: 0,
            hits: 0,
            hit_streak: 0,
            time_since_update: 0,
            history: Vec::new(),
        })
    }

    /// Update tracker with detected box
    ///
    /// Bookkeeping is only touched once the filter correction succeeded.
    pub fn update(&mut self, bbox: &Bbox<f32>) -> Result<()> {
        let z = bbox.to_z()?;
        self.kf.update(&Vector4::from(z))?;

        self.time_since_update = 0;
        self.history.clear();
        self.hits += 1;
        self.hit_streak += 1;
        Ok(())
    }

    /// Predict box position in next step
    pub fn predict(&mut self) -> Bbox<f32> {
        // Keep the area from being pushed to or below zero
        if self.kf.x[6] + self.kf.x[2] <= 0.0 {
            self.kf.x[6] = 0.0;
        }

        self.kf.predict();
        self.age += 1;

        if self.time_since_update > 0 {
            self.hit_streak = 0;
        }
        self.time_since_update += 1;

        let bbox = self.bbox();
        self.history.push(bbox);
        bbox
    }

    /// Get current bbox from Kalman filter state
    pub fn bbox(&self) -> Bbox<f32> {
        let state = self.kf.state();
        Bbox::from_z(&[state[0], state[1], state[2], state[3]])
    }

    /// Most recent prediction, if any since the last update
    pub fn last_prediction(&self) -> Option<&Bbox<f32>> {
        self.history.last()
    }

    /// Predictions made since the last update, oldest first
    pub fn history(&self) -> &[Bbox<f32>] {
        &self.history
    }

    pub fn state(&self) -> &SVector<f32, DIM_X> {
        self.kf.state()
    }

    pub fn covariance(&self) -> &SMatrix<f32, DIM_X, DIM_X> {
        self.kf.covariance()
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut SVector<f32, DIM_X> {
        &mut self.kf.x
    }

    #[cfg(test)]
    pub(crate) fn covariance_mut(&mut self) -> &mut SMatrix<f32, DIM_X, DIM_X> {
        &mut self.kf.p
    }

    /// Whether this track is reported by a tracker at `frame_count`
    pub fn is_reportable(&self, min_hits: u32, frame_count: u32) -> bool {
        self.track_state(min_hits, frame_count) == TrackState::Confirmed
    }

    pub fn track_state(&self, min_hits: u32, frame_count: u32) -> TrackState {
        if self.time_since_update >= 1 {
            TrackState::Coasting
        } else if self.hit_streak >= min_hits || frame_count <= min_hits {
            TrackState::Confirmed
        } else {
            TrackState::Tentative
        }
    }
}
