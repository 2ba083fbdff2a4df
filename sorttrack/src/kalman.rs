//! Linear Kalman filter with compile-time state and measurement dimensions

use crate::error::{Result, TrackerError};
use nalgebra::{SMatrix, SVector};

#[derive(Debug, Clone)]
pub struct KalmanFilterParams<const X: usize, const Z: usize> {
    pub x: SVector<f32, X>,    // Initial state
    pub p: SMatrix<f32, X, X>, // Initial state covariance
    pub f: SMatrix<f32, X, X>, // State transition matrix
    pub h: SMatrix<f32, Z, X>, // Observation matrix
    pub r: SMatrix<f32, Z, Z>, // Observation noise covariance
    pub q: SMatrix<f32, X, X>, // Process noise covariance
}

#[derive(Debug, Clone)]
pub struct KalmanFilter<const X: usize, const Z: usize> {
    pub x: SVector<f32, X>,    // State vector
    pub p: SMatrix<f32, X, X>, // State covariance matrix
    pub f: SMatrix<f32, X, X>, // State transition matrix
    pub h: SMatrix<f32, Z, X>, // Observation matrix
    pub r: SMatrix<f32, Z, Z>, // Observation noise covariance
    pub q: SMatrix<f32, X, X>, // Process noise covariance
    pub y: SVector<f32, Z>,    // Residual of the last update
    pub s: SMatrix<f32, Z, Z>, // Innovation covariance of the last update
    pub k: SMatrix<f32, X, Z>, // Kalman gain of the last update
}

impl<const X: usize, const Z: usize> KalmanFilter<X, Z> {
    pub fn new(params: KalmanFilterParams<X, Z>) -> Self {
        Self {
            x: params.x,
            p: params.p,
            f: params.f,
            h: params.h,
            r: params.r,
            q: params.q,
            y: SVector::zeros(),
            s: SMatrix::zeros(),
            k: SMatrix::zeros(),
        }
    }

    /// Predict the next state
    pub fn predict(&mut self) {
        // x = F * x
        self.x = self.f * self.x;

        // P = F * P * F^T + Q
        self.p = self.f * self.p * self.f.transpose() + self.q;
    }

    /// Correct the state with an observation
    ///
    /// On failure the state and covariance are left untouched.
    pub fn update(&mut self, z: &SVector<f32, Z>) -> Result<()> {
        // Residual: y = z - H * x
        let y = z - self.h * self.x;

        // Innovation covariance: S = H * P * H^T + R
        let s = self.h * self.p * self.h.transpose() + self.r;

        // Kalman gain: K = P * H^T * S^-1
        let s_inv = s
            .try_inverse()
            .ok_or_else(|| TrackerError::filter("innovation covariance is singular"))?;
        let k = self.p * self.h.transpose() * s_inv;

        // x = x + K * y
        self.x += k * y;

        // P = (I - K * H) * P
        self.p = (SMatrix::<f32, X, X>::identity() - k * self.h) * self.p;

        self.y = y;
        self.s = s;
        self.k = k;
        Ok(())
    }

    /// Get current state
    pub fn state(&self) -> &SVector<f32, X> {
        &self.x
    }

    /// Get current covariance
    pub fn covariance(&self) -> &SMatrix<f32, X, X> {
        &self.p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::{Matrix1, Matrix1x2, Matrix2, Vector1, Vector2};

    fn position_filter() -> KalmanFilter<2, 1> {
        // [position, velocity], observing position only
        KalmanFilter::new(KalmanFilterParams {
            x: Vector2::new(0.0, 1.0),
            p: Matrix2::from_diagonal(&Vector2::new(1000.0, 1000.0)),
            f: Matrix2::new(1.0, 1.0, 0.0, 1.0),
            h: Matrix1x2::new(1.0, 0.0),
            r: Matrix1::new(0.1),
            q: Matrix2::from_diagonal(&Vector2::new(0.01, 0.01)),
        })
    }

    #[test]
    fn test_kalman_filter_basic() {
        let mut kf = position_filter();

        kf.predict();
        assert_abs_diff_eq!(kf.x[0], 1.0, epsilon = 0.001);

        kf.update(&Vector1::new(0.9)).unwrap();

        // State should be somewhere between prediction and measurement
        assert!(kf.x[0] > 0.8 && kf.x[0] < 1.0);
    }

    #[test]
    fn test_update_shrinks_covariance() {
        let mut kf = position_filter();
        kf.predict();
        let before = kf.covariance()[(0, 0)];
        kf.update(&Vector1::new(1.0)).unwrap();
        assert!(kf.covariance()[(0, 0)] < before);
    }

    #[test]
    fn test_singular_innovation_is_an_error() {
        let mut kf = position_filter();
        kf.p = Matrix2::zeros();
        kf.r = Matrix1::zeros();
        let state = *kf.state();
        assert!(matches!(
            kf.update(&Vector1::new(3.0)),
            Err(TrackerError::Filter(_))
        ));
        assert_eq!(*kf.state(), state);
    }
}
