//! Bounding box geometry, the Kalman measurement codec and IoU calculations

use crate::error::{Result, TrackerError};
use ndarray::prelude::*;
use rayon::prelude::*;
use std::fmt;

/// Axis-aligned bounding box given by its corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bbox<T = f32> {
    pub xmin: T,
    pub ymin: T,
    pub xmax: T,
    pub ymax: T,
}

impl Bbox<f32> {
    pub fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    pub fn width(&self) -> f32 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f32 {
        self.ymax - self.ymin
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn center_x(&self) -> f32 {
        (self.xmin + self.xmax) / 2.0
    }

    pub fn center_y(&self) -> f32 {
        (self.ymin + self.ymax) / 2.0
    }

    /// True when every corner coordinate is finite
    pub fn is_finite(&self) -> bool {
        self.to_bounds().iter().all(|v| v.is_finite())
    }

    /// Convert to bounds array [xmin, ymin, xmax, ymax]
    pub fn to_bounds(&self) -> [f32; 4] {
        [self.xmin, self.ymin, self.xmax, self.ymax]
    }

    /// Convert to measurement form [center_x, center_y, area, aspect_ratio]
    ///
    /// Boxes with a non-positive width or height, or with non-finite corners,
    /// have no meaningful aspect ratio and are rejected.
    pub fn to_z(&self) -> Result<[f32; 4]> {
        let reason = if !self.is_finite() {
            Some("non-finite coordinate")
        } else if self.width() <= 0.0 {
            Some("non-positive width")
        } else if self.height() <= 0.0 {
            Some("non-positive height")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(TrackerError::DegenerateBox {
                x1: self.xmin,
                y1: self.ymin,
                x2: self.xmax,
                y2: self.ymax,
                reason,
            });
        }

        let w = self.width();
        let h = self.height();
        Ok([self.center_x(), self.center_y(), w * h, w / h])
    }

    /// Create from measurement form [center_x, center_y, area, aspect_ratio]
    ///
    /// Negative areas are clamped to zero. A zero area produces NaN extents,
    /// which callers detect with [`Bbox::is_finite`].
    pub fn from_z(z: &[f32; 4]) -> Self {
        let [center_x, center_y, area, aspect_ratio] = *z;
        let area = area.max(0.0);

        let w = (area * aspect_ratio).sqrt();
        let h = area / w;

        Self {
            xmin: center_x - w / 2.0,
            ymin: center_y - h / 2.0,
            xmax: center_x + w / 2.0,
            ymax: center_y + h / 2.0,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Bbox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bbox({}, {}, {}, {})",
            self.xmin, self.ymin, self.xmax, self.ymax
        )
    }
}

/// A detector output: box plus confidence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub bbox: Bbox<f32>,
    pub score: f32,
}

impl Detection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> Self {
        Self {
            bbox: Bbox::new(x1, y1, x2, y2),
            score,
        }
    }
}

/// Calculate IoU between two bounding boxes
pub fn calculate_iou(bbox1: &Bbox<f32>, bbox2: &Bbox<f32>) -> f32 {
    let x1 = bbox1.xmin.max(bbox2.xmin);
    let y1 = bbox1.ymin.max(bbox2.ymin);
    let x2 = bbox1.xmax.min(bbox2.xmax);
    let y2 = bbox1.ymax.min(bbox2.ymax);

    if !(x2 > x1 && y2 > y1) {
        return 0.0;
    }

    let intersection = (x2 - x1) * (y2 - y1);
    let union = bbox1.area() + bbox2.area() - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

/// IoU matrix between detections (rows) and tracks (columns)
pub fn ious(detections: &[Bbox<f32>], tracks: &[Bbox<f32>]) -> Array2<f32> {
    let mut matrix = Array2::zeros((detections.len(), tracks.len()));
    if detections.is_empty() || tracks.is_empty() {
        return matrix;
    }

    matrix
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(detections.par_iter())
        .for_each(|(mut row, det)| {
            for (cell, trk) in row.iter_mut().zip(tracks) {
                *cell = calculate_iou(det, trk);
            }
        });

    matrix
}
