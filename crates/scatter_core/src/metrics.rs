//! Numeric summaries used for logging and statistical checks.

use glam::{DMat3, DVec3};

use crate::Scalar;

/// Sum of all values; a cheap fingerprint for comparing density grids.
pub fn checksum(values: &[Scalar]) -> f64 {
    values.iter().map(|&v| v as f64).sum()
}

/// Sample mean and biased (divide-by-N) sample covariance of a point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleMoments {
    pub count: usize,
    pub mean: DVec3,
    pub covariance: DMat3,
}

impl SampleMoments {
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = DVec3>,
    {
        // Welford update keeps large sample counts stable.
        let mut count = 0usize;
        let mut mean = DVec3::ZERO;
        let mut scatter = DMat3::ZERO;
        for p in points {
            count += 1;
            let delta = p - mean;
            mean += delta / count as f64;
            let delta_after = p - mean;
            scatter += outer(delta, delta_after);
        }
        let covariance = if count > 0 {
            scatter * (1.0 / count as f64)
        } else {
            DMat3::ZERO
        };
        Self {
            count,
            mean,
            covariance,
        }
    }
}

fn outer(a: DVec3, b: DVec3) -> DMat3 {
    DMat3::from_cols(a * b.x, a * b.y, a * b.z)
}
