//! Standard and correlated normal variates drawn from a single random stream.

use glam::DVec3;
use rand::Rng;

use crate::linalg::CholeskyFactor;

/// Marsaglia polar sampler bound to one random stream.
///
/// Each polar draw yields two variates; the second is held in `spare` and
/// returned by the next call on the same stream. Streams never share it.
#[derive(Debug, Clone)]
pub struct NormalStream<R> {
    rng: R,
    spare: Option<f64>,
}

impl<R: Rng> NormalStream<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, spare: None }
    }

    /// Next `N(0, 1)` variate.
    pub fn next_standard(&mut self) -> f64 {
        if let Some(spare) = self.spare.take() {
            return spare;
        }
        loop {
            let u = 2.0 * self.rng.gen::<f64>() - 1.0;
            let v = 2.0 * self.rng.gen::<f64>() - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                let m = (-2.0 * s.ln() / s).sqrt();
                self.spare = Some(v * m);
                return u * m;
            }
        }
    }

    /// Three independent standard normals, in draw order.
    pub fn next_standard3(&mut self) -> DVec3 {
        let z0 = self.next_standard();
        let z1 = self.next_standard();
        let z2 = self.next_standard();
        DVec3::new(z0, z1, z2)
    }

    /// Next `N(mean, L·Lᵗ)` sample.
    pub fn next_correlated(&mut self, mean: DVec3, factor: &CholeskyFactor) -> DVec3 {
        mean + factor.transform(self.next_standard3())
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}
