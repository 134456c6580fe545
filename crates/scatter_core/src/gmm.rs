//! Deterministic point-cloud generation from a user-specified Gaussian mixture.

use glam::Vec3;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::allocate::allocate_samples;
use crate::config::{MixtureComponent, Rgba};
use crate::error::{EngineError, Result};
use crate::linalg::{cholesky3, CholeskyFactor};
use crate::normal::NormalStream;

/// Parallel position/color buffers of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Rgba>,
}

impl PointCloud {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn push(&mut self, position: Vec3, color: Rgba) {
        self.positions.push(position);
        self.colors.push(color);
    }
}

/// Samples the whole mixture.
///
/// Counts come from [`allocate_samples`]. Every sampled component is factored
/// before any point is drawn, so a covariance that is not positive definite
/// fails the call without producing partial output. Component `i` draws from
/// its own ChaCha stream whose seed is the next `u64` of a parent stream
/// seeded with the bit pattern of `seed`; identical inputs give bit-identical clouds.
pub fn generate_mixture_samples(
    components: &[MixtureComponent],
    total_samples: Option<u32>,
    seed: i64,
) -> Result<PointCloud> {
    let counts = allocate_samples(components, total_samples)?;

    let mut plan: Vec<(usize, usize, CholeskyFactor)> = Vec::new();
    for (index, (component, &count)) in components.iter().zip(counts.iter()).enumerate() {
        if count == 0 {
            continue;
        }
        let factor = cholesky3(&component.covariance.to_mat3())
            .map_err(|reason| EngineError::NonPositiveDefinite { index, reason })?;
        plan.push((index, count, factor));
    }

    let total: usize = plan.iter().map(|(_, count, _)| count).sum();
    let mut cloud = PointCloud::with_capacity(total);
    let mut parent = ChaCha20Rng::seed_from_u64(seed as u64);

    for (index, count, factor) in plan {
        let component = &components[index];
        let child_seed = parent.next_u64();
        let mut stream = NormalStream::new(ChaCha20Rng::seed_from_u64(child_seed));
        for _ in 0..count {
            let sample = stream.next_correlated(component.mean, &factor);
            cloud.push(sample.as_vec3(), component.color);
        }
        tracing::debug!(component = index, count, child_seed, "sampled mixture component");
    }

    Ok(cloud)
}
