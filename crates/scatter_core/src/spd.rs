//! Random symmetric positive definite covariances for "randomize" actions.

use glam::{DMat3, DVec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::config::{Covariance, MixtureComponent};
use crate::error::ParameterError;

/// Draws `S = Q·D·Qᵗ` with a random rotation `Q` and eigenvalues in a range.
///
/// `anisotropy_bias` pushes each eigenvalue toward one end of the range, so
/// larger values produce more elongated clusters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomSpdGenerator {
    min_eigen: f64,
    max_eigen: f64,
    anisotropy_bias: f64,
}

impl Default for RandomSpdGenerator {
    fn default() -> Self {
        Self {
            min_eigen: 0.02,
            max_eigen: 2.5,
            anisotropy_bias: 0.6,
        }
    }
}

impl RandomSpdGenerator {
    pub fn new(
        min_eigen: f64,
        max_eigen: f64,
        anisotropy_bias: f64,
    ) -> Result<Self, ParameterError> {
        if !(min_eigen > 0.0) || !(max_eigen >= min_eigen) || !max_eigen.is_finite() {
            return Err(ParameterError::InvalidEigenRange {
                min: min_eigen,
                max: max_eigen,
            });
        }
        if !(anisotropy_bias >= 0.0) || !anisotropy_bias.is_finite() {
            return Err(ParameterError::NegativeAnisotropyBias(anisotropy_bias));
        }
        Ok(Self {
            min_eigen,
            max_eigen,
            anisotropy_bias,
        })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DMat3 {
        let q = random_rotation(rng);

        let mut eigen = [
            self.sample_eigen(rng),
            self.sample_eigen(rng),
            self.sample_eigen(rng),
        ];
        eigen.sort_by(f64::total_cmp);
        let d = DMat3::from_diagonal(DVec3::from_array(eigen));

        let mut s = q * d * q.transpose();
        for i in 0..3 {
            for j in (i + 1)..3 {
                let avg = 0.5 * (s.col(j)[i] + s.col(i)[j]);
                s.col_mut(j)[i] = avg;
                s.col_mut(i)[j] = avg;
            }
        }
        s
    }

    /// Bimodal draw: half the time biased toward `min_eigen`, otherwise toward `max_eigen`.
    fn sample_eigen<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.gen();
        let exponent = 1.0 + 2.0 * self.anisotropy_bias;
        let t = if rng.gen::<f64>() < 0.5 {
            u.powf(exponent)
        } else {
            1.0 - (1.0 - u).powf(exponent)
        };
        self.min_eigen + (self.max_eigen - self.min_eigen) * t
    }
}

/// Orthonormal basis from two random vectors, returned with the basis as columns.
fn random_rotation<R: Rng + ?Sized>(rng: &mut R) -> DMat3 {
    let a = random_unit_cube_vector(rng);
    let b = random_unit_cube_vector(rng);

    let a = normalize_or_x(a);
    let b = normalize_or_x(b - a * a.dot(b));
    let c = normalize_or_x(a.cross(b));
    DMat3::from_cols(a, b, c)
}

fn random_unit_cube_vector<R: Rng + ?Sized>(rng: &mut R) -> DVec3 {
    DVec3::new(
        rng.gen::<f64>() * 2.0 - 1.0,
        rng.gen::<f64>() * 2.0 - 1.0,
        rng.gen::<f64>() * 2.0 - 1.0,
    )
}

fn normalize_or_x(v: DVec3) -> DVec3 {
    let n = v.length();
    if n <= 1e-12 {
        DVec3::X
    } else {
        v / n
    }
}

/// One random SPD covariance from a dedicated stream seeded with `seed`.
pub fn randomize_covariance(
    seed: i64,
    min_eigen: f64,
    max_eigen: f64,
    anisotropy_bias: f64,
) -> Result<DMat3, ParameterError> {
    let generator = RandomSpdGenerator::new(min_eigen, max_eigen, anisotropy_bias)?;
    let mut rng = ChaCha20Rng::seed_from_u64(seed as u64);
    Ok(generator.sample(&mut rng))
}

/// Replaces every component's covariance, drawing from one stream in component order.
pub fn randomize_covariances(
    components: &mut [MixtureComponent],
    seed: i64,
    generator: &RandomSpdGenerator,
) {
    let mut rng = ChaCha20Rng::seed_from_u64(seed as u64);
    for component in components.iter_mut() {
        component.covariance = Covariance::from_mat3(generator.sample(&mut rng));
    }
    tracing::debug!(
        count = components.len(),
        seed,
        "randomized component covariances"
    );
}
