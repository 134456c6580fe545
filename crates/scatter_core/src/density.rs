//! Mixture density sampled on a regular 3D grid for volumetric slicing.

use std::f64::consts::PI;

use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

use crate::config::MixtureComponent;
use crate::error::{ParameterError, Result};
use crate::linalg::cholesky3;
use crate::projection::Axis;
use crate::Scalar;

pub const MIN_RESOLUTION: u32 = 16;
pub const MAX_RESOLUTION: u32 = 256;

/// Axis-aligned box covered by a density grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridBounds {
    pub min: DVec3,
    pub max: DVec3,
}

impl GridBounds {
    /// Union of `mean ± k·σ` boxes; an empty or collapsed axis falls back to `[-1, 1]`.
    pub fn from_components<'a, I>(components: I, sigma_k: f64) -> Self
    where
        I: IntoIterator<Item = &'a MixtureComponent>,
    {
        let mut min = DVec3::splat(f64::INFINITY);
        let mut max = DVec3::splat(f64::NEG_INFINITY);
        for component in components {
            let variance = component.covariance.diagonal_vec().max(DVec3::ZERO);
            let reach = DVec3::new(variance.x.sqrt(), variance.y.sqrt(), variance.z.sqrt()) * sigma_k;
            min = min.min(component.mean - reach);
            max = max.max(component.mean + reach);
        }
        for axis in 0..3 {
            if !(max[axis] > min[axis]) {
                min[axis] = -1.0;
                max[axis] = 1.0;
            }
        }
        Self { min, max }
    }

    pub fn extent(&self) -> DVec3 {
        self.max - self.min
    }
}

/// `res³` density samples normalized so the largest value is 1.
///
/// Node `(x, y, z)` lives at `values[x + y·res + z·res²]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    resolution: usize,
    bounds: GridBounds,
    values: Vec<Scalar>,
}

impl DensityGrid {
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn values(&self) -> &[Scalar] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Scalar> {
        self.values
    }

    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.resolution + z * self.resolution * self.resolution
    }

    pub fn value(&self, x: usize, y: usize, z: usize) -> Scalar {
        self.values[self.index(x, y, z)]
    }

    /// World position of grid node `(x, y, z)`.
    pub fn node_position(&self, x: usize, y: usize, z: usize) -> DVec3 {
        node_position(&self.bounds, self.resolution, x, y, z)
    }

    /// The `res²` plane orthogonal to `axis` at `index`.
    ///
    /// Rows follow the remaining axes in X, Y, Z order with the first of them
    /// varying fastest, e.g. a `Z` slice is laid out `x + y·res`.
    pub fn slice(&self, axis: Axis, index: usize) -> Vec<Scalar> {
        let res = self.resolution;
        let index = index.min(res.saturating_sub(1));
        let mut out = Vec::with_capacity(res * res);
        for b in 0..res {
            for a in 0..res {
                let value = match axis {
                    Axis::X => self.value(index, a, b),
                    Axis::Y => self.value(a, index, b),
                    Axis::Z => self.value(a, b, index),
                };
                out.push(value);
            }
        }
        out
    }
}

fn node_position(bounds: &GridBounds, res: usize, x: usize, y: usize, z: usize) -> DVec3 {
    let denom = (res - 1) as f64;
    let t = DVec3::new(x as f64, y as f64, z as f64) / denom;
    bounds.min + bounds.extent() * t
}

/// Checks the grid resolution and box half-width before any evaluation.
pub fn validate_density_parameters(resolution: u32, sigma_k: f64) -> Result<(), ParameterError> {
    if !(MIN_RESOLUTION..=MAX_RESOLUTION).contains(&resolution) {
        return Err(ParameterError::ResolutionOutOfRange(resolution));
    }
    if !(sigma_k > 0.0) || !sigma_k.is_finite() {
        return Err(ParameterError::NonPositiveSigma(sigma_k));
    }
    Ok(())
}

/// Precomputed per-component terms of `w·N(x; μ, S)`.
struct DensityTerm {
    mean: DVec3,
    inverse: DMat3,
    scale: f64,
}

impl DensityTerm {
    fn eval(&self, p: DVec3) -> f64 {
        let d = p - self.mean;
        let q = d.dot(self.inverse * d);
        self.scale * (-0.5 * q).exp()
    }
}

/// Evaluates `Σ wᵢ·N(x; μᵢ, Sᵢ)` on a `resolution³` grid spanning `mean ± sigma_k·σ`.
///
/// Components whose covariance does not factor are skipped with a warning;
/// the density view tolerates a partially valid mixture.
pub fn evaluate_density_grid(
    components: &[MixtureComponent],
    resolution: u32,
    sigma_k: f64,
) -> Result<DensityGrid> {
    validate_density_parameters(resolution, sigma_k)?;

    let norm = (2.0 * PI).powf(-1.5);
    let mut contributing = Vec::new();
    let mut terms = Vec::new();
    for (index, component) in components.iter().enumerate() {
        if !component.is_eligible() {
            continue;
        }
        match cholesky3(&component.covariance.to_mat3()) {
            Ok(factor) => {
                terms.push(DensityTerm {
                    mean: component.mean,
                    inverse: factor.inverse(),
                    scale: component.weight * norm / factor.sqrt_determinant(),
                });
                contributing.push(component);
            }
            Err(reason) => {
                tracing::warn!(component = index, %reason, "skipping component in density grid");
            }
        }
    }

    let bounds = GridBounds::from_components(contributing.iter().copied(), sigma_k);
    let res = resolution as usize;
    let mut values = vec![0.0 as Scalar; res * res * res];
    let mut peak = 0.0f64;

    if terms.is_empty() {
        tracing::warn!("no component contributes to the density grid");
    } else {
        let mut i = 0;
        for z in 0..res {
            for y in 0..res {
                for x in 0..res {
                    let p = node_position(&bounds, res, x, y, z);
                    let density: f64 = terms.iter().map(|term| term.eval(p)).sum();
                    peak = peak.max(density);
                    values[i] = density as Scalar;
                    i += 1;
                }
            }
        }
    }

    if peak > 0.0 {
        // Peak node divides by its own f32 value so the maximum lands on exactly 1.
        let scale = (peak as Scalar).recip();
        let peak32 = peak as Scalar;
        for v in &mut values {
            *v = if *v == peak32 { 1.0 } else { (*v * scale).min(1.0) };
        }
    }
    tracing::debug!(
        resolution,
        components = terms.len(),
        peak,
        "evaluated density grid"
    );

    Ok(DensityGrid {
        resolution: res,
        bounds,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_components, Covariance};
    use crate::error::EngineError;

    #[test]
    fn grid_is_normalized_to_unit_peak() {
        let grid = evaluate_density_grid(&default_components(), 24, 3.0).unwrap();
        assert_eq!(grid.values().len(), 24 * 24 * 24);
        let max = grid.values().iter().copied().fold(f32::MIN, f32::max);
        assert_eq!(max, 1.0);
        assert!(grid.values().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn bounds_cover_sigma_boxes() {
        let components = default_components();
        let bounds = GridBounds::from_components(&components, 2.0);
        let expected_min_x = -1.0 - 2.0 * 0.4f64.sqrt();
        let expected_max_x = 1.5 + 2.0 * 0.3f64.sqrt();
        assert!((bounds.min.x - expected_min_x).abs() < 1e-12);
        assert!((bounds.max.x - expected_max_x).abs() < 1e-12);
        assert!((bounds.max.z - 2.0 * 0.6f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn degenerate_bounds_fall_back_to_unit_window() {
        let bounds = GridBounds::from_components(std::iter::empty(), 3.0);
        assert_eq!(bounds.min, DVec3::splat(-1.0));
        assert_eq!(bounds.max, DVec3::splat(1.0));
    }

    #[test]
    fn peak_sits_at_single_component_mean() {
        let component = MixtureComponent {
            weight: 1.0,
            mean: DVec3::new(0.5, -0.25, 2.0),
            covariance: Covariance::diagonal(0.5, 0.5, 0.5),
            ..MixtureComponent::default()
        };
        // Odd resolution puts a node exactly on the (symmetric) mean.
        let grid = evaluate_density_grid(&[component], 17, 3.0).unwrap();
        assert_eq!(grid.value(8, 8, 8), 1.0);
        let center = grid.node_position(8, 8, 8);
        assert!((center - component.mean).length() < 1e-12);
        assert!(grid.value(0, 8, 8) < grid.value(4, 8, 8));
    }

    #[test]
    fn raw_density_matches_closed_form() {
        let component = MixtureComponent {
            weight: 1.0,
            mean: DVec3::ZERO,
            covariance: Covariance::diagonal(1.0, 4.0, 9.0),
            ..MixtureComponent::default()
        };
        let grid = evaluate_density_grid(&[component], 17, 2.0).unwrap();
        // Ratio to the peak removes the normalization constant.
        let p = grid.node_position(12, 8, 8);
        let expected = (-0.5 * p.x * p.x).exp() as f32;
        assert!((grid.value(12, 8, 8) - expected).abs() < 1e-6);
    }

    #[test]
    fn single_precision_normalization_tracks_closed_form_everywhere() {
        let component = MixtureComponent {
            weight: 1.0,
            mean: DVec3::new(0.25, 0.0, -0.5),
            covariance: Covariance::diagonal(0.5, 2.0, 1.0),
            ..MixtureComponent::default()
        };
        let grid = evaluate_density_grid(&[component], 33, 3.0).unwrap();
        let inverse = DVec3::new(1.0 / 0.5, 1.0 / 2.0, 1.0);
        let mut worst = 0.0f64;
        for z in 0..33 {
            for y in 0..33 {
                for x in 0..33 {
                    let d = grid.node_position(x, y, z) - component.mean;
                    let expected = (-0.5 * d.dot(d * inverse)).exp();
                    worst = worst.max((grid.value(x, y, z) as f64 - expected).abs());
                }
            }
        }
        assert!(worst < 1e-6, "worst error {worst}");
        assert_eq!(grid.value(16, 16, 16), 1.0);
    }

    #[test]
    fn invalid_components_are_skipped_not_fatal() {
        let mut components = default_components();
        components[1].covariance = Covariance::diagonal(1.0, 1.0, -1.0);
        let grid = evaluate_density_grid(&components, 16, 3.0).unwrap();
        let only_first = evaluate_density_grid(&components[..1], 16, 3.0).unwrap();
        assert_eq!(grid, only_first);
    }

    #[test]
    fn all_invalid_components_give_zero_grid() {
        let component = MixtureComponent {
            covariance: Covariance::diagonal(-1.0, 1.0, 1.0),
            ..MixtureComponent::default()
        };
        let grid = evaluate_density_grid(&[component], 16, 3.0).unwrap();
        assert!(grid.values().iter().all(|&v| v == 0.0));
        assert_eq!(grid.bounds().min, DVec3::splat(-1.0));
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        let components = default_components();
        assert_eq!(
            evaluate_density_grid(&components, 15, 3.0),
            Err(EngineError::Parameter(ParameterError::ResolutionOutOfRange(15)))
        );
        assert_eq!(
            evaluate_density_grid(&components, 257, 3.0),
            Err(EngineError::Parameter(ParameterError::ResolutionOutOfRange(257)))
        );
        assert!(matches!(
            evaluate_density_grid(&components, 16, 0.0),
            Err(EngineError::Parameter(ParameterError::NonPositiveSigma(_)))
        ));
    }

    #[test]
    fn slices_follow_linear_index() {
        let grid = evaluate_density_grid(&default_components(), 16, 3.0).unwrap();
        let res = grid.resolution();
        let z_slice = grid.slice(Axis::Z, 5);
        assert_eq!(z_slice.len(), res * res);
        assert_eq!(z_slice[3 + 7 * res], grid.value(3, 7, 5));

        let x_slice = grid.slice(Axis::X, 2);
        assert_eq!(x_slice[4 + 9 * res], grid.value(2, 4, 9));

        let y_slice = grid.slice(Axis::Y, 11);
        assert_eq!(y_slice[1 + 6 * res], grid.value(1, 11, 6));
    }
}
