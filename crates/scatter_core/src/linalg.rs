//! 3×3 Cholesky factorization and the triangular solves built on top of it.
//!
//! Only symmetric positive definite inputs are accepted. There is no pivoting
//! and no diagonal jitter: a matrix that fails a leading-minor test is rejected.

use glam::{DMat3, DVec3};

use crate::error::CholeskyError;

/// Lower-triangular `L` with `L·Lᵗ = S`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CholeskyFactor {
    lower: DMat3,
}

impl CholeskyFactor {
    /// Factors `s`, trusting only its diagonal and lower triangle.
    pub fn new(s: &DMat3) -> Result<Self, CholeskyError> {
        cholesky3(s)
    }

    pub fn lower(&self) -> DMat3 {
        self.lower
    }

    /// `|S|^(1/2)`, i.e. the product of the diagonal of `L`.
    pub fn sqrt_determinant(&self) -> f64 {
        self.lower.x_axis.x * self.lower.y_axis.y * self.lower.z_axis.z
    }

    /// Maps independent standard normals onto the factored covariance: `L·z`.
    pub fn transform(&self, z: DVec3) -> DVec3 {
        let l = &self.lower;
        DVec3::new(
            l.x_axis.x * z.x,
            l.x_axis.y * z.x + l.y_axis.y * z.y,
            l.x_axis.z * z.x + l.y_axis.z * z.y + l.z_axis.z * z.z,
        )
    }

    /// Solves `L·y = b`.
    pub fn forward_substitution(&self, b: DVec3) -> DVec3 {
        let l = &self.lower;
        let l00 = l.x_axis.x;
        let l10 = l.x_axis.y;
        let l20 = l.x_axis.z;
        let l11 = l.y_axis.y;
        let l21 = l.y_axis.z;
        let l22 = l.z_axis.z;

        let y0 = b.x / l00;
        let y1 = (b.y - l10 * y0) / l11;
        let y2 = (b.z - l20 * y0 - l21 * y1) / l22;
        DVec3::new(y0, y1, y2)
    }

    /// Solves `Lᵗ·x = y`.
    pub fn backward_substitution(&self, y: DVec3) -> DVec3 {
        let l = &self.lower;
        let l00 = l.x_axis.x;
        let l10 = l.x_axis.y;
        let l20 = l.x_axis.z;
        let l11 = l.y_axis.y;
        let l21 = l.y_axis.z;
        let l22 = l.z_axis.z;

        let x2 = y.z / l22;
        let x1 = (y.y - l21 * x2) / l11;
        let x0 = (y.x - l10 * x1 - l20 * x2) / l00;
        DVec3::new(x0, x1, x2)
    }

    /// Solves `S·x = b` through the two triangular systems.
    pub fn solve(&self, b: DVec3) -> DVec3 {
        self.backward_substitution(self.forward_substitution(b))
    }

    /// `S⁻¹`, see [`symmetric_inverse3`].
    pub fn inverse(&self) -> DMat3 {
        symmetric_inverse3(self)
    }
}

/// Classical 3×3 Cholesky on the lower triangle of `s`.
///
/// NaN pivots count as failures.
pub fn cholesky3(s: &DMat3) -> Result<CholeskyFactor, CholeskyError> {
    let s00 = s.x_axis.x;
    let s10 = s.x_axis.y;
    let s20 = s.x_axis.z;
    let s11 = s.y_axis.y;
    let s21 = s.y_axis.z;
    let s22 = s.z_axis.z;

    let l11 = s00.sqrt();
    if !(s00 > 0.0) || l11.is_nan() {
        return Err(CholeskyError::FirstPivot);
    }
    let l21 = s10 / l11;
    let l31 = s20 / l11;

    let s22p = s11 - l21 * l21;
    if !(s22p > 0.0) {
        return Err(CholeskyError::SecondMinor);
    }
    let l22 = s22p.sqrt();
    let l32 = (s21 - l31 * l21) / l22;

    let s33p = s22 - l31 * l31 - l32 * l32;
    if !(s33p > 0.0) {
        return Err(CholeskyError::ThirdMinor);
    }
    let l33 = s33p.sqrt();

    Ok(CholeskyFactor {
        lower: DMat3::from_cols(
            DVec3::new(l11, l21, l31),
            DVec3::new(0.0, l22, l32),
            DVec3::new(0.0, 0.0, l33),
        ),
    })
}

/// Inverse of the factored matrix, one basis column at a time, symmetrized.
pub fn symmetric_inverse3(factor: &CholeskyFactor) -> DMat3 {
    let mut inv = DMat3::from_cols(
        factor.solve(DVec3::X),
        factor.solve(DVec3::Y),
        factor.solve(DVec3::Z),
    );
    for i in 0..3 {
        for j in (i + 1)..3 {
            let avg = 0.5 * (inv.col(j)[i] + inv.col(i)[j]);
            inv.col_mut(j)[i] = avg;
            inv.col_mut(i)[j] = avg;
        }
    }
    inv
}
