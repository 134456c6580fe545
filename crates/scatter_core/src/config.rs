//! Mixture parameters and scene settings shared between the engine and its callers.

use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

use crate::density::validate_density_parameters;
use crate::error::ParameterError;
use crate::projection::RasterSettings;
use crate::Scalar;

/// Linear RGBA color with every channel in `[0, 1]`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Rgba {
    pub r: Scalar,
    pub g: Scalar,
    pub b: Scalar,
    pub a: Scalar,
}

impl Rgba {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: Scalar, g: Scalar, b: Scalar, a: Scalar) -> Self {
        Self { r, g, b, a }
    }

    /// Builds an opaque color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(
            r as Scalar / 255.0,
            g as Scalar / 255.0,
            b as Scalar / 255.0,
            1.0,
        )
    }

    /// Quantizes every channel to 8 bits, clamping out-of-range values.
    pub fn to_rgba8(self) -> Rgba8 {
        fn quantize(c: Scalar) -> u8 {
            if c.is_nan() {
                return 0;
            }
            (c.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        Rgba8 {
            r: quantize(self.r),
            g: quantize(self.g),
            b: quantize(self.b),
            a: quantize(self.a),
        }
    }
}

/// 8-bit RGBA pixel, laid out so a pixel slice can be viewed as raw bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Named colors used by the component palette.
pub mod palette {
    use super::Rgba;

    pub fn steel_blue() -> Rgba {
        Rgba::from_rgb8(70, 130, 180)
    }

    pub fn indian_red() -> Rgba {
        Rgba::from_rgb8(205, 92, 92)
    }

    pub fn sea_green() -> Rgba {
        Rgba::from_rgb8(46, 139, 87)
    }

    pub fn dark_orange() -> Rgba {
        Rgba::from_rgb8(255, 140, 0)
    }

    pub fn medium_purple() -> Rgba {
        Rgba::from_rgb8(147, 112, 219)
    }

    pub fn teal() -> Rgba {
        Rgba::from_rgb8(0, 128, 128)
    }

    /// Fallback for points drawn without a matching color buffer.
    pub fn dodger_blue() -> Rgba {
        Rgba::from_rgb8(30, 144, 255)
    }

    /// Color assigned to the `index`-th added component; cycles through six hues.
    pub fn component_color(index: usize) -> Rgba {
        const CYCLE: [fn() -> Rgba; 6] = [
            steel_blue,
            indian_red,
            sea_green,
            dark_orange,
            medium_purple,
            teal,
        ];
        CYCLE[index % CYCLE.len()]()
    }
}

/// Symmetric 3×3 covariance stored as its six independent entries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Covariance {
    pub c11: f64,
    pub c12: f64,
    pub c13: f64,
    pub c22: f64,
    pub c23: f64,
    pub c33: f64,
}

impl Default for Covariance {
    fn default() -> Self {
        Self::diagonal(1.0, 1.0, 1.0)
    }
}

impl Covariance {
    pub fn diagonal(c11: f64, c22: f64, c33: f64) -> Self {
        Self {
            c11,
            c12: 0.0,
            c13: 0.0,
            c22,
            c23: 0.0,
            c33,
        }
    }

    /// Expands into a full symmetric matrix.
    pub fn to_mat3(&self) -> DMat3 {
        DMat3::from_cols(
            DVec3::new(self.c11, self.c12, self.c13),
            DVec3::new(self.c12, self.c22, self.c23),
            DVec3::new(self.c13, self.c23, self.c33),
        )
    }

    /// Reads the diagonal and lower triangle of `m`.
    pub fn from_mat3(m: DMat3) -> Self {
        Self {
            c11: m.x_axis.x,
            c12: m.x_axis.y,
            c13: m.x_axis.z,
            c22: m.y_axis.y,
            c23: m.y_axis.z,
            c33: m.z_axis.z,
        }
    }

    pub fn diagonal_vec(&self) -> DVec3 {
        DVec3::new(self.c11, self.c22, self.c33)
    }
}

/// One weighted Gaussian of the mixture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixtureComponent {
    /// Relative mass; components with `weight <= 0` are ignored.
    pub weight: f64,
    pub mean: DVec3,
    pub covariance: Covariance,
    /// Explicit sample count. `0` means "derive from the total".
    pub sample_count: u32,
    pub color: Rgba,
}

impl Default for MixtureComponent {
    fn default() -> Self {
        Self {
            weight: 1.0,
            mean: DVec3::ZERO,
            covariance: Covariance::default(),
            sample_count: 200,
            color: palette::steel_blue(),
        }
    }
}

impl MixtureComponent {
    /// A default component colored for position `index` in the component list.
    pub fn for_index(index: usize) -> Self {
        Self {
            color: palette::component_color(index),
            ..Self::default()
        }
    }

    pub fn is_eligible(&self) -> bool {
        self.weight > 0.0
    }
}

/// Everything a caller needs to reproduce a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Any integer; negative seeds are as valid as positive ones.
    pub seed: i64,
    pub total_samples: Option<u32>,
    pub point_size: Scalar,
    pub projection_width: u32,
    pub projection_height: u32,
    pub density_resolution: u32,
    pub density_sigma_k: f64,
    pub components: Vec<MixtureComponent>,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            total_samples: None,
            point_size: 5.0,
            projection_width: 210,
            projection_height: 210,
            density_resolution: 64,
            density_sigma_k: 3.0,
            components: default_components(),
        }
    }
}

impl SceneSettings {
    pub fn raster_settings(&self) -> RasterSettings {
        RasterSettings {
            width: self.projection_width,
            height: self.projection_height,
            point_size: self.point_size,
        }
    }

    /// Rejects bad canvas, marker or (when `with_density`) grid parameters
    /// so callers can fail before sampling starts.
    pub fn validate(&self, with_density: bool) -> Result<(), ParameterError> {
        self.raster_settings().validate()?;
        if with_density {
            validate_density_parameters(self.density_resolution, self.density_sigma_k)?;
        }
        Ok(())
    }
}

/// The two-cluster mixture a fresh scene starts with.
pub fn default_components() -> Vec<MixtureComponent> {
    vec![
        MixtureComponent {
            weight: 0.5,
            mean: DVec3::new(-1.0, 0.0, 0.0),
            covariance: Covariance::diagonal(0.4, 0.2, 0.6),
            sample_count: 500,
            color: palette::steel_blue(),
        },
        MixtureComponent {
            weight: 0.5,
            mean: DVec3::new(1.5, 0.5, -0.5),
            covariance: Covariance {
                c11: 0.3,
                c12: 0.1,
                c13: 0.0,
                c22: 0.5,
                c23: -0.05,
                c33: 0.3,
            },
            sample_count: 500,
            color: palette::indian_red(),
        },
    ]
}
