//! Statistical engine behind the Gaussian mixture scatter viewer.
//!
//! Everything here is independent of windowing, cameras or GPU backends:
//! - configuration structs shared between the engine and its caller
//! - deterministic mixture sampling on per-component random streams
//! - density evaluation on a regular grid for volumetric slicing
//! - a small software rasterizer for axis-aligned 2D projections

pub mod allocate;
pub mod bounds;
pub mod config;
pub mod density;
pub mod error;
pub mod gmm;
pub mod linalg;
pub mod metrics;
pub mod normal;
pub mod projection;
pub mod spd;

/// Scalar type of output buffers (positions, colors, density values).
pub type Scalar = f32;

pub use allocate::allocate_samples;
pub use config::{Covariance, MixtureComponent, Rgba, Rgba8, SceneSettings};
pub use density::{evaluate_density_grid, DensityGrid, GridBounds};
pub use error::{CholeskyError, EngineError, ParameterError};
pub use gmm::{generate_mixture_samples, PointCloud};
pub use linalg::{cholesky3, symmetric_inverse3, CholeskyFactor};
pub use normal::NormalStream;
pub use projection::{render_projection, Axis, ProjectionImage, ProjectionPlane, RasterSettings};
pub use spd::{randomize_covariance, randomize_covariances, RandomSpdGenerator};
