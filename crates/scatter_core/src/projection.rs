//! Axis-aligned orthographic projection of a point cloud into a small RGBA image.
//!
//! Overlapping points are composited by majority vote: each pixel takes the
//! color that covered it most often. Within a pixel, colors are remembered in
//! the order they first arrived and the first one to hold the maximum count
//! wins a tie, so output depends only on point order.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::{palette, Rgba, Rgba8};
use crate::error::{ParameterError, Result};
use crate::Scalar;

/// Margin, in pixels, kept free on every side of the canvas.
pub const PADDING: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn component(self, v: Vec3) -> f64 {
        match self {
            Axis::X => v.x as f64,
            Axis::Y => v.y as f64,
            Axis::Z => v.z as f64,
        }
    }
}

/// The data-space axes mapped onto image columns (U) and rows (V).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectionPlane {
    XY,
    XZ,
    YZ,
}

impl ProjectionPlane {
    pub const ALL: [ProjectionPlane; 3] = [ProjectionPlane::XY, ProjectionPlane::XZ, ProjectionPlane::YZ];

    pub fn axes(self) -> (Axis, Axis) {
        match self {
            ProjectionPlane::XY => (Axis::X, Axis::Y),
            ProjectionPlane::XZ => (Axis::X, Axis::Z),
            ProjectionPlane::YZ => (Axis::Y, Axis::Z),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProjectionPlane::XY => "xy",
            ProjectionPlane::XZ => "xz",
            ProjectionPlane::YZ => "yz",
        }
    }
}

/// Canvas size and marker size for [`render_projection`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterSettings {
    pub width: u32,
    pub height: u32,
    pub point_size: Scalar,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            width: 210,
            height: 210,
            point_size: 5.0,
        }
    }
}

impl RasterSettings {
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.width == 0 || self.height == 0 {
            return Err(ParameterError::EmptyCanvas {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.point_size > 0.0) || !self.point_size.is_finite() {
            return Err(ParameterError::NonPositivePointSize(self.point_size));
        }
        Ok(())
    }

    /// Side length of the square each point covers, in pixels.
    pub fn footprint(&self) -> f64 {
        (self.point_size as f64 * 0.6).max(1.0)
    }
}

/// Row-major RGBA pixels, row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionImage {
    width: u32,
    height: u32,
    pixels: Vec<Rgba8>,
}

impl ProjectionImage {
    fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba8::WHITE; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// The pixel buffer viewed as tightly packed RGBA8 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// Uniform data→pixel mapping shared by every point of one projection.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PixelMapping {
    min_u: f64,
    min_v: f64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    height: f64,
}

impl PixelMapping {
    fn fit(positions: &[Vec3], u_axis: Axis, v_axis: Axis, width: u32, height: u32) -> Self {
        let mut min_u = f64::INFINITY;
        let mut max_u = f64::NEG_INFINITY;
        let mut min_v = f64::INFINITY;
        let mut max_v = f64::NEG_INFINITY;
        for &p in positions {
            let u = u_axis.component(p);
            let v = v_axis.component(p);
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }
        if !(max_u > min_u) || !(max_v > min_v) {
            let center_u = u_axis.component(positions[0]);
            let center_v = v_axis.component(positions[0]);
            min_u = center_u - 1.0;
            max_u = center_u + 1.0;
            min_v = center_v - 1.0;
            max_v = center_v + 1.0;
        }

        let (w, h) = (width as f64, height as f64);
        let inner_w = w - 2.0 * PADDING;
        let inner_h = h - 2.0 * PADDING;
        let scale_u = inner_w / (max_u - min_u);
        let scale_v = inner_h / (max_v - min_v);
        let scale = scale_u.min(scale_v);
        Self {
            min_u,
            min_v,
            scale,
            offset_x: PADDING + (inner_w - (max_u - min_u) * scale) * 0.5,
            offset_y: PADDING + (inner_h - (max_v - min_v) * scale) * 0.5,
            height: h,
        }
    }

    /// Pixel-space center of a data point; image Y grows downward.
    fn project(&self, u: f64, v: f64) -> (f64, f64) {
        let x = (u - self.min_u) * self.scale + self.offset_x;
        let y = self.height - ((v - self.min_v) * self.scale + self.offset_y);
        (x, y)
    }
}

/// Inclusive pixel range touched by `[center - side/2, center + side/2)`, clipped to `[0, len)`.
fn covered_cells(center: f64, side: f64, len: u32) -> Option<(usize, usize)> {
    let lo = (center - side * 0.5).floor();
    let hi = (center + side * 0.5).ceil() - 1.0;
    if !lo.is_finite() || !hi.is_finite() || hi < 0.0 || lo >= len as f64 || hi < lo {
        return None;
    }
    let lo = lo.max(0.0) as usize;
    let hi = hi.min(len as f64 - 1.0) as usize;
    Some((lo, hi))
}

/// Rasterizes `positions` onto the `plane` view.
///
/// When `colors` does not match `positions` in length every point is drawn
/// in the fallback DodgerBlue. An empty cloud yields an all-white image.
pub fn render_projection(
    positions: &[Vec3],
    colors: &[Rgba],
    plane: ProjectionPlane,
    settings: &RasterSettings,
) -> Result<ProjectionImage> {
    settings.validate()?;
    let mut image = ProjectionImage::blank(settings.width, settings.height);
    if positions.is_empty() {
        return Ok(image);
    }

    let (u_axis, v_axis) = plane.axes();
    let mapping = PixelMapping::fit(positions, u_axis, v_axis, settings.width, settings.height);
    let side = settings.footprint();
    let fallback = palette::dodger_blue().to_rgba8();
    let per_point_colors = colors.len() == positions.len();
    if !per_point_colors && !colors.is_empty() {
        tracing::warn!(
            positions = positions.len(),
            colors = colors.len(),
            "color buffer length mismatch, using fallback color"
        );
    }

    let width = settings.width as usize;
    let mut votes: Vec<Vec<(Rgba8, u32)>> = vec![Vec::new(); image.pixels.len()];
    for (i, &p) in positions.iter().enumerate() {
        let color = if per_point_colors {
            colors[i].to_rgba8()
        } else {
            fallback
        };
        let (x, y) = mapping.project(u_axis.component(p), v_axis.component(p));
        let Some((x0, x1)) = covered_cells(x, side, settings.width) else {
            continue;
        };
        let Some((y0, y1)) = covered_cells(y, side, settings.height) else {
            continue;
        };
        for py in y0..=y1 {
            for px in x0..=x1 {
                let tally = &mut votes[py * width + px];
                match tally.iter_mut().find(|(c, _)| *c == color) {
                    Some((_, count)) => *count += 1,
                    None => tally.push((color, 1)),
                }
            }
        }
    }

    for (pixel, tally) in image.pixels.iter_mut().zip(votes.iter()) {
        let mut best: Option<(Rgba8, u32)> = None;
        for &(color, count) in tally {
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((color, count));
            }
        }
        if let Some((color, _)) = best {
            *pixel = color;
        }
    }

    Ok(image)
}
