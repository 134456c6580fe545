//! Extents of a generated cloud, for framing cameras and drawing axis lines.

use glam::Vec3;

use crate::projection::ProjectionPlane;

/// Radius reported for an empty scene.
pub const DEFAULT_RADIUS: f32 = 5.0;

fn aabb(positions: &[Vec3]) -> Option<(Vec3, Vec3)> {
    let first = *positions.first()?;
    Some(
        positions
            .iter()
            .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
    )
}

/// Bounding-box center and half of its largest side.
pub fn scene_center_and_radius(positions: &[Vec3]) -> (Vec3, f32) {
    match aabb(positions) {
        Some((lo, hi)) => ((lo + hi) * 0.5, (hi - lo).max_element() * 0.5),
        None => (Vec3::ZERO, DEFAULT_RADIUS),
    }
}

/// Half-length for axis lines through the origin: 110% of the largest absolute coordinate.
pub fn axis_half_length(positions: &[Vec3]) -> f32 {
    let reach = positions
        .iter()
        .fold(0.0f32, |acc, p| acc.max(p.abs().max_element()));
    if reach > 0.0 {
        reach * 1.1
    } else {
        DEFAULT_RADIUS * 1.1
    }
}

/// Data-space rectangle an orthographic axis-aligned view should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewWindow {
    pub min_u: f64,
    pub max_u: f64,
    pub min_v: f64,
    pub max_v: f64,
    /// Side of the square camera window, 5% larger than the longer range.
    pub width: f64,
}

impl ProjectionPlane {
    /// Per-axis extents of the cloud on this plane; a collapsed axis is widened to `center ± 1`.
    pub fn view_window(self, positions: &[Vec3]) -> ViewWindow {
        let (u_axis, v_axis) = self.axes();
        let (mut min_u, mut max_u, mut min_v, mut max_v) = if positions.is_empty() {
            (-5.0, 5.0, -5.0, 5.0)
        } else {
            positions.iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
                |(lu, hu, lv, hv), &p| {
                    let u = u_axis.component(p);
                    let v = v_axis.component(p);
                    (lu.min(u), hu.max(u), lv.min(v), hv.max(v))
                },
            )
        };
        if !(max_u > min_u) {
            let c = (min_u + max_u) * 0.5;
            min_u = c - 1.0;
            max_u = c + 1.0;
        }
        if !(max_v > min_v) {
            let c = (min_v + max_v) * 0.5;
            min_v = c - 1.0;
            max_v = c + 1.0;
        }
        let width = (max_u - min_u).max(max_v - min_v) * 1.05;
        ViewWindow {
            min_u,
            max_u,
            min_v,
            max_v,
            width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scene_uses_defaults() {
        assert_eq!(scene_center_and_radius(&[]), (Vec3::ZERO, 5.0));
        assert!((axis_half_length(&[]) - 5.5).abs() < 1e-6);
        let window = ProjectionPlane::XY.view_window(&[]);
        assert_eq!((window.min_u, window.max_u), (-5.0, 5.0));
        assert!((window.width - 10.5).abs() < 1e-12);
    }

    #[test]
    fn center_and_radius_follow_bounding_box() {
        let points = [Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 1.0, 2.5)];
        let (center, radius) = scene_center_and_radius(&points);
        assert_eq!(center, Vec3::new(1.0, 0.5, 2.25));
        assert_eq!(radius, 2.0);
    }

    #[test]
    fn axis_length_tracks_largest_coordinate() {
        let points = [Vec3::new(-4.0, 0.5, 1.0), Vec3::new(2.0, -1.0, 3.0)];
        assert!((axis_half_length(&points) - 4.4).abs() < 1e-5);
        assert!((axis_half_length(&[Vec3::ZERO]) - 5.5).abs() < 1e-6);
    }

    #[test]
    fn collapsed_axis_is_widened_independently() {
        let points = [Vec3::new(0.0, 2.0, -3.0), Vec3::new(4.0, 2.0, 1.0)];
        let window = ProjectionPlane::XY.view_window(&points);
        assert_eq!((window.min_u, window.max_u), (0.0, 4.0));
        assert_eq!((window.min_v, window.max_v), (1.0, 3.0));
        assert!((window.width - 4.2).abs() < 1e-12);

        let window = ProjectionPlane::YZ.view_window(&points);
        assert_eq!((window.min_u, window.max_u), (1.0, 3.0));
        assert_eq!((window.min_v, window.max_v), (-3.0, 1.0));
    }
}
