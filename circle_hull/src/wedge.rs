// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visibility wedges: how wide a hull looks from a point outside it.

use core::f64::consts::PI;

use kurbo::{Affine, Point, Vec2};

use crate::hull::ConvexHull;

/// The two tangent rays from a probe point to a hull.
///
/// The probe sits at `(-probe_distance, 0)` in the hull's frame, so the hull is
/// seen along the probe's positive x axis. `upper_angle` is the angle of the
/// counterclockwise tangent above that axis and `lower_angle` the angle of the
/// clockwise tangent below it; the lengths run from the probe to the tangent
/// points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityWedge {
    /// Counterclockwise tangent angle.
    pub upper_angle: f64,
    /// Distance from the probe to the counterclockwise tangent point.
    pub upper_length: f64,
    /// Clockwise tangent angle (positive below the axis).
    pub lower_angle: f64,
    /// Distance from the probe to the clockwise tangent point.
    pub lower_length: f64,
}

impl VisibilityWedge {
    /// The probe is inside the hull, or the hull fills at least a half-plane.
    pub const ENCLOSED: Self = Self {
        upper_angle: PI,
        upper_length: 0.0,
        lower_angle: PI,
        lower_length: 0.0,
    };

    /// Wedge of a single circle seen from `(-probe_distance, 0)`.
    pub fn of_circle(center: Point, radius: f64, probe_distance: f64) -> Self {
        let v = center.to_vec2() + Vec2::new(probe_distance, 0.0);
        let l = v.length();
        if l <= radius {
            return Self::ENCLOSED;
        }
        let alpha = v.atan2();
        let half = (radius / l).asin();
        let length = (l * l - radius * radius).sqrt();
        Self {
            upper_angle: alpha + half,
            upper_length: length,
            lower_angle: half - alpha,
            lower_length: length,
        }
    }

    /// Whether this is the [`ENCLOSED`](Self::ENCLOSED) sentinel.
    pub fn is_enclosed(&self) -> bool {
        *self == Self::ENCLOSED
    }

    /// Total opening angle.
    pub fn width(&self) -> f64 {
        self.upper_angle + self.lower_angle
    }
}

impl<D: Copy> ConvexHull<D> {
    /// Visibility wedge of this hull from `(-probe_distance, 0)`.
    ///
    /// Each tangent comes from the arc circle that reaches furthest to its
    /// side. Returns [`VisibilityWedge::ENCLOSED`] when the probe lies inside
    /// the hull or the opening reaches `π`.
    pub fn visibility_wedge(&self, probe_distance: f64) -> VisibilityWedge {
        self.visibility_wedge_along(probe_distance, 0.0)
    }

    /// Visibility wedge of this hull from a probe that sees the hull center
    /// in direction `axis_angle`, at `probe_distance`.
    ///
    /// The probe sits at `-probe_distance * (cos axis_angle, sin axis_angle)`
    /// in the hull's frame, which is where a parent's center is when this hull
    /// belongs to a child placed at (`probe_distance`, `axis_angle`). Angles
    /// of the result are measured from the probe→center axis.
    pub fn visibility_wedge_along(&self, probe_distance: f64, axis_angle: f64) -> VisibilityWedge {
        // Turn the hull so the axis becomes +x; the probe lands on (-d, 0).
        let turn = Affine::rotate(-axis_angle);
        let wedge_of = |center: Point, radius: f64| {
            VisibilityWedge::of_circle(turn * center, radius, probe_distance)
        };
        match self.arcs() {
            [] => {
                let bc = self.bounding_circle();
                wedge_of(bc.center(), bc.radius)
            }
            [only] => wedge_of(only.center(), only.radius),
            arcs => {
                let probe = (Vec2::from_angle(axis_angle) * -probe_distance).to_point();
                if self.contains_point(probe, 0.0) {
                    return VisibilityWedge::ENCLOSED;
                }
                let mut upper = (f64::NEG_INFINITY, 0.0);
                let mut lower = (f64::NEG_INFINITY, 0.0);
                for arc in arcs {
                    let w = wedge_of(arc.center(), arc.radius);
                    if w.is_enclosed() {
                        return VisibilityWedge::ENCLOSED;
                    }
                    if w.upper_angle > upper.0 {
                        upper = (w.upper_angle, w.upper_length);
                    }
                    if w.lower_angle > lower.0 {
                        lower = (w.lower_angle, w.lower_length);
                    }
                }
                let wedge = VisibilityWedge {
                    upper_angle: upper.0,
                    upper_length: upper.1,
                    lower_angle: lower.0,
                    lower_length: lower.1,
                };
                if wedge.width() >= PI {
                    VisibilityWedge::ENCLOSED
                } else {
                    wedge
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arc::Arc;
    use crate::builder::HullBuilder;
    use crate::config::HullConfig;

    #[test]
    fn single_circle_closed_form() {
        let w = ConvexHull::single((), 1.0).visibility_wedge(5.0);
        let half = (0.2_f64).asin();
        assert!((w.upper_angle - half).abs() < 1e-12);
        assert!((w.lower_angle - half).abs() < 1e-12);
        assert!((w.upper_length - 24.0_f64.sqrt()).abs() < 1e-12);
        assert!((w.lower_length - 24.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn probe_inside_circle_is_enclosed() {
        let w = ConvexHull::single((), 3.0).visibility_wedge(2.0);
        assert!(w.is_enclosed());
        assert_eq!(w, VisibilityWedge::ENCLOSED);
    }

    #[test]
    fn off_axis_circles_tilt_the_wedge() {
        // One circle above the axis and one on it, seen from far away.
        let mut b = HullBuilder::new(HullConfig::default());
        b.push_circle(0_u8, 2.0).unwrap();
        b.push_arc(&Arc::placed(1, 1.0, 4.0, core::f64::consts::FRAC_PI_2))
            .unwrap();
        let hull = b.build().unwrap();
        let w = hull.visibility_wedge(10.0);
        assert!(!w.is_enclosed());

        let top = VisibilityWedge::of_circle(Point::new(0.0, 4.0), 1.0, 10.0);
        let base = VisibilityWedge::of_circle(Point::ZERO, 2.0, 10.0);
        assert!((w.upper_angle - top.upper_angle).abs() < 1e-12);
        assert!((w.upper_length - top.upper_length).abs() < 1e-12);
        assert!((w.lower_angle - base.lower_angle).abs() < 1e-12);
        assert!(w.upper_angle > w.lower_angle);
    }

    #[test]
    fn probe_inside_hull_is_enclosed() {
        // The probe sits between two circles, inside their hull.
        let mut b = HullBuilder::new(HullConfig::default());
        b.push_circle(0_u8, 1.0).unwrap();
        b.push_arc(&Arc::placed(1, 1.0, 6.0, PI)).unwrap();
        let hull = b.build().unwrap();
        assert!(hull.visibility_wedge(3.0).is_enclosed());
    }

    #[test]
    fn wedge_follows_the_probe_axis() {
        // A unit circle at the center and one more 4 units east, seen from 10
        // units south: the eastern circle widens the clockwise side only.
        let mut b = HullBuilder::new(HullConfig::default());
        b.push_circle(0_u8, 1.0).unwrap();
        b.push_arc(&Arc::placed(1, 1.0, 4.0, 0.0)).unwrap();
        let hull = b.build().unwrap();

        let w = hull.visibility_wedge_along(10.0, core::f64::consts::FRAC_PI_2);
        let half = 0.1_f64.asin();
        let east = (1.0 / 116.0_f64.sqrt()).asin() + 0.4_f64.atan();
        assert!((w.upper_angle - half).abs() < 1e-12);
        assert!((w.lower_angle - east).abs() < 1e-12);
        assert!((w.lower_angle - 0.47349).abs() < 1e-5);
        assert!((w.lower_length - 115.0_f64.sqrt()).abs() < 1e-12);

        // Along +x the eastern circle hides behind the center one.
        assert_eq!(hull.visibility_wedge_along(10.0, 0.0), hull.visibility_wedge(10.0));
        let ahead = hull.visibility_wedge(10.0);
        assert!((ahead.upper_angle - half).abs() < 1e-12);
        assert!((ahead.lower_angle - half).abs() < 1e-12);
    }

    #[test]
    fn axis_probe_inside_hull_is_enclosed() {
        let mut b = HullBuilder::new(HullConfig::default());
        b.push_circle(0_u8, 1.0).unwrap();
        b.push_arc(&Arc::placed(1, 1.0, 6.0, -core::f64::consts::FRAC_PI_2))
            .unwrap();
        let hull = b.build().unwrap();
        // The probe at (0, -3) sits between the two circles.
        assert!(hull.visibility_wedge_along(3.0, core::f64::consts::FRAC_PI_2).is_enclosed());
        assert!(!hull.visibility_wedge(3.0).is_enclosed());
    }
}
