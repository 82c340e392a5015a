// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The arc: one contiguous visible piece of a hull boundary.

use core::f64::consts::{PI, TAU};

use kurbo::{Point, Vec2};

use crate::trig::{normalize_angle, unwrap_near};

/// One contiguous piece of a convex hull boundary.
///
/// An arc belongs to a single source circle (identified by `data`) whose center
/// sits at polar coordinates (`distance`, `angle`) around the hull origin.
///
/// ## Wedges
///
/// Wedges are measured in outward-normal direction. The arc covers the boundary
/// points `center + radius * (cos φ, sin φ)` for every
/// `φ ∈ [angle - lower_wedge, angle + upper_wedge]`. A circle alone on its hull
/// has `lower_wedge = upper_wedge = π`.
///
/// Either wedge may be negative when the circle center lies outside the
/// circle's own visible span; the sum `lower_wedge + upper_wedge` is always the
/// positive width of the span.
///
/// ## Ordering
///
/// Hull arcs are stored by non-decreasing [`sort_angle`](Self::sort_angle),
/// which is `angle + wedge_offset` folded into `(-π, π]`. The offset is zero
/// unless `angle` falls outside the visible span, which happens for the two
/// halves of a split arc and for circles seen edge-on. It then moves the key
/// just inside the span so keys stay unique and follow the boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arc<D> {
    /// Payload identifying the source circle.
    pub data: D,
    /// Radius of the source circle (> 0).
    pub radius: f64,
    /// Distance from the hull origin to the circle center.
    pub distance: f64,
    /// Direction from the hull origin to the circle center, in `(-π, π]`.
    pub angle: f64,
    /// Clockwise extent of the visible span, measured from `angle`.
    pub lower_wedge: f64,
    /// Counterclockwise extent of the visible span, measured from `angle`.
    pub upper_wedge: f64,
    /// Sort-key correction keeping [`sort_angle`](Self::sort_angle) inside the span.
    pub wedge_offset: f64,
}

impl<D: Copy> Arc<D> {
    /// A fully visible circle centered on the origin.
    pub fn full(data: D, radius: f64) -> Self {
        Self {
            data,
            radius,
            distance: 0.0,
            angle: 0.0,
            lower_wedge: PI,
            upper_wedge: PI,
            wedge_offset: 0.0,
        }
    }

    /// A fully visible circle at a polar position around the origin.
    ///
    /// Negative distances are folded into the opposite direction.
    pub fn placed(data: D, radius: f64, distance: f64, angle: f64) -> Self {
        let (distance, angle) = if distance < 0.0 {
            (-distance, angle + PI)
        } else {
            (distance, angle)
        };
        Self {
            distance,
            angle: normalize_angle(angle),
            ..Self::full(data, radius)
        }
    }

    /// Build an arc of the circle at `center` that is visible for outward
    /// normals in `[start, end]`.
    ///
    /// Circles within `eps` of the origin take the span midpoint as their angle.
    pub(crate) fn from_span(
        data: D,
        radius: f64,
        center: Vec2,
        start: f64,
        end: f64,
        eps: f64,
    ) -> Self {
        let distance = center.length();
        let width = end - start;
        let mid = start + 0.5 * width;
        if width >= TAU - eps {
            let angle = if distance <= eps { 0.0 } else { center.atan2() };
            return Self {
                distance: if distance <= eps { 0.0 } else { distance },
                angle: normalize_angle(angle),
                ..Self::full(data, radius)
            };
        }
        if distance <= eps {
            return Self {
                data,
                radius,
                distance: 0.0,
                angle: normalize_angle(mid),
                lower_wedge: 0.5 * width,
                upper_wedge: 0.5 * width,
                wedge_offset: 0.0,
            };
        }
        let angle = normalize_angle(center.atan2());
        let near = unwrap_near(angle, mid);
        Self {
            data,
            radius,
            distance,
            angle,
            lower_wedge: near - start,
            upper_wedge: end - near,
            wedge_offset: 0.0,
        }
    }

    /// Center of the source circle relative to the hull origin.
    pub fn center(&self) -> Point {
        (Vec2::from_angle(self.angle) * self.distance).to_point()
    }

    /// Sort key: `angle + wedge_offset` folded into `(-π, π]`.
    pub fn sort_angle(&self) -> f64 {
        normalize_angle(self.angle + self.wedge_offset)
    }

    /// Visible span as absolute outward-normal directions `(start, end)`.
    ///
    /// `start` is `angle - lower_wedge` (not normalized); `end - start` is the
    /// span width.
    pub fn visible_span(&self) -> (f64, f64) {
        (
            self.angle - self.lower_wedge,
            self.angle + self.upper_wedge,
        )
    }

    /// Width of the visible span in radians.
    pub fn span_width(&self) -> f64 {
        self.lower_wedge + self.upper_wedge
    }

    /// Whether the whole circle is on the boundary.
    pub fn is_full(&self) -> bool {
        self.span_width() >= TAU - 1e-12
    }

    /// Support value of the source circle in outward direction `phi`.
    pub fn support(&self, phi: f64) -> f64 {
        self.center().to_vec2().dot(Vec2::from_angle(phi)) + self.radius
    }

    /// Re-express this arc around an origin moved by `-offset`, i.e. the circle
    /// center becomes `center + offset`.
    ///
    /// Outward normals do not change under translation, so the visible span is
    /// kept and the wedges are re-derived around the new angle.
    #[must_use]
    pub fn translated(&self, offset: Vec2, eps: f64) -> Self {
        let center = self.center().to_vec2() + offset;
        if self.is_full() {
            let distance = center.length();
            return if distance <= eps {
                Self::full(self.data, self.radius)
            } else {
                Self::placed(self.data, self.radius, distance, center.atan2())
            };
        }
        let (start, end) = self.visible_span();
        Self::from_span(self.data, self.radius, center, start, end, eps)
    }

    /// Re-express an arc of a child hull in the frame of the parent whose
    /// center sees the child at (`distance`, `angle`).
    #[must_use]
    pub fn seen_from_parent(&self, distance: f64, angle: f64, eps: f64) -> Self {
        self.translated(Vec2::from_angle(angle) * distance, eps)
    }

    /// Pick `wedge_offset` so that the sort key lies inside the visible span.
    ///
    /// Keys of arcs whose angle is already inside the span stay untouched.
    /// Others land `eps` inside the nearer span endpoint (or on the midpoint of
    /// spans narrower than `2 * eps`).
    pub(crate) fn assign_sort_key(&mut self, eps: f64) {
        self.wedge_offset = 0.0;
        if self.is_full() || (self.lower_wedge >= 0.0 && self.upper_wedge >= 0.0) {
            return;
        }
        let inset = eps.min(0.5 * self.span_width());
        if self.lower_wedge < 0.0 {
            self.wedge_offset = -self.lower_wedge + inset;
        } else {
            self.wedge_offset = self.upper_wedge - inset;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_PI_2;

    #[test]
    fn full_arc_is_fully_visible() {
        let a = Arc::full(7_u32, 2.0);
        assert_eq!(a.lower_wedge, PI);
        assert_eq!(a.upper_wedge, PI);
        assert!(a.is_full());
        assert_eq!(a.center(), Point::ZERO);
        assert!((a.support(1.3) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn placed_folds_negative_distance() {
        let a = Arc::placed((), 1.0, -3.0, 0.25);
        assert!((a.distance - 3.0).abs() < 1e-12);
        assert!((a.angle - (0.25 + PI - TAU)).abs() < 1e-12);
    }

    #[test]
    fn translation_keeps_visible_span() {
        // Upper half of a circle at (1, 0).
        let a = Arc::from_span(1_u8, 1.0, Vec2::new(1.0, 0.0), 0.0, PI, 1e-9);
        assert!(a.lower_wedge.abs() < 1e-12);
        assert!((a.upper_wedge - PI).abs() < 1e-12);

        // Move the circle to (-1, 0): the center now points away from its span.
        let b = a.translated(Vec2::new(-2.0, 0.0), 1e-9);
        let (s, e) = b.visible_span();
        assert!((b.distance - 1.0).abs() < 1e-12);
        assert!(s.rem_euclid(TAU) < 1e-9 || (TAU - s.rem_euclid(TAU)) < 1e-9);
        assert!((e - s - PI).abs() < 1e-12);
        // The center direction (π) now sits on the span's counterclockwise end.
        assert!((b.lower_wedge - PI).abs() < 1e-12);
        assert!(b.upper_wedge.abs() < 1e-12);
    }

    #[test]
    fn concentric_arc_centers_its_angle() {
        let a = Arc::from_span((), 3.0, Vec2::ZERO, 0.5, 1.5, 1e-9);
        assert_eq!(a.distance, 0.0);
        assert!((a.angle - 1.0).abs() < 1e-12);
        assert!((a.lower_wedge - 0.5).abs() < 1e-12);
        assert!((a.upper_wedge - 0.5).abs() < 1e-12);
    }

    #[test]
    fn sort_key_moves_inside_span() {
        // Center at angle 0, visible only around +90°.
        let mut a = Arc::from_span((), 1.0, Vec2::new(2.0, 0.0), 1.0, 2.0, 1e-9);
        assert!(a.lower_wedge < 0.0);
        a.assign_sort_key(1e-6);
        assert!((a.sort_angle() - (1.0 + 1e-6)).abs() < 1e-12);

        let mut b = Arc::from_span((), 1.0, Vec2::new(2.0, 0.0), -2.0, -1.0, 1e-9);
        assert!(b.upper_wedge < 0.0);
        b.assign_sort_key(1e-6);
        assert!((b.sort_angle() - (-1.0 - 1e-6)).abs() < 1e-12);

        let mut c = Arc::from_span((), 1.0, Vec2::new(2.0, 0.0), -FRAC_PI_2, FRAC_PI_2, 1e-9);
        c.assign_sort_key(1e-6);
        assert_eq!(c.wedge_offset, 0.0);
    }

    #[test]
    fn seen_from_parent_adds_polar_offsets() {
        let a = Arc::placed((), 1.0, 2.0, FRAC_PI_2);
        let b = a.seen_from_parent(2.0, 0.0, 1e-9);
        let c = b.center();
        assert!((c.x - 2.0).abs() < 1e-12);
        assert!((c.y - 2.0).abs() < 1e-12);
        assert!(b.is_full());
    }
}
