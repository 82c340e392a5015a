// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The finished hull: an ordered ring of arcs plus a bounding circle.

use core::f64::consts::TAU;

use kurbo::{Circle, Point, Rect, Shape};

use crate::arc::Arc;
use crate::error::HullError;
use crate::trig::{normalize_angle, wrap_from};

/// Convex hull of a set of circles, in the frame of the node that owns it.
///
/// Arcs are ordered by [`Arc::sort_angle`] and their visible spans tile the
/// full turn of outward-normal directions without gaps.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexHull<D> {
    arcs: Vec<Arc<D>>,
    bounding_circle: Arc<D>,
    faults: u32,
}

impl<D: Copy> ConvexHull<D> {
    /// Hull of a lone circle centered on the origin.
    pub fn single(data: D, radius: f64) -> Self {
        let arc = Arc::full(data, radius);
        Self {
            arcs: vec![arc],
            bounding_circle: arc,
            faults: 0,
        }
    }

    pub(crate) fn from_parts(arcs: Vec<Arc<D>>, bounding_circle: Arc<D>, faults: u32) -> Self {
        Self {
            arcs,
            bounding_circle,
            faults,
        }
    }

    /// Arcs in boundary order.
    pub fn arcs(&self) -> &[Arc<D>] {
        &self.arcs
    }

    /// Number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Always false for a built hull; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Circle enclosing every arc.
    ///
    /// It is centered on the hull center (the largest circle) and reaches the
    /// farthest arc, so it is not necessarily the smallest enclosing circle.
    pub fn bounding_circle(&self) -> Arc<D> {
        self.bounding_circle
    }

    /// Inverse-trig arguments that had to be clamped while building.
    pub fn consistency_faults(&self) -> u32 {
        self.faults
    }

    /// The arc whose visible span contains outward direction `phi`.
    pub fn arc_at(&self, phi: f64) -> Option<&Arc<D>> {
        self.arcs.iter().find(|arc| {
            let (start, end) = arc.visible_span();
            wrap_from(phi, start) <= end
        })
    }

    /// Support function of the hull in outward direction `phi`.
    pub fn support(&self, phi: f64) -> f64 {
        match self.arc_at(phi) {
            Some(arc) => arc.support(phi),
            None => self
                .arcs
                .iter()
                .map(|a| a.support(phi))
                .fold(f64::NEG_INFINITY, f64::max),
        }
    }

    /// Whether the circle at `center` with `radius` lies inside the hull,
    /// allowing it to stick out by at most `tolerance`.
    pub fn contains_circle(&self, center: Point, radius: f64, tolerance: f64) -> bool {
        self.arcs.iter().all(|arc| {
            let diff = center - arc.center();
            let m = diff.length();
            let (start, end) = arc.visible_span();
            // Largest m·cos(φ − β) over the span.
            let reach = if m == 0.0 {
                0.0
            } else {
                let beta = diff.atan2();
                if wrap_from(beta, start) <= end {
                    m
                } else {
                    (m * (start - beta).cos()).max(m * (end - beta).cos())
                }
            };
            reach + radius - arc.radius <= tolerance
        })
    }

    /// Whether `point` lies inside the hull (within `tolerance`).
    pub fn contains_point(&self, point: Point, tolerance: f64) -> bool {
        self.contains_circle(point, 0.0, tolerance)
    }

    /// Axis-aligned box around every arc's circle.
    pub fn bounding_box(&self) -> Rect {
        self.arcs
            .iter()
            .map(|arc| Circle::new(arc.center(), arc.radius).bounding_box())
            .reduce(|a, b| a.union(b))
            .unwrap_or_else(|| {
                Circle::new(self.bounding_circle.center(), self.bounding_circle.radius)
                    .bounding_box()
            })
    }

    /// Check the structural invariants: sort keys are non-decreasing, spans
    /// are positive, each span ends where the next one starts, and all spans
    /// add up to a full turn.
    pub fn validate(&self, tolerance: f64) -> Result<(), HullError> {
        let n = self.arcs.len();
        if n == 0 {
            return Err(HullError::NoCircles);
        }
        for i in 1..n {
            if self.arcs[i].sort_angle() < self.arcs[i - 1].sort_angle() - tolerance {
                return Err(HullError::Unordered { index: i });
            }
        }
        let mut total = 0.0;
        for (i, arc) in self.arcs.iter().enumerate() {
            let width = arc.span_width();
            if width <= 0.0 {
                return Err(HullError::Gap { index: i, gap: width });
            }
            total += width;
            if n > 1 {
                let (_, end) = arc.visible_span();
                let (next, _) = self.arcs[(i + 1) % n].visible_span();
                let gap = normalize_angle(next - end);
                if gap.abs() > tolerance {
                    return Err(HullError::Gap { index: i, gap });
                }
            }
        }
        if (total - TAU).abs() > tolerance {
            return Err(HullError::Gap {
                index: n - 1,
                gap: TAU - total,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::HullBuilder;
    use crate::config::HullConfig;
    use core::f64::consts::{FRAC_PI_2, PI};

    fn pair() -> ConvexHull<u8> {
        let mut b = HullBuilder::new(HullConfig::default());
        b.push_circle(0, 2.0).unwrap();
        b.push_arc(&Arc::placed(1, 1.0, 5.0, 0.0)).unwrap();
        b.build().unwrap()
    }

    #[test]
    fn single_hull_is_valid() {
        let h = ConvexHull::single('a', 3.0);
        h.validate(1e-12).unwrap();
        assert_eq!(h.len(), 1);
        assert_eq!(h.bounding_circle().radius, 3.0);
        assert!((h.support(0.7) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn support_picks_the_visible_circle() {
        let h = pair();
        assert!((h.support(0.0) - 6.0).abs() < 1e-12);
        assert!((h.support(PI) - 2.0).abs() < 1e-12);
        assert_eq!(h.arc_at(0.0).map(|a| a.data), Some(1));
        assert_eq!(h.arc_at(PI).map(|a| a.data), Some(0));
        assert_eq!(h.arc_at(-PI).map(|a| a.data), Some(0));
    }

    #[test]
    fn containment() {
        let h = pair();
        assert!(h.contains_circle(Point::new(5.0, 0.0), 1.0, 1e-9));
        assert!(h.contains_circle(Point::new(3.0, 0.0), 1.2, 1e-9));
        assert!(!h.contains_circle(Point::new(5.0, 0.0), 1.1, 1e-9));
        assert!(h.contains_point(Point::new(-1.9, 0.0), 0.0));
        assert!(!h.contains_point(Point::new(0.0, 2.5), 0.0));
    }

    #[test]
    fn bounding_box_covers_every_circle() {
        let h = pair();
        let bb = h.bounding_box();
        assert!((bb.x0 + 2.0).abs() < 1e-12);
        assert!((bb.x1 - 6.0).abs() < 1e-12);
        assert!((bb.y0 + 2.0).abs() < 1e-12);
        assert!((bb.y1 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn validate_reports_gaps_and_order() {
        let h = pair();
        h.validate(1e-9).unwrap();

        let mut gap = h.clone();
        gap.arcs[0].upper_wedge -= 0.1;
        assert!(matches!(gap.validate(1e-9), Err(HullError::Gap { index: 0, .. })));

        let mut unordered = h.clone();
        unordered.arcs.swap(0, 1);
        assert_eq!(
            unordered.validate(1e-9),
            Err(HullError::Unordered { index: 1 })
        );

        let mut half = ConvexHull::single(0_u8, 1.0);
        half.arcs[0].lower_wedge = FRAC_PI_2;
        assert!(matches!(half.validate(1e-9), Err(HullError::Gap { .. })));
    }
}
