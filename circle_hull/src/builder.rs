// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental convex hull of circles.
//!
//! The builder follows Devillers & Golin: the largest circle becomes the hull
//! center, every other circle is inserted in order of non-increasing radius,
//! and each insertion only touches the arcs it eclipses.
//!
//! Internally the hull is a ring of [`Piece`]s. A piece names a circle and the
//! outward-normal direction where its visible span starts; the span ends where
//! the next piece starts, and the last piece wraps around to the first one
//! `2π` later. Normal directions do not depend on where the origin is, which is
//! what lets the finished ring be moved back into the caller's frame without
//! touching the spans.

use core::f64::consts::{PI, TAU};
use core::fmt::Debug;

use kurbo::Vec2;
use tracing::{debug, trace};

use crate::arc::Arc;
use crate::config::HullConfig;
use crate::error::{HullError, check_finite, check_radius};
use crate::hull::ConvexHull;
use crate::trig::{clamp_unit, wrap_from};

/// A candidate circle in Cartesian form.
#[derive(Clone, Copy, Debug)]
struct Disc<D> {
    data: D,
    center: Vec2,
    radius: f64,
}

/// Start of one visible span in the hull ring.
#[derive(Clone, Copy, Debug)]
struct Piece {
    disc: usize,
    start: f64,
}

/// Collects candidate circles and builds their [`ConvexHull`].
///
/// Positions are relative to the caller's origin (usually the center of the
/// node whose hull is being built). The finished hull is expressed in the same
/// frame.
///
/// ```
/// use circle_hull::{Arc, HullBuilder, HullConfig};
///
/// let mut builder = HullBuilder::new(HullConfig::default());
/// builder.push_circle("root", 2.0)?;
/// builder.push_arc(&Arc::placed("east", 1.0, 5.0, 0.0))?;
/// builder.push_arc(&Arc::placed("inner", 0.5, 1.0, 2.0))?;
/// let hull = builder.build()?;
///
/// // The inner circle hides inside the root circle.
/// assert_eq!(hull.len(), 2);
/// assert!(hull.arcs().iter().all(|a| a.data != "inner"));
/// # Ok::<(), circle_hull::HullError>(())
/// ```
#[derive(Clone, Debug)]
pub struct HullBuilder<D> {
    config: HullConfig,
    candidates: Vec<Disc<D>>,
}

impl<D: Copy + PartialEq + Debug> HullBuilder<D> {
    /// Create an empty builder.
    pub fn new(config: HullConfig) -> Self {
        Self {
            config,
            candidates: Vec::new(),
        }
    }

    /// Number of candidate circles collected so far.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// True if no candidate has been pushed.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Add a circle centered on the origin (the node's own circle).
    pub fn push_circle(&mut self, data: D, radius: f64) -> Result<(), HullError> {
        self.push_arc(&Arc::full(data, radius))
    }

    /// Add the circle behind an arc. Only its payload, radius and placement
    /// matter; wedges are ignored.
    pub fn push_arc(&mut self, arc: &Arc<D>) -> Result<(), HullError> {
        let radius = check_radius(arc.radius)?;
        check_finite("distance", arc.distance)?;
        check_finite("angle", arc.angle)?;
        self.candidates.push(Disc {
            data: arc.data,
            center: arc.center().to_vec2(),
            radius,
        });
        Ok(())
    }

    /// Add every circle visible on a child's hull, where the child's center
    /// sits at (`distance`, `angle`) from the origin.
    ///
    /// A circle that the child sees through several arcs (after a split) is
    /// added once.
    pub fn push_subtree(
        &mut self,
        hull: &ConvexHull<D>,
        distance: f64,
        angle: f64,
    ) -> Result<(), HullError> {
        check_finite("distance", distance)?;
        check_finite("angle", angle)?;
        let eps = self.config.eps_length;
        let arcs = hull.arcs();
        for (i, arc) in arcs.iter().enumerate() {
            let repeated = arcs[..i].iter().any(|prev| {
                prev.data == arc.data
                    && (prev.radius - arc.radius).abs() <= eps
                    && (prev.center() - arc.center()).length() <= eps
            });
            if repeated {
                continue;
            }
            self.push_arc(&arc.seen_from_parent(distance, angle, eps))?;
        }
        Ok(())
    }

    /// Compute the hull of all collected circles.
    pub fn build(&self) -> Result<ConvexHull<D>, HullError> {
        if self.candidates.is_empty() {
            return Err(HullError::NoCircles);
        }
        let eps = self.config.eps_length;

        // The largest circle (nearest one on ties) anchors the local frame.
        let root = self
            .candidates
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                b.radius
                    .total_cmp(&a.radius)
                    .then(a.center.length().total_cmp(&b.center.length()))
            })
            .map(|(i, _)| i)
            .unwrap_or(0);
        let origin = self.candidates[root].center;
        let discs: Vec<Disc<D>> = self
            .candidates
            .iter()
            .map(|d| Disc {
                center: d.center - origin,
                ..*d
            })
            .collect();
        let big = discs[root].radius;

        let mut order: Vec<usize> = (0..discs.len())
            .filter(|&i| i != root && discs[i].center.length() + discs[i].radius > big + eps)
            .collect();
        order.sort_by(|&a, &b| {
            discs[b]
                .radius
                .total_cmp(&discs[a].radius)
                .then(discs[a].center.length().total_cmp(&discs[b].center.length()))
        });

        let mut ring = Ring {
            config: &self.config,
            discs: &discs,
            root,
            pieces: vec![Piece {
                disc: root,
                start: -PI,
            }],
            faults: 0,
        };
        if let Some((&first, rest)) = order.split_first() {
            ring.seed(first);
            for &i in rest {
                ring.insert(i);
            }
        }

        let local = ring.arcs();
        let bound_radius = local
            .iter()
            .map(|a| a.radius + a.distance)
            .fold(big, f64::max);
        let mut arcs: Vec<Arc<D>> = if origin.length() <= eps {
            local
        } else {
            local.iter().map(|a| a.translated(origin, eps)).collect()
        };
        for arc in &mut arcs {
            arc.assign_sort_key(self.config.eps_angle);
        }
        let first = arcs
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.sort_angle().total_cmp(&b.sort_angle()))
            .map(|(i, _)| i)
            .unwrap_or(0);
        arcs.rotate_left(first);

        let bounding = Arc::full(discs[root].data, bound_radius).translated(origin, eps);
        debug!(
            circles = discs.len(),
            inserted = order.len(),
            arcs = arcs.len(),
            faults = ring.faults,
            "built convex hull"
        );
        let hull = ConvexHull::from_parts(arcs, bounding, ring.faults);
        if self.config.strict && ring.faults > 0 {
            return Err(HullError::Inconsistent {
                faults: ring.faults,
            });
        }
        Ok(hull)
    }
}

/// The hull under construction, in the frame centered on the root circle.
struct Ring<'a, D> {
    config: &'a HullConfig,
    discs: &'a [Disc<D>],
    root: usize,
    pieces: Vec<Piece>,
    faults: u32,
}

impl<D: Copy + Debug> Ring<'_, D> {
    fn base(&self) -> f64 {
        self.pieces[0].start
    }

    /// Visible span of piece `j` in ring coordinates.
    fn span(&self, j: usize) -> (f64, f64) {
        let start = self.pieces[j].start;
        let end = match self.pieces.get(j + 1) {
            Some(next) => next.start,
            None => self.base() + TAU,
        };
        (start, end)
    }

    /// Index of the piece whose span holds `angle` (any representative).
    fn piece_at(&self, angle: f64) -> usize {
        let x = wrap_from(angle, self.base());
        self.pieces
            .partition_point(|p| p.start <= x)
            .saturating_sub(1)
    }

    fn touch_tolerance(&self) -> f64 {
        self.config.eps_angle.max(1e-12) * 100.0
    }

    fn acos(&mut self, x: f64) -> f64 {
        let (x, fault) = clamp_unit(x, self.config.trig_slack);
        if fault {
            self.faults += 1;
        }
        x.acos()
    }

    /// Start the ring with the root circle and the first circle poking out of it.
    fn seed(&mut self, first: usize) {
        let disc = self.discs[first];
        let big = self.discs[self.root].radius;
        let dist = disc.center.length();
        let beta = disc.center.atan2();
        let w = self.acos((big - disc.radius) / dist);
        self.pieces = vec![
            Piece {
                disc: first,
                start: beta - w,
            },
            Piece {
                disc: self.root,
                start: beta + w,
            },
        ];
        trace!(candidate = ?disc.data, wedge = w, "seeded hull");
        self.coalesce();
    }

    fn insert(&mut self, i: usize) {
        let disc = self.discs[i];
        let theta = disc.center.atan2();

        // Locate the piece facing the candidate and its nearer neighbor.
        let n = self.pieces.len();
        let lo = self.piece_at(theta);
        let (s, e) = self.span(lo);
        let t = wrap_from(theta, s);
        let hi = if t - s < e - t {
            (lo + n - 1) % n
        } else {
            (lo + 1) % n
        };

        let (lo_disc, hi_disc) = (self.pieces[lo].disc, self.pieces[hi].disc);
        if self.encloses(lo_disc, i)
            || self.encloses(hi_disc, i)
            || self.trio_encloses([lo_disc, hi_disc, self.root], i)
        {
            trace!(candidate = ?disc.data, "enclosed by neighbors");
            return;
        }

        let runs = match self.traverse_from(lo, hi, i) {
            Some(runs) => runs,
            None => self.scan(i),
        };
        if runs.is_empty() {
            trace!(candidate = ?disc.data, "hidden behind hull");
            return;
        }
        for &(a, b) in &runs {
            self.overwrite(i, a, b);
        }
        self.coalesce();
        trace!(candidate = ?disc.data, runs = runs.len(), arcs = self.pieces.len(), "inserted");
    }

    /// Circle `i` lies inside circle `j`.
    fn encloses(&self, j: usize, i: usize) -> bool {
        let (a, c) = (self.discs[j], self.discs[i]);
        (c.center - a.center).length() + c.radius <= a.radius + self.config.eps_length
    }

    /// Sufficient test for circle `i` lying inside the hull of three circles.
    ///
    /// Every circle is shrunk by the candidate radius, which turns the question
    /// into a point-in-hull test. The point is accepted if it lies inside the
    /// triangle of centers or inside the Minkowski blend of any pair at its
    /// projection onto the pair's center segment.
    fn trio_encloses(&self, trio: [usize; 3], i: usize) -> bool {
        let eps = self.config.eps_length;
        let p = self.discs[i].center;
        let shrink = self.discs[i].radius;
        let shrunk = trio.map(|j| (self.discs[j].center, (self.discs[j].radius - shrink).max(0.0)));

        for (a, b) in [(0, 1), (1, 2), (0, 2)] {
            let (ca, ra) = shrunk[a];
            let (cb, rb) = shrunk[b];
            let ab = cb - ca;
            let len2 = ab.dot(ab);
            let t = if len2 <= eps * eps {
                0.0
            } else {
                ((p - ca).dot(ab) / len2).clamp(0.0, 1.0)
            };
            let q = ca + ab * t;
            if (p - q).length() <= ra + (rb - ra) * t + eps {
                return true;
            }
        }

        let [(a, _), (b, _), (c, _)] = shrunk;
        let area = (b - a).cross(c - a);
        if area.abs() <= eps {
            return false;
        }
        let sign = area.signum();
        (b - a).cross(p - a) * sign >= 0.0
            && (c - b).cross(p - b) * sign >= 0.0
            && (a - c).cross(p - c) * sign >= 0.0
    }

    /// Directions inside piece `j` where circle `i` sticks out past it.
    ///
    /// `shift` is added to the piece span, for walks that wrap past the ring end.
    fn wins(&self, j: usize, i: usize, shift: f64) -> Vec<(f64, f64)> {
        let (s, e) = self.span(j);
        let (s, e) = (s + shift, e + shift);
        let owner = self.discs[self.pieces[j].disc];
        let cand = self.discs[i];
        let diff = cand.center - owner.center;
        let m = diff.length();
        let dr = cand.radius - owner.radius;
        if m <= self.config.eps_length {
            return if dr > self.config.eps_length {
                vec![(s, e)]
            } else {
                Vec::new()
            };
        }
        // m·cos(φ − β) + dr > 0
        let t = -dr / m;
        if t >= 1.0 {
            return Vec::new();
        }
        if t <= -1.0 {
            return vec![(s, e)];
        }
        let w = t.acos();
        let beta = diff.atan2();
        let mut lo = beta - w;
        lo += TAU * ((s - lo) / TAU).floor();
        let mut out = Vec::with_capacity(2);
        for a in [lo, lo + TAU] {
            let x = a.max(s);
            let y = (a + 2.0 * w).min(e);
            if y > x {
                out.push((x, y));
            }
        }
        out
    }

    /// Walk outward from the located pieces while the candidate keeps winning.
    ///
    /// Returns `None` when the neighborhood gives no clear answer and the whole
    /// ring has to be scanned.
    fn traverse_from(&self, lo: usize, hi: usize, i: usize) -> Option<Vec<(f64, f64)>> {
        let n = self.pieces.len();
        let tol = self.touch_tolerance();
        let (start, (mut a, mut b)) = [lo, hi].into_iter().find_map(|j| {
            let w = self.wins(j, i, 0.0);
            (w.len() == 1).then(|| (j, w[0]))
        })?;

        let mut steps = 0;
        let (_, e0) = self.span(start);
        let mut open = b >= e0 - tol;
        let (mut j, mut shift) = (start, 0.0);
        while open && steps + 1 < n {
            j += 1;
            if j == n {
                j = 0;
                shift += TAU;
            }
            steps += 1;
            let (sj, ej) = self.span(j);
            let w = self.wins(j, i, shift);
            match w.first() {
                Some(&(x, y)) if x <= sj + shift + tol => {
                    b = y;
                    open = w.len() == 1 && y >= ej + shift - tol;
                }
                _ => open = false,
            }
        }
        if open {
            return None;
        }

        let (s0, _) = self.span(start);
        let mut open = a <= s0 + tol;
        let (mut j, mut shift) = (start, 0.0);
        while open && steps + 1 < n {
            if j == 0 {
                j = n;
                shift -= TAU;
            }
            j -= 1;
            steps += 1;
            let (sj, ej) = self.span(j);
            let w = self.wins(j, i, shift);
            match w.last() {
                Some(&(x, y)) if y >= ej + shift - tol => {
                    a = x;
                    open = w.len() == 1 && x <= sj + shift + tol;
                }
                _ => open = false,
            }
        }
        if open {
            return None;
        }

        Some(if b - a > self.config.eps_angle {
            vec![(a, b)]
        } else {
            Vec::new()
        })
    }

    /// Every maximal run of directions where circle `i` sticks out.
    fn scan(&self, i: usize) -> Vec<(f64, f64)> {
        let tol = self.touch_tolerance();
        let mut runs: Vec<(f64, f64)> = Vec::new();
        for j in 0..self.pieces.len() {
            for (x, y) in self.wins(j, i, 0.0) {
                match runs.last_mut() {
                    Some(last) if x <= last.1 + tol => last.1 = last.1.max(y),
                    _ => runs.push((x, y)),
                }
            }
        }
        if runs.len() > 1 {
            let base = self.base();
            let (first, last) = (runs[0], runs[runs.len() - 1]);
            if last.1 >= base + TAU - tol && first.0 <= base + tol {
                runs.pop();
                runs[0] = (last.0, first.1 + TAU);
            }
        }
        runs.retain(|(x, y)| y - x > self.config.eps_angle);
        runs
    }

    /// Give the directions `[a, b)` to circle `i`.
    ///
    /// Pieces inside the run disappear, the pieces at either end are trimmed,
    /// and a piece that contains the whole run is split in two.
    fn overwrite(&mut self, i: usize, a: f64, b: f64) {
        let eps = self.config.eps_angle;
        let len = b - a;
        if len >= TAU - eps {
            self.pieces = vec![Piece { disc: i, start: a }];
            return;
        }
        let mut a = wrap_from(a, self.base());
        if a + len > self.base() + TAU {
            self.rotate_to(a);
            a = a.max(self.base());
        }
        let b = a + len;
        let n = self.pieces.len();
        let head = self.pieces.partition_point(|p| p.start <= a).saturating_sub(1);
        let tail = self.pieces.partition_point(|p| p.start <= b).saturating_sub(1);
        let next_start = match self.pieces.get(tail + 1) {
            Some(p) => p.start,
            None => self.base() + TAU,
        };

        let keep_head = a - self.pieces[head].start > eps;
        let mut replacement = Vec::with_capacity(2);
        replacement.push(Piece {
            disc: i,
            start: if keep_head {
                a
            } else {
                self.pieces[head].start
            },
        });
        if next_start - b > eps {
            replacement.push(Piece {
                disc: self.pieces[tail].disc,
                start: b,
            });
        }
        let from = if keep_head { head + 1 } else { head };
        debug_assert!(from <= tail + 1 && tail < n, "overwrite range out of bounds");
        self.pieces.splice(from..tail + 1, replacement);
    }

    /// Rotate the ring so it starts at direction `a` (splitting a piece there).
    fn rotate_to(&mut self, a: f64) {
        let at = self.pieces.partition_point(|p| p.start <= a).saturating_sub(1);
        let r = if a - self.pieces[at].start > self.config.eps_angle {
            let disc = self.pieces[at].disc;
            self.pieces.insert(at + 1, Piece { disc, start: a });
            at + 1
        } else {
            at
        };
        if r == 0 {
            return;
        }
        for p in &mut self.pieces[..r] {
            p.start += TAU;
        }
        self.pieces.rotate_left(r);
    }

    /// Drop slivers and merge neighbors that belong to the same circle.
    fn coalesce(&mut self) {
        let mut j = 0;
        while self.pieces.len() > 1 && j < self.pieces.len() {
            let (s, e) = self.span(j);
            if e - s <= self.config.eps_angle {
                self.pieces.remove(j);
            } else {
                j += 1;
            }
        }
        let mut j = 1;
        while j < self.pieces.len() {
            if self.pieces[j].disc == self.pieces[j - 1].disc {
                self.pieces.remove(j);
            } else {
                j += 1;
            }
        }
        if self.pieces.len() > 1 && self.pieces[0].disc == self.pieces[self.pieces.len() - 1].disc
        {
            self.pieces.remove(0);
        }
    }

    /// The ring as arcs around the root circle's center.
    fn arcs(&self) -> Vec<Arc<D>> {
        (0..self.pieces.len())
            .map(|j| {
                let (s, e) = self.span(j);
                let d = self.discs[self.pieces[j].disc];
                Arc::from_span(d.data, d.radius, d.center, s, e, self.config.eps_length)
            })
            .collect()
    }
}
