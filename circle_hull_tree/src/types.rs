// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the circle tree: node identifiers, dirty flags, and local geometry.

use core::f64::consts::PI;

use circle_hull::{HullError, check_finite, check_radius, normalize_angle};

/// Identifier for a node in the tree.
///
/// This is a small, copyable handle that stays stable across updates but becomes
/// invalid when the underlying slot is reused.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// Use [`Tree::is_alive`](crate::Tree::is_alive) to check whether a `NodeId` still refers to a live node.
/// Stale `NodeId`s never alias a different live node because the generation must match.
///
/// `NodeId` is also the payload of every [`Arc`](circle_hull::Arc) the tree produces, so a
/// hull arc names the node whose circle it belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Cached geometry that must be recomputed before its next read.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub(crate) struct Dirty: u8 {
        /// The node's hull (and bounding circle) is out of date.
        const HULL  = 0b0000_0001;
        /// The node's cached visibility wedge is out of date.
        const WEDGE = 0b0000_0010;
    }
}

/// Local geometry for a node: its radius and its polar placement around the
/// parent's center.
///
/// Roots ignore `distance` and `angle` for their own hull, but the values are
/// kept so a root can be attached later without losing its placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalCircle {
    /// Circle radius (> 0).
    pub radius: f64,
    /// Distance from the parent's center.
    pub distance: f64,
    /// Direction from the parent's center, in `(-π, π]`.
    pub angle: f64,
}

impl LocalCircle {
    /// A circle of `radius` sitting on its parent's center.
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            distance: 0.0,
            angle: 0.0,
        }
    }

    /// Same circle placed at (`distance`, `angle`) around the parent.
    #[must_use]
    pub fn at(self, distance: f64, angle: f64) -> Self {
        Self {
            distance,
            angle,
            ..self
        }
    }

    /// Validate and normalize: the radius must be positive, placement finite.
    ///
    /// A negative distance is stored as its magnitude with the angle turned by π.
    pub fn normalized(self) -> Result<Self, HullError> {
        let radius = check_radius(self.radius)?;
        let distance = check_finite("distance", self.distance)?;
        let angle = check_finite("angle", self.angle)?;
        let (distance, angle) = fold_distance(distance, angle);
        Ok(Self {
            radius,
            distance,
            angle,
        })
    }
}

impl Default for LocalCircle {
    fn default() -> Self {
        Self::new(1.0)
    }
}

pub(crate) fn fold_distance(distance: f64, angle: f64) -> (f64, f64) {
    if distance < 0.0 {
        (-distance, normalize_angle(angle + PI))
    } else {
        (distance, normalize_angle(angle))
    }
}
