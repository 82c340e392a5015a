// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node geometry cache.

use circle_hull::{ConvexHull, VisibilityWedge};

use crate::types::{Dirty, NodeId};

/// A hull together with the branch version it was computed against.
#[derive(Clone, Debug)]
pub(crate) struct CachedHull {
    pub(crate) hull: ConvexHull<NodeId>,
    pub(crate) branch_version: u64,
}

/// Cached geometry of one node.
///
/// The hull is valid when the `HULL` flag is clear and it was computed at the
/// node's current branch version. The wedge is additionally keyed by the probe
/// distance and axis angle it was computed for.
#[derive(Clone, Debug)]
pub(crate) struct CircleGeom {
    pub(crate) dirty: Dirty,
    pub(crate) hull: Option<CachedHull>,
    pub(crate) wedge: Option<((u64, u64), VisibilityWedge)>,
}

impl CircleGeom {
    pub(crate) fn new() -> Self {
        Self {
            dirty: Dirty::HULL | Dirty::WEDGE,
            hull: None,
            wedge: None,
        }
    }

    pub(crate) fn is_stale(&self, branch_version: u64) -> bool {
        self.dirty.contains(Dirty::HULL)
            || self
                .hull
                .as_ref()
                .is_none_or(|c| c.branch_version != branch_version)
    }

    pub(crate) fn store(&mut self, hull: ConvexHull<NodeId>, branch_version: u64) {
        self.hull = Some(CachedHull {
            hull,
            branch_version,
        });
        self.dirty.remove(Dirty::HULL);
        self.dirty.insert(Dirty::WEDGE);
    }

    /// Cached wedge for a probe at `probe` along `axis`, if still valid.
    pub(crate) fn wedge_for(&self, probe: f64, axis: f64) -> Option<VisibilityWedge> {
        if self.dirty.contains(Dirty::WEDGE) {
            return None;
        }
        let key = (probe.to_bits(), axis.to_bits());
        self.wedge.and_then(|(k, w)| (k == key).then_some(w))
    }

    pub(crate) fn store_wedge(&mut self, probe: f64, axis: f64, wedge: VisibilityWedge) {
        self.wedge = Some(((probe.to_bits(), axis.to_bits()), wedge));
        self.dirty.remove(Dirty::WEDGE);
    }
}
