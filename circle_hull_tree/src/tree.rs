// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, invalidation, cached geometry.

use circle_hull::{
    Arc, ConvexHull, HullBuilder, HullConfig, VisibilityWedge, check_finite, check_radius,
    normalize_angle,
};
use kurbo::Rect;
use tracing::{debug, trace};

use crate::error::TreeError;
use crate::geom::CircleGeom;
use crate::types::{Dirty, LocalCircle, NodeId, fold_distance};

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// Tree of circles with lazily cached per-subtree hulls.
pub struct Tree {
    nodes: Vec<Option<Node>>, // slots
    generations: Vec<u32>,    // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    epoch: u64,
    config: HullConfig,
    recomputations: u64,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.len();
        let free = self.free_list.len();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .field("epoch", &self.epoch)
            .field("recomputations", &self.recomputations)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    index_in_parent: usize,
    children: Vec<NodeId>,
    subtree_size: usize,
    depth: usize,
    branch_version: u64,
    bumped_at: u64,
    local: LocalCircle,
    geom: CircleGeom,
}

impl Node {
    fn new(generation: u32, local: LocalCircle) -> Self {
        Self {
            generation,
            parent: None,
            index_in_parent: 0,
            children: Vec::new(),
            subtree_size: 1,
            depth: 0,
            branch_version: 0,
            bumped_at: 0,
            local,
            geom: CircleGeom::new(),
        }
    }

    fn is_stale(&self) -> bool {
        self.geom.is_stale(self.branch_version)
    }
}

impl Tree {
    /// Create a new empty tree with default tolerances.
    pub fn new() -> Self {
        Self::with_config(HullConfig::default())
    }

    /// Create a new empty tree whose hulls are built with `config`.
    pub fn with_config(config: HullConfig) -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            epoch: 0,
            config,
            recomputations: 0,
        }
    }

    /// Tolerances used for every hull in this tree.
    pub fn config(&self) -> &HullConfig {
        &self.config
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// True if the tree holds no live node.
    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(Option::is_none)
    }

    /// Insert a new node as a child of `parent` (or as a root if `None`).
    ///
    /// The circle is validated first: a non-positive radius or a non-finite
    /// placement is rejected and nothing is inserted.
    pub fn insert(
        &mut self,
        parent: Option<NodeId>,
        local: LocalCircle,
    ) -> Result<NodeId, TreeError> {
        let local = local.normalized()?;
        if let Some(p) = parent {
            self.get(p)?;
        }
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, local));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, local)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        if let Some(p) = parent {
            self.epoch += 1;
            self.link_parent(id, p);
        }
        trace!(node = ?id, parent = ?parent, "inserted node");
        Ok(id)
    }

    /// Remove a node and its whole subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.get(id)?;
        self.epoch += 1;
        self.unlink_parent(id);
        let mut stack = vec![id];
        let mut removed = 0_usize;
        while let Some(n) = stack.pop() {
            if let Some(node) = self.nodes[n.idx()].take() {
                stack.extend(node.children);
                self.free_list.push(n.idx());
                removed += 1;
            }
        }
        trace!(node = ?id, removed, "removed subtree");
        Ok(())
    }

    /// Move `id` (with its subtree) under `new_parent`, or make it a root.
    ///
    /// The node is detached first and then appended to the end of the new
    /// parent's children, so moving it under the parent it already has sends
    /// it to the back of the branch list. Rejects a parent that lies inside
    /// the moved subtree. Detaching a root is a no-op.
    pub fn set_parent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<(), TreeError> {
        let old_parent = self.get(id)?.parent;
        if let Some(p) = new_parent {
            self.get(p)?;
            if self.is_ancestor_or_self(id, p) {
                return Err(TreeError::Cycle { node: id, parent: p });
            }
        }
        if old_parent.is_none() && new_parent.is_none() {
            return Ok(());
        }
        self.epoch += 1;
        self.unlink_parent(id);
        if let Some(p) = new_parent {
            self.link_parent(id, p);
        }
        trace!(node = ?id, from = ?old_parent, to = ?new_parent, "reparented");
        Ok(())
    }

    /// Attach `id` as the last child of `parent`.
    ///
    /// See [`set_parent`](Self::set_parent); a node already under `parent`
    /// moves to the end of its siblings.
    pub fn attach(&mut self, id: NodeId, parent: NodeId) -> Result<(), TreeError> {
        self.set_parent(id, Some(parent))
    }

    /// Detach `id` from its parent, making it a root.
    pub fn detach(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.set_parent(id, None)
    }

    /// Change a node's radius.
    ///
    /// Invalidates the node's hull and the hulls of all its ancestors.
    pub fn set_radius(&mut self, id: NodeId, radius: f64) -> Result<(), TreeError> {
        let radius = check_radius(radius)?;
        let node = self.get_mut(id)?;
        node.local.radius = radius;
        self.invalidate_upward(Some(id));
        Ok(())
    }

    /// Change a node's distance from its parent's center.
    ///
    /// A negative distance is stored as its magnitude with the angle turned by π.
    /// The node's own hull is unaffected; its ancestors' hulls are invalidated.
    pub fn set_distance(&mut self, id: NodeId, distance: f64) -> Result<(), TreeError> {
        let distance = check_finite("distance", distance)?;
        let node = self.get_mut(id)?;
        let (distance, angle) = fold_distance(distance, node.local.angle);
        node.local.distance = distance;
        node.local.angle = angle;
        node.geom.dirty.insert(Dirty::WEDGE);
        let parent = node.parent;
        self.invalidate_upward(parent);
        Ok(())
    }

    /// Change a node's direction from its parent's center (normalized into `(-π, π]`).
    pub fn set_angle(&mut self, id: NodeId, angle: f64) -> Result<(), TreeError> {
        let angle = check_finite("angle", angle)?;
        let node = self.get_mut(id)?;
        node.local.angle = normalize_angle(angle);
        node.geom.dirty.insert(Dirty::WEDGE);
        let parent = node.parent;
        self.invalidate_upward(parent);
        Ok(())
    }

    /// Hull of the subtree rooted at `id`, in `id`'s frame.
    ///
    /// Recomputes stale hulls in the subtree first (children before parents);
    /// a fresh hull is returned from cache.
    pub fn hull(&mut self, id: NodeId) -> Result<&ConvexHull<NodeId>, TreeError> {
        self.refresh(id)?;
        self.cached_hull(id)
    }

    /// Bounding circle of the subtree rooted at `id`.
    pub fn bounding_circle(&mut self, id: NodeId) -> Result<Arc<NodeId>, TreeError> {
        Ok(self.hull(id)?.bounding_circle())
    }

    /// Axis-aligned box around the subtree rooted at `id`, in `id`'s frame.
    pub fn bounding_box(&mut self, id: NodeId) -> Result<Rect, TreeError> {
        Ok(self.hull(id)?.bounding_box())
    }

    /// Visibility wedge of the subtree rooted at `id`, seen from
    /// `(-probe_distance, 0)` in `id`'s frame.
    ///
    /// The last wedge is cached per node and reused while the hull is fresh and
    /// the probe matches.
    pub fn bounding_wedge(
        &mut self,
        id: NodeId,
        probe_distance: f64,
    ) -> Result<VisibilityWedge, TreeError> {
        self.wedge_along(id, probe_distance, 0.0)
    }

    /// Visibility wedge of `id`'s subtree as seen from its parent's center.
    ///
    /// Hulls are kept unrotated in their node's frame, so the parent center
    /// sits at `-distance * (cos angle, sin angle)`. Angles of the result are
    /// measured from the parent→node direction: `angle - lower_angle` and
    /// `angle + upper_angle` bound the subtree around the parent.
    pub fn wedge_from_parent(&mut self, id: NodeId) -> Result<VisibilityWedge, TreeError> {
        let LocalCircle {
            distance, angle, ..
        } = self.get(id)?.local;
        self.wedge_along(id, distance, angle)
    }

    fn wedge_along(
        &mut self,
        id: NodeId,
        probe_distance: f64,
        axis: f64,
    ) -> Result<VisibilityWedge, TreeError> {
        let probe = check_finite("probe distance", probe_distance)?;
        self.refresh(id)?;
        if let Some(w) = self.get(id)?.geom.wedge_for(probe, axis) {
            return Ok(w);
        }
        let wedge = self.cached_hull(id)?.visibility_wedge_along(probe, axis);
        self.get_mut(id)?.geom.store_wedge(probe, axis, wedge);
        Ok(wedge)
    }

    // --- introspection ---

    /// Returns `true` if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some()
    }

    /// Local geometry of a node.
    pub fn local(&self, id: NodeId) -> Option<LocalCircle> {
        self.node_opt(id).map(|n| n.local)
    }

    /// Parent of a node (`None` for roots and dead handles).
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Children of a node in insertion order (empty for dead handles).
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Position of a node in its parent's child list.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        self.node_opt(id)
            .and_then(|n| n.parent.map(|_| n.index_in_parent))
    }

    /// Number of nodes in the subtree rooted at `id`, including `id`.
    pub fn subtree_size(&self, id: NodeId) -> Option<usize> {
        self.node_opt(id).map(|n| n.subtree_size)
    }

    /// Number of edges between `id` and its root.
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        self.node_opt(id).map(|n| n.depth)
    }

    /// Counter bumped whenever the set of branches below `id` changes.
    pub fn branch_version(&self, id: NodeId) -> Option<u64> {
        self.node_opt(id).map(|n| n.branch_version)
    }

    /// Whether reading `id`'s hull would trigger a recomputation.
    pub fn is_hull_stale(&self, id: NodeId) -> Option<bool> {
        self.node_opt(id).map(Node::is_stale)
    }

    /// All live roots, in slot order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                Some(n) if n.parent.is_none() =>
                {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "NodeId uses 32-bit indices by design."
                    )]
                    Some(NodeId::new(i as u32, n.generation))
                }
                _ => None,
            })
            .collect()
    }

    /// Total number of hulls computed since the tree was created.
    pub fn hull_recomputations(&self) -> u64 {
        self.recomputations
    }

    // --- internals ---

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn get(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.node_opt(id).ok_or(TreeError::DanglingNode(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.node_opt_mut(id).ok_or(TreeError::DanglingNode(id))
    }

    fn cached_hull(&self, id: NodeId) -> Result<&ConvexHull<NodeId>, TreeError> {
        let node = self.get(id)?;
        match &node.geom.hull {
            Some(c) if !node.is_stale() => Ok(&c.hull),
            _ => Err(TreeError::StaleHull(id)),
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.parent_of(id) {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    /// Mark `start` and its ancestors stale, stopping at the first ancestor
    /// that already is (its own ancestors are stale too).
    fn invalidate_upward(&mut self, start: Option<NodeId>) {
        let mut cur = start;
        while let Some(id) = cur {
            let Some(node) = self.node_opt_mut(id) else {
                break;
            };
            if node.is_stale() {
                break;
            }
            node.geom.dirty.insert(Dirty::HULL | Dirty::WEDGE);
            cur = node.parent;
        }
    }

    /// Bump the branch version of `start` and every ancestor once per epoch.
    fn bump_branch_versions(&mut self, start: NodeId) {
        let epoch = self.epoch;
        let mut cur = Some(start);
        while let Some(id) = cur {
            let Some(node) = self.node_opt_mut(id) else {
                break;
            };
            if node.bumped_at == epoch {
                break;
            }
            node.bumped_at = epoch;
            node.branch_version += 1;
            cur = node.parent;
        }
    }

    /// Add `delta` to the subtree size of `start` and every ancestor.
    fn adjust_subtree_sizes(&mut self, start: NodeId, delta: isize) {
        let mut cur = Some(start);
        while let Some(id) = cur {
            let Some(node) = self.node_opt_mut(id) else {
                break;
            };
            node.subtree_size = node.subtree_size.saturating_add_signed(delta);
            cur = node.parent;
        }
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        let (size, depth) = {
            let Some(p) = self.node_opt_mut(parent) else {
                return;
            };
            p.children.push(id);
            let index = p.children.len() - 1;
            let depth = p.depth + 1;
            let Some(n) = self.node_opt_mut(id) else {
                return;
            };
            n.parent = Some(parent);
            n.index_in_parent = index;
            (n.subtree_size, depth)
        };
        self.adjust_subtree_sizes(parent, isize::try_from(size).unwrap_or(isize::MAX));
        self.bump_branch_versions(parent);
        self.set_subtree_depth(id, depth);
    }

    fn unlink_parent(&mut self, id: NodeId) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        let Some(parent) = node.parent.take() else {
            return;
        };
        let (index, size) = (node.index_in_parent, node.subtree_size);
        node.index_in_parent = 0;
        let siblings: Vec<NodeId> = match self.node_opt_mut(parent) {
            Some(p) if index < p.children.len() => {
                p.children.remove(index);
                p.children[index..].to_vec()
            }
            _ => Vec::new(),
        };
        for (offset, sib) in siblings.into_iter().enumerate() {
            if let Some(s) = self.node_opt_mut(sib) {
                s.index_in_parent = index + offset;
            }
        }
        self.adjust_subtree_sizes(parent, -isize::try_from(size).unwrap_or(isize::MAX));
        self.bump_branch_versions(parent);
        self.set_subtree_depth(id, 0);
    }

    /// Set the depth of `id` and shift its descendants to match.
    fn set_subtree_depth(&mut self, id: NodeId, depth: usize) {
        if self.node_opt(id).is_none_or(|n| n.depth == depth) {
            return;
        }
        let mut stack = vec![(id, depth)];
        while let Some((n, d)) = stack.pop() {
            if let Some(node) = self.node_opt_mut(n) {
                node.depth = d;
                stack.extend(node.children.iter().map(|&c| (c, d + 1)));
            }
        }
    }

    /// Bring the hull of `id` up to date, children before parents.
    fn refresh(&mut self, id: NodeId) -> Result<(), TreeError> {
        if !self.get(id)?.is_stale() {
            return Ok(());
        }
        let before = self.recomputations;
        let mut stack = vec![(id, false)];
        while let Some((n, expanded)) = stack.pop() {
            if expanded {
                self.recompute(n)?;
                continue;
            }
            stack.push((n, true));
            let node = self.get(n)?;
            for &c in &node.children {
                if self.node_opt(c).is_some_and(Node::is_stale) {
                    stack.push((c, false));
                }
            }
        }
        debug!(
            node = ?id,
            recomputed = self.recomputations - before,
            "refreshed hulls"
        );
        Ok(())
    }

    /// Rebuild the hull of `id` from its own circle and its children's hulls.
    fn recompute(&mut self, id: NodeId) -> Result<(), TreeError> {
        let node = self.get(id)?;
        let mut builder = HullBuilder::new(self.config);
        builder.push_circle(id, node.local.radius)?;
        for &c in &node.children {
            let child = self.get(c)?;
            let hull = self.cached_hull(c)?;
            builder.push_subtree(hull, child.local.distance, child.local.angle)?;
        }
        let hull = builder.build()?;
        let version = node.branch_version;
        trace!(node = ?id, arcs = hull.len(), "recomputed hull");
        self.get_mut(id)?.geom.store(hull, version);
        self.recomputations += 1;
        Ok(())
    }
}
