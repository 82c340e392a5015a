// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Circle Hull Tree: a tree of circles with lazily cached subtree hulls.
//!
//! Circle Hull Tree is the geometry layer for hierarchical circle layouts
//! (balloon trees, radial and force-directed circle packings).
//!
//! - Represents a hierarchy of circles, each placed in polar coordinates
//!   (distance and angle) around its parent's center.
//! - Answers, for any subtree, its convex hull, a bounding circle, a
//!   visibility wedge and an axis-aligned bounding box.
//! - Recomputes only what a mutation made stale, and only when it is read.
//!
//! Layout code moves nodes around with [`Tree::set_distance`] and
//! [`Tree::set_angle`], resizes them with [`Tree::set_radius`], and
//! restructures with [`Tree::attach`] / [`Tree::detach`]. Between those calls
//! it reads [`Tree::hull`], [`Tree::bounding_circle`] or
//! [`Tree::wedge_from_parent`] to keep sibling subtrees apart.
//!
//! ## Not a layout engine
//!
//! This crate does not decide where nodes go. It reports how much room each
//! subtree needs given the placements you set.
//!
//! ## Caching model
//!
//! Every node caches its hull in its own frame. A hull is stale when
//!
//! - a circle inside the subtree changed radius,
//! - a node inside the subtree (other than the node itself) moved, or
//! - the set of branches below the node changed, tracked by a per-node
//!   [`branch_version`](Tree::branch_version).
//!
//! Staleness only ever spreads upward, so a stale node always has stale
//! ancestors and invalidation can stop at the first ancestor that already is.
//! Reads refresh the subtree bottom-up with an explicit work stack, so deep
//! chains do not recurse.
//!
//! ## API overview
//!
//! - [`Tree`]: arena of nodes and their cached geometry.
//! - [`LocalCircle`]: per-node radius and polar placement.
//! - [`NodeId`]: generational handle of a node; also the payload of every hull [`Arc`](circle_hull::Arc).
//! - [`TreeError`]: rejected mutations and geometry faults.
//!
//! # Example
//!
//! ```
//! use circle_hull_tree::{LocalCircle, Tree};
//! use core::f64::consts::PI;
//!
//! let mut tree = Tree::new();
//! let root = tree.insert(None, LocalCircle::new(2.0))?;
//! let east = tree.insert(Some(root), LocalCircle::new(1.0).at(5.0, 0.0))?;
//! let west = tree.insert(Some(root), LocalCircle::new(1.0).at(5.0, PI))?;
//!
//! // Both children and two slivers of the root make up the hull.
//! let hull = tree.hull(root)?;
//! assert_eq!(hull.len(), 4);
//! assert!(hull.arcs().iter().any(|a| a.data == east));
//!
//! // A second read is served from cache.
//! let computed = tree.hull_recomputations();
//! tree.hull(root)?;
//! assert_eq!(tree.hull_recomputations(), computed);
//!
//! // Moving a child only invalidates its ancestors.
//! tree.set_distance(west, 8.0)?;
//! assert_eq!(tree.is_hull_stale(west), Some(false));
//! assert_eq!(tree.is_hull_stale(root), Some(true));
//! assert!((tree.bounding_circle(root)?.radius - 9.0).abs() < 1e-9);
//! # Ok::<(), circle_hull_tree::TreeError>(())
//! ```

mod error;
mod geom;
mod tree;
mod types;

pub use error::TreeError;
pub use tree::Tree;
pub use types::{LocalCircle, NodeId};

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::PI;
    use kurbo::{Point, Vec2};
    use proptest::prelude::*;

    /// `(parent pick, radius, distance, angle)` per node; node 0 is the root.
    fn shapes() -> impl Strategy<Value = Vec<(usize, f64, f64, f64)>> {
        prop::collection::vec((0_usize..64, 0.2_f64..3.0, 0.0_f64..12.0, -PI..PI), 1..40)
    }

    fn grow(shape: &[(usize, f64, f64, f64)]) -> (Tree, Vec<NodeId>, Vec<Point>) {
        let mut tree = Tree::new();
        let mut ids = Vec::new();
        let mut centers: Vec<Point> = Vec::new();
        for (i, &(pick, r, d, a)) in shape.iter().enumerate() {
            let circle = LocalCircle::new(r).at(d, a);
            if i == 0 {
                ids.push(tree.insert(None, circle).unwrap());
                centers.push(Point::ZERO);
            } else {
                let p = pick % i;
                ids.push(tree.insert(Some(ids[p]), circle).unwrap());
                centers.push(centers[p] + Vec2::from_angle(a) * d);
            }
        }
        (tree, ids, centers)
    }

    proptest! {
        #[test]
        fn root_hull_contains_every_descendant(shape in shapes()) {
            let (mut tree, ids, centers) = grow(&shape);
            let hull = tree.hull(ids[0]).unwrap().clone();
            prop_assert!(hull.validate(1e-6).is_ok());
            for (i, c) in centers.iter().enumerate() {
                prop_assert!(hull.contains_circle(*c, shape[i].1, 1e-6), "node {} escapes", i);
            }
            prop_assert_eq!(tree.hull_recomputations(), ids.len() as u64);
        }

        #[test]
        fn radius_change_recomputes_only_the_path(shape in shapes(), pick in 0_usize..64) {
            let (mut tree, ids, centers) = grow(&shape);
            tree.hull(ids[0]).unwrap();
            let target = ids[pick % ids.len()];
            let depth = tree.depth(target).unwrap() as u64;

            let before = tree.hull_recomputations();
            tree.set_radius(target, 0.5).unwrap();
            let hull = tree.hull(ids[0]).unwrap().clone();
            prop_assert_eq!(tree.hull_recomputations() - before, depth + 1);

            for (i, c) in centers.iter().enumerate() {
                let r = if ids[i] == target { 0.5 } else { shape[i].1 };
                prop_assert!(hull.contains_circle(*c, r, 1e-6));
            }
        }

        #[test]
        fn sizes_track_reparenting(shape in shapes(), a in 0_usize..64, b in 0_usize..64) {
            let (mut tree, ids, _) = grow(&shape);
            let (node, parent) = (ids[a % ids.len()], ids[b % ids.len()]);
            let total = tree.subtree_size(ids[0]).unwrap();
            match tree.attach(node, parent) {
                Ok(()) => {
                    prop_assert_eq!(tree.parent_of(node), Some(parent));
                    let roots = tree.roots();
                    let sum: usize = roots.iter().map(|&r| tree.subtree_size(r).unwrap()).sum();
                    prop_assert_eq!(sum, total);
                }
                Err(TreeError::Cycle { .. }) => {}
                Err(e) => prop_assert!(false, "unexpected error {e}"),
            }
        }
    }
}
