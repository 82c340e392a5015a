// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Balloon packing.
//!
//! Greedily fan the subtrees of a root around it, using each subtree's
//! visibility wedge to decide how much angle it needs. If the fan does not
//! close, push every subtree further out and try again. Finally check that
//! neighboring subtrees really are separated.
//!
//! Run:
//! - `cargo run -p circle_hull_demos --example balloon_packing`
//! - `RUST_LOG=circle_hull_tree=debug cargo run -p circle_hull_demos --example balloon_packing`

use circle_hull_tree::{LocalCircle, NodeId, Tree, TreeError};
use core::f64::consts::TAU;
use kurbo::Vec2;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), TreeError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut tree = Tree::new();
    let root = tree.insert(None, LocalCircle::new(2.0))?;

    // Subtrees of varying size: a hub with `k` leaves around it.
    let mut hubs = Vec::new();
    for (i, k) in [0_u32, 3, 5, 1, 8, 2].into_iter().enumerate() {
        let hub = tree.insert(Some(root), LocalCircle::new(1.0 + 0.2 * i as f64))?;
        for j in 0..k {
            let angle = f64::from(j) * TAU / f64::from(k);
            tree.insert(Some(hub), LocalCircle::new(0.5).at(2.5, angle))?;
        }
        hubs.push(hub);
    }

    let mut distance = 4.0;
    let sectors = loop {
        let sectors = fan_out(&mut tree, &hubs, distance)?;
        let needed = sectors.last().map_or(0.0, |s| s.1);
        println!("distance {distance:>6.2}: subtrees need {needed:.3} of {TAU:.3} rad");
        if needed <= TAU {
            break sectors;
        }
        distance *= 1.25;
    };

    let mut clean = true;
    let mut prev_end = sectors.last().map_or(0.0, |s| s.1) - TAU;
    for (i, (&hub, &(start, end))) in hubs.iter().zip(&sectors).enumerate() {
        let inside = fits(&mut tree, hub, start, end)?;
        let clear = start >= prev_end - 1e-9;
        println!("subtree {i}: [{start:.3}, {end:.3}] rad, inside: {inside}, clear of previous: {clear}");
        clean &= inside && clear;
        prev_end = end;
    }
    if !clean {
        eprintln!("packing has overlapping subtrees");
    }

    let hull = tree.hull(root)?;
    println!("root hull has {} arcs", hull.len());
    for arc in hull.arcs() {
        let (start, end) = arc.visible_span();
        println!("  {:?} visible over [{start:.3}, {end:.3}]", arc.data);
    }
    let bc = tree.bounding_circle(root)?;
    println!("root bounding radius {:.3}", bc.radius);
    println!("hull recomputations so far: {}", tree.hull_recomputations());
    Ok(())
}

/// Places every hub at `distance`, one after another counterclockwise, and
/// returns the angular sector each one occupies around the root center.
///
/// A hull is not rotated with its node, so turning a hub changes how wide its
/// subtree looks. Each hub is moved until the clockwise edge of the wedge
/// measured at its own placement meets the end of the previous sector.
fn fan_out(
    tree: &mut Tree,
    hubs: &[NodeId],
    distance: f64,
) -> Result<Vec<(f64, f64)>, TreeError> {
    let mut sectors = Vec::with_capacity(hubs.len());
    let mut cursor = 0.0;
    for &hub in hubs {
        tree.set_distance(hub, distance)?;
        let mut angle = cursor;
        let mut sector = (cursor, cursor);
        for _ in 0..64 {
            tree.set_angle(hub, angle)?;
            let w = tree.wedge_from_parent(hub)?;
            if w.is_enclosed() {
                // The root center sits inside this subtree; no fan can fit.
                return Ok(vec![(cursor, f64::INFINITY)]);
            }
            sector = (angle - w.lower_angle, angle + w.upper_angle);
            let next = cursor + w.lower_angle;
            if (next - angle).abs() <= 1e-12 {
                break;
            }
            angle = next;
        }
        sectors.push(sector);
        cursor = sector.1;
    }
    Ok(sectors)
}

/// Whether every circle on `hub`'s hull lies in the sector `[start, end]`
/// around the root center.
///
/// Sectors narrower than π are convex, so this covers the whole subtree.
fn fits(tree: &mut Tree, hub: NodeId, start: f64, end: f64) -> Result<bool, TreeError> {
    let Some(local) = tree.local(hub) else {
        return Err(TreeError::DanglingNode(hub));
    };
    let at = Vec2::from_angle(local.angle) * local.distance;
    let mid = 0.5 * (start + end);
    Ok(tree.hull(hub)?.arcs().iter().all(|arc| {
        let c = at + arc.center().to_vec2();
        let d = c.length();
        if d <= arc.radius {
            return false;
        }
        let mut theta = c.atan2();
        theta += TAU * ((mid - theta) / TAU).round();
        let half = (arc.radius / d).asin();
        theta - half >= start - 1e-9 && theta + half <= end + 1e-9
    }))
}
