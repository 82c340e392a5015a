// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Circle Hull: convex hulls of circles as rings of visible arcs.
//!
//! Circle Hull is the geometric core behind hierarchical circle layouts.
//!
//! - Build the convex hull of any set of circles with [`HullBuilder`].
//! - Read the hull back as [`Arc`]s: which circle is visible, and over which
//!   range of outward-normal directions.
//! - Ask how wide a hull looks from a point on its axis with
//!   [`ConvexHull::visibility_wedge`], or how much room it takes with
//!   [`ConvexHull::bounding_circle`] and [`ConvexHull::bounding_box`].
//!
//! Positions are polar (distance and angle from the owning node's center) on
//! the public surface and Cartesian ([`kurbo`]) where that is more natural.
//! Angles are radians, normalized into `(-π, π]`.
//!
//! The builder is incremental: circles are inserted in order of non-increasing
//! radius, and each insertion only replaces the arcs it eclipses. Higher layers
//! (like `circle_hull_tree`) feed it a node's own circle plus the arcs of every
//! child hull and cache the result.
//!
//! # Example
//!
//! ```rust
//! use circle_hull::{Arc, HullBuilder, HullConfig};
//!
//! let mut builder = HullBuilder::new(HullConfig::default());
//! builder.push_circle("center", 2.0)?;
//! builder.push_arc(&Arc::placed("east", 1.0, 5.0, 0.0))?;
//! let hull = builder.build()?;
//!
//! assert_eq!(hull.len(), 2);
//! hull.validate(1e-9)?;
//!
//! // Both tangents come from the center circle when seen from far to the west.
//! let wedge = hull.visibility_wedge(20.0);
//! assert!((wedge.upper_angle - 0.1_f64.asin()).abs() < 1e-12);
//! # Ok::<(), circle_hull::HullError>(())
//! ```
//!
//! ## Tolerances
//!
//! [`HullConfig`] carries the length and angle tolerances. Visible spans
//! narrower than `eps_angle` are absorbed into their neighbors, and
//! inverse-trig arguments that stray past `[-1, 1]` are clamped and counted
//! (see [`ConvexHull::consistency_faults`]). Set `strict` to turn such faults
//! into [`HullError::Inconsistent`].

pub mod arc;
pub mod builder;
pub mod config;
pub mod error;
pub mod hull;
mod trig;
pub mod wedge;

pub use arc::Arc;
pub use builder::HullBuilder;
pub use config::HullConfig;
pub use error::{HullError, check_finite, check_radius};
pub use hull::ConvexHull;
pub use trig::normalize_angle;
pub use wedge::VisibilityWedge;
