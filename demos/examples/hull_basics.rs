// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hull basics.
//!
//! Build the hull of a few circles, print its arcs, then probe it.
//!
//! Run:
//! - `cargo run -p circle_hull_demos --example hull_basics`

use circle_hull::{Arc, HullBuilder, HullConfig, HullError};
use kurbo::Point;

fn main() -> Result<(), HullError> {
    let mut builder = HullBuilder::new(HullConfig::default());
    builder.push_circle("center", 3.0)?;
    builder.push_arc(&Arc::placed("north", 1.0, 6.0, core::f64::consts::FRAC_PI_2))?;
    builder.push_arc(&Arc::placed("east", 2.0, 5.0, 0.0))?;
    builder.push_arc(&Arc::placed("hidden", 0.5, 1.0, 2.0))?;
    let hull = builder.build()?;

    println!("hull has {} arcs:", hull.len());
    for arc in hull.arcs() {
        let (start, end) = arc.visible_span();
        println!(
            "  {:<6} r={:.2} at ({:.2}, {:.2} rad) visible over [{:.3}, {:.3}]",
            arc.data, arc.radius, arc.distance, arc.angle, start, end
        );
    }
    hull.validate(1e-9)?;

    let bc = hull.bounding_circle();
    println!("bounding circle radius {:.3}", bc.radius);
    println!("bounding box {:?}", hull.bounding_box());

    for probe in [10.0, 20.0, 40.0] {
        let w = hull.visibility_wedge(probe);
        println!(
            "seen from {probe:>4}: upper {:.4} rad ({:.2}), lower {:.4} rad ({:.2})",
            w.upper_angle, w.upper_length, w.lower_angle, w.lower_length
        );
    }

    println!(
        "contains (5, 0): {}, contains (0, 8): {}",
        hull.contains_point(Point::new(5.0, 0.0), 1e-9),
        hull.contains_point(Point::new(0.0, 8.0), 1e-9)
    );
    Ok(())
}
