// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Angle helpers and clamped inverse trigonometry.

use core::f64::consts::{PI, TAU};

use tracing::warn;

/// Normalize an angle into `(-π, π]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

/// Shift `angle` by whole turns so it lands in `[base, base + 2π)`.
pub(crate) fn wrap_from(angle: f64, base: f64) -> f64 {
    let mut a = angle - TAU * ((angle - base) / TAU).floor();
    if a >= base + TAU {
        a -= TAU;
    }
    if a < base {
        a = base;
    }
    a
}

/// Shift `angle` by whole turns so it is as close as possible to `target`.
pub(crate) fn unwrap_near(angle: f64, target: f64) -> f64 {
    angle + TAU * ((target - angle) / TAU).round()
}

/// Clamp an inverse-trig argument into `[-1, 1]`.
///
/// Returns the clamped value and whether the input strayed further than
/// `slack`, which callers count as a consistency fault.
pub(crate) fn clamp_unit(x: f64, slack: f64) -> (f64, bool) {
    if (-1.0..=1.0).contains(&x) {
        return (x, false);
    }
    let fault = !(x.abs() <= 1.0 + slack);
    if fault {
        warn!(value = x, "inverse-trig argument outside [-1, 1]; clamping");
    }
    (if x.is_nan() { 0.0 } else { x.clamp(-1.0, 1.0) }, fault)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_into_half_open_range() {
        assert!((normalize_angle(PI) - PI).abs() < 1e-15);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-15);
        assert!((normalize_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert!((normalize_angle(-5.0 * TAU + 0.25) - 0.25).abs() < 1e-12);
        assert_eq!(normalize_angle(0.0), 0.0);
    }

    #[test]
    fn wrap_and_unwrap() {
        let w = wrap_from(-0.5, 0.0);
        assert!((w - (TAU - 0.5)).abs() < 1e-12);
        let w = wrap_from(7.0 * TAU + 1.0, 1.0);
        assert!((w - 1.0).abs() < 1e-9);
        let u = unwrap_near(-3.0, 3.2);
        assert!((u - (TAU - 3.0)).abs() < 1e-12);
    }

    #[test]
    fn clamp_reports_only_large_excursions() {
        assert_eq!(clamp_unit(0.5, 1e-6), (0.5, false));
        assert_eq!(clamp_unit(1.0 + 1e-9, 1e-6), (1.0, false));
        assert_eq!(clamp_unit(-1.5, 1e-6), (-1.0, true));
        let (v, fault) = clamp_unit(f64::NAN, 1e-6);
        assert_eq!(v, 0.0);
        assert!(fault);
    }
}
