// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy for hull construction and validation.

use thiserror::Error;

/// Errors reported by [`HullBuilder`](crate::HullBuilder) and
/// [`ConvexHull::validate`](crate::ConvexHull::validate).
///
/// `InvalidRadius` and `NonFinite` are caller mistakes and are rejected before
/// any state changes. `Inconsistent`, `Unordered` and `Gap` signal corrupted
/// geometry rather than bad input.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum HullError {
    /// The builder was asked to build a hull without any circle.
    #[error("cannot build a hull from zero circles")]
    NoCircles,

    /// A circle radius was zero, negative or not finite.
    #[error("circle radius must be positive and finite, got {0}")]
    InvalidRadius(f64),

    /// A distance or angle was NaN or infinite.
    #[error("{what} must be finite, got {value}")]
    NonFinite {
        /// Which quantity was rejected.
        what: &'static str,
        /// The offending value.
        value: f64,
    },

    /// Inverse-trig arguments left `[-1, 1]` beyond tolerance while building.
    #[error("hull geometry is inconsistent: {faults} inverse-trig argument(s) clamped")]
    Inconsistent {
        /// Number of clamped arguments.
        faults: u32,
    },

    /// Arc sort keys decrease at `index`.
    #[error("arc {index} is out of order")]
    Unordered {
        /// Index of the first arc that sorts before its predecessor.
        index: usize,
    },

    /// The visible spans of arcs `index` and `index + 1` do not meet.
    #[error("visible spans leave a gap of {gap} rad after arc {index}")]
    Gap {
        /// Index of the arc whose span does not meet its successor.
        index: usize,
        /// Signed angular mismatch in radians.
        gap: f64,
    },
}

/// Reject radii that are not strictly positive and finite.
pub fn check_radius(radius: f64) -> Result<f64, HullError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(HullError::InvalidRadius(radius))
    }
}

/// Reject NaN and infinities.
pub fn check_finite(what: &'static str, value: f64) -> Result<f64, HullError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(HullError::NonFinite { what, value })
    }
}
