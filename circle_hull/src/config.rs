// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Numeric tolerances and policy knobs shared by hull construction and queries.

/// Tolerances used while building and querying hulls.
///
/// The defaults suit coordinates in the range of typical layout units (roughly
/// `1e-3..1e6`). Scale `eps_length` along with your coordinates if you work far
/// outside that range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HullConfig {
    /// Length tolerance: circles closer than this are treated as concentric,
    /// containment tests accept this much overlap.
    pub eps_length: f64,
    /// Angular tolerance: visible spans narrower than this are absorbed into
    /// their neighbor, and split sort keys are kept this far inside their span.
    pub eps_angle: f64,
    /// How far an inverse-trig argument may stray outside `[-1, 1]` before the
    /// clamp is reported as a consistency fault.
    pub trig_slack: f64,
    /// Turn consistency faults into hard errors instead of clamped results.
    pub strict: bool,
}

impl Default for HullConfig {
    fn default() -> Self {
        Self {
            eps_length: 1e-9,
            eps_angle: 1e-9,
            trig_slack: 1e-6,
            strict: false,
        }
    }
}

impl HullConfig {
    /// Replace the length tolerance.
    #[must_use]
    pub fn with_eps_length(mut self, eps: f64) -> Self {
        self.eps_length = eps;
        self
    }

    /// Replace the angular tolerance.
    #[must_use]
    pub fn with_eps_angle(mut self, eps: f64) -> Self {
        self.eps_angle = eps;
        self
    }

    /// Replace the inverse-trig slack.
    #[must_use]
    pub fn with_trig_slack(mut self, slack: f64) -> Self {
        self.trig_slack = slack;
        self
    }

    /// Enable or disable strict consistency checking.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
