// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Secant tolerance driven tessellation

use std::f64::consts::PI;

/// Maximum distance between a curved surface and its polygonal approximation.
///
/// Read once from the document root and passed by value to every builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecantTolerance(f64);

impl SecantTolerance {
    pub const DEFAULT: f64 = 0.01;
    pub const MIN_SEGMENTS: usize = 6;
    pub const MAX_SEGMENTS: usize = 720;

    /// Returns `None` unless `value` is finite and positive
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Number of segments for a full circle of the given radius.
    ///
    /// Each chord deviates at most `tolerance` from the arc it replaces.
    pub fn segments(&self, radius: f64) -> usize {
        if !(radius > 0.0) {
            return Self::MIN_SEGMENTS;
        }
        let half_angle = (1.0 - self.0 / radius).clamp(-1.0, 1.0).acos();
        if half_angle <= f64::EPSILON {
            return Self::MAX_SEGMENTS;
        }
        let n = (PI / half_angle).ceil() as usize;
        n.clamp(Self::MIN_SEGMENTS, Self::MAX_SEGMENTS)
    }
}

impl Default for SecantTolerance {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}
