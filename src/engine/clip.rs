// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use super::ClipEngine;
use crate::geometry::{fuse_profiles, PolygonSet, Profile};
use crate::model::BooleanOp;
use geo::{BooleanOps, MultiPolygon};

/// Clip engine backed by `geo` boolean operations
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoClipEngine;

impl GeoClipEngine {
    pub fn new() -> Self {
        Self
    }
}

impl ClipEngine for GeoClipEngine {
    fn compute(&mut self, profile: Profile, op: BooleanOp) -> PolygonSet {
        let region = match op {
            BooleanOp::Union => profile.fused(),
            BooleanOp::Difference | BooleanOp::Intersection => {
                let mut parts = profile.parts.into_iter();
                let first = parts.next().unwrap_or_else(|| MultiPolygon::new(Vec::new()));
                let rest = fuse_profiles(parts.collect());
                match op {
                    BooleanOp::Difference => first.difference(&rest),
                    _ => first.intersection(&rest),
                }
            }
        };
        PolygonSet::from(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{transform_profile, SecantTolerance, Shape2dPrimitive};
    use nalgebra::{Matrix4, Vector3};

    fn square_at(x: f64) -> MultiPolygon<f64> {
        let square = Shape2dPrimitive::Rectangle {
            dx: 1.0,
            dy: 1.0,
            center: false,
        }
        .to_multi_polygon(&SecantTolerance::default());
        transform_profile(&square, &Matrix4::new_translation(&Vector3::new(x, 0.0, 0.0)))
    }

    #[test]
    fn test_union_merges_overlaps_only() {
        let profile = Profile::new(vec![square_at(0.0), square_at(0.5), square_at(3.0)]);
        let set = GeoClipEngine::new().compute(profile, BooleanOp::Union);
        assert_eq!(set.len(), 2);
        approx::assert_relative_eq!(set.area(), 2.5, epsilon = 1e-9);
    }

    #[test]
    fn test_difference_and_intersection() {
        let profile = Profile::new(vec![square_at(0.0), square_at(0.5)]);
        let diff = GeoClipEngine::new().compute(profile.clone(), BooleanOp::Difference);
        approx::assert_relative_eq!(diff.area(), 0.5, epsilon = 1e-9);

        let both = GeoClipEngine::new().compute(profile, BooleanOp::Intersection);
        approx::assert_relative_eq!(both.area(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_profile() {
        let set = GeoClipEngine::new().compute(Profile::default(), BooleanOp::Union);
        assert!(set.is_empty());
    }
}
