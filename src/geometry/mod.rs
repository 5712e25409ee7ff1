// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - polyhedra, triangle meshes, 2D profiles and the BSP kernel

mod csg;
mod mesh;
mod polyhedron;
mod primitives;
mod profile;
mod tessellate;
mod tolerance;

pub use csg::{Csg, KernelError};
pub use mesh::{Mesh, Triangle, TriangleSet};
pub use polyhedron::{Polyhedron, PolyhedronCheck, WELD_EPSILON};
pub use primitives::{linear_extrude, rotate_extrude, Primitive};
pub use profile::{fuse_profiles, transform_profile, PolygonSet, Profile, Shape2dPrimitive};
pub use tessellate::{triangulate_face, triangulate_polygon_2d};
pub use tolerance::SecantTolerance;
