//! Geometry kernel: points, vectors, segments, polylines and polygon meshes.

mod core;
mod curve;
mod mesh;

pub use core::{BBox, Point3, Tolerance, Vec3};
pub use curve::{CurveError, Line3, Polyline3};
pub use mesh::{Mesh, MeshClosestPoint, MeshError, MeshFace, Triangle3};
