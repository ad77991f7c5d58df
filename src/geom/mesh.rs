use super::{BBox, Point3, Tolerance};

/// Errors raised when a mesh cannot be used for sampling or projection.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    /// The mesh has no vertices.
    #[error("mesh has no vertices")]
    NoVertices,

    /// The mesh has no faces.
    #[error("mesh has no faces")]
    NoFaces,

    /// A face does not have 3 or 4 corners.
    #[error("face {face} has {corners} corners, expected 3 or 4")]
    UnsupportedFace { face: usize, corners: usize },

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {vertex}, mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        face: usize,
        vertex: u32,
        vertex_count: usize,
    },

    /// A vertex position contains NaN or Inf.
    #[error("vertex {index} has non-finite coordinates")]
    NonFiniteVertex { index: usize },
}

/// Face of a polygon mesh, indices point into [`Mesh::vertices`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFace {
    Triangle([u32; 3]),
    Quad([u32; 4]),
}

impl MeshFace {
    #[must_use]
    pub fn is_triangle(self) -> bool {
        matches!(self, Self::Triangle(_))
    }

    fn indices(&self) -> &[u32] {
        match self {
            Self::Triangle(idx) => idx,
            Self::Quad(idx) => idx,
        }
    }
}

/// A triangle with resolved corner positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle3 {
    pub a: Point3,
    pub b: Point3,
    pub c: Point3,
}

impl Triangle3 {
    #[must_use]
    pub const fn new(a: Point3, b: Point3, c: Point3) -> Self {
        Self { a, b, c }
    }

    #[must_use]
    pub fn area(self) -> f64 {
        (self.b - self.a).cross(self.c - self.a).length() * 0.5
    }

    /// Point at barycentric weights `(u, v)` relative to the edges `a→b` and `a→c`.
    #[must_use]
    pub fn point_at(self, u: f64, v: f64) -> Point3 {
        self.a + (self.b - self.a) * u + (self.c - self.a) * v
    }

    /// Exact closest point on the (closed) triangle.
    ///
    /// Walks the Voronoi regions of the vertices and edges before falling back
    /// to the interior projection, so points beyond an edge land on that edge.
    #[must_use]
    pub fn closest_point(self, p: Point3) -> Point3 {
        let ab = self.b - self.a;
        let ac = self.c - self.a;
        let ap = p - self.a;

        let d1 = ab.dot(ap);
        let d2 = ac.dot(ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return self.a;
        }

        let bp = p - self.b;
        let d3 = ab.dot(bp);
        let d4 = ac.dot(bp);
        if d3 >= 0.0 && d4 <= d3 {
            return self.b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let denom = d1 - d3;
            if denom.abs() > Tolerance::ZERO_LENGTH.eps {
                return self.a + ab * (d1 / denom);
            }
            return self.a;
        }

        let cp = p - self.c;
        let d5 = ab.dot(cp);
        let d6 = ac.dot(cp);
        if d6 >= 0.0 && d5 <= d6 {
            return self.c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let denom = d2 - d6;
            if denom.abs() > Tolerance::ZERO_LENGTH.eps {
                return self.a + ac * (d2 / denom);
            }
            return self.a;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let denom = (d4 - d3) + (d5 - d6);
            if denom.abs() > Tolerance::ZERO_LENGTH.eps {
                return self.b + (self.c - self.b) * ((d4 - d3) / denom);
            }
            return self.b;
        }

        let sum = va + vb + vc;
        if sum.abs() <= Tolerance::ZERO_LENGTH.eps {
            // Collinear corners: take the nearest edge.
            return closest_on_degenerate(self, p);
        }
        let v = vb / sum;
        let w = vc / sum;
        self.a + ab * v + ac * w
    }
}

fn closest_on_degenerate(tri: Triangle3, p: Point3) -> Point3 {
    let edges = [(tri.a, tri.b), (tri.b, tri.c), (tri.c, tri.a)];
    let mut best = tri.a;
    let mut best_dist = f64::INFINITY;
    for (start, end) in edges {
        let candidate = super::Line3::new(start, end).closest_point(p);
        let dist = candidate.distance_squared_to(p);
        if dist < best_dist {
            best_dist = dist;
            best = candidate;
        }
    }
    best
}

/// Result of a closest-point query against a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshClosestPoint {
    pub point: Point3,
    pub face_index: usize,
    pub distance: f64,
}

/// Polygon mesh with triangle and quad faces.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub vertices: Vec<Point3>,
    pub faces: Vec<MeshFace>,
}

impl Mesh {
    #[must_use]
    pub fn new(vertices: Vec<Point3>, faces: Vec<MeshFace>) -> Self {
        Self { vertices, faces }
    }

    /// Build a mesh from raw vertex arrays and index lists as carried by
    /// `Value::Surface`. Faces must have 3 or 4 indices.
    pub fn from_indexed(vertices: &[[f64; 3]], faces: &[Vec<u32>]) -> Result<Self, MeshError> {
        let faces = faces
            .iter()
            .enumerate()
            .map(|(face, idx)| match idx.as_slice() {
                [a, b, c] => Ok(MeshFace::Triangle([*a, *b, *c])),
                [a, b, c, d] => Ok(MeshFace::Quad([*a, *b, *c, *d])),
                other => Err(MeshError::UnsupportedFace {
                    face,
                    corners: other.len(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mesh = Self::new(vertices.iter().copied().map(Point3::from).collect(), faces);
        mesh.validate()?;
        Ok(mesh)
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        if self.vertices.is_empty() {
            return Err(MeshError::NoVertices);
        }
        if self.faces.is_empty() {
            return Err(MeshError::NoFaces);
        }
        if let Some(index) = self.vertices.iter().position(|v| !v.is_finite()) {
            return Err(MeshError::NonFiniteVertex { index });
        }
        let vertex_count = self.vertices.len();
        for (face, mesh_face) in self.faces.iter().enumerate() {
            if let Some(&vertex) = mesh_face
                .indices()
                .iter()
                .find(|&&v| v as usize >= vertex_count)
            {
                return Err(MeshError::IndexOutOfRange {
                    face,
                    vertex,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn bbox(&self) -> Option<BBox> {
        BBox::from_points(&self.vertices)
    }

    /// Corner positions of a face. Triangles repeat `C` as their fourth corner.
    ///
    /// # Panics
    ///
    /// Panics when `face_index` is out of range or the face references missing
    /// vertices; call [`Mesh::validate`] first.
    #[must_use]
    pub fn face_corners(&self, face_index: usize) -> [Point3; 4] {
        match self.faces[face_index] {
            MeshFace::Triangle([a, b, c]) => {
                let c = self.vertices[c as usize];
                [self.vertices[a as usize], self.vertices[b as usize], c, c]
            }
            MeshFace::Quad([a, b, c, d]) => [
                self.vertices[a as usize],
                self.vertices[b as usize],
                self.vertices[c as usize],
                self.vertices[d as usize],
            ],
        }
    }

    /// Triangles making up one face; quads split along the `A–C` diagonal.
    #[must_use]
    pub fn face_triangles(&self, face_index: usize) -> Vec<Triangle3> {
        let [a, b, c, d] = self.face_corners(face_index);
        if self.faces[face_index].is_triangle() {
            vec![Triangle3::new(a, b, c)]
        } else {
            vec![Triangle3::new(a, b, c), Triangle3::new(a, c, d)]
        }
    }

    /// Closest point on the mesh surface, searched over every face without a
    /// distance limit. Ties keep the lowest face index.
    pub fn closest_point(&self, p: Point3) -> Result<MeshClosestPoint, MeshError> {
        self.validate()?;

        let mut best: Option<MeshClosestPoint> = None;
        for face_index in 0..self.faces.len() {
            for triangle in self.face_triangles(face_index) {
                let point = triangle.closest_point(p);
                let distance = point.distance_to(p);
                if best.is_none_or(|current| distance < current.distance) {
                    best = Some(MeshClosestPoint {
                        point,
                        face_index,
                        distance,
                    });
                }
            }
        }

        best.ok_or(MeshError::NoFaces)
    }
}

#[cfg(test)]
mod tests {
    use super::{Mesh, MeshError, MeshFace, Triangle3};
    use crate::geom::Point3;

    fn flat_triangle() -> Triangle3 {
        Triangle3::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
        )
    }

    #[test]
    fn closest_point_projects_interior_points() {
        let p = flat_triangle().closest_point(Point3::new(1.0, 1.0, 1.0));
        assert!(p.distance_to(Point3::new(1.0, 1.0, 0.0)) < 1e-12);
    }

    #[test]
    fn closest_point_snaps_to_edges_and_vertices() {
        let tri = flat_triangle();
        let below = tri.closest_point(Point3::new(1.0, -3.0, 0.5));
        assert!(below.distance_to(Point3::new(1.0, 0.0, 0.0)) < 1e-12);

        let corner = tri.closest_point(Point3::new(-1.0, -1.0, 0.0));
        assert_eq!(corner, tri.a);

        let apex = tri.closest_point(Point3::new(1.0, 5.0, 0.0));
        assert_eq!(apex, tri.c);
    }

    #[test]
    fn from_indexed_accepts_triangles_and_quads() {
        let mesh = Mesh::from_indexed(
            &[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            &[vec![0, 1, 2, 3], vec![0, 1, 2]],
        )
        .unwrap();
        assert_eq!(mesh.faces[0], MeshFace::Quad([0, 1, 2, 3]));
        assert!(mesh.faces[1].is_triangle());
        assert_eq!(mesh.face_triangles(0).len(), 2);
    }

    #[test]
    fn from_indexed_rejects_bad_faces() {
        let err = Mesh::from_indexed(&[[0.0, 0.0, 0.0]], &[vec![0, 1]]).unwrap_err();
        assert_eq!(err, MeshError::UnsupportedFace { face: 0, corners: 2 });

        let err = Mesh::from_indexed(&[[0.0, 0.0, 0.0]], &[vec![0, 1, 2]]).unwrap_err();
        assert!(matches!(err, MeshError::IndexOutOfRange { vertex: 1, .. }));
    }

    #[test]
    fn empty_mesh_has_no_closest_point() {
        let mesh = Mesh::default();
        assert_eq!(mesh.closest_point(Point3::ORIGIN), Err(MeshError::NoVertices));
    }

    #[test]
    fn closest_point_over_quad_mesh() {
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(4.0, 0.0, 0.0),
                Point3::new(4.0, 4.0, 0.0),
                Point3::new(0.0, 4.0, 0.0),
            ],
            vec![MeshFace::Quad([0, 1, 2, 3])],
        );
        let hit = mesh.closest_point(Point3::new(1.0, 3.0, 2.0)).unwrap();
        assert!(hit.point.distance_to(Point3::new(1.0, 3.0, 0.0)) < 1e-12);
        assert!((hit.distance - 2.0).abs() < 1e-12);
        assert_eq!(hit.face_index, 0);
    }

    #[test]
    fn triangle_area_and_point_at() {
        let tri = flat_triangle();
        assert!((tri.area() - 2.0).abs() < 1e-12);
        assert_eq!(tri.point_at(0.5, 0.0), Point3::new(1.0, 0.0, 0.0));
    }
}
