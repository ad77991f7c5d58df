//! One growth step of the aggregation walk, as a set of pure functions.
//!
//! A step samples a random point on the target mesh, finds the closest point on
//! the segments grown so far, pushes from there toward the sample (optionally
//! bent along an attractor curve) and pulls the result back onto the mesh.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geom::{CurveError, Line3, Mesh, MeshError, Point3, Polyline3, Tolerance, Vec3};

use super::error::DlaError;
use super::params::SimulationParameters;

/// Arc-length spacing used to discretize the attractor curve.
pub const ATTRACTOR_DIVISION_LENGTH: f64 = 0.1;
/// Distance at which the attractor falloff reaches zero.
pub const ATTRACTOR_FALLOFF_DISTANCE: f64 = 52.0;
/// Control values of the attractor falloff curve.
pub const ATTRACTOR_FALLOFF: [f64; 4] = [1.0, 0.8, 0.2, 0.0];

/// Cubic Bernstein polynomial with control values `a..d`.
#[must_use]
pub fn bezier(t: f64, a: f64, b: f64, c: f64, d: f64) -> f64 {
    let s = 1.0 - t;
    s * s * s * a + 3.0 * s * s * t * b + 3.0 * s * t * t * c + t * t * t * d
}

/// Linear remap of `value` from `[source_min, source_max]` to
/// `[target_min, target_max]`. Not clamped.
#[must_use]
pub fn remap(value: f64, source_min: f64, source_max: f64, target_min: f64, target_max: f64) -> f64 {
    target_min + (value - source_min) * (target_max - target_min) / (source_max - source_min)
}

/// Vertical segment that bootstraps growth at the start point.
#[must_use]
pub fn seed_segment(start: Point3) -> Line3 {
    Line3::new(start, start + Vec3::Z)
}

/// Random point on a random face of `mesh`, reproducible per `step_index`.
///
/// Faces are picked uniformly. A quad is split along its `A–C` diagonal and one
/// half is chosen by area, so the sample never leaves the face.
pub fn sample_surface_point(mesh: &Mesh, step_index: u64) -> Result<Point3, DlaError> {
    mesh.validate()?;

    let mut rng = StdRng::seed_from_u64(step_index);
    let face_index = rng.random_range(0..mesh.face_count());
    let triangles = mesh.face_triangles(face_index);

    let triangle = match triangles.as_slice() {
        [single] => *single,
        [first, second] => {
            let total = first.area() + second.area();
            if total > 0.0 && rng.random::<f64>() * total >= first.area() {
                *second
            } else {
                *first
            }
        }
        _ => return Err(DlaError::Mesh(MeshError::NoFaces)),
    };

    let mut u: f64 = rng.random();
    let mut v: f64 = rng.random();
    if u + v > 1.0 {
        u = 1.0 - u;
        v = 1.0 - v;
    }
    Ok(triangle.point_at(u, v))
}

/// Closest point to `target` over all segments, each clamped to its ends.
/// Ties keep the earliest segment.
pub fn find_closest_point_on_segments(target: Point3, segments: &[Line3]) -> Result<Point3, DlaError> {
    let mut best: Option<(Point3, f64)> = None;
    for segment in segments {
        let candidate = segment.closest_point(target);
        let distance = candidate.distance_squared_to(target);
        if best.is_none_or(|(_, current)| distance < current) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(point, _)| point).ok_or(DlaError::EmptySegments)
}

/// Unit direction from `from` toward `to`, flipped when `scale` is negative.
pub fn compute_base_direction(from: Point3, to: Point3, scale: f64) -> Result<Vec3, DlaError> {
    let dir = (to - from)
        .normalized()
        .ok_or(DlaError::DegenerateDirection)?;
    Ok(if scale < 0.0 { -dir } else { dir })
}

/// Attractor curve discretized into short sub-segments with their midpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct AttractorSampling {
    segments: Vec<Line3>,
    midpoints: Vec<Point3>,
}

impl AttractorSampling {
    /// Divide `curve` every [`ATTRACTOR_DIVISION_LENGTH`] units.
    pub fn from_polyline(curve: &Polyline3) -> Result<Self, CurveError> {
        let points = curve.divide_by_length(ATTRACTOR_DIVISION_LENGTH)?;
        let segments: Vec<Line3> = points
            .windows(2)
            .map(|pair| Line3::new(pair[0], pair[1]))
            .collect();
        if segments.is_empty() {
            return Err(CurveError::ZeroLength);
        }
        let midpoints = segments.iter().map(|segment| segment.point_at(0.5)).collect();
        Ok(Self { segments, midpoints })
    }

    #[must_use]
    pub fn segments(&self) -> &[Line3] {
        &self.segments
    }

    #[must_use]
    pub fn midpoints(&self) -> &[Point3] {
        &self.midpoints
    }

    /// Index of and distance to the midpoint nearest to `point`. First wins.
    #[must_use]
    pub fn nearest(&self, point: Point3) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (index, midpoint) in self.midpoints.iter().enumerate() {
            let distance = midpoint.distance_to(point);
            if best.is_none_or(|(_, current)| distance < current) {
                best = Some((index, distance));
            }
        }
        best
    }

    /// Unit direction of sub-segment `index`.
    #[must_use]
    pub fn direction(&self, index: usize) -> Vec3 {
        self.segments
            .get(index)
            .and_then(|segment| segment.direction().normalized())
            .unwrap_or(Vec3::ZERO)
    }
}

/// Blend `base_direction` with the direction of the nearest attractor
/// sub-segment. The blend weight falls off with distance along
/// [`ATTRACTOR_FALLOFF`].
#[must_use]
pub fn compute_attractor_influence(
    closest_point: Point3,
    base_direction: Vec3,
    attractor: &AttractorSampling,
    attractor_weight: f64,
    scale: f64,
) -> Vec3 {
    let Some((index, distance)) = attractor.nearest(closest_point) else {
        return base_direction * scale;
    };
    let attractor_direction = attractor.direction(index);

    let t = remap(distance, 0.0, ATTRACTOR_FALLOFF_DISTANCE, 0.0, 1.0);
    let [a, b, c, d] = ATTRACTOR_FALLOFF;
    let weight = bezier(t, a, b, c, d) * attractor_weight;

    base_direction * (1.0 - weight) + attractor_direction * weight * scale
}

/// Nearest point on the mesh surface, no search radius.
pub fn project_onto_surface(point: Point3, mesh: &Mesh) -> Result<Point3, DlaError> {
    mesh.closest_point(point)
        .map(|hit| hit.point)
        .map_err(DlaError::Projection)
}

/// Validated, read-only inputs of a run: the mesh to crawl on, the start point
/// and the discretized attractor curve.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthTarget {
    mesh: Mesh,
    start: Point3,
    attractor: Option<AttractorSampling>,
}

impl GrowthTarget {
    pub fn new(mesh: Mesh, start: Point3, attractor: Option<&Polyline3>) -> Result<Self, DlaError> {
        mesh.validate()?;
        if !start.is_finite() {
            return Err(DlaError::InvalidStartPoint);
        }
        let attractor = attractor.map(AttractorSampling::from_polyline).transpose()?;
        Ok(Self {
            mesh,
            start,
            attractor,
        })
    }

    /// Skips validation so tests can feed a broken mesh into a step.
    #[cfg(test)]
    pub(crate) fn unchecked(mesh: Mesh, start: Point3) -> Self {
        Self {
            mesh,
            start,
            attractor: None,
        }
    }

    #[must_use]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    #[must_use]
    pub fn start(&self) -> Point3 {
        self.start
    }

    #[must_use]
    pub fn attractor(&self) -> Option<&AttractorSampling> {
        self.attractor.as_ref()
    }
}

/// Compute the segment grown at `step_index` from the current `segments`.
///
/// `segments` must already contain the seed segment.
pub fn grow_segment(
    segments: &[Line3],
    target: &GrowthTarget,
    params: &SimulationParameters,
    step_index: u64,
) -> Result<Line3, DlaError> {
    let sample = sample_surface_point(&target.mesh, step_index)?;
    let closest = find_closest_point_on_segments(sample, segments)?;

    let base = match compute_base_direction(closest, sample, params.scale) {
        Ok(dir) => dir,
        Err(DlaError::DegenerateDirection) => {
            log::debug!("step {step_index}: sample hit the structure, reusing last direction");
            fallback_direction(segments).ok_or(DlaError::DegenerateDirection)?
        }
        Err(err) => return Err(err),
    };

    let final_dir = match (target.attractor.as_ref(), params.has_attractor) {
        (Some(attractor), true) => compute_attractor_influence(
            closest,
            base,
            attractor,
            params.attractor_weight,
            params.scale,
        ),
        _ => base * params.scale,
    };

    let projected = project_onto_surface(closest + final_dir, &target.mesh)?;
    Ok(Line3::new(closest, projected))
}

/// Direction of the most recent segment that has a usable length.
fn fallback_direction(segments: &[Line3]) -> Option<Vec3> {
    segments.iter().rev().find_map(|segment| {
        let dir = segment.direction();
        if Tolerance::ZERO_LENGTH.is_zero_vec3(dir) {
            None
        } else {
            dir.normalized()
        }
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{
        AttractorSampling, GrowthTarget, bezier, compute_attractor_influence,
        compute_base_direction, find_closest_point_on_segments, grow_segment,
        project_onto_surface, remap, sample_surface_point, seed_segment,
    };
    use crate::dla::error::DlaError;
    use crate::dla::params::{SimulationAttributes, SimulationParameters};
    use crate::geom::{Line3, Mesh, MeshFace, Point3, Polyline3, Vec3};

    pub(crate) fn unit_cube() -> Mesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let faces = [
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [1, 2, 6],
            [1, 6, 5],
            [2, 3, 7],
            [2, 7, 6],
            [3, 0, 4],
            [3, 4, 7],
        ]
        .into_iter()
        .map(MeshFace::Triangle)
        .collect();
        Mesh::new(vertices, faces)
    }

    fn params(scale: f64) -> SimulationParameters {
        SimulationParameters::new(SimulationAttributes::new(50, 5), scale, 0.1, false)
            .expect("valid params")
    }

    #[test]
    fn bezier_endpoints_and_monotone_falloff() {
        assert!((bezier(0.0, 1.0, 0.8, 0.2, 0.0) - 1.0).abs() < 1e-12);
        assert!(bezier(1.0, 1.0, 0.8, 0.2, 0.0).abs() < 1e-12);
        let mut previous = f64::INFINITY;
        for i in 0..=100 {
            let value = bezier(f64::from(i) / 100.0, 1.0, 0.8, 0.2, 0.0);
            assert!(value <= previous + 1e-12);
            previous = value;
        }
    }

    #[test]
    fn remap_extrapolates() {
        assert!((remap(26.0, 0.0, 52.0, 0.0, 1.0) - 0.5).abs() < 1e-12);
        assert!((remap(104.0, 0.0, 52.0, 0.0, 1.0) - 2.0).abs() < 1e-12);
        assert!((remap(0.5, 0.0, 1.0, 7.0, 1.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn samples_stay_on_the_sampled_face() {
        let cube = unit_cube();
        for step in 0..50 {
            let p = sample_surface_point(&cube, step).expect("sample");
            let hit = cube.closest_point(p).expect("closest");
            assert!(hit.distance < 1e-9, "step {step} sample left the surface");
        }
    }

    #[test]
    fn sampling_is_reproducible_per_step() {
        let cube = unit_cube();
        let a = sample_surface_point(&cube, 7).expect("sample");
        let b = sample_surface_point(&cube, 7).expect("sample");
        let c = sample_surface_point(&cube, 8).expect("sample");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn quad_samples_stay_inside() {
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(4.0, 0.0, 0.0),
                Point3::new(4.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![MeshFace::Quad([0, 1, 2, 3])],
        );
        for step in 0..50 {
            let p = sample_surface_point(&mesh, step).expect("sample");
            assert!((0.0..=4.0).contains(&p.x) && (0.0..=1.0).contains(&p.y));
            assert!(p.z.abs() < 1e-12);
        }
    }

    #[test]
    fn empty_mesh_cannot_be_sampled() {
        assert!(matches!(
            sample_surface_point(&Mesh::default(), 0),
            Err(DlaError::Mesh(_))
        ));
    }

    #[test]
    fn closest_point_clamps_and_prefers_first() {
        let segment = Line3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
        let q = Point3::new(2.0, 1.0, 0.0);
        let found = find_closest_point_on_segments(q, &[segment]).expect("closest");
        assert_eq!(found, segment.closest_point(q));
        assert_eq!(found, Point3::new(1.0, 0.0, 0.0));

        let twin = Line3::new(Point3::new(0.0, 2.0, 0.0), Point3::new(1.0, 2.0, 0.0));
        let between = Point3::new(0.5, 1.0, 0.0);
        let found = find_closest_point_on_segments(between, &[segment, twin]).expect("closest");
        assert_eq!(found, Point3::new(0.5, 0.0, 0.0));

        assert_eq!(
            find_closest_point_on_segments(q, &[]),
            Err(DlaError::EmptySegments)
        );
    }

    #[test]
    fn base_direction_is_unit_and_follows_sign() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(4.0, -2.0, 3.0);
        let dir = compute_base_direction(a, b, 2.0).expect("direction");
        assert!((dir.length() - 1.0).abs() < 1e-12);
        assert!((dir.x - 0.6).abs() < 1e-12 && (dir.y + 0.8).abs() < 1e-12);
        let flipped = compute_base_direction(a, b, -1.0).expect("direction");
        assert!(flipped.dot(b - a) < 0.0);
        assert_eq!(
            compute_base_direction(a, a, 1.0),
            Err(DlaError::DegenerateDirection)
        );
    }

    #[test]
    fn attractor_sampling_finds_nearest_midpoint() {
        let curve = Polyline3::new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)])
            .expect("curve");
        let sampling = AttractorSampling::from_polyline(&curve).expect("sampling");
        assert_eq!(sampling.segments().len(), 10);
        let (index, distance) = sampling.nearest(Point3::new(0.26, 1.0, 0.0)).expect("nearest");
        assert_eq!(index, 2);
        assert!((distance - (0.01_f64.powi(2) + 1.0).sqrt()).abs() < 1e-9);
        let dir = sampling.direction(index);
        assert!((dir.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn attractor_blend_at_zero_distance() {
        let curve = Polyline3::new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)])
            .expect("curve");
        let sampling = AttractorSampling::from_polyline(&curve).expect("sampling");
        let on_midpoint = sampling.midpoints()[0];
        let base = Vec3::new(0.0, 1.0, 0.0);
        let dir = compute_attractor_influence(on_midpoint, base, &sampling, 0.5, 2.0);
        // weight 0.5: half the base plus half the attractor direction times scale
        assert!((dir.x - 1.0).abs() < 1e-12);
        assert!((dir.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn projection_lands_on_surface() {
        let cube = unit_cube();
        let p = project_onto_surface(Point3::new(0.5, 0.5, 3.0), &cube).expect("project");
        assert!((p.z - 1.0).abs() < 1e-12);
        assert!(matches!(
            project_onto_surface(Point3::ORIGIN, &Mesh::default()),
            Err(DlaError::Projection(_))
        ));
    }

    #[test]
    fn grown_segment_starts_on_structure_and_ends_on_mesh() {
        let cube = unit_cube();
        let target = GrowthTarget::new(cube.clone(), Point3::new(0.5, 0.5, 0.5), None).expect("target");
        let seed = seed_segment(target.start());
        let grown = grow_segment(&[seed], &target, &params(0.5), 0).expect("grow");
        let on_seed = seed.closest_point(grown.start);
        assert!(on_seed.distance_to(grown.start) < 1e-12);
        let hit = cube.closest_point(grown.end).expect("closest");
        assert!(hit.distance < 1e-9);
    }

    /// Flat quad large enough that every scaled step stays inside it.
    fn plane() -> Mesh {
        Mesh::new(
            vec![
                Point3::new(-50.0, -50.0, 0.0),
                Point3::new(50.0, -50.0, 0.0),
                Point3::new(50.0, 50.0, 0.0),
                Point3::new(-50.0, 50.0, 0.0),
            ],
            vec![MeshFace::Quad([0, 1, 2, 3])],
        )
    }

    #[test]
    fn grown_segment_points_at_sample_with_scale_length() {
        let target = GrowthTarget::new(plane(), Point3::ORIGIN, None).expect("target");
        let seed = seed_segment(target.start());
        for (step, scale) in [(0, 0.5), (1, 2.0), (2, -3.0)] {
            let sample = sample_surface_point(target.mesh(), step).expect("sample");
            let grown = grow_segment(&[seed], &target, &params(scale), step).expect("grow");
            assert_eq!(grown.start, Point3::ORIGIN);

            let offset = grown.end - grown.start;
            assert!((offset.length() - f64::abs(scale)).abs() < 1e-9);
            let toward = (sample - Point3::ORIGIN).normalized().expect("sample off origin");
            assert!((offset.dot(toward) - f64::abs(scale)).abs() < 1e-9);
        }
    }

    #[test]
    fn sample_on_structure_reuses_last_direction() {
        // collinear corners: every sample lies on the x axis, on the segment below
        let sliver = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            vec![MeshFace::Triangle([0, 1, 2])],
        );
        let target = GrowthTarget::new(sliver, Point3::ORIGIN, None).expect("target");
        let axis = Line3::new(Point3::ORIGIN, Point3::new(2.0, 0.0, 0.0));

        let mut longest = 0.0_f64;
        for step in 0..10 {
            let grown = grow_segment(&[axis], &target, &params(0.25), step).expect("grow");
            let offset = grown.end - grown.start;
            assert!(grown.start.y == 0.0 && grown.start.z == 0.0);
            assert!(offset.y.abs() < 1e-12 && offset.z.abs() < 1e-12);
            assert!(offset.x >= 0.0 && offset.x <= 0.25 + 1e-12);
            longest = longest.max(offset.x);
        }
        assert!((longest - 0.25).abs() < 1e-9);
    }

    #[test]
    fn no_usable_direction_is_an_error() {
        let point = Mesh::new(
            vec![Point3::ORIGIN, Point3::ORIGIN, Point3::ORIGIN],
            vec![MeshFace::Triangle([0, 1, 2])],
        );
        let target = GrowthTarget::new(point, Point3::ORIGIN, None).expect("target");
        let stub = Line3::new(Point3::ORIGIN, Point3::ORIGIN);
        assert_eq!(
            grow_segment(&[stub], &target, &params(1.0), 0),
            Err(DlaError::DegenerateDirection)
        );
    }

    #[test]
    fn target_rejects_non_finite_start() {
        let err = GrowthTarget::new(unit_cube(), Point3::new(f64::NAN, 0.0, 0.0), None).unwrap_err();
        assert_eq!(err, DlaError::InvalidStartPoint);
    }
}
