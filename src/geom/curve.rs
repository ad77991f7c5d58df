//! Line segments and polylines: the curve primitives the growth engine works with.

use super::{Point3, Tolerance, Vec3};

/// Errors raised while building or dividing curves.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    /// The polyline has fewer than 2 points.
    #[error("polyline requires at least 2 points, got {count}")]
    InsufficientPoints { count: usize },

    /// A vertex contains NaN or Inf.
    #[error("polyline vertex {index} is not finite")]
    NonFinitePoint { index: usize },

    /// All vertices coincide.
    #[error("polyline has zero length")]
    ZeroLength,

    /// The division step must be a positive finite length.
    #[error("division length must be positive and finite: {step}")]
    InvalidStep { step: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line3 {
    pub start: Point3,
    pub end: Point3,
}

impl Line3 {
    #[must_use]
    pub const fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn direction(self) -> Vec3 {
        self.end - self.start
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.direction().length()
    }

    #[must_use]
    pub fn point_at(self, t: f64) -> Point3 {
        self.start + self.direction() * t
    }

    /// Normalized parameter of the point on the segment closest to `p`,
    /// clamped to `[0, 1]`. Degenerate segments return 0.
    #[must_use]
    pub fn closest_parameter(self, p: Point3) -> f64 {
        let dir = self.direction();
        let len_sq = dir.length_squared();
        if len_sq <= Tolerance::ZERO_LENGTH.eps_squared() {
            return 0.0;
        }
        ((p - self.start).dot(dir) / len_sq).clamp(0.0, 1.0)
    }

    /// Closest point on the finite segment (not the infinite line).
    #[must_use]
    pub fn closest_point(self, p: Point3) -> Point3 {
        self.point_at(self.closest_parameter(p))
    }
}

/// Open polyline with at least two vertices and non-zero length.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline3 {
    points: Vec<Point3>,
    length: f64,
}

impl Polyline3 {
    pub fn new(points: Vec<Point3>) -> Result<Self, CurveError> {
        if points.len() < 2 {
            return Err(CurveError::InsufficientPoints {
                count: points.len(),
            });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(CurveError::NonFinitePoint { index });
        }

        let length = points
            .windows(2)
            .map(|pair| pair[0].distance_to(pair[1]))
            .sum::<f64>();
        if length <= Tolerance::ZERO_LENGTH.eps {
            return Err(CurveError::ZeroLength);
        }

        Ok(Self { points, length })
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[must_use]
    pub fn segments(&self) -> Vec<Line3> {
        self.points
            .windows(2)
            .map(|pair| Line3::new(pair[0], pair[1]))
            .collect()
    }

    /// Divide the polyline into points spaced `step` apart along its arc length.
    ///
    /// The first division point is the start vertex and the last one is always
    /// the end vertex. A regular division that would land within a quarter step
    /// of the end is dropped so the closing piece never becomes a sliver.
    pub fn divide_by_length(&self, step: f64) -> Result<Vec<Point3>, CurveError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(CurveError::InvalidStep { step });
        }

        let mut points = vec![self.points[0]];
        let mut target = step;
        let mut walked = 0.0;

        for segment in self.segments() {
            let seg_len = segment.length();
            if seg_len <= Tolerance::ZERO_LENGTH.eps {
                continue;
            }
            while target <= walked + seg_len && target < self.length - step * 0.25 {
                points.push(segment.point_at((target - walked) / seg_len));
                target += step;
            }
            walked += seg_len;
        }

        if let Some(last) = self.points.last() {
            points.push(*last);
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::{CurveError, Line3, Polyline3};
    use crate::geom::Point3;

    #[test]
    fn closest_point_is_clamped_to_segment() {
        let line = Line3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0));
        assert_eq!(line.closest_point(Point3::new(1.0, 5.0, 0.0)), Point3::new(1.0, 0.0, 0.0));
        assert_eq!(line.closest_point(Point3::new(-3.0, 1.0, 0.0)), line.start);
        assert_eq!(line.closest_point(Point3::new(9.0, -1.0, 2.0)), line.end);
    }

    #[test]
    fn degenerate_segment_returns_start() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let line = Line3::new(p, p);
        assert_eq!(line.closest_point(Point3::new(4.0, 0.0, 0.0)), p);
    }

    #[test]
    fn polyline_rejects_short_and_zero_length_input() {
        assert_eq!(
            Polyline3::new(vec![Point3::ORIGIN]).unwrap_err(),
            CurveError::InsufficientPoints { count: 1 }
        );
        assert_eq!(
            Polyline3::new(vec![Point3::ORIGIN, Point3::ORIGIN]).unwrap_err(),
            CurveError::ZeroLength
        );
    }

    #[test]
    fn divide_by_length_spaces_points_along_arc() {
        let polyline = Polyline3::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ])
        .unwrap();

        let points = polyline.divide_by_length(0.5).unwrap();
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], Point3::new(0.0, 0.0, 0.0));
        assert!(points[1].distance_to(Point3::new(0.5, 0.0, 0.0)) < 1e-12);
        assert!(points[2].distance_to(Point3::new(1.0, 0.0, 0.0)) < 1e-12);
        assert!(points[3].distance_to(Point3::new(1.0, 0.5, 0.0)) < 1e-12);
        assert_eq!(points[4], Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn divide_by_length_drops_sliver_before_end() {
        let polyline =
            Polyline3::new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.05, 0.0, 0.0)]).unwrap();
        let points = polyline.divide_by_length(0.5).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[2], Point3::new(1.05, 0.0, 0.0));
    }

    #[test]
    fn divide_by_length_rejects_non_positive_step() {
        let polyline =
            Polyline3::new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]).unwrap();
        assert!(matches!(
            polyline.divide_by_length(0.0),
            Err(CurveError::InvalidStep { .. })
        ));
    }
}
