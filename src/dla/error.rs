use crate::geom::{CurveError, MeshError};

use super::params::{Severity, ValidationError};

/// Errors raised by a growth step. None of them touch the accumulated state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DlaError {
    /// Parameters were rejected before stepping.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The target mesh cannot be sampled.
    #[error("invalid target mesh: {0}")]
    Mesh(#[from] MeshError),

    /// The attractor curve cannot be discretized.
    #[error("invalid attractor curve: {0}")]
    Attractor(#[from] CurveError),

    /// Nearest-point search over an empty segment list.
    #[error("no segments to search for a closest point")]
    EmptySegments,

    /// Start point is NaN or Inf.
    #[error("start point is not a valid point")]
    InvalidStartPoint,

    /// Direction between two coincident points.
    #[error("growth direction is undefined for coincident points")]
    DegenerateDirection,

    /// Projection back onto the mesh did not produce a point.
    #[error("could not project point onto the target mesh: {0}")]
    Projection(MeshError),
}

impl DlaError {
    /// Input problems the user has to fix are warnings, everything that fails
    /// while computing is an error.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Validation(err) => err.severity(),
            Self::Mesh(_) | Self::InvalidStartPoint => Severity::Warning,
            Self::Attractor(_)
            | Self::EmptySegments
            | Self::DegenerateDirection
            | Self::Projection(_) => Severity::Error,
        }
    }
}
