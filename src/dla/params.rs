//! Simulation attributes (the JSON blob built by the attributes component) and
//! the validated per-cycle parameter snapshot.

use serde::{Deserialize, Serialize};

/// Interval used when the attribute blob is missing.
pub const DEFAULT_INTERVAL_MS: i64 = 10;
/// Step budget used by the crawl component when the attribute blob is missing.
pub const DEFAULT_MAX_STEPS: i64 = 200;
pub const DEFAULT_SCALE: f64 = 1.0;
pub const DEFAULT_ATTRACTOR_WEIGHT: f64 = 0.1;

/// How severe a rejected input is for the host's message surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Reasons a parameter snapshot is rejected before any step runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid interval. Must be greater than 1ms (got {interval}).")]
    IntervalTooSmall { interval: i64 },

    #[error("Invalid step budget. Must be greater than 0 (got {max_steps}).")]
    MaxStepsTooSmall { max_steps: i64 },

    #[error("Scale multiplier cannot be zero!")]
    ZeroScale,

    #[error("Scale multiplier must be finite (got {scale}).")]
    NonFiniteScale { scale: f64 },

    #[error("Attractor weight cannot be zero!")]
    ZeroAttractorWeight,

    #[error("Attractor weight must be finite (got {weight}).")]
    NonFiniteAttractorWeight { weight: f64 },

    #[error("Invalid simulation attributes: {0}")]
    MalformedAttributes(String),
}

impl ValidationError {
    /// Timing problems are warnings, geometric ones are errors.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::IntervalTooSmall { .. } | Self::MaxStepsTooSmall { .. } => Severity::Warning,
            Self::ZeroScale
            | Self::NonFiniteScale { .. }
            | Self::ZeroAttractorWeight
            | Self::NonFiniteAttractorWeight { .. }
            | Self::MalformedAttributes(_) => Severity::Error,
        }
    }
}

/// Timing attributes of a run, exchanged as `{ "interval": 10, "maxStep": 200 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationAttributes {
    pub interval: i64,
    #[serde(rename = "maxStep")]
    pub max_step: i64,
}

impl Default for SimulationAttributes {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL_MS,
            max_step: DEFAULT_MAX_STEPS,
        }
    }
}

impl SimulationAttributes {
    #[must_use]
    pub const fn new(interval: i64, max_step: i64) -> Self {
        Self { interval, max_step }
    }

    /// Parse the attribute blob. Both keys are required; unknown keys are ignored.
    pub fn from_json(text: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(text).map_err(|err| ValidationError::MalformedAttributes(err.to_string()))
    }

    /// Serialize as indented JSON, the format the attributes component emits.
    pub fn to_json_pretty(&self) -> Result<String, ValidationError> {
        serde_json::to_string_pretty(self)
            .map_err(|err| ValidationError::MalformedAttributes(err.to_string()))
    }

    /// Checks shared by the attributes component and the crawl component.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval <= 1 {
            return Err(ValidationError::IntervalTooSmall {
                interval: self.interval,
            });
        }
        if self.max_step < 1 {
            return Err(ValidationError::MaxStepsTooSmall {
                max_steps: self.max_step,
            });
        }
        Ok(())
    }
}

/// Immutable, validated snapshot of everything one solve cycle needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParameters {
    pub interval_ms: u64,
    pub max_steps: u64,
    pub scale: f64,
    pub attractor_weight: f64,
    pub has_attractor: bool,
}

impl SimulationParameters {
    /// Validate and freeze the inputs of one cycle.
    ///
    /// The attractor weight is only checked when an attractor is connected.
    pub fn new(
        attributes: SimulationAttributes,
        scale: f64,
        attractor_weight: f64,
        has_attractor: bool,
    ) -> Result<Self, ValidationError> {
        attributes.validate()?;

        if !scale.is_finite() {
            return Err(ValidationError::NonFiniteScale { scale });
        }
        if scale == 0.0 {
            return Err(ValidationError::ZeroScale);
        }
        if has_attractor {
            if !attractor_weight.is_finite() {
                return Err(ValidationError::NonFiniteAttractorWeight {
                    weight: attractor_weight,
                });
            }
            if attractor_weight == 0.0 {
                return Err(ValidationError::ZeroAttractorWeight);
            }
        }

        // validate() guarantees both values are positive
        Ok(Self {
            interval_ms: attributes.interval as u64,
            max_steps: attributes.max_step as u64,
            scale,
            attractor_weight,
            has_attractor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Severity, SimulationAttributes, SimulationParameters, ValidationError};

    #[test]
    fn parses_attribute_blob() {
        let attrs = SimulationAttributes::from_json("{ \"interval\": 50, \"maxStep\": 5 }").unwrap();
        assert_eq!(attrs, SimulationAttributes::new(50, 5));
    }

    #[test]
    fn rejects_malformed_blob() {
        let err = SimulationAttributes::from_json("{ \"interval\": 50 }").unwrap_err();
        assert!(matches!(err, ValidationError::MalformedAttributes(_)));
        assert_eq!(err.severity(), Severity::Error);
    }

    #[test]
    fn pretty_json_round_trips_keys() {
        let json = SimulationAttributes::new(10, 50).to_json_pretty().unwrap();
        assert!(json.contains("\"interval\": 10"));
        assert!(json.contains("\"maxStep\": 50"));
    }

    #[test]
    fn timing_violations_are_warnings() {
        let err = SimulationParameters::new(SimulationAttributes::new(1, 5), 1.0, 0.1, false)
            .unwrap_err();
        assert_eq!(err, ValidationError::IntervalTooSmall { interval: 1 });
        assert_eq!(err.severity(), Severity::Warning);

        let err = SimulationParameters::new(SimulationAttributes::new(10, 0), 1.0, 0.1, false)
            .unwrap_err();
        assert_eq!(err.severity(), Severity::Warning);
    }

    #[test]
    fn zero_scale_is_an_error() {
        let err = SimulationParameters::new(SimulationAttributes::new(10, 5), 0.0, 0.1, false)
            .unwrap_err();
        assert_eq!(err, ValidationError::ZeroScale);
        assert_eq!(err.severity(), Severity::Error);
    }

    #[test]
    fn attractor_weight_only_checked_with_attractor() {
        let attrs = SimulationAttributes::new(10, 5);
        assert!(SimulationParameters::new(attrs, 1.0, 0.0, false).is_ok());
        assert_eq!(
            SimulationParameters::new(attrs, 1.0, 0.0, true).unwrap_err(),
            ValidationError::ZeroAttractorWeight
        );
    }

    #[test]
    fn snapshot_converts_units() {
        let params =
            SimulationParameters::new(SimulationAttributes::new(50, 5), 0.5, 0.1, true).unwrap();
        assert_eq!(params.interval_ms, 50);
        assert_eq!(params.max_steps, 5);
        assert!(params.has_attractor);
    }

    #[test]
    fn step_budget_beyond_u32_is_kept_whole() {
        let budget = i64::from(u32::MAX) + 1;
        let params =
            SimulationParameters::new(SimulationAttributes::new(50, budget), 1.0, 0.1, false).unwrap();
        assert_eq!(params.max_steps, 4_294_967_296);
    }
}
