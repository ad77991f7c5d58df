//! Diffusion-limited aggregation of line segments over a mesh surface.

pub mod engine;
pub mod error;
pub mod params;
pub mod scheduler;
pub mod state;

pub use engine::{AttractorSampling, GrowthTarget};
pub use error::DlaError;
pub use params::{Severity, SimulationAttributes, SimulationParameters, ValidationError};
pub use scheduler::{MIN_TICK_INTERVAL_MS, PendingTick, Scheduler};
pub use state::{GrowthState, Phase, StepOutcome};
