//! DLA-groei over een mesh: elke geplande tick voegt één lijnsegment toe.
//!
//! Pinnen: `G` mesh, `P` startpunt, `C` optionele attractorcurve, `[]A`
//! simulatie-attributen (JSON), `S` schaal, `W` optioneel attractorgewicht.
//! Uitvoer `Ln`: alle lijnen tot nu toe, bij elke oplossing volledig.

use std::collections::BTreeMap;

use crate::dla::params::{DEFAULT_ATTRACTOR_WEIGHT, DEFAULT_SCALE};
use crate::dla::scheduler::tick_delay;
use crate::dla::{
    GrowthState, GrowthTarget, Phase, Scheduler, SimulationAttributes, SimulationParameters,
};
use crate::geom::Line3;
use crate::graph::node::MetaMap;
use crate::graph::value::Value;

use super::{ComponentError, ComponentResult, ScheduledComponent, coerce};

/// Attribuutblob wanneer `[]A` niet is aangesloten.
pub const DEFAULT_ATTRIBUTES: &str = "{ \"interval\": 10, \"maxStep\": 200 }";

const PIN_MESH: usize = 0;
const PIN_START: usize = 1;
const PIN_ATTRACTOR: usize = 2;
const PIN_ATTRIBUTES: usize = 3;
const PIN_SCALE: usize = 4;
const PIN_WEIGHT: usize = 5;

const OUTPUT_PIN: &str = "Ln";

#[derive(Debug, Clone, Default)]
pub struct DlaCrawl {
    state: GrowthState,
    snapshot: Option<(SimulationParameters, GrowthTarget)>,
    warnings: Vec<String>,
}

impl DlaCrawl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// De "Simulate"-knop.
    pub fn simulate(&mut self) {
        self.state.start();
    }

    pub fn stop(&mut self) {
        self.state.stop();
    }

    #[must_use]
    pub fn state(&self) -> &GrowthState {
        &self.state
    }

    #[must_use]
    pub fn lines(&self) -> &[Line3] {
        self.state.segments()
    }

    fn read_inputs(inputs: &[Value]) -> Result<(SimulationParameters, GrowthTarget), ComponentError> {
        let mesh = match inputs.get(PIN_MESH) {
            Some(value) if !value.is_empty() => coerce::coerce_mesh(value)
                .map_err(|err| ComponentError::warning(err.message()))?,
            _ => {
                return Err(ComponentError::warning(
                    "No mesh input detected, please plugin a mesh.",
                ));
            }
        };
        let start = match inputs.get(PIN_START) {
            Some(value) if !value.is_empty() => coerce::coerce_point(value)?,
            _ => {
                return Err(ComponentError::new(
                    "No point input detected, please plugin a point.",
                ));
            }
        };

        let attractor_input = inputs.get(PIN_ATTRACTOR);
        let has_attractor = coerce::has_data(attractor_input);
        let attractor = attractor_input
            .filter(|_| has_attractor)
            .map(coerce::coerce_polyline)
            .transpose()?;

        let attributes = coerce::coerce_text_with_default(inputs.get(PIN_ATTRIBUTES), DEFAULT_ATTRIBUTES)?;
        let attributes = SimulationAttributes::from_json(&attributes)?;
        let scale = coerce::coerce_number_with_default(inputs.get(PIN_SCALE), DEFAULT_SCALE)?;
        let weight =
            coerce::coerce_number_with_default(inputs.get(PIN_WEIGHT), DEFAULT_ATTRACTOR_WEIGHT)?;

        let params = SimulationParameters::new(attributes, scale, weight, has_attractor)?;
        let target = GrowthTarget::new(mesh, start, attractor.as_ref())?;
        Ok((params, target))
    }
}

impl ScheduledComponent for DlaCrawl {
    fn solve(
        &mut self,
        inputs: &[Value],
        _meta: &MetaMap,
        scheduler: &mut dyn Scheduler,
    ) -> ComponentResult {
        self.warnings.clear();
        let (params, target) = Self::read_inputs(inputs)?;

        if self.state.phase() == Phase::Running {
            let (delay, raised) = tick_delay(params.interval_ms);
            if raised {
                log::warn!("interval {}ms raised to {delay}ms", params.interval_ms);
                self.warnings.push(format!(
                    "Interval of {}ms is too short, ticks are scheduled every {delay}ms.",
                    params.interval_ms
                ));
            }
            scheduler.schedule_solution(delay);
        }
        self.snapshot = Some((params, target));

        let lines = self
            .state
            .segments()
            .iter()
            .map(|line| Value::CurveLine {
                p1: line.start.to_array(),
                p2: line.end.to_array(),
            })
            .collect();

        let mut outputs = BTreeMap::new();
        outputs.insert(OUTPUT_PIN.to_owned(), Value::List(lines));
        Ok(outputs)
    }

    fn tick(&mut self) -> Result<(), ComponentError> {
        let Some((params, target)) = &self.snapshot else {
            return Ok(());
        };
        self.state.step(params, target)?;
        Ok(())
    }

    fn message(&self) -> String {
        self.state.status_message()
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}
