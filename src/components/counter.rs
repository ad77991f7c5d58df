//! Teller die per gepland interval met één ophoogt tot een doelwaarde.

use std::collections::BTreeMap;

use crate::dla::Scheduler;
use crate::graph::node::MetaMap;
use crate::graph::value::Value;

use super::{ComponentError, ComponentResult, ScheduledComponent, coerce};

pub const DEFAULT_START: i64 = 0;
pub const DEFAULT_TARGET: i64 = 15;
pub const DEFAULT_INTERVAL_MS: i64 = 150;
/// Kortste interval dat de teller accepteert.
pub const MIN_INTERVAL_MS: i64 = 50;

const OUTPUT_PIN: &str = "C";

#[derive(Debug, Clone)]
pub struct Counter {
    count: i64,
    target: i64,
    message: String,
    warnings: Vec<String>,
}

impl Default for Counter {
    fn default() -> Self {
        Self {
            count: DEFAULT_START,
            target: DEFAULT_TARGET,
            message: "Stopped.".to_owned(),
            warnings: Vec::new(),
        }
    }
}

impl Counter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn count(&self) -> i64 {
        self.count
    }
}

impl ScheduledComponent for Counter {
    fn solve(
        &mut self,
        inputs: &[Value],
        _meta: &MetaMap,
        scheduler: &mut dyn Scheduler,
    ) -> ComponentResult {
        self.warnings.clear();

        let run = coerce::coerce_boolean_with_default(inputs.first(), false)?;
        let start = coerce::coerce_integer_with_default(inputs.get(1), DEFAULT_START)?;
        let mut target = coerce::coerce_integer_with_default(inputs.get(2), DEFAULT_TARGET)?;
        let mut interval = coerce::coerce_integer_with_default(inputs.get(3), DEFAULT_INTERVAL_MS)?;

        if interval < MIN_INTERVAL_MS {
            interval = MIN_INTERVAL_MS;
            self.warnings.push(format!(
                "Interval must not be less than {MIN_INTERVAL_MS}ms. Value is set to {MIN_INTERVAL_MS}ms."
            ));
        }
        if start == target {
            target = start.saturating_add(1);
            self.warnings
                .push("Start number and Target number must not be equal.".to_owned());
        }
        if start > target {
            return Err(ComponentError::new(
                "Start number must not be greater than Target number.",
            ));
        }
        self.target = target;

        if run {
            if self.count < target {
                // interval is at least MIN_INTERVAL_MS here
                scheduler.schedule_solution(interval as u64);
            }
        } else {
            self.count = start;
            self.message = "Stopped.".to_owned();
        }

        let mut outputs = BTreeMap::new();
        outputs.insert(OUTPUT_PIN.to_owned(), Value::Number(self.count as f64));
        Ok(outputs)
    }

    fn tick(&mut self) -> Result<(), ComponentError> {
        self.count += 1;
        self.message = format!("Count: {} / {}", self.count, self.target);
        Ok(())
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}
