//! Weergavedata voor DLA-lijnen: een genormaliseerde parameter per lijn en
//! een lijndikte die afneemt met de groeivolgorde.

use std::collections::BTreeMap;

use crate::dla::engine::remap;
use crate::graph::node::{MetaLookupExt, MetaMap};
use crate::graph::value::Value;

use super::{Component, ComponentError, ComponentResult, coerce};

/// Dikte van de oudste lijn.
pub const DEFAULT_MAX_THICKNESS: f64 = 7.0;
/// Dikte van de jongste lijn.
pub const DEFAULT_MIN_THICKNESS: f64 = 1.0;

const PIN_PARAMETERS: &str = "P";
const PIN_THICKNESS: &str = "T";

#[derive(Debug, Default, Clone, Copy)]
pub struct ComponentImpl;

impl Component for ComponentImpl {
    fn evaluate(&self, inputs: &[Value], meta: &MetaMap) -> ComponentResult {
        let input = inputs.first();
        if !coerce::has_data(input) {
            return Err(ComponentError::warning("No DLA lines input detected."));
        }
        let lines = input.map(coerce::coerce_lines).transpose()?.unwrap_or_default();
        if lines.is_empty() {
            return Err(ComponentError::warning("No DLA lines input detected."));
        }

        let max_thickness = meta.number("MaxThickness").unwrap_or(DEFAULT_MAX_THICKNESS);
        let min_thickness = meta.number("MinThickness").unwrap_or(DEFAULT_MIN_THICKNESS);

        let parameters = normalized_indices(lines.len());
        let thickness = parameters
            .iter()
            .map(|&t| remap(t, 0.0, 1.0, max_thickness, min_thickness))
            .collect::<Vec<_>>();

        let mut outputs = BTreeMap::new();
        outputs.insert(PIN_PARAMETERS.to_owned(), numbers(parameters));
        outputs.insert(PIN_THICKNESS.to_owned(), numbers(thickness));
        Ok(outputs)
    }
}

/// `i / (count - 1)` voor elke index; een enkele lijn krijgt 0.
fn normalized_indices(count: usize) -> Vec<f64> {
    if count <= 1 {
        return vec![0.0; count];
    }
    let last = (count - 1) as f64;
    (0..count).map(|i| i as f64 / last).collect()
}

fn numbers(values: Vec<f64>) -> Value {
    Value::List(values.into_iter().map(Value::Number).collect())
}
