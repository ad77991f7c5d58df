//! Bouwt de JSON-attributen (interval en maximaal aantal stappen) voor een simulatie.

use std::collections::BTreeMap;

use crate::dla::SimulationAttributes;
use crate::graph::node::MetaMap;
use crate::graph::value::Value;

use super::{Component, ComponentResult, coerce};

pub const DEFAULT_INTERVAL: i64 = 10;
pub const DEFAULT_MAX_STEP: i64 = 50;

const OUTPUT_PIN: &str = "A";

#[derive(Debug, Default, Clone, Copy)]
pub struct ComponentImpl;

impl Component for ComponentImpl {
    fn evaluate(&self, inputs: &[Value], _meta: &MetaMap) -> ComponentResult {
        let interval = coerce::coerce_integer_with_default(inputs.first(), DEFAULT_INTERVAL)?;
        let max_step = coerce::coerce_integer_with_default(inputs.get(1), DEFAULT_MAX_STEP)?;

        let attributes = SimulationAttributes::new(interval, max_step);
        attributes.validate()?;

        let mut outputs = BTreeMap::new();
        outputs.insert(OUTPUT_PIN.to_owned(), Value::Text(attributes.to_json_pretty()?));
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::{Component, ComponentImpl, OUTPUT_PIN};
    use crate::components::ComponentError;
    use crate::dla::SimulationAttributes;
    use crate::graph::node::MetaMap;
    use crate::graph::value::Value;

    #[test]
    fn defaults_produce_attribute_blob() {
        let outputs = ComponentImpl.evaluate(&[], &MetaMap::new()).expect("attributes");
        let Some(Value::Text(json)) = outputs.get(OUTPUT_PIN) else {
            panic!("expected text output");
        };
        let parsed = SimulationAttributes::from_json(json).expect("valid json");
        assert_eq!(parsed, SimulationAttributes::new(10, 50));
    }

    #[test]
    fn custom_values_are_written() {
        let outputs = ComponentImpl
            .evaluate(&[Value::Number(50.0), Value::Number(5.0)], &MetaMap::new())
            .expect("attributes");
        let Some(Value::Text(json)) = outputs.get(OUTPUT_PIN) else {
            panic!("expected text output");
        };
        assert_eq!(
            SimulationAttributes::from_json(json).expect("valid json"),
            SimulationAttributes::new(50, 5)
        );
    }

    #[test]
    fn invalid_interval_is_a_warning() {
        let err = ComponentImpl
            .evaluate(&[Value::Number(1.0), Value::Number(5.0)], &MetaMap::new())
            .unwrap_err();
        assert!(matches!(err, ComponentError::Warning(_)));

        let err = ComponentImpl
            .evaluate(&[Value::Number(10.0), Value::Number(0.0)], &MetaMap::new())
            .unwrap_err();
        assert!(matches!(err, ComponentError::Warning(_)));
    }
}
