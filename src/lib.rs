#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod components;
pub mod dla;
pub mod geom;
pub mod graph;

use std::fmt;

use components::dla_crawl::DlaCrawl;
use components::{ComponentError, ScheduledComponent};
use dla::PendingTick;
use graph::node::MetaMap;
use graph::value::Value;
use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Aantal invoerpinnen van de crawl-component.
const CRAWL_PIN_COUNT: usize = 6;

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "type")]
enum GeometryItem {
    Line { start: [f64; 3], end: [f64; 3] },
}

/// Resultaat van één `solve` voor de host.
#[derive(Debug, Serialize, Clone, PartialEq)]
struct SolveReport {
    /// Vertraging in ms waarna de host `tick` en daarna `solve` moet aanroepen.
    #[serde(skip_serializing_if = "Option::is_none")]
    next_tick_ms: Option<u64>,
    status: String,
    line_count: usize,
    warnings: Vec<String>,
}

/// Public entry point for consumers.
#[wasm_bindgen]
pub struct Engine {
    crawl: DlaCrawl,
    inputs: Vec<Value>,
    pending: PendingTick,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Engine {
        Engine {
            crawl: DlaCrawl::new(),
            inputs: vec![Value::Null; CRAWL_PIN_COUNT],
            pending: PendingTick::new(),
        }
    }

    /// Stel de mesh in. `vertices` is een vlakke xyz-lijst, `faces` bevat
    /// per vlak vier indices; een driehoek herhaalt zijn derde index.
    #[wasm_bindgen]
    pub fn set_mesh(&mut self, vertices: &[f64], faces: &[u32]) -> Result<(), JsValue> {
        let value = mesh_value(vertices, faces).map_err(|err| js_error(&err))?;
        self.inputs[0] = value;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_start_point(&mut self, x: f64, y: f64, z: f64) {
        self.inputs[1] = Value::Point([x, y, z]);
    }

    /// Stel de attractorcurve in als vlakke xyz-lijst van polyline-punten.
    #[wasm_bindgen]
    pub fn set_attractor(&mut self, points: &[f64]) -> Result<(), JsValue> {
        let points = triples(points).map_err(|err| js_error(&err))?;
        if points.len() < 2 {
            return Err(js_error("attractorcurve vereist minstens twee punten"));
        }
        self.inputs[2] = Value::List(points.into_iter().map(Value::Point).collect());
        Ok(())
    }

    #[wasm_bindgen]
    pub fn clear_attractor(&mut self) {
        self.inputs[2] = Value::Null;
    }

    /// JSON-attributen, bv. `{ "interval": 10, "maxStep": 200 }`.
    #[wasm_bindgen]
    pub fn set_attributes(&mut self, json: &str) -> Result<(), JsValue> {
        dla::SimulationAttributes::from_json(json).map_err(to_js_error)?;
        self.inputs[3] = Value::Text(json.to_owned());
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_scale(&mut self, scale: f64) {
        self.inputs[4] = Value::Number(scale);
    }

    #[wasm_bindgen]
    pub fn set_attractor_weight(&mut self, weight: f64) {
        self.inputs[5] = Value::Number(weight);
    }

    /// De "Simulate"-knop.
    #[wasm_bindgen]
    pub fn simulate(&mut self) {
        self.crawl.simulate();
    }

    #[wasm_bindgen]
    pub fn stop(&mut self) {
        self.crawl.stop();
        self.pending.cancel();
    }

    /// Los de component op; het rapport vertelt of en wanneer de volgende tick volgt.
    #[wasm_bindgen]
    pub fn solve(&mut self) -> Result<JsValue, JsValue> {
        let report = self.solve_report().map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&report).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Voer de geplande stap uit. Zonder openstaande tick gebeurt er niets.
    #[wasm_bindgen]
    pub fn tick(&mut self) -> Result<bool, JsValue> {
        self.run_pending_tick().map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn get_lines(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.line_items())
            .map_err(|err| JsError::new(&err.to_string()).into())
    }

    #[wasm_bindgen]
    pub fn get_status(&self) -> String {
        self.crawl.message()
    }
}

impl Engine {
    fn solve_report(&mut self) -> Result<SolveReport, ComponentError> {
        self.pending.cancel();
        let outputs = self
            .crawl
            .solve(&self.inputs, &MetaMap::new(), &mut self.pending)?;
        let line_count = outputs
            .get("Ln")
            .and_then(|value| value.expect_list().ok())
            .map_or(0, <[Value]>::len);

        debug_log!("solve: {line_count} lijnen, status {}", self.crawl.message());
        Ok(SolveReport {
            next_tick_ms: self.pending.delay_ms(),
            status: self.crawl.message(),
            line_count,
            warnings: self.crawl.warnings().to_vec(),
        })
    }

    fn run_pending_tick(&mut self) -> Result<bool, ComponentError> {
        if self.pending.take().is_none() {
            return Ok(false);
        }
        self.crawl.tick()?;
        Ok(true)
    }

    fn line_items(&self) -> Vec<GeometryItem> {
        self.crawl
            .lines()
            .iter()
            .map(|line| GeometryItem::Line {
                start: line.start.to_array(),
                end: line.end.to_array(),
            })
            .collect()
    }
}

fn triples(flat: &[f64]) -> Result<Vec<[f64; 3]>, String> {
    if flat.len() % 3 != 0 {
        return Err(format!(
            "coördinatenlijst moet een veelvoud van 3 zijn, kreeg {}",
            flat.len()
        ));
    }
    Ok(flat
        .chunks_exact(3)
        .map(|chunk| [chunk[0], chunk[1], chunk[2]])
        .collect())
}

fn mesh_value(vertices: &[f64], faces: &[u32]) -> Result<Value, String> {
    let vertices = triples(vertices)?;
    if faces.len() % 4 != 0 {
        return Err(format!(
            "vlakkenlijst moet een veelvoud van 4 zijn, kreeg {}",
            faces.len()
        ));
    }
    let faces = faces
        .chunks_exact(4)
        .map(|face| {
            if face[2] == face[3] {
                face[..3].to_vec()
            } else {
                face.to_vec()
            }
        })
        .collect();
    Ok(Value::Surface { vertices, faces })
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::{Engine, GeometryItem, mesh_value, triples};
    use crate::graph::value::Value;

    const CUBE_VERTICES: [f64; 24] = [
        0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0,
    ];
    const CUBE_FACES: [u32; 24] = [
        0, 3, 2, 1, 4, 5, 6, 7, 0, 1, 5, 4, 1, 2, 6, 5, 2, 3, 7, 6, 3, 0, 4, 7,
    ];

    #[test]
    fn repeated_index_marks_a_triangle() {
        let value = mesh_value(&[0.0; 9], &[0, 1, 2, 2]).expect("mesh");
        match value {
            Value::Surface { faces, .. } => assert_eq!(faces, vec![vec![0, 1, 2]]),
            other => panic!("verwacht Surface, kreeg {other:?}"),
        }
        assert!(mesh_value(&[0.0; 9], &[0, 1, 2]).is_err());
        assert!(triples(&[0.0; 4]).is_err());
    }

    #[test]
    fn engine_drives_a_full_run() {
        let mut engine = Engine::new();
        assert!(engine.set_mesh(&CUBE_VERTICES, &CUBE_FACES).is_ok());
        engine.set_start_point(0.5, 0.5, 0.5);
        assert!(engine.set_attributes("{ \"interval\": 50, \"maxStep\": 5 }").is_ok());
        engine.set_scale(0.5);
        engine.simulate();

        let mut report = engine.solve_report().expect("solve");
        while let Some(delay) = report.next_tick_ms {
            assert_eq!(delay, 50);
            assert!(engine.run_pending_tick().expect("tick"));
            report = engine.solve_report().expect("solve");
        }

        assert_eq!(report.line_count, 6);
        assert_eq!(report.status, "Step: 5");
        assert_eq!(engine.line_items().len(), 6);
        assert!(matches!(engine.line_items()[0], GeometryItem::Line { start, .. } if start == [0.5, 0.5, 0.5]));
    }

    #[test]
    fn tick_without_pending_request_is_a_no_op() {
        let mut engine = Engine::new();
        assert!(!engine.run_pending_tick().expect("tick"));
        assert_eq!(engine.get_status(), "Stopped.");
    }

    #[test]
    fn stop_cancels_pending_tick() {
        let mut engine = Engine::new();
        assert!(engine.set_mesh(&CUBE_VERTICES, &CUBE_FACES).is_ok());
        engine.set_start_point(0.5, 0.5, 0.5);
        engine.simulate();
        let report = engine.solve_report().expect("solve");
        assert_eq!(report.next_tick_ms, Some(10));
        engine.stop();
        assert!(!engine.run_pending_tick().expect("tick"));
    }
}
