#[cfg(target_arch = "wasm32")]
fn main() {
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("dla_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use dla_engine::components::dla_crawl::DlaCrawl;
    use dla_engine::components::{
        Component, REGISTRATIONS, ScheduledComponent, dla_visualizer, simulation_param,
    };
    use dla_engine::dla::PendingTick;
    use dla_engine::geom::Line3;
    use dla_engine::graph::node::MetaMap;
    use dla_engine::graph::value::Value;
    use std::fmt::Write as _;
    use std::fs::{self, File};
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};

    const SNAPSHOT_QUANTIZE: f64 = 1e-6;
    const SNAPSHOT_DECIMALS: usize = 6;

    const DEFAULT_STEPS: i64 = 5;
    const DEFAULT_SCALE: f64 = 0.5;
    const SCENARIO_INTERVAL_MS: i64 = 50;

    const USAGE: &str = r#"dla_cli (dla-engine)

USAGE:
  dla_cli list
  dla_cli run <scenario> [options]

SCENARIOS:
  cube_center
  cube_attractor
  plane_grid

OPTIONS (run):
  --steps <n>        Step budget (default 5)
  --scale <s>        Branch scale (default 0.5)
  --obj <path>       Write grown lines as OBJ
  --snap <path>      Write golden-style snapshot instead of printing it
  --overwrite        Overwrite existing output files
  -h, --help         Show this help
"#;

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "list" => {
                print_scenarios();
                Ok(())
            }
            "run" => cmd_run(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn print_scenarios() {
        for scenario in Scenario::ALL {
            println!("{}", scenario.name());
        }
        println!();
        println!("components:");
        for registration in REGISTRATIONS {
            println!(
                "  {:<24} {}",
                registration.kind.name(),
                registration.guids.join(", ")
            );
        }
    }

    fn cmd_run(args: &mut Args) -> Result<(), String> {
        let scenario_name = args.next().ok_or("missing scenario name")?;

        let mut steps = DEFAULT_STEPS;
        let mut scale = DEFAULT_SCALE;
        let mut obj_path: Option<PathBuf> = None;
        let mut snap_path: Option<PathBuf> = None;
        let mut overwrite = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--steps" => steps = parse_value(&args.value("--steps")?, "--steps")?,
                "--scale" => scale = parse_value(&args.value("--scale")?, "--scale")?,
                "--obj" => obj_path = Some(PathBuf::from(args.value("--obj")?)),
                "--snap" => snap_path = Some(PathBuf::from(args.value("--snap")?)),
                "--overwrite" => overwrite = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let scenario =
            Scenario::from_str(scenario_name.as_str()).ok_or_else(|| unknown_scenario(&scenario_name))?;
        let output = run_scenario(scenario, steps, scale)?;

        if let Some(path) = snap_path.as_deref() {
            write_text_file(path, &output.snapshot, overwrite)?;
            eprintln!("wrote {}", path.display());
        } else {
            print!("{}", output.snapshot);
        }

        if let Some(path) = obj_path.as_deref() {
            write_obj_file(path, &output.lines, output.name, overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        eprintln!(
            "{}: lines={} ticks={} | {}",
            output.name,
            output.lines.len(),
            output.ticks,
            output.status
        );
        for warning in &output.warnings {
            eprintln!("warning: {warning}");
        }

        Ok(())
    }

    fn parse_value<T: std::str::FromStr>(text: &str, flag: &str) -> Result<T, String> {
        text.parse()
            .map_err(|_| format!("invalid value `{text}` for {flag}"))
    }

    fn unknown_scenario(name: &str) -> String {
        let mut msg = String::new();
        let _ = writeln!(msg, "unknown scenario `{name}`\n\navailable scenarios:");
        for scenario in Scenario::ALL {
            let _ = writeln!(msg, "  {}", scenario.name());
        }
        msg
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        fs::write(path, normalize_snapshot_text(text)).map_err(|e| format!("write {}: {e}", path.display()))
    }

    fn write_obj_file(path: &Path, lines: &[Line3], name: &str, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }

        let file = File::create(path).map_err(|e| format!("create {}: {e}", path.display()))?;
        let mut w = BufWriter::new(file);

        writeln!(w, "# dla-engine dla_cli").map_err(|e| format!("write obj: {e}"))?;
        writeln!(w, "o {name}").map_err(|e| format!("write obj: {e}"))?;

        for line in lines {
            for p in [line.start, line.end] {
                writeln!(w, "v {} {} {}", p.x, p.y, p.z).map_err(|e| format!("write obj: {e}"))?;
            }
        }
        for index in 0..lines.len() {
            let a = 2 * index + 1;
            let b = a + 1;
            writeln!(w, "l {a} {b}").map_err(|e| format!("write obj: {e}"))?;
        }

        w.flush().map_err(|e| format!("flush {}: {e}", path.display()))
    }

    fn normalize_snapshot_text(text: &str) -> String {
        let normalized = text.replace("\r\n", "\n");
        if normalized.ends_with('\n') {
            normalized
        } else {
            format!("{normalized}\n")
        }
    }

    fn quantize_f64(value: f64) -> f64 {
        if !value.is_finite() {
            return value;
        }
        let q = (value / SNAPSHOT_QUANTIZE).round() * SNAPSHOT_QUANTIZE;
        if q == 0.0 { 0.0 } else { q }
    }

    fn write_f64(out: &mut String, value: f64) {
        let value = quantize_f64(value);
        let _ = write!(out, "{value:.SNAPSHOT_DECIMALS$}");
    }

    fn write_vec3(out: &mut String, v: [f64; 3]) {
        write_f64(out, v[0]);
        out.push(' ');
        write_f64(out, v[1]);
        out.push(' ');
        write_f64(out, v[2]);
    }

    fn snapshot(op: &str, sections: impl FnOnce(&mut String)) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# dla-engine golden v1");
        let _ = writeln!(out, "op {op}");
        let _ = writeln!(out, "quantize {SNAPSHOT_QUANTIZE:.1e}");
        sections(&mut out);
        normalize_snapshot_text(&out)
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Scenario {
        CubeCenter,
        CubeAttractor,
        PlaneGrid,
    }

    impl Scenario {
        const ALL: &'static [Scenario] = &[
            Scenario::CubeCenter,
            Scenario::CubeAttractor,
            Scenario::PlaneGrid,
        ];

        fn name(self) -> &'static str {
            match self {
                Scenario::CubeCenter => "cube_center",
                Scenario::CubeAttractor => "cube_attractor",
                Scenario::PlaneGrid => "plane_grid",
            }
        }

        fn from_str(name: &str) -> Option<Self> {
            Self::ALL.iter().copied().find(|scenario| scenario.name() == name)
        }
    }

    struct ScenarioOutput {
        name: &'static str,
        lines: Vec<Line3>,
        ticks: usize,
        status: String,
        warnings: Vec<String>,
        snapshot: String,
    }

    fn run_scenario(scenario: Scenario, steps: i64, scale: f64) -> Result<ScenarioOutput, String> {
        let (mesh, start, attractor) = match scenario {
            Scenario::CubeCenter => (unit_cube(), [0.5, 0.5, 0.5], Value::Null),
            Scenario::CubeAttractor => (
                unit_cube(),
                [0.5, 0.5, 0.5],
                Value::List(vec![Value::Point([0.0, 0.0, 1.0]), Value::Point([1.0, 1.0, 1.0])]),
            ),
            Scenario::PlaneGrid => (plane_grid(4), [2.0, 2.0, 0.0], Value::Null),
        };
        let has_attractor = !attractor.is_empty();
        let meta = MetaMap::new();

        let attributes = simulation_param::ComponentImpl
            .evaluate(
                &[Value::Number(SCENARIO_INTERVAL_MS as f64), Value::Number(steps as f64)],
                &meta,
            )
            .map_err(|e| format!("simulation attributes: {e}"))?
            .remove("A")
            .ok_or("simulation attributes: missing output `A`")?;

        let inputs = [
            mesh,
            Value::Point(start),
            attractor,
            attributes,
            Value::Number(scale),
            Value::Number(0.5),
        ];

        let mut crawl = DlaCrawl::new();
        let mut pending = PendingTick::new();
        let mut ticks = 0;
        crawl.simulate();
        crawl
            .solve(&inputs, &meta, &mut pending)
            .map_err(|e| format!("solve: {e}"))?;
        while pending.take().is_some() {
            crawl.tick().map_err(|e| format!("tick {ticks}: {e}"))?;
            crawl
                .solve(&inputs, &meta, &mut pending)
                .map_err(|e| format!("solve: {e}"))?;
            ticks += 1;
        }

        let lines = crawl.lines().to_vec();
        let thickness = line_thickness(&lines)?;
        let status = crawl.message();
        let name = scenario.name();

        let snapshot = snapshot(name, |out| {
            let _ = write!(out, "params interval={SCENARIO_INTERVAL_MS} steps={steps} scale=");
            write_f64(out, scale);
            let _ = writeln!(out, " attractor={}", if has_attractor { "yes" } else { "no" });
            let _ = writeln!(out, "status {status}");
            let _ = writeln!(out, "lines {}", lines.len());
            for (line, t) in lines.iter().zip(&thickness) {
                out.push_str("l ");
                write_vec3(out, line.start.to_array());
                out.push(' ');
                write_vec3(out, line.end.to_array());
                out.push(' ');
                write_f64(out, *t);
                out.push('\n');
            }
        });

        Ok(ScenarioOutput {
            name,
            lines,
            ticks,
            status,
            warnings: crawl.warnings().to_vec(),
            snapshot,
        })
    }

    fn line_thickness(lines: &[Line3]) -> Result<Vec<f64>, String> {
        let value = Value::List(
            lines
                .iter()
                .map(|line| Value::CurveLine {
                    p1: line.start.to_array(),
                    p2: line.end.to_array(),
                })
                .collect(),
        );
        let outputs = dla_visualizer::ComponentImpl
            .evaluate(&[value], &MetaMap::new())
            .map_err(|e| format!("visualizer: {e}"))?;
        match outputs.get("T") {
            Some(Value::List(values)) => values
                .iter()
                .map(|v| v.expect_number().map_err(|e| format!("visualizer: {e}")))
                .collect(),
            _ => Err("visualizer: missing output `T`".to_string()),
        }
    }

    fn unit_cube() -> Value {
        let vertices = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
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
        .iter()
        .map(|face| face.to_vec())
        .collect();
        Value::Surface { vertices, faces }
    }

    /// Flat `size` x `size` quad grid in the XY plane.
    fn plane_grid(size: u32) -> Value {
        let row = size + 1;
        let mut vertices = Vec::with_capacity((row * row) as usize);
        for j in 0..row {
            for i in 0..row {
                vertices.push([f64::from(i), f64::from(j), 0.0]);
            }
        }
        let mut faces = Vec::with_capacity((size * size) as usize);
        for j in 0..size {
            for i in 0..size {
                let a = j * row + i;
                faces.push(vec![a, a + 1, a + row + 1, a + row]);
            }
        }
        Value::Surface { vertices, faces }
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}
