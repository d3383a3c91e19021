#[cfg(target_arch = "wasm32")]
fn main() {
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("geomesh_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use geomesh_engine::parse::parse_str;
    use geomesh_engine::pipeline::{ParamValue, Params, RegenerationController, World, export_world};
    use std::fs;
    use std::path::{Path, PathBuf};

    const USAGE: &str = r"geomesh_cli (geomesh-engine)

USAGE:
  geomesh_cli <input.geojson> [options]

OPTIONS:
  --params <file>     Load parameters from a JSON file
  --set <name=value>  Override one parameter (repeatable), e.g. --set loop=3 --set flat=true
  --out <path>        Write the export document to this path
  --overwrite         Overwrite an existing output file
  -h, --help          Show this help
";

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let mut input_path: Option<PathBuf> = None;
        let mut params_path: Option<PathBuf> = None;
        let mut overrides: Vec<(String, ParamValue)> = Vec::new();
        let mut out_path: Option<PathBuf> = None;
        let mut overwrite = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--params" => params_path = Some(PathBuf::from(args.value("--params")?)),
                "--set" => overrides.push(parse_override(&args.value("--set")?)?),
                "--out" => out_path = Some(PathBuf::from(args.value("--out")?)),
                "--overwrite" => overwrite = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other if other.starts_with("--") => {
                    return Err(format!("unknown option `{other}`\n\n{USAGE}"));
                }
                other => {
                    if input_path.is_some() {
                        return Err(format!("unexpected argument `{other}`\n\n{USAGE}"));
                    }
                    input_path = Some(PathBuf::from(other));
                }
            }
        }

        let Some(input_path) = input_path else {
            print_usage();
            return Ok(());
        };

        let mut params = match params_path.as_ref() {
            Some(path) => {
                let text = read_text_file(path)?;
                Params::from_json_str(&text).map_err(|e| format!("params {}: {e}", path.display()))?
            }
            None => Params::default(),
        };
        for (name, value) in overrides {
            params
                .set(&name, value)
                .map_err(|e| format!("--set {name}: {e}"))?;
        }

        let text = read_text_file(&input_path)?;
        let input = parse_str(&text).map_err(|e| format!("input {}: {e}", input_path.display()))?;

        let mut controller = RegenerationController::new(params);
        let world = controller.load_input(input).map_err(|e| e.to_string())?;
        print_summary(&world);

        if let Some(path) = out_path.as_ref() {
            let Some(document) = export_world(&world) else {
                println!("nothing to export (world is empty)");
                return Ok(());
            };
            let json = document.to_json_string_pretty()?;
            write_text_file(path, &json, overwrite)?;
            println!("wrote {}", path.display());
        }

        Ok(())
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn parse_override(arg: &str) -> Result<(String, ParamValue), String> {
        let (name, raw) = arg
            .split_once('=')
            .ok_or_else(|| format!("expected name=value, got `{arg}`"))?;
        let value = match raw.trim() {
            "true" => ParamValue::Bool(true),
            "false" => ParamValue::Bool(false),
            number => ParamValue::Number(
                number
                    .parse::<f64>()
                    .map_err(|e| format!("invalid value for {name}: {e}"))?,
            ),
        };
        Ok((name.trim().to_owned(), value))
    }

    fn print_summary(world: &World) {
        println!(
            "anchor: lon={:.7} lat={:.7}",
            world.anchor.lon, world.anchor.lat
        );
        println!(
            "meshes: {}  vertices: {}  triangles: {}  skipped: {}",
            world.meshes.len(),
            world.vertex_count(),
            world.triangle_count(),
            world.skipped.len()
        );
        if let Some(bbox) = world.bounding_box() {
            let size = bbox.size();
            println!("extent: {:.3} x {:.3} m", size.x, size.y);
        }
        println!("{}", world.diagnostics);
        for skipped in &world.skipped {
            println!("  skipped feature {}: {}", skipped.index, skipped.reason);
        }
        for warning in &world.diagnostics.warnings {
            println!("  warning: {warning}");
        }
        if let Some(timing) = world.timing.as_ref() {
            println!("time: {:.3} ms", timing.total_ms());
        }
    }

    fn read_text_file(path: &Path) -> Result<String, String> {
        fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        fs::write(path, text).map_err(|e| format!("write {}: {e}", path.display()))
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
