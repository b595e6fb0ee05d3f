#![deny(unsafe_code)]
//! CLI binary for the plane-engine.
//!
//! Subcommands:
//! - `render <engine>`: compute a plane on a background thread, write PNG
//! - `list`: print available planes, their parameters, and resolution presets

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use plane_engine_core::{spawn_calculation, Engine, GridRange, Resolution, Seed};
use plane_engine_engines::EngineKind;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "plane-engine", about = "Fractal and vector-field plane renderer")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute a plane and write a PNG snapshot.
    Render {
        /// Plane name (e.g. "weather"). Required unless `--spec` is given.
        engine: Option<String>,

        /// Canvas width in pixels.
        #[arg(short = 'W', long, default_value_t = 640)]
        width: usize,

        /// Canvas height in pixels.
        #[arg(short = 'H', long, default_value_t = 360)]
        height: usize,

        /// Math range as xMin_xMax_yCenter; defaults to the plane's own.
        #[arg(long)]
        range: Option<String>,

        /// Plane parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// PRNG seed for deterministic textures.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Read the whole render description from a JSON file instead.
        #[arg(long, conflicts_with_all = ["engine", "range", "params"])]
        spec: Option<PathBuf>,

        /// Also write the render description, with resolved parameters.
        #[arg(long)]
        save_spec: Option<PathBuf>,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,
    },
    /// List available planes and resolution presets.
    List,
}

fn seed_from_args(
    engine: Option<String>,
    width: usize,
    height: usize,
    range: Option<String>,
    params: &str,
    seed: u64,
    spec: Option<PathBuf>,
) -> Result<Seed, CliError> {
    if let Some(path) = spec {
        let text = std::fs::read_to_string(&path)
            .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))?;
        return serde_json::from_str(&text)
            .map_err(|e| CliError::Input(format!("invalid spec {}: {e}", path.display())));
    }
    let engine = engine.ok_or_else(|| CliError::Input("missing engine name or --spec".into()))?;
    let range = range
        .map(|r| r.parse::<GridRange>())
        .transpose()
        .map_err(|e| CliError::Input(format!("invalid --range: {e}")))?;
    let params = serde_json::from_str(params)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    Ok(Seed {
        engine,
        width,
        height,
        range,
        params,
        seed,
    })
}

fn write_spec(seed: &Seed, path: &Path) -> Result<(), CliError> {
    std::fs::write(path, serde_json::to_string_pretty(seed)?)?;
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let engines = EngineKind::list_engines();
            let presets = Resolution::presets();
            if cli.json {
                let mut schemas = serde_json::Map::new();
                for &name in engines {
                    let engine = EngineKind::from_name(name, 16, 9, None, 0, &serde_json::json!({}))?;
                    schemas.insert(name.to_string(), engine.param_schema());
                }
                let info = serde_json::json!({
                    "engines": schemas,
                    "resolutions": presets,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Engines:");
                for name in engines {
                    println!("  {name}");
                }
                println!("Resolutions:");
                for r in &presets {
                    println!("  {:>5} x {:<5} {}", r.width, r.height, r.description);
                }
            }
        }
        Command::Render {
            engine,
            width,
            height,
            range,
            params,
            seed,
            spec,
            save_spec,
            output,
        } => {
            let mut seed = seed_from_args(engine, width, height, range, &params, seed, spec)?;
            tracing::debug!(?seed, "render requested");
            let eng = EngineKind::from_seed(&seed)?;
            let scheme = eng.color_scheme();
            seed.params = eng.params();
            let grid = eng.grid().to_string();

            let calculation = spawn_calculation(&seed.engine, move |progress| eng.compute(progress))?;
            let show_progress = !cli.json;
            let field = calculation.wait(|percent| {
                if show_progress {
                    eprint!("\r{percent:>3}%");
                    let _ = std::io::stderr().flush();
                }
            })?;
            if show_progress {
                eprintln!("\r100%");
            }

            plane_engine_engines::snapshot::write_png(&field, &scheme, &output)?;
            if let Some(path) = &save_spec {
                write_spec(&seed, path)?;
            }

            if cli.json {
                let info = serde_json::json!({
                    "seed": seed,
                    "grid": grid,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} ({grid}, seed {}) -> {}",
                    seed.engine,
                    seed.seed,
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_build_a_seed() {
        let seed = seed_from_args(
            Some("weather".into()),
            64,
            32,
            Some("-90_90_10".into()),
            r#"{"coriolis_force": 2}"#,
            5,
            None,
        )
        .unwrap();
        assert_eq!(seed.engine, "weather");
        assert_eq!(seed.range, Some(GridRange::new(-90.0, 90.0, 10.0).unwrap()));
        assert_eq!(seed.params, json!({"coriolis_force": 2}));
        assert_eq!((seed.width, seed.height, seed.seed), (64, 32, 5));
    }

    #[test]
    fn bad_inputs_are_input_errors() {
        let bad_range = seed_from_args(Some("noise".into()), 8, 8, Some("2_1_0".into()), "{}", 1, None);
        assert_eq!(bad_range.err().map(|e| e.exit_code()), Some(12));
        let bad_json = seed_from_args(Some("noise".into()), 8, 8, None, "{oops", 1, None);
        assert_eq!(bad_json.err().map(|e| e.exit_code()), Some(12));
        let no_engine = seed_from_args(None, 8, 8, None, "{}", 1, None);
        assert_eq!(no_engine.err().map(|e| e.exit_code()), Some(12));
    }

    #[test]
    fn spec_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.json");
        let mut seed = Seed::new("charges", 20, 10, 3);
        seed.params = json!({"lic_length": 4});
        write_spec(&seed, &path).unwrap();
        let loaded = seed_from_args(None, 1, 1, None, "{}", 0, Some(path)).unwrap();
        assert_eq!(loaded, seed);

        let missing = seed_from_args(None, 1, 1, None, "{}", 0, Some(dir.path().join("none.json")));
        assert_eq!(missing.err().map(|e| e.exit_code()), Some(11));
    }

    #[test]
    fn render_writes_png_and_spec() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("noise.png");
        let spec = dir.path().join("noise.json");
        let cli = Cli::parse_from([
            "plane-engine",
            "--json",
            "render",
            "noise",
            "-W",
            "12",
            "-H",
            "8",
            "--params",
            r#"{"noise": "white"}"#,
            "--save-spec",
            spec.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ]);
        assert!(run(cli).is_ok());
        assert!(output.exists());
        let saved: Seed = serde_json::from_str(&std::fs::read_to_string(&spec).unwrap()).unwrap();
        assert_eq!(saved.engine, "noise");
        assert_eq!(saved.params["noise"], "white");
    }

    #[test]
    fn unknown_engine_exits_with_engine_code() {
        let cli = Cli::parse_from(["plane-engine", "render", "lorenz", "-W", "4", "-H", "4"]);
        assert_eq!(run(cli).err().map(|e| e.exit_code()), Some(10));
    }
}
