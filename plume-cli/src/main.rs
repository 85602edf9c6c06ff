mod scenario;

use anyhow::{Context, Result, bail};
use clap::Parser;
use plume_core::{Boundary, ModelParams, PollutantModel};
use scenario::{Flow, Scenario, ScenarioKind, build_flow};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

const HISTORY_FILE: &str = "history_mass.bin";
const FIELD_FILE: &str = "final_concentration.bin";
const META_FILE: &str = "meta.json";

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Output directory
    #[arg(long)]
    out: PathBuf,

    /// JSON file with model parameters; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width (cells along i)
    #[arg(long)]
    nx: Option<usize>,

    /// Grid height (cells along j)
    #[arg(long)]
    ny: Option<usize>,

    #[arg(long)]
    dx: Option<f64>,

    #[arg(long)]
    dy: Option<f64>,

    #[arg(long)]
    dt: Option<f64>,

    /// Diffusion coefficient D
    #[arg(long)]
    diffusion: Option<f64>,

    /// Decay rate lambda
    #[arg(long)]
    decay: Option<f64>,

    /// Boundary mode (open|periodic|reflective)
    #[arg(long)]
    boundary: Option<Boundary>,

    /// Velocity field installed before the first step
    #[arg(long, value_enum, default_value_t = Flow::Eddy)]
    flow: Flow,

    /// Background drift, x component
    #[arg(long, default_value_t = 0.8)]
    ux: f64,

    /// Background drift, y component
    #[arg(long, default_value_t = 0.0)]
    uy: f64,

    /// Release pattern
    #[arg(long, value_enum, default_value_t = ScenarioKind::Discharge)]
    scenario: ScenarioKind,

    /// Per-step probability of a new release (random-puffs only)
    #[arg(long, default_value_t = 0.05)]
    puff_rate: f64,

    /// RNG seed (random-puffs only)
    #[arg(long, default_value_t = 123)]
    seed: u64,

    /// Number of steps to run
    #[arg(long, default_value_t = 500)]
    steps: usize,

    /// Log a status line every N steps (0 disables)
    #[arg(long, default_value_t = 50)]
    report_every: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Serialize)]
struct RunMeta<'a> {
    params: &'a ModelParams,
    flow: &'static str,
    ux: f64,
    uy: f64,
    scenario: &'static str,
    seed: u64,
    puff_rate: f64,

    steps: usize,
    field_shape: [usize; 2],
    history_file: &'static str,
    field_file: &'static str,
    dtype: &'static str,

    final_mass: f64,
    max_concentration: f64,
    elapsed_ms: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&args.log_level))
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if !(0.0..=1.0).contains(&args.puff_rate) {
        bail!("puff_rate must be within [0, 1]");
    }

    let params = resolve_params(&args)?;
    info!(
        nx = params.nx,
        ny = params.ny,
        boundary = %params.boundary,
        flow = args.flow.as_str(),
        scenario = args.scenario.as_str(),
        steps = args.steps,
        "starting run"
    );

    let mut model = PollutantModel::new(params.clone()).context("building model")?;
    model.set_velocity(build_flow(args.flow, params.nx, params.ny, args.ux, args.uy))?;

    let mut scenario = Scenario::new(
        args.scenario,
        params.nx,
        params.ny,
        args.seed,
        args.puff_rate,
    );
    for (i, j, amount) in scenario.initial_releases() {
        model.add_source_point(i, j, amount);
    }
    debug!(kind = scenario.kind().as_str(), mass = model.total_mass(), "initial releases applied");

    let started = Instant::now();
    let mut history = Vec::with_capacity(args.steps);
    for t in 1..=args.steps {
        model.step_with(|| scenario.step_releases());
        let mass = model.total_mass();
        history.push(mass);

        if args.report_every > 0 && t % args.report_every == 0 {
            info!(t, total_mass = mass, max = model.max_concentration(), "status");
        }
    }
    let elapsed_ms = started.elapsed().as_secs_f64() * 1e3;

    fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;
    write_f64_file(&args.out.join(HISTORY_FILE), &history)?;
    write_f64_file(&args.out.join(FIELD_FILE), model.field())?;

    let meta = RunMeta {
        params: &params,
        flow: args.flow.as_str(),
        ux: args.ux,
        uy: args.uy,
        scenario: args.scenario.as_str(),
        seed: args.seed,
        puff_rate: args.puff_rate,

        steps: args.steps,
        field_shape: [params.nx, params.ny],
        history_file: HISTORY_FILE,
        field_file: FIELD_FILE,
        dtype: "<f8",

        final_mass: model.total_mass(),
        max_concentration: model.max_concentration(),
        elapsed_ms,
    };
    let mut meta_file = BufWriter::new(File::create(args.out.join(META_FILE))?);
    serde_json::to_writer_pretty(&mut meta_file, &meta)?;
    meta_file.write_all(b"\n")?;
    meta_file.flush()?;

    info!(out = %args.out.display(), elapsed_ms, "wrote {HISTORY_FILE}, {FIELD_FILE}, {META_FILE}");

    Ok(())
}

fn parse_level(s: &str) -> Level {
    match s.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Config file (or defaults) first, then individual flag overrides.
fn resolve_params(args: &Args) -> Result<ModelParams> {
    let mut p = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ModelParams::default(),
    };

    if let Some(v) = args.nx { p.nx = v; }
    if let Some(v) = args.ny { p.ny = v; }
    if let Some(v) = args.dx { p.dx = v; }
    if let Some(v) = args.dy { p.dy = v; }
    if let Some(v) = args.dt { p.dt = v; }
    if let Some(v) = args.diffusion { p.diffusion = v; }
    if let Some(v) = args.decay { p.decay = v; }
    if let Some(v) = args.boundary { p.boundary = v; }

    Ok(p)
}

fn write_f64_file(path: &Path, v: &[f64]) -> Result<()> {
    let mut w = BufWriter::new(
        File::create(path).with_context(|| format!("creating {}", path.display()))?,
    );
    write_f64_vec(&mut w, v)?;
    w.flush()?;
    Ok(())
}

fn write_f64_vec<W: Write>(w: &mut W, v: &[f64]) -> std::io::Result<()> {
    for &x in v {
        w.write_all(&x.to_le_bytes())?;
    }
    Ok(())
}
