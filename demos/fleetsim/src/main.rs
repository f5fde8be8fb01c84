//! fleetsim: headless multi-robot traffic run over a JSON navigation graph.
//!
//! Spawns robots on random free vertices, keeps every idle robot busy with a
//! random reachable target, and optionally records every transition to CSV.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use fleet_core::{SimClock, Tick};
use fleet_graph::{load_graph, BfsRouter, Viewport};
use fleet_output::{CsvEventWriter, EventLogObserver};
use fleet_robot::TransitionEvent;
use fleet_sim::{FleetBuilder, FleetConfig, FleetObserver, RandomDispatcher, TickSummary};
use fleet_traffic::Conflict;

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "fleetsim", version, about = "Multi-robot fleet traffic simulator")]
struct Args {
    /// Navigation graph definition (JSON).
    #[arg(long, default_value = "data/nav_graph.json")]
    nav_graph: PathBuf,

    /// Log file, written alongside stderr.
    #[arg(long, default_value = "logs/fleet.log")]
    log_file: PathBuf,

    /// Directory for events.csv and tick_summaries.csv.  No event log if unset.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Fleet configuration (JSON).  Defaults apply to missing fields.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 4)]
    robots: usize,

    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Simulated seconds per tick.
    #[arg(long, default_value_t = 0.1)]
    dt: f64,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Viewport size used for the screen coordinates in the final table.
    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Raise the default log level to debug.
    #[arg(long)]
    debug: bool,
}

const VIEW_MARGIN: u32 = 50;

// ── Logging ───────────────────────────────────────────────────────────────────

fn init_logging(log_file: &Path, debug: bool) -> Result<()> {
    if let Some(dir) = log_file.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = File::create(log_file).with_context(|| format!("creating {}", log_file.display()))?;

    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .init();
    Ok(())
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Counts what the run produced and forwards to the CSV log, if any.
#[derive(Default)]
struct RunObserver {
    log:         Option<EventLogObserver<CsvEventWriter>>,
    transitions: usize,
    conflicts:   usize,
    summaries:   usize,
    peak_wait:   usize,
}

impl FleetObserver for RunObserver {
    fn on_tick_start(&mut self, clock: &SimClock) {
        if let Some(log) = self.log.as_mut() {
            log.on_tick_start(clock);
        }
    }

    fn on_transition(&mut self, event: &TransitionEvent) {
        self.transitions += 1;
        if let Some(log) = self.log.as_mut() {
            log.on_transition(event);
        }
    }

    fn on_conflicts(&mut self, tick: Tick, conflicts: &[Conflict]) {
        self.conflicts += conflicts.len();
        if let Some(log) = self.log.as_mut() {
            log.on_conflicts(tick, conflicts);
        }
    }

    fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
        self.summaries += 1;
        self.peak_wait = self.peak_wait.max(summary.waiting);
        if let Some(log) = self.log.as_mut() {
            log.on_tick_end(tick, summary);
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<FleetConfig> {
    let Some(path) = path else {
        return Ok(FleetConfig::default());
    };
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(file).with_context(|| format!("parsing {}", path.display()))
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(&args.log_file, args.debug)?;

    println!("=== fleetsim ===");
    println!(
        "Robots: {}  |  Ticks: {} × {} s  |  Seed: {}",
        args.robots, args.ticks, args.dt, args.seed
    );
    println!();

    // 1. Load the navigation graph.
    let graph = match load_graph(&args.nav_graph) {
        Ok(g) => g,
        Err(e) => {
            error!(path = %args.nav_graph.display(), error = %e, "failed to load navigation graph");
            eprintln!("failed to load {}: {e}", args.nav_graph.display());
            return Ok(ExitCode::from(1));
        }
    };
    println!(
        "Navigation graph: {} vertices, {} lanes, {} chargers",
        graph.vertex_count(),
        graph.lane_count(),
        graph.chargers().len()
    );

    // 2. Fit the viewport.
    let viewport = graph
        .bounds()
        .map(|b| Viewport::fit(b, args.width, args.height, VIEW_MARGIN))
        .context("navigation graph has no vertices")?;
    println!("Viewport: {}×{} px, {:.2} px/unit", args.width, args.height, viewport.scale());

    // 3. Fleet configuration.
    let config = load_config(args.config.as_deref())?;
    println!(
        "Fleet: speed {} lane/tick, wait timeout {} s, safety gap {} s",
        config.robot_speed, config.wait_timeout_secs, config.traffic.safety_gap_secs
    );
    println!();

    // 4. Event log.
    let log = match &args.output_dir {
        Some(dir) => Some(EventLogObserver::new(CsvEventWriter::new(dir)?)),
        None => None,
    };
    let observer = RunObserver { log, ..RunObserver::default() };

    // 5. Build the fleet and place robots.
    let mut fleet = FleetBuilder::new(graph, BfsRouter).config(config).observer(observer).build()?;
    let mut dispatcher = RandomDispatcher::new(args.seed);
    let spawned = dispatcher.scatter(&mut fleet, args.robots)?;
    if spawned.len() < args.robots {
        info!(requested = args.robots, spawned = spawned.len(), "graph too small for every robot");
    }

    // 6. Run.
    let t0 = Instant::now();
    let mut assigned = 0;
    for _ in 0..args.ticks {
        assigned += dispatcher.dispatch(&mut fleet).len();
        fleet.tick(args.dt);
    }
    let elapsed = t0.elapsed();

    // 7. Summary.
    let summary = fleet.summary();
    let clock = fleet.clock();
    println!("Run complete in {:.3} s ({} simulated)", elapsed.as_secs_f64(), clock.now);
    println!("  tasks assigned  : {assigned}");
    println!("  transitions     : {}", fleet.observer().transitions);
    println!("  peak waiting    : {}", fleet.observer().peak_wait);
    println!("  audit conflicts : {}", fleet.observer().conflicts);
    println!(
        "  final states    : {} moving, {} waiting, {} idle, {} complete, {} charging",
        summary.moving, summary.waiting, summary.idle, summary.complete, summary.charging
    );
    println!();

    // 8. Final robot table.
    println!("{:<6} {:<16} {:<14} {:<8} {:<12}", "Robot", "State", "Vertex", "Target", "Screen");
    println!("{}", "-".repeat(60));
    for status in fleet.statuses() {
        let vertex = fleet
            .graph()
            .vertex(status.vertex)
            .map_or_else(|| status.vertex.to_string(), |v| v.name.clone());
        let target = status.target.map_or_else(|| "-".to_owned(), |t| t.to_string());
        let (sx, sy) = viewport.to_screen(status.position);
        println!(
            "{:<6} {:<16} {:<14} {:<8} ({sx}, {sy})",
            status.agent.to_string(),
            status.label,
            vertex,
            target
        );
    }

    // 9. Flush the event log.
    let observer = fleet.into_observer();
    if let Some(mut log) = observer.log {
        let rows = log.rows_written();
        log.finish().context("writing event log")?;
        if let Some(dir) = &args.output_dir {
            println!();
            println!("Event log: {rows} rows in {}", dir.display());
        }
    }

    info!(ticks = args.ticks, "shutdown");
    Ok(ExitCode::SUCCESS)
}
