use clap::{Parser, Subcommand};
use eta_project::{LoadedScenario, ProjectResult, ValidationError, load_run, load_tables};
use eta_sim::{RunSummary, SimulationResult, SolverStats, simulate, simulate_batch};
use eta_tables::LookupTable;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "eta")]
#[command(about = "Eta-One hybrid race-vehicle simulator", long_about = None)]
struct Cli {
    /// Log controller transitions (motor mode, phases, forced braking)
    #[arg(long, global = true)]
    diagnostics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a scenario and its table file
    Validate {
        /// Path to the scenario file (YAML or JSON)
        scenario: PathBuf,
    },
    /// Run one scenario
    Run {
        /// Path to the scenario file (YAML or JSON)
        scenario: PathBuf,
        /// Write the full result record as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run several scenarios sharing one table file in parallel
    Batch {
        /// Scenario files; all must reference the same table file
        #[arg(required = true)]
        scenarios: Vec<PathBuf>,
        /// Directory receiving one `<scenario>.json` result per run
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Describe a table file
    Tables {
        /// Path to the table file (YAML or JSON)
        tables: PathBuf,
    },
}

fn main() -> ProjectResult<()> {
    let cli = Cli::parse();

    let default_level = if cli.diagnostics { "eta_sim=debug,info" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Commands::Validate { scenario } => cmd_validate(&scenario),
        Commands::Run { scenario, output } => {
            cmd_run(&scenario, output.as_deref(), cli.diagnostics)
        }
        Commands::Batch {
            scenarios,
            output_dir,
        } => cmd_batch(&scenarios, output_dir.as_deref(), cli.diagnostics),
        Commands::Tables { tables } => cmd_tables(&tables),
    }
}

fn cmd_validate(scenario_path: &Path) -> ProjectResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let loaded = load_run(scenario_path)?;
    let s = &loaded.scenario;
    println!("✓ Scenario is valid: {}", s.name);
    println!("  Distance:   {:.1} m", s.distance_m);
    println!("  Time limit: {:.1} s", s.time_limit_s);
    println!("  Phases:     {}", s.phases.len());
    println!("  Tables:     {}", loaded.tables_path.display());
    Ok(())
}

fn cmd_run(scenario_path: &Path, output: Option<&Path>, diagnostics: bool) -> ProjectResult<()> {
    let mut loaded = load_run(scenario_path)?;
    loaded.request.diagnostics |= diagnostics;
    println!("Running scenario: {}", loaded.scenario.name);

    let start = Instant::now();
    let result = simulate(&loaded.request, &loaded.tables)?;
    let elapsed = start.elapsed().as_secs_f64();

    print_summary(&result.summary, &result.stats, elapsed);
    if let Some(path) = output {
        write_result(path, &result)?;
        println!("✓ Result written to {}", path.display());
    }
    Ok(())
}

fn cmd_batch(paths: &[PathBuf], output_dir: Option<&Path>, diagnostics: bool) -> ProjectResult<()> {
    let loaded: Vec<LoadedScenario> = paths
        .iter()
        .map(|p| load_run(p))
        .collect::<ProjectResult<_>>()?;
    let Some(first) = loaded.first() else {
        return Ok(());
    };
    let tables_path = first.tables_path.clone();
    if let Some(other) = loaded.iter().find(|l| l.tables_path != tables_path) {
        return Err(ValidationError::InvalidValue {
            field: "tables".to_string(),
            value: other.tables_path.display().to_string(),
            reason: format!("batch runs share {}", tables_path.display()),
        }
        .into());
    }
    let requests: Vec<_> = loaded
        .iter()
        .map(|l| {
            let mut request = l.request.clone();
            request.diagnostics |= diagnostics;
            request
        })
        .collect();

    info!(runs = requests.len(), tables = %tables_path.display(), "starting batch");
    let start = Instant::now();
    let results = simulate_batch(&requests, &first.tables);
    let elapsed = start.elapsed().as_secs_f64();

    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)?;
    }
    println!(
        "{:<32} {:>9} {:>9} {:>10} {:>9}",
        "scenario", "time (s)", "dist (m)", "fuel (ml)", "km/l"
    );
    for ((path, l), result) in paths.iter().zip(&loaded).zip(results) {
        match result {
            Ok(r) => {
                let s = &r.summary;
                println!(
                    "{:<32} {:>9.2} {:>9.1} {:>10.3} {:>9}",
                    l.scenario.name,
                    s.total_time_s,
                    s.total_distance_m,
                    s.total_fuel_ml,
                    format_efficiency(s.km_per_litre),
                );
                if let Some(dir) = output_dir {
                    let stem = path.file_stem().unwrap_or(path.as_os_str());
                    write_result(&dir.join(stem).with_extension("json"), &r)?;
                }
            }
            Err(e) => println!("{:<32} failed: {}", l.scenario.name, e),
        }
    }
    println!("\nBatch wall time: {:.3}s", elapsed);
    Ok(())
}

fn cmd_tables(path: &Path) -> ProjectResult<()> {
    let bundle = load_tables(path)?;
    println!("Tables: {}", path.display());
    describe("Thermal torque (N·m)", &bundle.thermal_torque);
    describe("Specific consumption (g/kWh)", &bundle.thermal_csp);
    describe("Electric torque (N·m)", &bundle.electric_torque);
    describe("CVT ratio", &bundle.cvt_ratio);
    describe("Drag coefficient", &bundle.drag_coefficient);

    let track = &bundle.track;
    let length = track.length();
    println!(
        "  {:<30} {:>8.1} m, elevation {:.1} -> {:.1} m",
        "Track",
        length,
        track.elevation(0.0),
        track.elevation(length)
    );
    Ok(())
}

fn describe(label: &str, table: &LookupTable) {
    let (lo, hi) = table.domain();
    let y = table.y();
    let y_min = y.iter().copied().fold(f64::INFINITY, f64::min);
    let y_max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    println!(
        "  {:<30} {:>3} samples, x in [{}, {}], y in [{:.3}, {:.3}]",
        label,
        table.len(),
        lo,
        hi,
        y_min,
        y_max
    );
}

fn print_summary(s: &RunSummary, stats: &SolverStats, wall_s: f64) {
    if s.reached_finish {
        println!("✓ Finish reached");
    } else {
        println!(
            "✗ Time limit reached at {:.1} of {:.1} m",
            s.total_distance_m, s.target_distance_m
        );
    }
    println!("\nRun summary:");
    println!("  Time:             {:.2} s", s.total_time_s);
    println!("  Distance:         {:.1} m", s.total_distance_m);
    println!(
        "  Mean speed:       {:.2} m/s ({:.1} km/h)",
        s.mean_speed_mps, s.mean_speed_kmh
    );
    println!("  Phases completed: {}", s.phases_completed);
    println!(
        "  Fuel:             {:.3} g ethanol ({:.3} ml)",
        s.fuel_g, s.ethanol_ml
    );
    println!("  Thermal equiv.:   {:.3} ml", s.thermal_fuel_ml);
    println!(
        "  Electrical:       {:.1} J ({:.3} ml equiv.)",
        s.electrical_energy_j, s.electric_fuel_ml
    );
    println!("  Total equiv.:     {:.3} ml", s.total_fuel_ml);
    println!("  Efficiency:       {} km/l", format_efficiency(s.km_per_litre));
    println!("  Stored energy:    {:.1} J", s.final_stored_energy_j);

    println!("\nSolver:");
    println!("  RHS evaluations:  {}", stats.rhs_evals);
    println!("  Accepted steps:   {}", stats.accepted_steps);
    println!("  Rejected steps:   {}", stats.rejected_steps);
    println!("  Wall time:        {:.3} s", wall_s);
}

fn format_efficiency(km_per_litre: Option<f64>) -> String {
    km_per_litre.map_or_else(|| "-".to_string(), |k| format!("{k:.1}"))
}

fn write_result(path: &Path, result: &SimulationResult) -> ProjectResult<()> {
    let content = serde_json::to_string_pretty(result)?;
    std::fs::write(path, content)?;
    Ok(())
}
