//! Fauna Simulation Runner
//!
//! Headless tick loop: loads a config, populates the grid and runs the
//! animals, writing events as JSONL and printing periodic summaries.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use fauna_core::config::{default_config_toml, FaunaConfig};
use fauna_core::events::EventLogger;
use fauna_core::interventions::{remove_applied_files, scan_interventions, PendingInterventions};
use fauna_core::output::{self, SnapshotGenerator, StatsCollector};
use fauna_core::{build_schedule, create_world, step, GridWorld, SimClock};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "fauna_sim")]
#[command(about = "A tile-grid animal simulation")]
struct Args {
    /// Path to a TOML config (built-in default when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate (overrides the config)
    #[arg(long)]
    ticks: Option<u64>,

    /// Write every event to this JSONL file
    #[arg(long)]
    events: Option<PathBuf>,

    /// Ticks between population summaries (overrides the config)
    #[arg(long)]
    summary_interval: Option<u64>,

    /// Ticks between snapshot files, 0 to disable
    #[arg(long, default_value_t = 0)]
    snapshot_interval: u64,

    /// Directory for snapshot files
    #[arg(long, default_value = "output/snapshots")]
    snapshot_dir: PathBuf,

    /// Write run statistics to this JSON file
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Watch this directory for intervention files
    #[arg(long)]
    interventions: Option<PathBuf>,

    /// Print the default config and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    if args.print_default_config {
        print!("{}", default_config_toml());
        return;
    }

    let loaded = match &args.config {
        Some(path) => FaunaConfig::from_file(path),
        None => FaunaConfig::default_config(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(ticks) = args.ticks {
        config.simulation.ticks = ticks;
    }
    if let Some(interval) = args.summary_interval {
        config.simulation.summary_interval = interval;
    }
    let sim = config.simulation.clone();

    println!("Fauna Simulation");
    println!("================");
    println!("Seed: {}", sim.seed);
    println!("Ticks: {}", sim.ticks);
    println!("Grid: {}x{}", sim.grid_width, sim.grid_height);
    println!("Summary interval: {}", sim.summary_interval);
    println!();

    println!("Populating world...");
    let mut world = match create_world(&config) {
        Ok(world) => world,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let logger = match &args.events {
        Some(path) => match EventLogger::new(path) {
            Ok(logger) => {
                println!("  Logging events to {}", path.display());
                logger
            }
            Err(e) => {
                eprintln!("  Warning: Could not open event log {}: {}", path.display(), e);
                EventLogger::null()
            }
        },
        None => EventLogger::null(),
    };
    world.insert_resource(logger);
    world.insert_resource(StatsCollector::new());
    world.insert_resource(SnapshotGenerator::new(args.snapshot_interval));
    world.insert_resource(PendingInterventions::new());

    let initial = output::take_snapshot(&mut world);
    println!("  Spawned {} animals", initial.animals.len());
    for (species, count) in initial.species_counts() {
        println!("    {}: {}", species, count);
    }
    println!("  Placed {} food items", initial.food_remaining);

    let mut schedule = build_schedule();

    println!();
    println!("Starting simulation...");
    println!();

    let mut ran = 0;
    for _ in 0..sim.ticks {
        if let Some(dir) = &args.interventions {
            let mut pending = world.resource_mut::<PendingInterventions>();
            scan_interventions(dir, &mut pending);
        }

        let events = step(&mut world, &mut schedule);
        let tick = world.resource::<SimClock>().tick;
        ran = tick;

        remove_applied_files(&mut world.resource_mut::<PendingInterventions>());
        if let Err(e) = world.resource_mut::<EventLogger>().log_batch(&events) {
            eprintln!("Warning: Could not log events at tick {}: {}", tick, e);
        }
        world.resource_mut::<StatsCollector>().record_tick(tick, &events);

        let should_snapshot = world.resource::<SnapshotGenerator>().should_snapshot(tick);
        if should_snapshot {
            let snapshot = output::take_snapshot(&mut world);
            if let Err(e) = output::write_snapshot_to_dir(&snapshot, &args.snapshot_dir) {
                eprintln!("Warning: Could not write snapshot at tick {}: {}", tick, e);
            }
            world.resource_mut::<SnapshotGenerator>().mark_snapshot(tick);
        }

        let summary_due = sim.summary_interval > 0 && tick % sim.summary_interval == 0;
        if summary_due {
            let snapshot = output::generate_snapshot(&mut world, "summary");
            println!(
                "[Tick {:>5}] {} animals ({} starving) | food {} | droppings {} | {} events",
                tick,
                snapshot.alive_count(),
                snapshot.starving_count(),
                snapshot.food_remaining,
                snapshot.droppings,
                events.len()
            );
        }

        if world.resource::<GridWorld>().agent_count() == 0 {
            println!();
            println!("No animals left at tick {}.", tick);
            break;
        }
    }

    if let Err(e) = world.resource_mut::<EventLogger>().flush() {
        eprintln!("Warning: Could not flush event log: {}", e);
    }
    let logged = world.resource::<EventLogger>().event_count();

    let stats = world.resource::<StatsCollector>().generate_stats(ran);
    if let Some(path) = &args.stats {
        if let Err(e) = output::write_stats(&stats, path) {
            eprintln!("Warning: Could not write stats: {}", e);
        }
    }

    let last = output::generate_snapshot(&mut world, "final");
    println!();
    println!("Simulation complete. Ran {} ticks.", ran);
    println!(
        "{} events, {} animals alive, {} food left.",
        logged,
        last.alive_count(),
        last.food_remaining
    );
    for (species, species_stats) in &stats.species {
        println!(
            "  {}: {} meals, {} droppings, {} deaths",
            species, species_stats.meals, species_stats.droppings, species_stats.deaths
        );
    }
}
