//! SmoothLife CLI - Run simulations from JSON configuration.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use smoothlife::{
    compute::{FieldStats, GameOfLife, SmoothLife},
    schema::{Seed, SimulationConfig},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [steps] [--discrete]", args[0]);
        eprintln!();
        eprintln!("Run SmoothLife simulation from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to simulation configuration file");
        eprintln!("  steps        Number of simulation steps (default: 100)");
        eprintln!("  --discrete   Run the discrete Game of Life instead");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let steps: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);
    let discrete = args.iter().any(|a| a == "--discrete");

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: SimulationConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    // Load seed if one sits next to the config
    let seed_path = config_path.with_extension("seed.json");
    let seed: Option<Seed> = if seed_path.exists() {
        let seed_str = fs::read_to_string(&seed_path).unwrap_or_else(|e| {
            eprintln!("Error reading seed file: {}", e);
            std::process::exit(1);
        });
        Some(serde_json::from_str(&seed_str).unwrap_or_else(|e| {
            eprintln!("Error parsing seed: {}", e);
            std::process::exit(1);
        }))
    } else {
        None
    };

    println!("SmoothLife Simulation");
    println!("=====================");
    println!("Grid: {}x{}", config.width, config.height);
    println!(
        "Radii: inner={}, outer={}",
        config.inner_radius, config.outer_radius
    );
    println!("dt: {}", config.dt);
    println!("Mode: {}", if discrete { "discrete" } else { "smooth" });
    println!("Steps: {}", steps);
    println!();

    if discrete {
        run_discrete(&config, seed.as_ref(), steps);
    } else {
        run_smooth(config, seed.as_ref(), steps);
    }
}

fn run_smooth(config: SimulationConfig, seed: Option<&Seed>, steps: u64) {
    let mut life = SmoothLife::new(config).unwrap_or_else(|e| {
        eprintln!("Error creating simulation: {}", e);
        std::process::exit(1);
    });
    match seed {
        Some(seed) => life.restart_with(seed),
        None => life.restart(true),
    }

    print_stats("Initial state", &life.stats());
    println!();

    println!("Running simulation...");
    let start = Instant::now();

    for i in 0..steps {
        life.step();

        // Print progress every 10%
        if (i + 1) % (steps / 10).max(1) == 0 {
            let stats = life.stats();
            let elapsed = start.elapsed().as_secs_f32();
            println!(
                "  Step {}/{}: mass={:.4}, live={:.1}%, {:.1} steps/s",
                i + 1,
                steps,
                stats.mass,
                stats.live_fraction * 100.0,
                (i + 1) as f32 / elapsed
            );
        }
    }

    let elapsed = start.elapsed();
    println!();
    print_stats("Final state", &life.stats());
    println!(
        "Time: {:.2}s ({:.1} steps/s)",
        elapsed.as_secs_f32(),
        steps as f32 / elapsed.as_secs_f32()
    );
}

fn run_discrete(config: &SimulationConfig, seed: Option<&Seed>, steps: u64) {
    let mut life = match seed {
        Some(seed) => GameOfLife::from_field(seed.generate(config.height, config.width)),
        None => GameOfLife::new(config.height, config.width),
    };

    print_stats("Initial state", &FieldStats::from_field(life.current_field()));
    println!();

    println!("Running simulation...");
    let start = Instant::now();
    for _ in 0..steps {
        life.step();
    }
    let elapsed = start.elapsed();

    println!();
    print_stats("Final state", &FieldStats::from_field(life.current_field()));
    println!(
        "Time: {:.2}s ({:.1} steps/s)",
        elapsed.as_secs_f32(),
        steps as f32 / elapsed.as_secs_f32()
    );
}

fn print_stats(label: &str, stats: &FieldStats) {
    println!("{}:", label);
    println!("  Total mass: {:.4}", stats.mass);
    println!("  Live fraction: {:.2}%", stats.live_fraction * 100.0);
    println!(
        "  Value range: [{:.4}, {:.4}]",
        stats.min_value, stats.max_value
    );
}

fn print_example_config() {
    let config = SimulationConfig::default();
    let seed = Seed::default();

    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
    println!();
    println!("Example seed (config.seed.json):");
    println!("{}", serde_json::to_string_pretty(&seed).unwrap());
}
