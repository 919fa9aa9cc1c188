//! Firewood Allocator - Command Line Interface
//!
//! Greedy location-allocation of municipal firewood supply, industrial demand first.

use clap::{Parser, Subcommand};
use firewood_allocator::allocator::{AllocationConfig, AllocationHeuristic, GreedyAllocator};
use firewood_allocator::error::Result;
use firewood_allocator::instance::{AllocationInstance, DemandType};
use firewood_allocator::output::{export_allocation_csv, export_summary_json};

use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "firewood-allocator")]
#[command(version = "1.0")]
#[command(about = "Firewood location-allocation over a road-network OD matrix (industrial priority)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Allocate supply to demand and write the allocation table
    Allocate {
        /// Path to the demand/supply CSV
        #[arg(long)]
        demand_supply: PathBuf,

        /// Path to the OD matrix CSV
        #[arg(long)]
        od: PathBuf,

        /// Output CSV path
        #[arg(short, long, default_value = "firewood_allocation_result.csv")]
        out: PathBuf,

        /// Maximum distance (km) for an allocation
        #[arg(long, default_value = "50", conflicts_with = "no_cutoff")]
        cutoff_km: f64,

        /// Allow allocations at any distance
        #[arg(long)]
        no_cutoff: bool,

        /// Also write the summary as JSON
        #[arg(long)]
        summary_json: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print statistics about the input tables
    Analyze {
        /// Path to the demand/supply CSV
        #[arg(long)]
        demand_supply: PathBuf,

        /// Path to the OD matrix CSV
        #[arg(long)]
        od: PathBuf,

        /// Distance cutoff (km) to count eligible pairs against
        #[arg(long)]
        cutoff_km: Option<f64>,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Allocate { demand_supply, od, out, cutoff_km, no_cutoff, summary_json, verbose } => {
            let cutoff_km = if no_cutoff { None } else { Some(cutoff_km) };
            allocate(&demand_supply, &od, &out, cutoff_km, summary_json, verbose)
        }

        Commands::Analyze { demand_supply, od, cutoff_km } => {
            analyze(&demand_supply, &od, cutoff_km)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn allocate(
    demand_supply: &Path,
    od: &Path,
    out: &Path,
    cutoff_km: Option<f64>,
    summary_json: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let config = AllocationConfig::with_cutoff(cutoff_km);
    config.validate()?;

    println!("Loading {:?} and {:?}...", demand_supply, od);
    let instance = AllocationInstance::from_files(demand_supply, od)?;

    if verbose {
        println!("{}", instance.statistics(cutoff_km));
    }

    let start = Instant::now();
    let allocator = GreedyAllocator::new(config);
    let allocation = allocator.allocate(&instance)?;
    let elapsed = start.elapsed();

    export_allocation_csv(out, &allocation.records)?;

    let summary = allocation.summary();
    println!("\n========== Allocation ==========");
    println!("Algorithm: {}", allocation.algorithm);
    match cutoff_km {
        Some(c) => println!("Cutoff: {:.2} km", c),
        None => println!("Cutoff: none"),
    }
    println!("Ranked OD pairs: {}", allocation.ranked_pairs);
    println!("Time: {:.4}s\n", elapsed.as_secs_f64());
    print!("{}", summary);

    if verbose {
        for demand_type in DemandType::ALL {
            println!("\n{} allocations:", demand_type);
            for record in allocation.records_of(demand_type) {
                println!(
                    "  {} -> {}: {:.2} m³ over {:.2} km",
                    record.origin, record.destination, record.allocated_volume, record.distance_km
                );
            }
        }
        for demand_type in DemandType::ALL {
            let unmet = allocation.unmet_demand(demand_type);
            let total: f64 = unmet.iter().map(|(_, v)| v).sum();
            println!("\nUnmet {} demand: {:.2} m³ in {} municipalities", demand_type, total, unmet.len());
            for (name, volume) in &unmet {
                println!("  {}: {:.2}", name, volume);
            }
        }
        let unused = allocation.unused_supply();
        let total: f64 = unused.iter().map(|(_, v)| v).sum();
        println!("\nUnused supply: {:.2} m³ in {} municipalities", total, unused.len());
        for (name, volume) in &unused {
            println!("  {}: {:.2}", name, volume);
        }
    }

    let resolved = std::fs::canonicalize(out).unwrap_or_else(|_| out.to_path_buf());
    println!("\nSaved results to {:?}", resolved);

    if let Some(json_path) = summary_json {
        export_summary_json(&json_path, &summary)?;
        println!("Summary saved to {:?}", json_path);
    }

    Ok(())
}

fn analyze(demand_supply: &Path, od: &Path, cutoff_km: Option<f64>) -> Result<()> {
    AllocationConfig::with_cutoff(cutoff_km).validate()?;

    let instance = AllocationInstance::from_files(demand_supply, od)?;
    let stats = instance.statistics(cutoff_km);

    println!("========== Instance Analysis ==========\n");
    println!("{}", stats);
    for name in &stats.uncovered {
        println!("  {}", name);
    }

    let supply_gap = stats.total_supply - stats.total_industrial_demand - stats.total_residential_demand;
    println!("\nSupply minus total demand: {:.2} m³", supply_gap);

    Ok(())
}
