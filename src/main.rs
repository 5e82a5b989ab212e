use anyhow::Result;
use clap::Parser;
use contactbench::{init_logging, Benchmark, Config};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Check the benchmark configuration and the inputs it points at.
#[derive(Parser, Debug)]
#[command(name = "contactbench", version)]
struct Args {
    /// Configuration file (default: $CONTACTBENCH_CONFIG or ./contactbench.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    init_logging(&config.benchmark.log_level);

    let benchmark = config.build_benchmark()?;
    run_verification(&benchmark);
    Ok(())
}

/// Print what was discovered and warn about coverage gaps
fn run_verification(benchmark: &Benchmark) {
    let structures: BTreeSet<&str> = benchmark
        .structures()
        .iter()
        .map(|s| s.protein.as_str())
        .collect();

    println!("\n=== Benchmark inputs ===\n");
    println!("Structures: {} in {}", structures.len(), benchmark.pdb_dir().display());
    println!("{:-<60}", "");
    println!("{:<24} {:>10} {:>12} {:>10}", "Method", "Files", "Structures", "Missing");
    println!("{:-<60}", "");

    let mut incomplete = BTreeSet::new();
    for method in benchmark.methods() {
        let covered = structures
            .iter()
            .filter(|p| method.score_files.contains_key(**p))
            .count();
        let missing = structures.len() - covered;
        println!(
            "{:<24} {:>10} {:>12} {:>10}",
            method.name,
            method.score_files.len(),
            covered,
            missing
        );
        for protein in &structures {
            if !method.score_files.contains_key(*protein) {
                log::warn!("Protein {} has no scores for method '{}'", protein, method.name);
                incomplete.insert(*protein);
            }
        }
    }
    println!("{:-<60}", "");

    for constraint in benchmark.constraints() {
        println!("Filter: {} {} {}", constraint.key, constraint.comparison, constraint.threshold);
    }

    println!(
        "\n{} of {} proteins are covered by every method.",
        structures.len() - incomplete.len(),
        structures.len()
    );
}
