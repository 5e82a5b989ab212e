//! Runtime CLI: distribution of the `runtime` metadata value (minutes) per method.

use clap::Parser;
use contactbench::{
    init_logging,
    io::{discover_score_files, read_metadata},
    report::{runtime_boxplot_svg, write_html},
    stats::BoxSummary,
    Config,
};
use std::path::PathBuf;

/// Summarize and plot the runtimes recorded in score-matrix metadata.
#[derive(Parser, Debug)]
#[command(name = "runtimes")]
struct Args {
    /// Configuration file (default: $CONTACTBENCH_CONFIG or ./contactbench.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory for the plot (overrides benchmark.plot_dir)
    #[arg(long)]
    plot_dir: Option<PathBuf>,

    /// Only these methods (default: all configured methods)
    #[arg(long = "method")]
    methods: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    init_logging(&config.benchmark.log_level);

    let selected: Vec<_> = config
        .methods
        .iter()
        .filter(|m| args.methods.is_empty() || args.methods.contains(&m.name))
        .collect();
    if selected.is_empty() {
        anyhow::bail!("No configured method matches {:?}", args.methods);
    }

    let mut groups = Vec::with_capacity(selected.len());
    for method in &selected {
        let files = discover_score_files(&method.dir, &method.filter)?;
        let mut runtimes = Vec::with_capacity(files.len());
        for (protein, path) in &files {
            let meta = read_metadata(path)?;
            match meta.find_f64("runtime") {
                Some(runtime) => runtimes.push(runtime),
                None => log::warn!("No runtime for protein {} of method '{}'", protein, method.name),
            }
        }
        log::info!("Method '{}': {} runtimes", method.name, runtimes.len());
        groups.push((method.name.clone(), runtimes));
    }

    println!("\n=== Runtime in minutes ===\n");
    println!("{:-<92}", "");
    println!(
        "{:<20} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Method", "Count", "Min", "Q1", "Median", "Q3", "Max", "Mean"
    );
    println!("{:-<92}", "");
    for (name, runtimes) in &groups {
        match BoxSummary::from_values(runtimes) {
            Ok(s) => println!(
                "{:<20} {:>6} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
                name, s.count, s.min, s.q1, s.median, s.q3, s.max, s.mean
            ),
            Err(_) => println!("{:<20} {:>6}", name, 0),
        }
    }
    println!("{:-<92}", "");

    let plot_dir = args
        .plot_dir
        .unwrap_or_else(|| config.plot_dir().to_path_buf());
    let names: Vec<&str> = groups.iter().map(|(name, _)| name.as_str()).collect();
    let path = plot_dir.join(format!("runtime_boxplot_{}.html", names.join("_")));
    write_html(&runtime_boxplot_svg(&groups)?, "Runtime", &path)?;
    println!("\nPlot: {}", path.display());

    Ok(())
}
