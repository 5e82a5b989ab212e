//! Benchmark CLI: evaluate every configured method against the structures and
//! plot mean precision (and optionally recall / mean error) per rank.

use anyhow::Context;
use clap::Parser;
use contactbench::{
    config::parse_constraint,
    eval::{mean_metric_per_rank, MeanRankCurves, Metric},
    init_logging,
    report::{precision_vs_rank_svg, rank_curves_svg, rank_label, write_html},
    Config,
};
use std::path::PathBuf;

/// Run the contact-prediction benchmark.
#[derive(Parser, Debug)]
#[command(name = "benchmark")]
struct Args {
    /// Configuration file (default: $CONTACTBENCH_CONFIG or ./contactbench.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory for plots and statistics (overrides benchmark.plot_dir)
    #[arg(long)]
    plot_dir: Option<PathBuf>,

    /// Minimal sequence separation |i - j|
    #[arg(long)]
    seqsep: Option<usize>,

    /// Contact distance threshold in Å
    #[arg(long)]
    contact_thr: Option<f64>,

    /// Non-contact distance threshold in Å
    #[arg(long)]
    noncontact_thr: Option<f64>,

    /// Extra metadata filter, key:operator:value (e.g. opt_code:greater_equal:0)
    #[arg(long = "filter")]
    filters: Vec<String>,

    /// Also plot mean recall and mean error per rank
    #[arg(long)]
    all_metrics: bool,

    /// Plot the precision difference between two methods (A - B)
    #[arg(long, num_args = 2, value_names = ["A", "B"])]
    difference: Option<Vec<String>>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    init_logging(&config.benchmark.log_level);

    let mut settings = config.settings();
    if let Some(seqsep) = args.seqsep {
        settings.sequence_separation = seqsep;
    }
    if let Some(thr) = args.contact_thr {
        settings.contact_threshold = thr;
    }
    if let Some(thr) = args.noncontact_thr {
        settings.noncontact_threshold = thr;
    }
    let plot_dir = args
        .plot_dir
        .clone()
        .unwrap_or_else(|| config.plot_dir().to_path_buf());

    let mut benchmark = config.build_benchmark()?;
    for filter in &args.filters {
        let c = parse_constraint(filter)?;
        log::info!("Filter: {} {} {}", c.key, c.comparison, c.threshold);
        benchmark.add_constraint(c.key, c.threshold, c.comparison);
    }

    let stats = benchmark
        .compute_evaluation_statistics(settings)
        .context("Benchmark evaluation failed")?;

    let json_path = plot_dir.join("evaluation_statistics.json");
    stats.write_json(&json_path)?;
    log::info!("Wrote statistics to {}", json_path.display());

    println!("\n=== Benchmark Results ===\n");
    println!(
        "Proteins evaluated: {}  skipped: {}",
        stats.proteins.len(),
        stats.skipped.len()
    );
    println!(
        "seqsep = {}, contact <= {} Å, non-contact > {} Å\n",
        stats.settings.sequence_separation,
        stats.settings.contact_threshold,
        stats.settings.noncontact_threshold
    );

    let precision = mean_metric_per_rank(stats, Metric::Precision);
    print_table(&precision);

    let filename = format!(
        "precision_vs_rank_seqsep{}_contacthr{}.html",
        stats.settings.sequence_separation, stats.settings.contact_threshold
    );
    if let Some(path) = benchmark.plot_precision_vs_rank(&plot_dir.join(filename))? {
        println!("\nPlot: {}", path.display());
    } else {
        println!("\nNo proteins passed the checks; no plot written.");
        return Ok(());
    }

    let Some(stats) = benchmark.statistics() else {
        return Ok(());
    };

    if args.all_metrics {
        for metric in [Metric::Recall, Metric::MeanError] {
            let curves = mean_metric_per_rank(stats, metric);
            let svg = precision_vs_rank_svg(&curves, "")?;
            let path = plot_dir.join(format!("{}_vs_rank.html", metric));
            write_html(&svg, metric.label(), &path)?;
            println!("Plot: {}", path.display());
        }
    }

    if let Some([a, b]) = args.difference.as_deref() {
        let diff = precision.difference(a, b)?;
        let svg = rank_curves_svg(
            "",
            &precision.ranks,
            &[(format!("{} - {}", a, b), diff)],
            "Difference in Mean Precision",
            None,
        )?;
        let path = plot_dir.join(format!("precision_difference_{}_{}.html", a, b));
        write_html(&svg, "Precision difference", &path)?;
        println!("Plot: {}", path.display());
    }

    Ok(())
}

/// Mean precision at a few rank fractions, one row per method
fn print_table(curves: &MeanRankCurves) {
    let columns: Vec<usize> = curves
        .ranks
        .iter()
        .enumerate()
        .filter(|&(_, &r)| ["0.1", "0.2", "0.5", "1.0"].contains(&rank_label(r).as_str()))
        .map(|(pos, _)| pos)
        .collect();

    print!("{:<20}", "Method");
    for &pos in &columns {
        print!(" {:>10}", format!("L*{}", rank_label(curves.ranks[pos])));
    }
    println!();
    println!("{:-<64}", "");
    for (name, values) in &curves.methods {
        print!("{:<20}", name);
        for &pos in &columns {
            print!(" {:>10.3}", values[pos]);
        }
        println!();
    }
    println!("{:-<64}", "");
}
