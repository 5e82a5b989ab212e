//! Compare CLI: per-protein agreement between two methods' contact scores,
//! with a scatter page per protein and a box plot over proteins.

use anyhow::Context;
use clap::Parser;
use contactbench::{
    cache::MatrixCache,
    init_logging,
    io::discover_score_files,
    report::{score_scatter_svg, statistics_boxplot_svg, write_html},
    stats::{compare_scores, ScoreComparison},
    BenchError, Config,
};
use std::path::{Path, PathBuf};

/// Correlation statistics between the scores of two methods.
#[derive(Parser, Debug)]
#[command(name = "compare")]
struct Args {
    /// Configuration file (default: $CONTACTBENCH_CONFIG or ./contactbench.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory for the plots (overrides benchmark.plot_dir)
    #[arg(long)]
    plot_dir: Option<PathBuf>,

    /// Method A (overrides compare.method_a)
    #[arg(long)]
    method_a: Option<String>,

    /// Method B (overrides compare.method_b)
    #[arg(long)]
    method_b: Option<String>,
}

/// Upper-triangle scores of both methods and their comparison.
struct ProteinScores {
    a: Vec<f64>,
    b: Vec<f64>,
    comparison: ScoreComparison,
}

fn compare_protein(cache: &mut MatrixCache, a: &Path, b: &Path) -> contactbench::Result<ProteinScores> {
    let ma = cache.load(a)?;
    let mb = cache.load(b)?;
    if ma.scores.size() != mb.scores.size() {
        return Err(BenchError::InvalidInput(format!(
            "matrix sizes differ: {} ({}) vs {} ({})",
            a.display(),
            ma.scores.size(),
            b.display(),
            mb.scores.size()
        )));
    }
    let (a, b) = (ma.scores.upper_triangle(), mb.scores.upper_triangle());
    let comparison = compare_scores(&a, &b)?;
    Ok(ProteinScores { a, b, comparison })
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    init_logging(&config.benchmark.log_level);

    let configured = config.compare.clone();
    let name_a = args
        .method_a
        .or_else(|| configured.as_ref().map(|c| c.method_a.clone()))
        .context("No method A: set compare.method_a or pass --method-a")?;
    let name_b = args
        .method_b
        .or_else(|| configured.as_ref().map(|c| c.method_b.clone()))
        .context("No method B: set compare.method_b or pass --method-b")?;

    let method_a = config
        .method(&name_a)
        .with_context(|| format!("Unknown method: {}", name_a))?;
    let method_b = config
        .method(&name_b)
        .with_context(|| format!("Unknown method: {}", name_b))?;

    let files_a = discover_score_files(&method_a.dir, &method_a.filter)?;
    let files_b = discover_score_files(&method_b.dir, &method_b.filter)?;
    let mut cache = MatrixCache::new(config.cache.matrix_capacity);
    let plot_dir = args
        .plot_dir
        .unwrap_or_else(|| config.plot_dir().to_path_buf());

    println!("\n=== {} vs {} ===\n", name_a, name_b);
    println!("{:-<96}", "");
    println!(
        "{:<12} {:>8} {:>10} {:>10} {:>10} {:>10} {:>12} {:>10}",
        "Protein", "Pairs", "Pearson", "Spearman", "Kendall", "Slope", "Intercept", "KS D"
    );
    println!("{:-<96}", "");

    let mut pearson = Vec::new();
    let mut spearman = Vec::new();
    let mut kendall = Vec::new();
    let mut slope = Vec::new();

    for (protein, path_a) in &files_a {
        let Some(path_b) = files_b.get(protein) else {
            log::debug!("Protein {} has no scores for method '{}'", protein, name_b);
            continue;
        };
        let scores = match compare_protein(&mut cache, path_a, path_b) {
            Ok(scores) => scores,
            Err(e) => {
                log::warn!("Skipping protein {}: {}", protein, e);
                continue;
            }
        };
        let c = &scores.comparison;
        println!(
            "{:<12} {:>8} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>12.4} {:>10.4}",
            protein, c.n, c.pearson, c.spearman, c.kendall_tau, c.fit.slope, c.fit.intercept, c.ks_statistic
        );
        pearson.push(c.pearson);
        spearman.push(c.spearman);
        kendall.push(c.kendall_tau);
        slope.push(c.fit.slope);

        let svg = score_scatter_svg(
            &format!("{}: {} vs {}", protein, name_a, name_b),
            &scores.a,
            &scores.b,
            c,
            &name_a,
            &name_b,
        )?;
        let path = plot_dir.join(format!("{}_scatter_{}_vs_{}.html", protein, name_a, name_b));
        write_html(&svg, &format!("{} vs {} ({})", name_a, name_b, protein), &path)?;
    }
    println!("{:-<96}", "");

    if pearson.is_empty() {
        println!("\nNo protein has scores for both methods.");
        return Ok(());
    }
    println!("\n{} proteins compared.", pearson.len());
    println!("Scatter plots: {}", plot_dir.display());

    let groups = vec![
        ("Pearson r".to_string(), pearson),
        ("Spearman rho".to_string(), spearman),
        ("Kendall tau".to_string(), kendall),
        ("Slope".to_string(), slope),
    ];
    let path = plot_dir.join(format!("correlation_{}_vs_{}.html", name_a, name_b));
    let svg = statistics_boxplot_svg(&groups, "statistic value")?;
    write_html(&svg, &format!("{} vs {}", name_a, name_b), &path)?;
    println!("Plot: {}", path.display());

    Ok(())
}
