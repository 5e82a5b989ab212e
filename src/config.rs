use crate::eval::{Benchmark, Comparison, Constraint, EvaluationSettings};
use crate::eval::metrics::DEFAULT_RANK_POINTS;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "CONTACTBENCH_CONFIG";

/// Config file used when neither `--config` nor the environment names one.
pub const DEFAULT_CONFIG_FILE: &str = "contactbench.toml";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub benchmark: BenchmarkConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub methods: Vec<MethodConfig>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    pub compare: Option<CompareConfig>,
}

/// Inputs, outputs and evaluation thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct BenchmarkConfig {
    /// Directory of ground-truth structures (`*pdb`)
    pub pdb_dir: PathBuf,
    #[serde(default = "default_plot_dir")]
    pub plot_dir: PathBuf,
    #[serde(default = "default_threshold")]
    pub contact_threshold: f64,
    #[serde(default = "default_threshold")]
    pub noncontact_threshold: f64,
    #[serde(default = "default_sequence_separation")]
    pub sequence_separation: usize,
    #[serde(default = "default_rank_points")]
    pub rank_points: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Parsed score matrices kept in memory
    #[serde(default = "default_matrix_capacity")]
    pub matrix_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            matrix_capacity: default_matrix_capacity(),
        }
    }
}

/// One prediction method: a directory of score matrices
#[derive(Debug, Clone, Deserialize)]
pub struct MethodConfig {
    pub name: String,
    pub dir: PathBuf,
    /// Substring a file name must contain (empty accepts all)
    #[serde(default)]
    pub filter: String,
}

/// Pair of methods for the score comparison
#[derive(Debug, Clone, Deserialize)]
pub struct CompareConfig {
    pub method_a: String,
    pub method_b: String,
}

fn default_plot_dir() -> PathBuf {
    PathBuf::from("plots")
}

fn default_threshold() -> f64 {
    8.0
}

fn default_sequence_separation() -> usize {
    12
}

fn default_rank_points() -> usize {
    DEFAULT_RANK_POINTS
}

fn default_matrix_capacity() -> usize {
    16
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. `path`, when given (the `--config` flag)
    /// 2. Path specified in CONTACTBENCH_CONFIG environment variable
    /// 3. ./contactbench.toml in current directory
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenv::dotenv();

        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => std::env::var(CONFIG_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE)),
        };

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        let b = &self.benchmark;
        if !b.pdb_dir.is_dir() {
            anyhow::bail!(
                "pdb_dir is not a directory: {}. Set benchmark.pdb_dir to the structure directory.",
                b.pdb_dir.display()
            );
        }

        if !b.contact_threshold.is_finite() || b.contact_threshold <= 0.0 {
            anyhow::bail!("benchmark.contact_threshold must be a positive number");
        }

        if !b.noncontact_threshold.is_finite() {
            anyhow::bail!("benchmark.noncontact_threshold must be a finite number");
        }

        if b.rank_points == 0 {
            anyhow::bail!("benchmark.rank_points must be greater than 0");
        }

        if self.methods.is_empty() {
            anyhow::bail!("at least one [[methods]] entry is required");
        }

        let mut names = HashSet::new();
        for method in &self.methods {
            if !names.insert(method.name.as_str()) {
                anyhow::bail!("duplicate method name: {}", method.name);
            }
            if !method.dir.is_dir() {
                anyhow::bail!(
                    "directory for method '{}' does not exist: {}",
                    method.name,
                    method.dir.display()
                );
            }
        }

        if let Some(compare) = &self.compare {
            for name in [&compare.method_a, &compare.method_b] {
                if !names.contains(name.as_str()) {
                    anyhow::bail!("compare refers to unknown method: {}", name);
                }
            }
        }

        Ok(())
    }

    /// Evaluation settings from the `[benchmark]` section
    pub fn settings(&self) -> EvaluationSettings {
        EvaluationSettings {
            sequence_separation: self.benchmark.sequence_separation,
            contact_threshold: self.benchmark.contact_threshold,
            noncontact_threshold: self.benchmark.noncontact_threshold,
            rank_points: self.benchmark.rank_points,
        }
    }

    pub fn method(&self, name: &str) -> Option<&MethodConfig> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Build a benchmark session with every configured method and constraint
    pub fn build_benchmark(&self) -> Result<Benchmark> {
        let mut benchmark = Benchmark::new(&self.benchmark.pdb_dir)
            .context("Failed to scan structure directory")?
            .with_cache_capacity(self.cache.matrix_capacity);

        for method in &self.methods {
            benchmark
                .add_method(&method.name, &method.dir, &method.filter)
                .with_context(|| format!("Failed to register method '{}'", method.name))?;
        }

        for constraint in &self.constraints {
            log::info!(
                "Filter: {} {} {}",
                constraint.key,
                constraint.comparison,
                constraint.threshold
            );
            benchmark.add_constraint(&constraint.key, constraint.threshold, constraint.comparison);
        }

        Ok(benchmark)
    }

    /// Get the plot output directory
    pub fn plot_dir(&self) -> &Path {
        &self.benchmark.plot_dir
    }
}

/// Parse a `key:operator:value` filter given on the command line.
pub fn parse_constraint(arg: &str) -> Result<Constraint> {
    let mut parts = arg.splitn(3, ':');
    let (Some(key), Some(op), Some(value)) = (parts.next(), parts.next(), parts.next()) else {
        anyhow::bail!("filter must look like key:operator:value, got '{}'", arg);
    };
    let comparison: Comparison = op.parse()?;
    let threshold: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("filter value is not a number: {}", value))?;
    Ok(Constraint::new(key.trim(), threshold, comparison))
}
