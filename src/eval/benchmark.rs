//! Benchmark evaluator: compares contact-prediction methods against
//! ground-truth structures on a common set of proteins.

use crate::cache::MatrixCache;
use crate::error::{BenchError, Result};
use crate::eval::constraint::{Comparison, Constraint};
use crate::eval::metrics::{
    cumulative_curves, rank_cutoffs, rank_fractions, EvaluatedPair, RankCurves,
    DEFAULT_RANK_POINTS,
};
use crate::io::{discover_score_files, discover_structures, distance_map, Metadata, ProteinFile};
use crate::matrix::SquareMatrix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default capacity of the parsed-matrix cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 16;

/// Thresholds and rank axis used for one evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSettings {
    /// Pairs with `j - i` below this are ignored
    pub sequence_separation: usize,
    /// Pairs at or below this distance (Å) are contacts
    pub contact_threshold: f64,
    /// Pairs above this distance (Å) are non-contacts; clamped to at least `contact_threshold`
    pub noncontact_threshold: f64,
    /// Number of rank fractions
    pub rank_points: usize,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            sequence_separation: 12,
            contact_threshold: 8.0,
            noncontact_threshold: 8.0,
            rank_points: DEFAULT_RANK_POINTS,
        }
    }
}

impl EvaluationSettings {
    pub fn new(sequence_separation: usize, contact_threshold: f64, noncontact_threshold: f64) -> Self {
        Self {
            sequence_separation,
            contact_threshold,
            noncontact_threshold,
            ..Self::default()
        }
    }

    /// Settings with the non-contact threshold raised to the contact threshold if needed.
    pub fn normalized(mut self) -> Self {
        if self.noncontact_threshold < self.contact_threshold {
            self.noncontact_threshold = self.contact_threshold;
        }
        self
    }
}

/// A registered method: display name plus protein → score-matrix path.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub score_files: BTreeMap<String, PathBuf>,
}

/// Per-protein facts taken from the first method's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinInfo {
    /// Protein length L (`ncol`)
    pub length: usize,
    /// Number of sequences N (`nrow`)
    pub sequences: Option<f64>,
    pub diversity: Option<f64>,
    /// Effective number of sequences
    pub neff: Option<f64>,
}

impl ProteinInfo {
    fn from_metadata(metadata: &Metadata, matrix_size: usize) -> Self {
        Self {
            length: metadata.find_usize("ncol").unwrap_or(matrix_size),
            sequences: metadata.find_f64("nrow"),
            diversity: metadata.find_f64("diversity"),
            neff: metadata.find_f64("neff"),
        }
    }
}

/// Evaluation record for one protein.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinEvaluation {
    pub info: ProteinInfo,
    /// Rank cutoffs (number of top pairs) actually evaluated
    pub cutoffs: Vec<usize>,
    pub pair_count: usize,
    pub contact_count: usize,
    /// Method name → curves
    pub methods: BTreeMap<String, RankCurves>,
}

/// Why a protein was left out of the evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    MissingScores {
        method: String,
    },
    ConstraintFailed {
        method: String,
        key: String,
        comparison: Comparison,
        threshold: f64,
        observed: Option<f64>,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingScores { method } => {
                write!(f, "no scores available for method '{}'", method)
            }
            SkipReason::ConstraintFailed {
                method,
                key,
                comparison,
                threshold,
                observed,
            } => {
                let observed = observed
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "missing".to_string());
                write!(
                    f,
                    "method '{}' did not pass filter {} {} {}: {}",
                    method, key, comparison, threshold, observed
                )
            }
        }
    }
}

/// Result of evaluating one structure file.
#[derive(Debug, Clone, PartialEq)]
pub enum ProteinOutcome {
    Evaluated(ProteinEvaluation),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedProtein {
    pub protein: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Output of [`Benchmark::compute_evaluation_statistics`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationStatistics {
    /// Effective settings (non-contact threshold already clamped)
    pub settings: EvaluationSettings,
    /// Rank fractions of the protein length, increasing
    pub ranks: Vec<f64>,
    /// Method names in registration order
    pub methods: Vec<String>,
    pub proteins: BTreeMap<String, ProteinEvaluation>,
    pub skipped: Vec<SkippedProtein>,
}

impl EvaluationStatistics {
    pub fn is_empty(&self) -> bool {
        self.proteins.is_empty()
    }

    /// Write the statistics as pretty-printed JSON, creating parent directories.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Ground-truth pairs for evaluation from a distance map.
///
/// Keeps resolved pairs with `j > i` and `j - i >= sequence_separation`. When
/// the non-contact threshold exceeds the contact threshold, pairs in the band
/// between them are dropped.
pub fn ground_truth_pairs(distances: &SquareMatrix, settings: &EvaluationSettings) -> Vec<EvaluatedPair> {
    let settings = settings.normalized();
    let n = distances.size();
    let mut pairs = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if j - i < settings.sequence_separation {
                continue;
            }
            let distance = distances.get(i, j);
            if distance.is_nan() {
                continue;
            }
            let contact = distance <= settings.contact_threshold;
            if !contact
                && settings.noncontact_threshold > settings.contact_threshold
                && distance <= settings.noncontact_threshold
            {
                continue;
            }
            pairs.push(EvaluatedPair {
                i,
                j,
                distance,
                contact,
            });
        }
    }
    pairs
}

/// Benchmark session: structures, registered methods and constraints.
pub struct Benchmark {
    pdb_dir: PathBuf,
    structures: Vec<ProteinFile>,
    methods: Vec<Method>,
    constraints: Vec<Constraint>,
    statistics: Option<EvaluationStatistics>,
    cache: MatrixCache,
}

impl Benchmark {
    /// Create a benchmark over the structure files (`*pdb`) in `pdb_dir`.
    pub fn new(pdb_dir: impl Into<PathBuf>) -> Result<Self> {
        let pdb_dir = pdb_dir.into();
        let structures = discover_structures(&pdb_dir)?;
        Ok(Self {
            pdb_dir,
            structures,
            methods: Vec::new(),
            constraints: Vec::new(),
            statistics: None,
            cache: MatrixCache::new(DEFAULT_CACHE_CAPACITY),
        })
    }

    /// Replace the matrix cache with one of the given capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = MatrixCache::new(capacity);
        self
    }

    pub fn pdb_dir(&self) -> &Path {
        &self.pdb_dir
    }

    pub fn structures(&self) -> &[ProteinFile] {
        &self.structures
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Statistics of the last run, if it has not been invalidated since.
    pub fn statistics(&self) -> Option<&EvaluationStatistics> {
        self.statistics.as_ref()
    }

    /// Register a method from the score files in `dir` whose name contains `filter`.
    pub fn add_method(&mut self, name: impl Into<String>, dir: &Path, filter: &str) -> Result<()> {
        let name = name.into();
        let score_files = discover_score_files(dir, filter)?;
        log::info!("Registered method '{}' with {} score files", name, score_files.len());
        self.push_method(Method { name, score_files });
        Ok(())
    }

    fn push_method(&mut self, method: Method) {
        if self.methods.iter().any(|m| m.name == method.name) {
            log::warn!("Method name '{}' is registered more than once", method.name);
        }
        self.methods.push(method);
        self.statistics = None;
    }

    pub fn add_constraint(&mut self, key: impl Into<String>, threshold: f64, comparison: Comparison) {
        self.constraints.push(Constraint::new(key, threshold, comparison));
        self.statistics = None;
    }

    /// Forget all methods, constraints, statistics and cached matrices.
    pub fn reset(&mut self) {
        self.methods.clear();
        self.constraints.clear();
        self.statistics = None;
        self.cache.clear();
    }

    /// Evaluate every protein with a structure file and replace the statistics.
    pub fn compute_evaluation_statistics(
        &mut self,
        settings: EvaluationSettings,
    ) -> Result<&EvaluationStatistics> {
        if self.methods.is_empty() {
            return Err(BenchError::InvalidInput(
                "no methods registered for benchmarking".to_string(),
            ));
        }

        self.statistics = None;
        if settings.noncontact_threshold < settings.contact_threshold {
            log::warn!(
                "Non-contact threshold {} raised to contact threshold {}",
                settings.noncontact_threshold,
                settings.contact_threshold
            );
        }
        let settings = settings.normalized();
        let ranks = rank_fractions(settings.rank_points);
        let method_names: Vec<String> = self.methods.iter().map(|m| m.name.clone()).collect();

        log::info!(
            "Compute evaluation statistics for {} proteins and methods: {:?}",
            self.structures.len(),
            method_names
        );

        let mut proteins = BTreeMap::new();
        let mut skipped = Vec::new();
        let structures = self.structures.clone();
        let total = structures.len();

        for (idx, structure) in structures.iter().enumerate() {
            log::info!("[{}/{}] {}", idx + 1, total, structure.protein);

            match self.evaluate_protein(structure, &settings, &ranks)? {
                ProteinOutcome::Evaluated(evaluation) => {
                    proteins.insert(structure.protein.clone(), evaluation);
                }
                ProteinOutcome::Skipped(reason) => {
                    log::info!("Protein {} skipped: {}", structure.protein, reason);
                    skipped.push(SkippedProtein {
                        protein: structure.protein.clone(),
                        reason,
                    });
                }
            }
        }

        let (hits, misses) = self.cache.stats();
        log::debug!("Matrix cache: {} hits, {} misses", hits, misses);

        if proteins.is_empty() {
            log::warn!("No protein passed the availability and constraint checks");
        } else {
            log::info!("There are {} proteins in the evaluation data set.", proteins.len());
        }

        Ok(&*self.statistics.insert(EvaluationStatistics {
            settings,
            ranks,
            methods: method_names,
            proteins,
            skipped,
        }))
    }

    /// Plot mean precision per rank of the last run to `path`; a no-op
    /// (`Ok(None)`) without statistics or proteins.
    pub fn plot_precision_vs_rank(&self, path: &Path) -> Result<Option<PathBuf>> {
        crate::report::plot_precision_vs_rank(self.statistics(), path)
    }

    /// Evaluate one structure against all registered methods.
    ///
    /// Missing scores and failed constraints come back as
    /// [`ProteinOutcome::Skipped`]; unreadable inputs are errors.
    pub fn evaluate_protein(
        &mut self,
        structure: &ProteinFile,
        settings: &EvaluationSettings,
        ranks: &[f64],
    ) -> Result<ProteinOutcome> {
        let protein = structure.protein.as_str();

        // every method must cover the protein
        let mut score_paths = Vec::with_capacity(self.methods.len());
        for method in &self.methods {
            match method.score_files.get(protein) {
                Some(path) => score_paths.push((method.name.clone(), path.clone())),
                None => {
                    return Ok(ProteinOutcome::Skipped(SkipReason::MissingScores {
                        method: method.name.clone(),
                    }))
                }
            }
        }

        if let Some(reason) = self.check_constraints(&score_paths)? {
            return Ok(ProteinOutcome::Skipped(reason));
        }

        let Some((_, first_path)) = score_paths.first() else {
            return Err(BenchError::InvalidInput(
                "no methods registered for benchmarking".to_string(),
            ));
        };
        let first = self.cache.load(first_path)?;
        let info = ProteinInfo::from_metadata(&first.metadata, first.scores.size());

        let distances = distance_map(&structure.path, info.length)?;
        let pairs = ground_truth_pairs(&distances, settings);
        let contact_count = pairs.iter().filter(|p| p.contact).count();
        let cutoffs = rank_cutoffs(info.length, ranks, pairs.len());

        log::debug!(
            "{}: L={} pairs={} contacts={} cutoffs={}",
            protein,
            info.length,
            pairs.len(),
            contact_count,
            cutoffs.len()
        );

        let mut methods = BTreeMap::new();
        for (name, path) in &score_paths {
            let loaded = self.cache.load(path)?;
            if loaded.scores.size() < info.length {
                return Err(BenchError::InvalidInput(format!(
                    "score matrix {} has size {} but protein {} has length {}",
                    path.display(),
                    loaded.scores.size(),
                    protein,
                    info.length
                )));
            }
            let scores: Vec<f64> = pairs.iter().map(|p| loaded.scores.get(p.i, p.j)).collect();
            let curves = cumulative_curves(&pairs, &scores, settings.contact_threshold);
            methods.insert(name.clone(), curves.at_cutoffs(&cutoffs));
        }

        Ok(ProteinOutcome::Evaluated(ProteinEvaluation {
            info,
            cutoffs,
            pair_count: pairs.len(),
            contact_count,
            methods,
        }))
    }

    /// First failing constraint over all methods, in registration order.
    fn check_constraints(&mut self, score_paths: &[(String, PathBuf)]) -> Result<Option<SkipReason>> {
        if self.constraints.is_empty() {
            return Ok(None);
        }
        for (method, path) in score_paths {
            let loaded = self.cache.load(path)?;
            for constraint in &self.constraints {
                if let Err(observed) = constraint.check(&loaded.metadata) {
                    return Ok(Some(SkipReason::ConstraintFailed {
                        method: method.clone(),
                        key: constraint.key.clone(),
                        comparison: constraint.comparison,
                        threshold: constraint.threshold,
                        observed,
                    }));
                }
            }
        }
        Ok(None)
    }
}
