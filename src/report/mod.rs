//! SVG figures and the standalone HTML pages that display them.

pub mod figure;
pub mod html;

pub use figure::{
    precision_vs_rank_svg, rank_curves_svg, rank_label, runtime_boxplot_svg, score_scatter_svg,
    statistics_boxplot_svg,
};
pub use html::{render_html, write_html};

use crate::error::Result;
use crate::eval::{compute_mean_precision_per_rank, EvaluationStatistics};
use std::path::{Path, PathBuf};

/// Plot mean precision per rank for every method to `path`.
///
/// Does nothing and returns `Ok(None)` when there are no statistics or no
/// protein passed the evaluation.
pub fn plot_precision_vs_rank(
    stats: Option<&EvaluationStatistics>,
    path: &Path,
) -> Result<Option<PathBuf>> {
    let Some(stats) = stats else {
        log::warn!("No evaluation statistics computed yet; nothing to plot");
        return Ok(None);
    };
    if stats.is_empty() {
        log::warn!("Evaluation statistics contain no proteins; nothing to plot");
        return Ok(None);
    }

    let curves = compute_mean_precision_per_rank(stats);
    let svg = precision_vs_rank_svg(&curves, "")?;
    write_html(&svg, "Mean precision vs rank", path).map(Some)
}
