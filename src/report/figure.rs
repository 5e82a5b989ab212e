//! Figures drawn with plotters into SVG strings, ready to be inlined in a page.
//!
//! Text is emitted as SVG `<text>` elements, so no system fonts are needed.

use crate::error::Result;
use crate::eval::{MeanRankCurves, Metric};
use crate::stats::{defined_pairs, qq_points, BoxSummary, ScoreComparison};
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::combinators::WithKeyPoints;
use plotters::coord::Shift;
use plotters::prelude::*;

const FIGURE_SIZE: (u32, u32) = (900, 600);
const FONT: &str = "sans-serif";

/// ColorBrewer Set1.
pub const SET1: [RGBColor; 9] = [
    RGBColor(228, 26, 28),
    RGBColor(55, 126, 184),
    RGBColor(77, 175, 74),
    RGBColor(152, 78, 163),
    RGBColor(255, 127, 0),
    RGBColor(255, 255, 51),
    RGBColor(166, 86, 40),
    RGBColor(247, 129, 191),
    RGBColor(153, 153, 153),
];

pub fn color(index: usize) -> RGBColor {
    SET1[index % SET1.len()]
}

/// Rank fraction as an axis label, rounded to two decimals (`0.02`, `1.0`).
pub fn rank_label(fraction: f64) -> String {
    format!("{:?}", (fraction * 100.0).round() / 100.0)
}

type Root<'a> = DrawingArea<SVGBackend<'a>, Shift>;

fn render_svg<F>(draw: F) -> Result<String>
where
    F: FnOnce(&Root<'_>) -> Result<()>,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, FIGURE_SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }
    Ok(svg)
}

fn draw_no_data(root: &Root<'_>) -> Result<()> {
    let (width, height) = FIGURE_SIZE;
    root.draw(&Text::new(
        "No data",
        (width as i32 / 2, height as i32 / 2),
        (FONT, 20).into_font().color(&BLACK),
    ))?;
    Ok(())
}

/// Smallest range holding every finite value, padded by 5%. `(0, 1)` when
/// nothing is finite.
fn value_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return (0.0, 1.0);
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 0.5 };
    (lo - pad, hi + pad)
}

/// Runs of consecutive finite values as `(rank, value)` points. A NaN ends a
/// run, so unreachable ranks show as gaps.
fn finite_segments(ranks: &[f64], values: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (&rank, &value) in ranks.iter().zip(values) {
        if value.is_finite() {
            current.push((rank, value));
        } else if !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Mean metric per rank with one line per method, in the order the curves
/// list them. Precision and recall use a fixed `[0, 1]` axis.
pub fn precision_vs_rank_svg(curves: &MeanRankCurves, title: &str) -> Result<String> {
    let y_range = match curves.metric {
        Metric::Precision | Metric::Recall => Some((0.0, 1.0)),
        Metric::MeanError => None,
    };
    rank_curves_svg(title, &curves.ranks, &curves.methods, curves.metric.label(), y_range)
}

/// Line chart over rank fractions. `y_range` of `None` fits the data.
pub fn rank_curves_svg(
    title: &str,
    ranks: &[f64],
    series: &[(String, Vec<f64>)],
    y_label: &str,
    y_range: Option<(f64, f64)>,
) -> Result<String> {
    render_svg(|root| {
        if series.is_empty() {
            return draw_no_data(root);
        }
        let (y_min, y_max) = y_range
            .unwrap_or_else(|| value_range(series.iter().flat_map(|(_, v)| v.iter().copied())));

        let mut builder = ChartBuilder::on(root);
        builder.margin(20).x_label_area_size(50).y_label_area_size(70);
        if !title.is_empty() {
            builder.caption(title, (FONT, 24));
        }
        let mut chart = builder.build_cartesian_2d(0.0..1.0, y_min..y_max)?;

        chart
            .configure_mesh()
            .x_desc("#predicted contacts / protein length")
            .y_desc(y_label)
            .x_label_formatter(&|x: &f64| rank_label(*x))
            .axis_desc_style((FONT, 18))
            .draw()?;

        for (nr, (name, values)) in series.iter().enumerate() {
            let style = color(nr).stroke_width(3);
            let mut segments = finite_segments(ranks, values).into_iter();
            chart
                .draw_series(LineSeries::new(segments.next().unwrap_or_default(), style))?
                .label(name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
            for segment in segments {
                chart.draw_series(LineSeries::new(segment, style))?;
            }
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((FONT, 16))
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
        Ok(())
    })
}

/// Box per group (quartile box, median line, min/max whiskers, mean cross).
pub fn statistics_boxplot_svg(groups: &[(String, Vec<f64>)], y_label: &str) -> Result<String> {
    render_svg(|root| draw_boxplot(root, groups, y_label, false))
}

/// Runtime box plot in minutes on a log10 axis. Non-positive runtimes are left out.
pub fn runtime_boxplot_svg(groups: &[(String, Vec<f64>)]) -> Result<String> {
    render_svg(|root| draw_boxplot(root, groups, "runtime in min", true))
}

/// Decade label for a log10 axis position; blank between decades.
fn log_tick_label(exponent: f64) -> String {
    let rounded = exponent.round();
    if (exponent - rounded).abs() > 1e-9 {
        return String::new();
    }
    format!("{}", 10f64.powi(rounded as i32))
}

fn draw_boxplot(
    root: &Root<'_>,
    groups: &[(String, Vec<f64>)],
    y_label: &str,
    log_axis: bool,
) -> Result<()> {
    let summaries: Vec<(usize, BoxSummary)> = groups
        .iter()
        .enumerate()
        .filter_map(|(nr, (name, values))| {
            let values: Vec<f64> = values
                .iter()
                .copied()
                .filter(|v| !log_axis || *v > 0.0)
                .collect();
            match BoxSummary::from_values(&values) {
                Ok(summary) => Some((nr, summary)),
                Err(_) => {
                    log::debug!("Group '{}' has no values to draw", name);
                    None
                }
            }
        })
        .collect();
    if summaries.is_empty() {
        return draw_no_data(root);
    }

    let scale = |v: f64| if log_axis { v.log10() } else { v };
    let (y_min, y_max) = if log_axis {
        let lo = summaries.iter().map(|(_, s)| s.min).fold(f64::INFINITY, f64::min);
        let hi = summaries.iter().map(|(_, s)| s.max).fold(f64::NEG_INFINITY, f64::max);
        let lo = lo.log10().floor();
        (lo, hi.log10().ceil().max(lo + 1.0))
    } else {
        value_range(summaries.iter().flat_map(|(_, s)| [s.min, s.max]))
    };

    let names: Vec<&str> = groups.iter().map(|(name, _)| name.as_str()).collect();
    let x_range = KeyPointAxis(
        (-0.5..names.len() as f64 - 0.5)
            .with_key_points((0..names.len()).map(|i| i as f64).collect()),
    );
    let group_label = |x: &f64| {
        let slot = x.round();
        if slot < 0.0 || (x - slot).abs() > 1e-6 {
            return String::new();
        }
        names.get(slot as usize).map(|s| s.to_string()).unwrap_or_default()
    };
    let value_label = |y: &f64| {
        if log_axis {
            log_tick_label(*y)
        } else {
            format!("{:.2}", y)
        }
    };

    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_min..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc(y_label)
        .x_label_formatter(&group_label)
        .y_label_formatter(&value_label)
        .axis_desc_style((FONT, 18))
        .label_style((FONT, 16))
        .draw()?;

    let (half_width, cap) = (0.3, 0.15);
    for (nr, s) in &summaries {
        let c = color(*nr);
        let x = *nr as f64;
        let [min, q1, median, q3, max, mean] =
            [s.min, s.q1, s.median, s.q3, s.max, s.mean].map(scale);

        chart.draw_series([
            Rectangle::new([(x - half_width, q1), (x + half_width, q3)], c.mix(0.3).filled()),
            Rectangle::new([(x - half_width, q1), (x + half_width, q3)], c.stroke_width(2)),
        ])?;
        chart.draw_series([
            PathElement::new(vec![(x - half_width, median), (x + half_width, median)], c.stroke_width(3)),
            PathElement::new(vec![(x, q3), (x, max)], c.stroke_width(2)),
            PathElement::new(vec![(x, q1), (x, min)], c.stroke_width(2)),
            PathElement::new(vec![(x - cap, max), (x + cap, max)], c.stroke_width(2)),
            PathElement::new(vec![(x - cap, min), (x + cap, min)], c.stroke_width(2)),
        ])?;
        chart.draw_series(std::iter::once(Cross::new((x, mean), 6, c.stroke_width(2))))?;
    }
    Ok(())
}

/// Scatter of method A's scores (y) against method B's (x) over the pairs
/// where both are defined.
///
/// Adds the diagonal, the least-squares line of `comparison`, a QQ overlay
/// of the sorted scores and the Pearson correlation.
pub fn score_scatter_svg(
    title: &str,
    a: &[f64],
    b: &[f64],
    comparison: &ScoreComparison,
    name_a: &str,
    name_b: &str,
) -> Result<String> {
    let points = defined_pairs(a, b);
    let qq = qq_points(&points);
    let fit = comparison.fit;
    let fit_text = format!("y = {:.3} + {:.3}x", fit.intercept, fit.slope);
    let pearson_text = format!("Pearson r = {:.3}", comparison.pearson);

    render_svg(|root| {
        if points.is_empty() {
            return draw_no_data(root);
        }
        let (lo, hi) = value_range(points.iter().flat_map(|&(x, y)| [x, y]));
        let (fit_lo, fit_hi) = (fit.intercept + fit.slope * lo, fit.intercept + fit.slope * hi);
        let (y_lo, y_hi) = (lo.min(fit_lo).min(fit_hi), hi.max(fit_lo).max(fit_hi));

        let mut builder = ChartBuilder::on(root);
        builder.margin(20).x_label_area_size(50).y_label_area_size(70);
        if !title.is_empty() {
            builder.caption(title, (FONT, 24));
        }
        let mut chart = builder.build_cartesian_2d(lo..hi, y_lo..y_hi)?;

        chart
            .configure_mesh()
            .x_desc(format!("{} score", name_b))
            .y_desc(format!("{} score", name_a))
            .axis_desc_style((FONT, 18))
            .draw()?;

        let pair_color = color(1);
        chart
            .draw_series(points.iter().map(|&p| Circle::new(p, 2, pair_color.mix(0.4).filled())))?
            .label("residue pairs")
            .legend(move |(x, y)| Circle::new((x, y), 4, pair_color.filled()));

        let qq_color = color(0);
        chart
            .draw_series(qq.iter().map(|&p| Circle::new(p, 2, qq_color.filled())))?
            .label("QQ (sorted scores)")
            .legend(move |(x, y)| Circle::new((x, y), 4, qq_color.filled()));

        let diagonal = RGBColor(120, 120, 120).stroke_width(1);
        chart
            .draw_series(LineSeries::new([(lo, lo), (hi, hi)], diagonal))?
            .label("y = x")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], diagonal));

        let fit_style = color(2).stroke_width(2);
        chart
            .draw_series(LineSeries::new([(lo, fit_lo), (hi, fit_hi)], fit_style))?
            .label("least-squares fit")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], fit_style));

        let step = (y_hi - y_lo) * 0.06;
        let left = lo + (hi - lo) * 0.03;
        chart.draw_series([
            Text::new(pearson_text, (left, y_hi - step), (FONT, 18).into_font()),
            Text::new(fit_text, (left, y_hi - 2.0 * step), (FONT, 18).into_font()),
        ])?;

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((FONT, 16))
            .position(SeriesLabelPosition::LowerRight)
            .draw()?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::rank_fractions;
    use crate::stats::compare_scores;

    fn curves() -> MeanRankCurves {
        MeanRankCurves {
            metric: Metric::Precision,
            ranks: rank_fractions(50),
            methods: vec![
                ("pseudolikelihood".to_string(), vec![0.9; 50]),
                ("covariance".to_string(), vec![f64::NAN; 50]),
            ],
            protein_count: 3,
        }
    }

    #[test]
    fn test_rank_labels() {
        assert_eq!(rank_label(0.02), "0.02");
        assert_eq!(rank_label(1.0), "1.0");
        assert_eq!(rank_label(0.30000000000000004), "0.3");
    }

    #[test]
    fn test_colors_cycle() {
        assert_eq!(color(0), color(9));
        assert_ne!(color(0), color(1));
    }

    #[test]
    fn test_finite_segments_split_at_nan() {
        let ranks = [0.2, 0.4, 0.6, 0.8, 1.0];
        let values = [0.9, f64::NAN, 0.7, 0.6, f64::NAN];
        assert_eq!(
            finite_segments(&ranks, &values),
            vec![vec![(0.2, 0.9)], vec![(0.6, 0.7), (0.8, 0.6)]]
        );
        assert!(finite_segments(&ranks, &[f64::NAN; 5]).is_empty());
    }

    #[test]
    fn test_value_range_pads_and_defaults() {
        assert_eq!(value_range([f64::NAN]), (0.0, 1.0));
        assert_eq!(value_range([2.0, 2.0]), (1.5, 2.5));
        let (lo, hi) = value_range([0.0, 10.0, f64::NAN]);
        assert!((lo + 0.5).abs() < 1e-12 && (hi - 10.5).abs() < 1e-12);
    }

    #[test]
    fn test_precision_figure_svg() {
        let svg = precision_vs_rank_svg(&curves(), "").unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("pseudolikelihood"));
        assert!(svg.contains("covariance"));
        assert!(svg.contains("Mean Precision over Proteins"));
        assert!(svg.contains("#predicted contacts / protein length"));
    }

    #[test]
    fn test_empty_figures_say_no_data() {
        let empty = MeanRankCurves {
            methods: vec![],
            ..curves()
        };
        assert!(precision_vs_rank_svg(&empty, "").unwrap().contains("No data"));
        assert!(statistics_boxplot_svg(&[], "r").unwrap().contains("No data"));
        let negative = [("pLL".to_string(), vec![0.0, -1.0])];
        assert!(runtime_boxplot_svg(&negative).unwrap().contains("No data"));
    }

    #[test]
    fn test_boxplot_svg_names_groups() {
        let groups = [
            ("Pearson r".to_string(), vec![0.2, 0.5, 0.7]),
            ("Kendall tau".to_string(), vec![0.1, 0.3, f64::NAN]),
        ];
        let svg = statistics_boxplot_svg(&groups, "statistic value").unwrap();
        assert!(svg.contains("Pearson r"));
        assert!(svg.contains("Kendall tau"));
        assert!(svg.contains("statistic value"));
        assert!(!svg.contains("No data"));
    }

    #[test]
    fn test_log_tick_labels() {
        assert_eq!(log_tick_label(0.0), "1");
        assert_eq!(log_tick_label(3.0), "1000");
        assert_eq!(log_tick_label(-1.0), "0.1");
        assert_eq!(log_tick_label(0.5), "");
        let svg = runtime_boxplot_svg(&[("pLL".to_string(), vec![2.0, 30.0, 400.0])]).unwrap();
        assert!(svg.contains("runtime in min"));
    }

    #[test]
    fn test_score_scatter_annotations() {
        let a = [0.1, 0.4, 0.35, 0.8, f64::NAN];
        let b = [0.2, 0.3, 0.5, 0.9, 0.1];
        let comparison = compare_scores(&a, &b).unwrap();
        let svg = score_scatter_svg("1abc", &a, &b, &comparison, "pLL", "PCD").unwrap();

        assert!(svg.contains(&format!("Pearson r = {:.3}", comparison.pearson)));
        assert!(svg.contains(&format!(
            "y = {:.3} + {:.3}x",
            comparison.fit.intercept, comparison.fit.slope
        )));
        assert!(svg.contains("y = x"));
        assert!(svg.contains("QQ (sorted scores)"));
        assert!(svg.contains("pLL score"));
        assert!(svg.contains("PCD score"));
        // a marker per defined pair and per QQ point
        assert!(svg.matches("<circle").count() >= 8);
    }
}

/// Delegates to `WithKeyPoints` but uses `DefaultFormatting`, so that
/// `configure_mesh` type-checks; labels come from the custom formatter.
struct KeyPointAxis(WithKeyPoints<RangedCoordf64>);

impl Ranged for KeyPointAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn range(&self) -> std::ops::Range<f64> {
        self.0.range()
    }

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.0.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        self.0.key_points(hint)
    }

    fn axis_pixel_range(&self, limit: (i32, i32)) -> std::ops::Range<i32> {
        self.0.axis_pixel_range(limit)
    }
}
