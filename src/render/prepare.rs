//! Turns a column into the series a chart routine draws.  Every edge-case
//! policy of the chart kinds lives here so it can be tested without a
//! drawing backend.

use std::collections::BTreeMap;
use std::fmt;

use crate::data::model::{Column, Dataset, Value};
use crate::data::profile::{ColumnProfile, Dtype};
use crate::error::RenderError;
use crate::rules::ChartKind;

use super::{HISTOGRAM_MAX_BINS, OTHER_LABEL};

// ---------------------------------------------------------------------------
// Prepared series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Five-number summary with 1.5×IQR whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// A chart ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedChart {
    Histogram {
        title: String,
        bins: Vec<HistogramBin>,
    },
    Boxplot {
        title: String,
        label: String,
        stats: BoxStats,
    },
    Bar {
        title: String,
        categories: Vec<CategoryCount>,
    },
    Pie {
        title: String,
        categories: Vec<CategoryCount>,
    },
    Line {
        title: String,
        x_label: String,
        points: Vec<(f64, f64)>,
    },
    Scatter {
        title: String,
        x_label: String,
        y_label: String,
        points: Vec<(f64, f64)>,
    },
}

impl PreparedChart {
    pub fn title(&self) -> &str {
        match self {
            PreparedChart::Histogram { title, .. }
            | PreparedChart::Boxplot { title, .. }
            | PreparedChart::Bar { title, .. }
            | PreparedChart::Pie { title, .. }
            | PreparedChart::Line { title, .. }
            | PreparedChart::Scatter { title, .. } => title,
        }
    }

    /// Number of bars, which drives the figure width.
    pub fn bar_count(&self) -> usize {
        match self {
            PreparedChart::Bar { categories, .. } => categories.len(),
            _ => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Skips
// ---------------------------------------------------------------------------

/// Why a suggested chart was not drawn.  Skips are expected outcomes, not
/// failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Scatter needs another numeric column for its x axis.
    NoNumericPartner,
    TooManyCategories { distinct: usize, ceiling: usize },
    /// The column holds nothing plottable.
    NoValues,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoNumericPartner => write!(f, "no other numeric column for the x axis"),
            SkipReason::TooManyCategories { distinct, ceiling } => {
                write!(f, "{distinct} categories exceed the pie ceiling of {ceiling}")
            }
            SkipReason::NoValues => write!(f, "no plottable values"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Preparation {
    Ready(PreparedChart),
    Skip(SkipReason),
}

/// Limits applied while preparing bar and pie series.
#[derive(Debug, Clone, Copy)]
pub struct PrepareOptions {
    pub max_categories: usize,
    pub pie_ceiling: usize,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn prepare_chart(
    kind: ChartKind,
    dataset: &Dataset,
    column: &Column,
    profile: &ColumnProfile,
    opts: PrepareOptions,
) -> Result<Preparation, RenderError> {
    let name = &column.name;
    let require_numeric = || {
        if profile.dtype == Dtype::Numeric {
            Ok(finite_values(column))
        } else {
            Err(RenderError::NotNumeric {
                column: name.clone(),
                kind,
            })
        }
    };

    let chart = match kind {
        ChartKind::Histogram => {
            let values = require_numeric()?;
            if values.is_empty() {
                return Ok(Preparation::Skip(SkipReason::NoValues));
            }
            check_axis(&values)?;
            PreparedChart::Histogram {
                title: format!("Histogram of {name}"),
                bins: histogram_bins(&values, histogram_bin_count(profile.distinct)),
            }
        }
        ChartKind::Boxplot => {
            let values = require_numeric()?;
            let Some(stats) = box_stats(&values) else {
                return Ok(Preparation::Skip(SkipReason::NoValues));
            };
            check_axis(&values)?;
            PreparedChart::Boxplot {
                title: format!("Boxplot of {name}"),
                label: name.clone(),
                stats,
            }
        }
        ChartKind::Bar => {
            let counts = category_counts(column);
            if counts.is_empty() {
                return Ok(Preparation::Skip(SkipReason::NoValues));
            }
            PreparedChart::Bar {
                title: format!("Bar chart of {name}"),
                categories: collapse_categories(counts, opts.max_categories),
            }
        }
        ChartKind::Pie => {
            if profile.distinct > opts.pie_ceiling {
                return Ok(Preparation::Skip(SkipReason::TooManyCategories {
                    distinct: profile.distinct,
                    ceiling: opts.pie_ceiling,
                }));
            }
            let counts = category_counts(column);
            if counts.is_empty() {
                return Ok(Preparation::Skip(SkipReason::NoValues));
            }
            PreparedChart::Pie {
                title: format!("Pie chart of {name}"),
                categories: collapse_categories(counts, opts.max_categories),
            }
        }
        ChartKind::Line => {
            require_numeric()?;
            let (x_label, points) = line_points(dataset, column);
            if points.is_empty() {
                return Ok(Preparation::Skip(SkipReason::NoValues));
            }
            check_axes(&points)?;
            PreparedChart::Line {
                title: format!("Line chart of {name}"),
                x_label,
                points,
            }
        }
        ChartKind::Scatter => {
            let Some(partner) = scatter_partner(dataset, column) else {
                return Ok(Preparation::Skip(SkipReason::NoNumericPartner));
            };
            require_numeric()?;
            let points = paired_points(partner, column);
            if points.is_empty() {
                return Ok(Preparation::Skip(SkipReason::NoValues));
            }
            check_axes(&points)?;
            PreparedChart::Scatter {
                title: format!("Scatter plot of {} vs {name}", partner.name),
                x_label: partner.name.clone(),
                y_label: name.clone(),
                points,
            }
        }
    };
    Ok(Preparation::Ready(chart))
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Value counts of the non-null cells, most frequent first.  Ties keep the
/// value order.
pub fn category_counts(column: &Column) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&Value, usize> = BTreeMap::new();
    for v in column.values.iter().filter(|v| !v.is_null()) {
        *counts.entry(v).or_default() += 1;
    }
    let mut counts: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(v, count)| CategoryCount {
            label: v.to_string(),
            count,
        })
        .collect();
    // Stable sort keeps the BTreeMap order among equal counts.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Keep the `max` − 1 largest categories and fold the rest into a trailing
/// "Other" bucket, so the result never exceeds `max` entries.
pub fn collapse_categories(mut counts: Vec<CategoryCount>, max: usize) -> Vec<CategoryCount> {
    if counts.len() <= max {
        return counts;
    }
    let keep = max.saturating_sub(1);
    let dropped: usize = counts[keep..].iter().map(|c| c.count).sum();
    counts.truncate(keep);
    counts.push(CategoryCount {
        label: OTHER_LABEL.to_string(),
        count: dropped,
    });
    counts
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// min(30, distinct), and never zero.
pub fn histogram_bin_count(distinct: usize) -> usize {
    distinct.clamp(1, HISTOGRAM_MAX_BINS)
}

/// Equal-width bins over the value range; the last bin is closed.
pub fn histogram_bins(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let bins = bins.max(1);
    let (min, max) = value_range(values).unwrap_or((0.0, 1.0));
    let (lo, hi) = if min == max { (min - 0.5, max + 0.5) } else { (min, max) };
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: lo + width * i as f64,
            end: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();
    for &v in values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

// ---------------------------------------------------------------------------
// Boxplot
// ---------------------------------------------------------------------------

pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let inside = || sorted.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
    Some(BoxStats {
        q1,
        median,
        q3,
        lower_whisker: inside().next().unwrap_or(q1),
        upper_whisker: inside().last().unwrap_or(q3),
        outliers: sorted
            .iter()
            .copied()
            .filter(|v| !(low_fence..=high_fence).contains(v))
            .collect(),
    })
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// ---------------------------------------------------------------------------
// Line / scatter
// ---------------------------------------------------------------------------

/// Points of a line chart.  The x axis is the dataset index when it is
/// numeric, the row position otherwise.
pub fn line_points(dataset: &Dataset, column: &Column) -> (String, Vec<(f64, f64)>) {
    let numeric_index = dataset
        .index()
        .filter(|idx| Dtype::classify(idx) == Dtype::Numeric);

    match numeric_index {
        Some(index) => (index.name.clone(), paired_points(index, column)),
        None => {
            let points = column
                .values
                .iter()
                .enumerate()
                .filter_map(|(row, v)| Some((row as f64, v.as_f64()?)))
                .filter(|(_, y)| y.is_finite())
                .collect();
            ("Row".to_string(), points)
        }
    }
}

/// First numeric column of the dataset other than `column`.
pub fn scatter_partner<'a>(dataset: &'a Dataset, column: &Column) -> Option<&'a Column> {
    dataset
        .columns()
        .iter()
        .find(|c| c.name != column.name && Dtype::classify(c) == Dtype::Numeric)
}

/// Rows where both cells are finite numbers.
fn paired_points(x: &Column, y: &Column) -> Vec<(f64, f64)> {
    x.values
        .iter()
        .zip(&y.values)
        .filter_map(|(x, y)| Some((x.as_f64()?, y.as_f64()?)))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect()
}

fn finite_values(column: &Column) -> Vec<f64> {
    column
        .numeric_values()
        .into_iter()
        .filter(|v| v.is_finite())
        .collect()
}

pub(crate) fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (min <= max).then_some((min, max))
}

/// Axis bounds: the range widened by 5% on both sides, or ±0.5 around a
/// single value.  `None` when the widened span is empty or does not fit in
/// an `f64`.
pub(crate) fn padded_range((lo, hi): (f64, f64)) -> Option<(f64, f64)> {
    let (lo, hi) = if lo == hi {
        (lo - 0.5, hi + 0.5)
    } else {
        let pad = (hi - lo) * 0.05;
        (lo - pad, hi + pad)
    };
    (lo.is_finite() && hi.is_finite() && (hi - lo).is_finite() && hi > lo).then_some((lo, hi))
}

/// Fails when `values` cannot be laid out on a finite axis.
pub(crate) fn check_axis(values: &[f64]) -> Result<(), RenderError> {
    match value_range(values) {
        Some((min, max)) if padded_range((min, max)).is_none() => Err(RenderError::Range { min, max }),
        _ => Ok(()),
    }
}

fn check_axes(points: &[(f64, f64)]) -> Result<(), RenderError> {
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    check_axis(&xs)?;
    check_axis(&ys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> PrepareOptions {
        PrepareOptions {
            max_categories: 20,
            pie_ceiling: 8,
        }
    }

    fn prepare(kind: ChartKind, ds: &Dataset, col: &str, opts: PrepareOptions) -> Result<Preparation, RenderError> {
        let column = ds.column(col).unwrap();
        prepare_chart(kind, ds, column, &ColumnProfile::of(column), opts)
    }

    /// 25 categories, category `c{i}` appearing 30 - i times.
    fn wide_column() -> Column {
        let values: Vec<String> = (0..25)
            .flat_map(|i| std::iter::repeat(format!("c{i:02}")).take(30 - i))
            .collect();
        Column::new("wide", values)
    }

    #[test]
    fn counts_are_sorted_by_frequency() {
        let col = Column::new("g", ["b", "a", "b", "c", "b", "a"]);
        let counts = category_counts(&col);
        let pairs: Vec<(&str, usize)> = counts.iter().map(|c| (c.label.as_str(), c.count)).collect();
        assert_eq!(pairs, vec![("b", 3), ("a", 2), ("c", 1)]);
    }

    #[test]
    fn collapsing_keeps_max_entries_and_sums_the_rest() {
        let counts = category_counts(&wide_column());
        let total: usize = counts.iter().map(|c| c.count).sum();
        let dropped: usize = counts[19..].iter().map(|c| c.count).sum();

        let collapsed = collapse_categories(counts, 20);
        assert_eq!(collapsed.len(), 20);
        let last = collapsed.last().unwrap();
        assert_eq!(last.label, OTHER_LABEL);
        assert_eq!(last.count, dropped);
        assert_eq!(collapsed.iter().map(|c| c.count).sum::<usize>(), total);
    }

    #[test]
    fn collapsing_leaves_small_series_alone() {
        let counts = category_counts(&Column::new("g", ["a", "b"]));
        assert_eq!(collapse_categories(counts.clone(), 20), counts);
    }

    #[test]
    fn bar_preparation_collapses_wide_columns() {
        let ds = Dataset::new(vec![wide_column()]).unwrap();
        let Preparation::Ready(PreparedChart::Bar { title, categories }) =
            prepare(ChartKind::Bar, &ds, "wide", opts()).unwrap()
        else {
            panic!("expected a bar chart");
        };
        assert_eq!(title, "Bar chart of wide");
        assert_eq!(categories.len(), 20);
        assert_eq!(categories[19].label, "Other");
    }

    #[test]
    fn pie_is_skipped_above_the_ceiling() {
        let ds = Dataset::new(vec![wide_column()]).unwrap();
        assert_eq!(
            prepare(ChartKind::Pie, &ds, "wide", opts()).unwrap(),
            Preparation::Skip(SkipReason::TooManyCategories {
                distinct: 25,
                ceiling: 8
            })
        );
    }

    #[test]
    fn histogram_uses_at_most_thirty_bins() {
        assert_eq!(histogram_bin_count(0), 1);
        assert_eq!(histogram_bin_count(3), 3);
        assert_eq!(histogram_bin_count(500), 30);

        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let bins = histogram_bins(&values, histogram_bin_count(100));
        assert_eq!(bins.len(), 30);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 100);
        assert_eq!(bins.last().unwrap().end, 99.0);
    }

    #[test]
    fn constant_values_get_a_unit_wide_bin() {
        let bins = histogram_bins(&[4.0, 4.0], 1);
        assert_eq!(
            bins,
            vec![HistogramBin {
                start: 3.5,
                end: 4.5,
                count: 2
            }]
        );
    }

    #[test]
    fn padding_handles_constant_and_overflowing_ranges() {
        assert_eq!(padded_range((2.0, 2.0)), Some((1.5, 2.5)));
        assert_eq!(padded_range((0.0, 10.0)), Some((-0.5, 10.5)));
        assert_eq!(padded_range((f64::MAX, f64::MAX)), None);
        assert_eq!(padded_range((0.0, f64::MAX)), None);
        assert_eq!(padded_range((-f64::MAX, f64::MAX)), None);
    }

    #[test]
    fn numeric_charts_fail_on_unplottable_ranges() {
        let ds = Dataset::new(vec![
            Column::new("v", [f64::MAX, -f64::MAX, 0.0]),
            Column::new("w", [1.0, 2.0, 3.0]),
        ])
        .unwrap();
        for kind in [ChartKind::Histogram, ChartKind::Boxplot, ChartKind::Line, ChartKind::Scatter] {
            assert!(
                matches!(prepare(kind, &ds, "v", opts()), Err(RenderError::Range { .. })),
                "{kind} accepted an infinite axis"
            );
        }
        assert!(matches!(
            prepare(ChartKind::Line, &ds, "w", opts()),
            Ok(Preparation::Ready(_))
        ));
    }

    #[test]
    fn box_stats_flag_outliers() {
        let stats = box_stats(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_eq!(stats.median, 3.5);
        assert_eq!(stats.q1, 2.25);
        assert_eq!(stats.q3, 4.75);
        assert_eq!(stats.upper_whisker, 5.0);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.outliers, vec![100.0]);
        assert!(box_stats(&[]).is_none());
    }

    #[test]
    fn line_uses_row_order_without_numeric_index() {
        let ds = Dataset::new(vec![Column::new("v", [10.0, 20.0, 30.0])])
            .unwrap()
            .with_index(Column::new("day", ["mon", "tue", "wed"]))
            .unwrap();
        let (label, points) = line_points(&ds, ds.column("v").unwrap());
        assert_eq!(label, "Row");
        assert_eq!(points, vec![(0.0, 10.0), (1.0, 20.0), (2.0, 30.0)]);
    }

    #[test]
    fn line_uses_numeric_index() {
        let ds = Dataset::new(vec![Column::new("v", [10.0, 20.0])])
            .unwrap()
            .with_index(Column::new("year", [2020, 2021]))
            .unwrap();
        let (label, points) = line_points(&ds, ds.column("v").unwrap());
        assert_eq!(label, "year");
        assert_eq!(points, vec![(2020.0, 10.0), (2021.0, 20.0)]);
    }

    #[test]
    fn line_on_categorical_column_fails() {
        let ds = Dataset::new(vec![Column::new("g", ["a", "b"])]).unwrap();
        assert!(matches!(
            prepare(ChartKind::Line, &ds, "g", opts()),
            Err(RenderError::NotNumeric { kind: ChartKind::Line, .. })
        ));
    }

    #[test]
    fn scatter_needs_a_second_numeric_column() {
        let single = Dataset::new(vec![Column::new("y", [1, 2, 3])]).unwrap();
        assert_eq!(
            prepare(ChartKind::Scatter, &single, "y", opts()).unwrap(),
            Preparation::Skip(SkipReason::NoNumericPartner)
        );

        let pair = Dataset::new(vec![
            Column::new("label", ["a", "b", "c"]),
            Column::new("x", [1, 2, 3]),
            Column::new("y", [Some(2.0), None, Some(6.0)]),
        ])
        .unwrap();
        let Preparation::Ready(PreparedChart::Scatter { title, points, .. }) =
            prepare(ChartKind::Scatter, &pair, "y", opts()).unwrap()
        else {
            panic!("expected a scatter plot");
        };
        assert_eq!(title, "Scatter plot of x vs y");
        assert_eq!(points, vec![(1.0, 2.0), (3.0, 6.0)]);
    }
}
