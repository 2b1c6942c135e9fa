use std::f64::consts::PI;

use plotters::coord::Shift;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::color::{SERIES_COLOR, category_colors};
use crate::error::RenderError;

use super::prepare::{
    BoxStats, CategoryCount, HistogramBin, PreparedChart, padded_range, value_range,
};

const FONT_FAMILY: &str = "sans-serif";
const LABEL_CHARS: usize = 14;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

impl PreparedChart {
    /// Draw onto `root`, which is cleared first.
    pub fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), RenderError> {
        root.fill(&WHITE)?;
        match self {
            PreparedChart::Histogram { title, bins } => draw_histogram(root, title, bins),
            PreparedChart::Boxplot {
                title,
                label,
                stats,
            } => draw_boxplot(root, title, label, stats),
            PreparedChart::Bar { title, categories } => draw_bar(root, title, categories),
            PreparedChart::Pie { title, categories } => draw_pie(root, title, categories),
            PreparedChart::Line {
                title,
                x_label,
                points,
            } => draw_line(root, title, x_label, points),
            PreparedChart::Scatter {
                title,
                x_label,
                y_label,
                points,
            } => draw_scatter(root, title, x_label, y_label, points),
        }
    }
}

// ---------------------------------------------------------------------------
// Cartesian charts
// ---------------------------------------------------------------------------

fn draw_histogram<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    bins: &[HistogramBin],
) -> Result<(), RenderError> {
    let lo = bins.first().map_or(0.0, |b| b.start);
    let hi = bins.last().map_or(1.0, |b| b.end);
    if !(lo.is_finite() && hi.is_finite() && (hi - lo).is_finite() && hi > lo) {
        return Err(RenderError::Range { min: lo, max: hi });
    }
    let top = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64 * 1.05;

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT_FAMILY, 20).into_font())
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(45)
        .build_cartesian_2d(lo..hi, 0f64..top)?;
    chart.configure_mesh().disable_x_mesh().y_desc("Count").draw()?;

    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], SERIES_COLOR.filled())
    }))?;
    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], WHITE.stroke_width(1))
    }))?;
    Ok(())
}

fn draw_boxplot<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    label: &str,
    stats: &BoxStats,
) -> Result<(), RenderError> {
    let mut extremes = vec![stats.lower_whisker, stats.upper_whisker];
    extremes.extend(&stats.outliers);
    let (lo, hi) = padded(value_range(&extremes).unwrap_or((stats.q1, stats.q3)))?;

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT_FAMILY, 20).into_font())
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(0f64..2f64, lo..hi)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .x_desc(label)
        .draw()?;

    let (left, right, mid) = (0.6, 1.4, 1.0);
    chart.draw_series(std::iter::once(Rectangle::new(
        [(left, stats.q1), (right, stats.q3)],
        SERIES_COLOR.mix(0.3).filled(),
    )))?;
    chart.draw_series(std::iter::once(Rectangle::new(
        [(left, stats.q1), (right, stats.q3)],
        SERIES_COLOR.stroke_width(2),
    )))?;

    let cap = |y: f64| vec![(0.8, y), (1.2, y)];
    let segments = [
        vec![(mid, stats.q3), (mid, stats.upper_whisker)],
        vec![(mid, stats.q1), (mid, stats.lower_whisker)],
        cap(stats.upper_whisker),
        cap(stats.lower_whisker),
    ];
    chart.draw_series(
        segments
            .into_iter()
            .map(|points| PathElement::new(points, BLACK.stroke_width(1))),
    )?;
    chart.draw_series(std::iter::once(PathElement::new(
        vec![(left, stats.median), (right, stats.median)],
        RED.stroke_width(2),
    )))?;
    chart.draw_series(
        stats
            .outliers
            .iter()
            .map(|&y| Circle::new((mid, y), 3, BLACK.stroke_width(1))),
    )?;
    Ok(())
}

fn draw_bar<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    categories: &[CategoryCount],
) -> Result<(), RenderError> {
    let n = categories.len() as u32;
    let top = categories.iter().map(|c| c.count).max().unwrap_or(0).max(1) as f64 * 1.05;
    let labels: Vec<String> = categories.iter().map(|c| c.label.clone()).collect();
    let colors = category_colors(&labels);

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT_FAMILY, 20).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(45)
        .build_cartesian_2d((0u32..n).into_segmented(), 0f64..top)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => labels
                .get(*i as usize)
                .map(|l| shorten(l))
                .unwrap_or_default(),
            _ => String::new(),
        })
        .y_desc("Count")
        .draw()?;

    chart.draw_series(categories.iter().zip(&colors).enumerate().map(|(i, (c, color))| {
        let i = i as u32;
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), c.count as f64)],
            color.filled(),
        );
        bar.set_margin(0, 0, 4, 4);
        bar
    }))?;
    Ok(())
}

fn draw_line<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    x_label: &str,
    points: &[(f64, f64)],
) -> Result<(), RenderError> {
    let mut chart = xy_chart(root, title, points)?;
    chart.configure_mesh().x_desc(x_label).draw()?;
    chart.draw_series(LineSeries::new(
        points.iter().copied(),
        SERIES_COLOR.stroke_width(2),
    ))?;
    Ok(())
}

fn draw_scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    x_label: &str,
    y_label: &str,
    points: &[(f64, f64)],
) -> Result<(), RenderError> {
    let mut chart = xy_chart(root, title, points)?;
    chart.configure_mesh().x_desc(x_label).y_desc(y_label).draw()?;
    chart.draw_series(
        points
            .iter()
            .map(|&p| Circle::new(p, 3, SERIES_COLOR.mix(0.8).filled())),
    )?;
    Ok(())
}

type XyChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn xy_chart<'a, DB: DrawingBackend>(
    root: &'a DrawingArea<DB, Shift>,
    title: &str,
    points: &[(f64, f64)],
) -> Result<XyChart<'a, DB>, RenderError> {
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let (x0, x1) = padded(value_range(&xs).unwrap_or((0.0, 1.0)))?;
    let (y0, y1) = padded(value_range(&ys).unwrap_or((0.0, 1.0)))?;

    Ok(ChartBuilder::on(root)
        .caption(title, (FONT_FAMILY, 20).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(55)
        .build_cartesian_2d(x0..x1, y0..y1)?)
}

// ---------------------------------------------------------------------------
// Pie
// ---------------------------------------------------------------------------

fn draw_pie<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    categories: &[CategoryCount],
) -> Result<(), RenderError> {
    let area = root.titled(title, (FONT_FAMILY, 20).into_font())?;
    let (w, h) = area.dim_in_pixel();
    let center = (w as f64 / 2.0, h as f64 / 2.0);
    let radius = w.min(h) as f64 * 0.36;
    let total = categories.iter().map(|c| c.count).sum::<usize>().max(1) as f64;

    let labels: Vec<String> = categories.iter().map(|c| c.label.clone()).collect();
    let colors = category_colors(&labels);
    let label_style = TextStyle::from((FONT_FAMILY, 13).into_font())
        .pos(Pos::new(HPos::Center, VPos::Center));
    let at = |angle: f64, r: f64| {
        (
            (center.0 + r * angle.cos()).round() as i32,
            (center.1 + r * angle.sin()).round() as i32,
        )
    };

    // Slices run clockwise from twelve o'clock.
    let mut start = -PI / 2.0;
    for (cat, color) in categories.iter().zip(&colors) {
        let share = cat.count as f64 / total;
        let sweep = share * 2.0 * PI;
        let steps = ((sweep / 0.05).ceil() as usize).max(2);

        let mut outline = Vec::with_capacity(steps + 2);
        outline.push(at(0.0, 0.0));
        outline.extend((0..=steps).map(|s| at(start + sweep * s as f64 / steps as f64, radius)));
        area.draw(&Polygon::new(outline, color.filled()))?;

        let mid = start + sweep / 2.0;
        area.draw(&Text::new(
            format!("{} ({:.1}%)", shorten(&cat.label), share * 100.0),
            at(mid, radius * 1.2),
            label_style.clone(),
        ))?;
        start += sweep;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Axis bounds for `range`; an axis that would not be finite fails the chart
/// instead of reaching the mesh.
fn padded((min, max): (f64, f64)) -> Result<(f64, f64), RenderError> {
    padded_range((min, max)).ok_or(RenderError::Range { min, max })
}

fn shorten(label: &str) -> String {
    if label.chars().count() <= LABEL_CHARS {
        return label.to_string();
    }
    let head: String = label.chars().take(LABEL_CHARS - 1).collect();
    format!("{head}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_axes_fail_before_drawing() {
        let chart = PreparedChart::Scatter {
            title: "Scatter plot of x vs y".into(),
            x_label: "x".into(),
            y_label: "y".into(),
            points: vec![(0.0, -f64::MAX), (1.0, f64::MAX)],
        };
        let mut svg = String::new();
        let root = SVGBackend::with_string(&mut svg, (200, 150)).into_drawing_area();
        assert!(matches!(chart.draw(&root), Err(RenderError::Range { .. })));
        assert_eq!(padded((2.0, 2.0)).ok(), Some((1.5, 2.5)));
    }

    #[test]
    fn long_labels_are_shortened() {
        assert_eq!(shorten("short"), "short");
        assert_eq!(shorten("a very long category name"), "a very long c…");
    }
}
