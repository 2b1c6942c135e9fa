use std::collections::BTreeSet;

use autoviz::{
    ChartKind, ChartStatus, Column, Dataset, Domain, ExportFormat, MemorySink, RenderError,
    RenderOptions, RuleEngine, RuleTable, SkipReason, VisualizeError, Visualizer,
    VisualizerConfig,
};
use log::Level;

fn scores_and_grades() -> Dataset {
    Dataset::new(vec![
        Column::new("scores", [50, 60, 70]),
        Column::new("grades", ["A", "B", "C"]),
    ])
    .unwrap()
}

fn visualizer(domain: Domain, config: VisualizerConfig) -> Visualizer<MemorySink> {
    Visualizer::with_sink(domain, config, MemorySink::default()).unwrap()
}

fn files_in(dir: &std::path::Path) -> BTreeSet<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn default_export_writes_files_for_every_column() {
    let dir = tempfile::tempdir().unwrap();
    let vis = visualizer(Domain::Generic, VisualizerConfig::default());

    let report = vis
        .render(&scores_and_grades(), &RenderOptions::export_to(dir.path()))
        .unwrap();

    let files = files_in(dir.path());
    assert!(files.iter().any(|f| f.starts_with("scores_")));
    assert!(files.iter().any(|f| f.starts_with("grades_")));
    assert_eq!(
        files,
        BTreeSet::from([
            "scores_histogram.png".to_string(),
            "scores_boxplot.png".to_string(),
            "grades_bar.png".to_string(),
            "grades_pie.png".to_string(),
        ])
    );
    assert_eq!(report.exported_files().len(), 4);
    assert_eq!(report.failed().count(), 0);
    assert_eq!(vis.sink().messages_at(Level::Info).len(), 5);
}

#[test]
fn education_export_with_one_chart_per_column() {
    let dir = tempfile::tempdir().unwrap();
    let config = VisualizerConfig::default().with_max_charts_per_column(1);
    let vis = visualizer(Domain::Education, config);

    vis.render(&scores_and_grades(), &RenderOptions::export_to(dir.path()))
        .unwrap();

    assert_eq!(
        files_in(dir.path()),
        BTreeSet::from(["scores_histogram.png".to_string(), "grades_bar.png".to_string()])
    );
}

#[test]
fn empty_dataset_aborts_without_files() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("charts");
    let vis = visualizer(Domain::Generic, VisualizerConfig::default());

    let result = vis.render(&Dataset::default(), &RenderOptions::export_to(&out));

    assert!(matches!(result, Err(VisualizeError::EmptyDataset)));
    assert!(!out.exists());
    assert_eq!(vis.sink().messages_at(Level::Error).len(), 1);

    let no_rows = Dataset::new(vec![Column::new("scores", Vec::<i64>::new())]).unwrap();
    assert!(matches!(
        vis.render(&no_rows, &RenderOptions::export_to(&out)),
        Err(VisualizeError::EmptyDataset)
    ));
    assert!(!out.exists());
}

#[test]
fn scatter_on_single_column_is_skipped_with_warning() {
    let ds = Dataset::new(vec![Column::new("yield", [1.5, 2.5, 3.0])]).unwrap();
    let vis = visualizer(Domain::Agriculture, VisualizerConfig::default());

    let outcome = vis
        .render_chart(&ds, "yield", ChartKind::Scatter, &RenderOptions::default())
        .unwrap();

    assert!(matches!(
        outcome.status,
        ChartStatus::Skipped(SkipReason::NoNumericPartner)
    ));
    let warnings = vis.sink().messages_at(Level::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("scatter"));
}

#[test]
fn agriculture_pass_reports_skipped_scatter_and_keeps_going() {
    let dir = tempfile::tempdir().unwrap();
    let ds = Dataset::new(vec![Column::new("yield", [1.5, 2.5, 3.0])]).unwrap();
    let vis = visualizer(Domain::Agriculture, VisualizerConfig::default());

    let report = vis.render(&ds, &RenderOptions::export_to(dir.path())).unwrap();

    assert_eq!(report.rendered().count(), 1);
    assert_eq!(report.skipped().count(), 1);
    assert_eq!(files_in(dir.path()), BTreeSet::from(["yield_line.png".to_string()]));
}

#[test]
fn failing_chart_does_not_stop_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let rules = RuleTable::from_json(
        r#"{"generic": {"numeric": ["histogram"], "categorical": ["line", "bar"]}}"#,
    )
    .unwrap();
    let vis = visualizer(Domain::Generic, VisualizerConfig::default()).with_rules(RuleEngine::new(rules));

    let report = vis
        .render(&scores_and_grades(), &RenderOptions::export_to(dir.path()))
        .unwrap();

    let failed: Vec<_> = report.failed().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!((failed[0].column.as_str(), failed[0].kind), ("grades", ChartKind::Line));
    assert!(matches!(
        failed[0].status,
        ChartStatus::Failed(RenderError::NotNumeric { .. })
    ));
    assert_eq!(
        files_in(dir.path()),
        BTreeSet::from(["scores_histogram.png".to_string(), "grades_bar.png".to_string()])
    );
    let errors = vis.sink().messages_at(Level::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("grades") && errors[0].contains("line"));
}

#[test]
fn wide_categorical_columns_drop_pie_and_collapse_bars() {
    let dir = tempfile::tempdir().unwrap();
    let cities: Vec<String> = (0..30).map(|i| format!("city{i:02}")).collect();
    let ds = Dataset::new(vec![Column::new("city", cities)]).unwrap();
    let vis = visualizer(Domain::Supermarket, VisualizerConfig::default());

    let report = vis.render(&ds, &RenderOptions::export_to(dir.path())).unwrap();

    let kinds: Vec<ChartKind> = report.outcomes.iter().map(|o| o.kind).collect();
    assert_eq!(kinds, vec![ChartKind::Bar]);
    assert_eq!(files_in(dir.path()), BTreeSet::from(["city_bar.png".to_string()]));

    let pie = vis
        .render_chart(&ds, "city", ChartKind::Pie, &RenderOptions::default())
        .unwrap();
    assert!(matches!(
        pie.status,
        ChartStatus::Skipped(SkipReason::TooManyCategories { distinct: 30, ceiling: 10 })
    ));
}

#[test]
fn svg_and_jpeg_exports_use_the_configured_extension() {
    for (format, ext) in [(ExportFormat::Svg, "svg"), (ExportFormat::Jpeg, "jpeg")] {
        let dir = tempfile::tempdir().unwrap();
        let config = VisualizerConfig::default()
            .with_export_format(format)
            .with_max_charts_per_column(1);
        let vis = visualizer(Domain::Finance, config);

        vis.render(&scores_and_grades(), &RenderOptions::export_to(dir.path()))
            .unwrap();

        assert_eq!(
            files_in(dir.path()),
            BTreeSet::from([format!("scores_line.{ext}"), format!("grades_bar.{ext}")])
        );
    }
}

#[test]
fn unknown_column_is_reported() {
    let vis = visualizer(Domain::Generic, VisualizerConfig::default());
    assert!(matches!(
        vis.render_chart(&scores_and_grades(), "age", ChartKind::Bar, &RenderOptions::default()),
        Err(VisualizeError::UnknownColumn(ref c)) if c == "age"
    ));
}

#[test]
fn unplottable_ranges_fail_one_chart_without_hanging_the_pass() {
    let dir = tempfile::tempdir().unwrap();
    let ds = Dataset::new(vec![
        Column::new("v", [f64::MAX, -f64::MAX, 0.0]),
        Column::new("w", [1.0, 2.0, 3.0]),
    ])
    .unwrap();
    let vis = visualizer(Domain::Agriculture, VisualizerConfig::default());

    for kind in [ChartKind::Histogram, ChartKind::Boxplot, ChartKind::Line, ChartKind::Scatter] {
        let outcome = vis
            .render_chart(&ds, "v", kind, &RenderOptions::default())
            .unwrap();
        assert!(
            matches!(outcome.status, ChartStatus::Failed(RenderError::Range { .. })),
            "{kind}: {:?}",
            outcome.status
        );
    }

    let report = vis.render(&ds, &RenderOptions::export_to(dir.path())).unwrap();
    // `w` scatters against `v`, so only its line chart survives.
    assert_eq!(report.failed().count(), 3);
    assert_eq!(report.rendered().count(), 1);
    assert_eq!(files_in(dir.path()), BTreeSet::from(["w_line.png".to_string()]));
}

#[test]
fn colliding_export_names_log_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let ds = Dataset::new(vec![
        Column::new("a/b", [1, 2, 3]),
        Column::new("a_b", [4, 5, 6]),
    ])
    .unwrap();
    let config = VisualizerConfig::default().with_max_charts_per_column(1);
    let vis = visualizer(Domain::Generic, config);

    vis.render(&ds, &RenderOptions::export_to(dir.path())).unwrap();

    assert_eq!(
        files_in(dir.path()),
        BTreeSet::from(["a_b_histogram.png".to_string()])
    );
    let warnings = vis.sink().messages_at(Level::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("a_b_histogram.png") && warnings[0].contains("a/b"));
}
