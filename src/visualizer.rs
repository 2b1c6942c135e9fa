//! One visualization pass: profile every column, ask the rule engine for
//! chart kinds, and render each (column, chart) pair in isolation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::Level;

use crate::config::{ExportFormat, VisualizerConfig};
use crate::data::model::{Column, Dataset};
use crate::data::profile::{ColumnProfile, Dtype};
use crate::error::{ConfigError, RenderError, VisualizeError};
use crate::logging::{LogFacade, LogSink};
use crate::render::{Canvas, Preparation, PrepareOptions, SkipReason, prepare_chart};
use crate::rules::{ChartKind, Domain, RuleEngine};

// ---------------------------------------------------------------------------
// Options and outcomes
// ---------------------------------------------------------------------------

/// Per-call options of [`Visualizer::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Write one image per (column, chart) pair into `output_dir`.
    pub export: bool,
    pub output_dir: PathBuf,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            export: false,
            output_dir: PathBuf::from("charts"),
        }
    }
}

impl RenderOptions {
    pub fn export_to(dir: impl Into<PathBuf>) -> Self {
        RenderOptions {
            export: true,
            output_dir: dir.into(),
        }
    }
}

#[derive(Debug)]
pub enum ChartStatus {
    /// Drawn; `path` is set when the image was exported.
    Rendered { path: Option<PathBuf> },
    Skipped(SkipReason),
    Failed(RenderError),
}

#[derive(Debug)]
pub struct ChartOutcome {
    pub column: String,
    pub kind: ChartKind,
    pub status: ChartStatus,
}

/// Every outcome of a pass, in column then suggestion order.
#[derive(Debug, Default)]
pub struct VisualizationReport {
    pub outcomes: Vec<ChartOutcome>,
}

impl VisualizationReport {
    pub fn rendered(&self) -> impl Iterator<Item = &ChartOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ChartStatus::Rendered { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ChartOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ChartStatus::Skipped(_)))
    }

    pub fn failed(&self) -> impl Iterator<Item = &ChartOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ChartStatus::Failed(_)))
    }

    pub fn exported_files(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.status {
                ChartStatus::Rendered { path: Some(p) } => Some(p.as_path()),
                _ => None,
            })
            .collect()
    }

    /// Outcomes of one column.
    pub fn for_column<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a ChartOutcome> {
        self.outcomes.iter().filter(move |o| o.column == column)
    }
}

/// `<column>_<chartKind>.<format>`, with path separators in the column name
/// replaced so the file always lands in the output directory.
pub fn export_file_name(column: &str, kind: ChartKind, format: ExportFormat) -> String {
    let safe: String = column
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    format!("{safe}_{kind}.{}", format.extension())
}

// ---------------------------------------------------------------------------
// Visualizer
// ---------------------------------------------------------------------------

pub struct Visualizer<L: LogSink = LogFacade> {
    domain: Domain,
    config: VisualizerConfig,
    engine: RuleEngine,
    sink: L,
}

impl Visualizer<LogFacade> {
    /// Visualizer logging through the `log` facade at info level.
    pub fn new(domain: Domain, config: VisualizerConfig) -> Result<Self, ConfigError> {
        Self::with_sink(domain, config, LogFacade::default())
    }
}

impl<L: LogSink> Visualizer<L> {
    pub fn with_sink(domain: Domain, config: VisualizerConfig, sink: L) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Visualizer {
            domain,
            config,
            engine: RuleEngine::default(),
            sink,
        })
    }

    /// Replace the built-in rule table.
    pub fn with_rules(mut self, engine: RuleEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn sink(&self) -> &L {
        &self.sink
    }

    /// Dtype of a named column, `None` if the dataset has no such column.
    pub fn detect_dtype(&self, dataset: &Dataset, column: &str) -> Option<Dtype> {
        dataset.column(column).map(Dtype::classify)
    }

    /// Chart kinds for a profiled column, capped at `max_charts_per_column`.
    pub fn suggestions(&self, profile: &ColumnProfile) -> Vec<ChartKind> {
        let mut kinds = self
            .engine
            .suggest(self.domain, profile.dtype, profile.distinct);
        kinds.truncate(self.config.max_charts_per_column);
        kinds
    }

    /// Run a full pass over `dataset`.  Only an empty dataset or an
    /// unusable output directory abort the pass; every chart failure is
    /// recorded in the report and the pass moves on.
    pub fn render(
        &self,
        dataset: &Dataset,
        options: &RenderOptions,
    ) -> Result<VisualizationReport, VisualizeError> {
        self.begin(dataset, options)?;

        let mut report = VisualizationReport::default();
        let mut exported: BTreeMap<PathBuf, String> = BTreeMap::new();
        for column in dataset.columns() {
            let profile = ColumnProfile::of(column);
            let kinds = self.suggestions(&profile);
            self.log(
                Level::Debug,
                format_args!(
                    "column `{}`: {}, {} distinct values, charts {:?}",
                    profile.name, profile.dtype, profile.distinct, kinds
                ),
            );
            for kind in kinds {
                let outcome = self.render_unit(dataset, column, &profile, kind, options);
                if let ChartStatus::Rendered { path: Some(path) } = &outcome.status {
                    if let Some(earlier) = exported.insert(path.clone(), column.name.clone()) {
                        self.log(
                            Level::Warn,
                            format_args!(
                                "`{}` overwrote {} exported for `{earlier}` in this pass",
                                column.name,
                                path.display()
                            ),
                        );
                    }
                }
                report.outcomes.push(outcome);
            }
        }

        self.log(
            Level::Info,
            format_args!(
                "visualization finished: {} rendered, {} skipped, {} failed",
                report.rendered().count(),
                report.skipped().count(),
                report.failed().count()
            ),
        );
        Ok(report)
    }

    /// Render a single (column, chart) pair, whatever the rules suggest.
    pub fn render_chart(
        &self,
        dataset: &Dataset,
        column: &str,
        kind: ChartKind,
        options: &RenderOptions,
    ) -> Result<ChartOutcome, VisualizeError> {
        self.begin(dataset, options)?;
        let col = dataset
            .column(column)
            .ok_or_else(|| VisualizeError::UnknownColumn(column.to_string()))?;
        Ok(self.render_unit(dataset, col, &ColumnProfile::of(col), kind, options))
    }

    /// Checks shared by every entry point.
    fn begin(&self, dataset: &Dataset, options: &RenderOptions) -> Result<(), VisualizeError> {
        if dataset.is_empty() {
            self.log(Level::Error, format_args!("{}", VisualizeError::EmptyDataset));
            return Err(VisualizeError::EmptyDataset);
        }
        if options.export {
            std::fs::create_dir_all(&options.output_dir).map_err(|source| {
                let err = VisualizeError::OutputDir {
                    path: options.output_dir.clone(),
                    source,
                };
                self.log(Level::Error, format_args!("{err}"));
                err
            })?;
        }
        Ok(())
    }

    fn render_unit(
        &self,
        dataset: &Dataset,
        column: &Column,
        profile: &ColumnProfile,
        kind: ChartKind,
        options: &RenderOptions,
    ) -> ChartOutcome {
        let status = match self.draw_unit(dataset, column, profile, kind, options) {
            Ok(ChartStatus::Skipped(reason)) => {
                self.log(
                    Level::Warn,
                    format_args!("{kind} for `{}` skipped: {reason}", column.name),
                );
                ChartStatus::Skipped(reason)
            }
            Ok(status) => status,
            Err(err) => {
                self.log(
                    Level::Error,
                    format_args!("error visualizing `{}` with {kind}: {err}", column.name),
                );
                ChartStatus::Failed(err)
            }
        };
        ChartOutcome {
            column: column.name.clone(),
            kind,
            status,
        }
    }

    fn draw_unit(
        &self,
        dataset: &Dataset,
        column: &Column,
        profile: &ColumnProfile,
        kind: ChartKind,
        options: &RenderOptions,
    ) -> Result<ChartStatus, RenderError> {
        let opts = PrepareOptions {
            max_categories: self.config.max_categories,
            pie_ceiling: self.engine.pie_ceiling(self.domain),
        };
        let chart = match prepare_chart(kind, dataset, column, profile, opts)? {
            Preparation::Ready(chart) => chart,
            Preparation::Skip(reason) => return Ok(ChartStatus::Skipped(reason)),
        };

        let format = self.config.export_format;
        let canvas = Canvas::new(self.config.figure_size(chart.bar_count()), format);
        let target = options
            .export
            .then(|| options.output_dir.join(export_file_name(&column.name, kind, format)));
        canvas.render(&chart, target.as_deref())?;

        if let Some(path) = &target {
            self.log(Level::Info, format_args!("exported {}", path.display()));
        } else {
            self.log(Level::Debug, format_args!("rendered {}", chart.title()));
        }
        Ok(ChartStatus::Rendered { path: target })
    }

    fn log(&self, level: Level, args: std::fmt::Arguments<'_>) {
        self.sink.log_fmt(level, args);
    }
}
