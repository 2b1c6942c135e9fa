//! Automatic chart selection and export for tabular datasets.
//!
//! ```no_run
//! use autoviz::{Column, Dataset, Domain, RenderOptions, Visualizer, VisualizerConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let dataset = Dataset::new(vec![
//!     Column::new("scores", [50, 60, 70]),
//!     Column::new("grades", ["A", "B", "C"]),
//! ])?;
//! let vis = Visualizer::new(Domain::Education, VisualizerConfig::default())?;
//! let report = vis.render(&dataset, &RenderOptions::export_to("charts"))?;
//! for path in report.exported_files() {
//!     println!("{}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod render;
pub mod rules;
pub mod visualizer;

pub use config::{ExportFormat, VisualizerConfig};
pub use data::loader::load_file;
pub use data::model::{Column, Dataset, Value};
pub use data::profile::{ColumnProfile, Dtype};
pub use error::{ConfigError, DatasetError, RenderError, RuleError, VisualizeError};
pub use logging::{LogFacade, LogSink, MemorySink};
pub use render::SkipReason;
pub use rules::{ChartKind, Domain, DomainRules, RuleEngine, RuleTable};
pub use visualizer::{
    ChartOutcome, ChartStatus, RenderOptions, VisualizationReport, Visualizer, export_file_name,
};
