/// Rendering layer: series preparation, drawing, and image export.
///
/// ```text
///   Column + ChartKind
///        │
///        ▼
///   ┌──────────┐
///   │ prepare   │  edge-case policy → PreparedChart | Skip
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  draw     │  plotters routines, generic over the backend
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ canvas    │  in-memory bitmap / SVG → optional file
///   └──────────┘
/// ```

pub mod canvas;
pub mod draw;
pub mod prepare;

pub use canvas::Canvas;
pub use prepare::{
    BoxStats, CategoryCount, HistogramBin, Preparation, PrepareOptions, PreparedChart,
    SkipReason, prepare_chart,
};

/// Label of the bucket that collects the smallest categories.
pub const OTHER_LABEL: &str = "Other";

/// Upper bound on histogram buckets.
pub const HISTOGRAM_MAX_BINS: usize = 30;
