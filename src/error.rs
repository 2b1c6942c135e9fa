//! Error types shared across the crate.

use std::io;
use std::path::PathBuf;

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

use crate::rules::{ChartKind, Domain};

/// Violations of the dataset shape invariants.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("column `{column}` has {found} rows, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("duplicate column name `{0}`")]
    DuplicateColumn(String),
    #[error("index has {found} rows, expected {expected}")]
    IndexLength { expected: usize, found: usize },
}

/// Rejected configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("`{field}` must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: usize,
        value: usize,
    },
    #[error("`{field}` must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("figure of {width}x{height} pixels exceeds the limit of {max} pixels")]
    FigureTooLarge { width: u32, height: u32, max: u64 },
    #[error("unknown export format `{0}`")]
    UnknownFormat(String),
    #[error("reading configuration: {0}")]
    Io(#[from] io::Error),
    #[error("parsing configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// A rule table that failed validation.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule table has no `generic` entry")]
    MissingGeneric,
    #[error("{domain} has no {dtype} chart kinds")]
    EmptyList { domain: Domain, dtype: &'static str },
    #[error("{domain} lists `{kind}` twice for {dtype} columns")]
    Duplicate {
        domain: Domain,
        dtype: &'static str,
        kind: ChartKind,
    },
    #[error("{domain} categorical rules need a chart kind other than pie")]
    PieOnly { domain: Domain },
    #[error("{domain} pie ceiling must be at least 2, got {value}")]
    PieCeiling { domain: Domain, value: usize },
    #[error("parsing rule table: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure to prepare, draw or encode a single chart.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{kind} needs numeric values but `{column}` is categorical")]
    NotNumeric { column: String, kind: ChartKind },
    #[error("drawing failed: {0}")]
    Backend(String),
    #[error("value range {min}..{max} is too wide to plot")]
    Range { min: f64, max: f64 },
    #[error("canvas of {width}x{height} pixels is too large")]
    CanvasTooLarge { width: u32, height: u32 },
    #[error("loading chart font: {0}")]
    Font(String),
    #[error("encoding image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Backend(e.to_string())
    }
}

/// Errors that abort a whole visualization pass.
#[derive(Debug, Error)]
pub enum VisualizeError {
    #[error("dataset is empty, visualization aborted")]
    EmptyDataset,
    #[error("unknown column `{0}`")]
    UnknownColumn(String),
    #[error("creating output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
