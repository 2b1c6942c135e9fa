//! Visualizer options with defaults, JSON overrides and validation.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest figure, in pixels, a single chart may allocate.
pub const MAX_FIGURE_PIXELS: u64 = 40_000_000;

// ---------------------------------------------------------------------------
// ExportFormat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
    Svg,
}

impl ExportFormat {
    /// File extension, also used in exported file names.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "svg" => Ok(ExportFormat::Svg),
            other => Err(ConfigError::UnknownFormat(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// VisualizerConfig
// ---------------------------------------------------------------------------

/// Options of a visualization pass.  Every field has a default so partial
/// JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Suggestions kept per column, in rule order.
    pub max_charts_per_column: usize,
    pub export_format: ExportFormat,
    /// Categories shown by bar and pie charts before the rest fold into
    /// "Other".
    pub max_categories: usize,
    /// Inches of figure width per category on bar charts.
    pub figure_width_multiplier: f64,
    pub dpi: u32,
    /// Base figure size in inches.
    pub figure_width: f64,
    pub figure_height: f64,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            max_charts_per_column: 2,
            export_format: ExportFormat::Png,
            max_categories: 20,
            figure_width_multiplier: 0.5,
            dpi: 100,
            figure_width: 6.4,
            figure_height: 4.8,
        }
    }
}

impl VisualizerConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: VisualizerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_min("max_charts_per_column", self.max_charts_per_column, 1)?;
        check_min("max_categories", self.max_categories, 2)?;
        check_min("dpi", self.dpi as usize, 1)?;
        check_positive("figure_width_multiplier", self.figure_width_multiplier)?;
        check_positive("figure_width", self.figure_width)?;
        check_positive("figure_height", self.figure_height)?;

        // Bar charts are the widest figures and never show more than
        // `max_categories` bars.
        let (width, height) = self.figure_size(self.max_categories);
        if u64::from(width) * u64::from(height) > MAX_FIGURE_PIXELS {
            return Err(ConfigError::FigureTooLarge {
                width,
                height,
                max: MAX_FIGURE_PIXELS,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn with_max_charts_per_column(mut self, n: usize) -> Self {
        self.max_charts_per_column = n;
        self
    }
    #[inline]
    pub fn with_export_format(mut self, format: ExportFormat) -> Self {
        self.export_format = format;
        self
    }
    #[inline]
    pub fn with_max_categories(mut self, n: usize) -> Self {
        self.max_categories = n;
        self
    }
    #[inline]
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Pixel size of a figure showing `categories` bars (0 for charts
    /// without categories).
    pub fn figure_size(&self, categories: usize) -> (u32, u32) {
        let width = self
            .figure_width
            .max(categories as f64 * self.figure_width_multiplier);
        let px = |inches: f64| (inches * self.dpi as f64).round().max(1.0) as u32;
        (px(width), px(self.figure_height))
    }
}

fn check_min(field: &'static str, value: usize, min: usize) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::TooSmall { field, min, value });
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(())
}
