use std::path::Path;
use std::sync::OnceLock;

use image::{ExtendedColorType, ImageFormat};
use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};

use crate::config::{ExportFormat, MAX_FIGURE_PIXELS};
use crate::error::RenderError;

use super::prepare::PreparedChart;

/// Bundled so bitmap output does not depend on system fonts.
static FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

fn ensure_font() -> Result<(), RenderError> {
    static REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();
    REGISTERED
        .get_or_init(|| {
            register_font("sans-serif", FontStyle::Normal, FONT_BYTES)
                .map_err(|_| "bundled DejaVuSans.ttf is not a valid font".to_string())
        })
        .clone()
        .map_err(RenderError::Font)
}

// ---------------------------------------------------------------------------
// Canvas – one figure, owned for the duration of a single render
// ---------------------------------------------------------------------------

/// Pixel size and output format of a figure.  The backing buffer only lives
/// inside [`Canvas::render`], so it is released on every exit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub format: ExportFormat,
}

impl Canvas {
    pub fn new((width, height): (u32, u32), format: ExportFormat) -> Self {
        Canvas {
            width,
            height,
            format,
        }
    }

    /// Draw `chart` and, when `target` is given, write the encoded image
    /// there.  Without a target the figure is drawn and discarded.
    pub fn render(&self, chart: &PreparedChart, target: Option<&Path>) -> Result<(), RenderError> {
        if u64::from(self.width) * u64::from(self.height) > MAX_FIGURE_PIXELS {
            return Err(RenderError::CanvasTooLarge {
                width: self.width,
                height: self.height,
            });
        }
        ensure_font()?;
        let size = (self.width, self.height);
        match self.format {
            ExportFormat::Png | ExportFormat::Jpeg => {
                let mut pixels = vec![0u8; self.width as usize * self.height as usize * 3];
                {
                    let root = BitMapBackend::with_buffer(&mut pixels, size).into_drawing_area();
                    chart.draw(&root)?;
                    root.present()?;
                }
                if let Some(path) = target {
                    let format = match self.format {
                        ExportFormat::Jpeg => ImageFormat::Jpeg,
                        _ => ImageFormat::Png,
                    };
                    image::save_buffer_with_format(
                        path,
                        &pixels,
                        self.width,
                        self.height,
                        ExtendedColorType::Rgb8,
                        format,
                    )?;
                }
            }
            ExportFormat::Svg => {
                let mut svg = String::new();
                {
                    let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
                    chart.draw(&root)?;
                    root.present()?;
                }
                if let Some(path) = target {
                    std::fs::write(path, svg).map_err(|source| RenderError::Write {
                        path: path.to_path_buf(),
                        source,
                    })?;
                }
            }
        }
        Ok(())
    }
}
