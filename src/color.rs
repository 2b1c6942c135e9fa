use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Colour of single-series charts (histogram, line, scatter, boxplot).
pub const SERIES_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Colour of the synthetic "Other" bucket.
pub const OTHER_COLOR: RGBColor = RGBColor(160, 160, 160);

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<RGBColor> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            RGBColor(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// One colour per category label; "Other" is always grey.
pub fn category_colors(labels: &[String]) -> Vec<RGBColor> {
    let palette = generate_palette(labels.len());
    labels
        .iter()
        .zip(palette)
        .map(|(label, c)| if label == crate::render::OTHER_LABEL { OTHER_COLOR } else { c })
        .collect()
}
