//! Rendering of qflow tables as faceted line plots.
//!
//! The plot is drawn into an in-memory RGB buffer (a [`Figure`]), which can be kept open by the
//! caller or encoded to PNG and written to disk.

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use ndarray::Array1;
use ndarray_stats::QuantileExt;
use plotters::prelude::*;

use std::fs;
use std::io::Cursor;
use std::path::Path;

use crate::error::{QflowError, Result};
use crate::table::QflowTable;

/// Width to height ratio of a single facet.
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub facet_height: u32,
    pub aspect: f64,
    pub title_size: u32,
    pub caption_size: u32,
    pub background: RGBColor,
    pub line_color: RGBColor,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            facet_height: 300,
            aspect: GOLDEN_RATIO,
            title_size: 20,
            caption_size: 15,
            background: WHITE,
            line_color: RGBColor(31, 119, 180),
        }
    }
}

impl PlotStyle {
    pub fn facet_width(&self) -> u32 {
        (self.facet_height as f64 * self.aspect).round() as u32
    }

    /// Height of the band above the facets that holds the figure title.
    pub fn title_height(&self) -> u32 {
        2 * self.title_size
    }
}


/// A rendered plot, stored as RGB8 pixels in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Figure {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Encode the figure as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let image = ImageBuffer::<Rgb<u8>, _>::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| QflowError::Plot("figure buffer does not match its size".into()))?;
        let mut output = Vec::new();
        DynamicImage::ImageRgb8(image).write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
        Ok(output)
    }

    /// Write the figure to a PNG file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_png()?)?;
        Ok(())
    }
}


/// Shared y range of all facets, padded by 5 percent. NaN values are ignored.
fn value_range(table: &QflowTable) -> (f64, f64) {
    let values: Array1<f64> = table.rows().iter().map(|row| row.value).collect();
    let lo = *values.min_skipnan();
    let hi = *values.max_skipnan();
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    if (hi - lo).abs() < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = 0.05 * (hi - lo);
    (lo - pad, hi + pad)
}


/// Render a table as a line plot with one facet per area, side by side in order of first appearance.
///
/// Each facet plots the values of its area against the time point index and is captioned `area = <label>`.
/// All facets share the y range. The figure carries `title` above the facets.
///
/// # Errors
///
/// [`QflowError::Plot`] if the table is empty or drawing fails.
pub fn render_facets(table: &QflowTable, title: &str, style: &PlotStyle) -> Result<Figure> {
    if table.is_empty() {
        return Err(QflowError::Plot("table has no samples".into()));
    }

    let areas = table.areas();
    let width = style.facet_width() * areas.len() as u32;
    let height = style.facet_height + style.title_height();
    let (y_lo, y_hi) = value_range(table);

    let mut pixels = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        root.fill(&style.background)?;
        let body = root.titled(title, ("sans-serif", style.title_size))?;

        for (panel, area) in body.split_evenly((1, areas.len())).iter().zip(areas.iter()) {
            let series = table.series(*area);
            let x_max = series.len().saturating_sub(1).max(1) as f64;

            let mut chart = ChartBuilder::on(panel)
                .margin(8)
                .caption(format!("area = {}", area), ("sans-serif", style.caption_size))
                .set_label_area_size(LabelAreaPosition::Left, 45)
                .set_label_area_size(LabelAreaPosition::Bottom, 30)
                .build_cartesian_2d(0f64..x_max, y_lo..y_hi)?;
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc("value")
                .draw()?;

            let points = series
                .iter()
                .enumerate()
                .filter(|(_, value)| value.is_finite())
                .map(|(t, value)| (t as f64, *value));
            chart.draw_series(LineSeries::new(points, &style.line_color))?;
        }
        root.present()?;
    }

    Ok(Figure { width, height, pixels })
}
