//! Plot rendering and image export.
//!
//! Consumes a [`ChartSpec`] and draws it into an owned RGB buffer with
//! plotters, then encodes the buffer as PNG. An empty spec renders an empty
//! plot rather than failing.

use image::ImageEncoder;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;

use crate::chart::{AxisChart, ChartSpec, PieChart};
use crate::error::{EncodeError, RenderError};
use crate::table::format_number;
use crate::RenderOptions;

/// Fixed file name for the exported chart image.
pub const EXPORT_FILE_NAME: &str = "chart_export.png";
/// MIME type of the exported chart image.
pub const EXPORT_MIME_TYPE: &str = "image/png";

/// Category palette, assigned in axis order (matplotlib/plotly category10).
const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// An opaque drawable figure: the rendered RGB bitmap.
#[derive(Debug, Clone)]
pub struct Figure {
    buffer: Vec<u8>,
    width: u32,
    height: u32,
}

impl Figure {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encode the figure as PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>, EncodeError> {
        let mut png_bytes = Vec::new();
        {
            let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
            encoder.write_image(&self.buffer, self.width, self.height, image::ColorType::Rgb8)?;
        }
        Ok(png_bytes)
    }

    /// Encode and wrap the figure for download delivery.
    pub fn into_download(self) -> Result<DownloadPayload, EncodeError> {
        let bytes = self.encode_png()?;
        Ok(DownloadPayload {
            file_name: EXPORT_FILE_NAME,
            mime_type: EXPORT_MIME_TYPE,
            bytes,
        })
    }
}

/// Binary image payload exposed to the user under a fixed name.
#[derive(Debug, Clone)]
pub struct DownloadPayload {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Render a chart specification into a figure.
pub fn render_chart(spec: &ChartSpec, options: &RenderOptions) -> Result<Figure, RenderError> {
    let width = options.width;
    let height = options.height;
    let mut buffer = vec![0u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        match spec {
            ChartSpec::Bar(c) => draw_bar_chart(&root, c)?,
            ChartSpec::Line(c) => draw_line_chart(&root, c, false)?,
            ChartSpec::Area(c) => draw_line_chart(&root, c, true)?,
            ChartSpec::Scatter(c) => draw_scatter_chart(&root, c)?,
            ChartSpec::Pie(p) => draw_pie_chart(&root, p)?,
        }

        root.present().map_err(draw_err)?;
    }

    Ok(Figure {
        buffer,
        width,
        height,
    })
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// Distinct category labels in order of first appearance.
fn category_order(points: &[(String, f64)]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for (label, _) in points {
        if !categories.contains(label) {
            categories.push(label.clone());
        }
    }
    categories
}

fn category_index(categories: &[String], label: &str) -> f64 {
    categories
        .iter()
        .position(|c| c == label)
        .map(|i| i as f64)
        .unwrap_or(0.0)
}

/// Y range over the values, always including the zero baseline, padded 5%.
fn value_range(values: &[f64]) -> Range<f64> {
    if values.is_empty() {
        return 0.0..1.0;
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min).min(0.0);
    let max = values
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max)
        .max(0.0);
    if min == max {
        return (min - 1.0)..(max + 1.0);
    }
    let padding = (max - min) * 0.05;
    (min - padding)..(max + padding)
}

/// Build a cartesian chart with a categorical x axis and draw its mesh.
fn build_categorical_chart<'a, 'b>(
    root: &'a Area<'b>,
    title: &str,
    chart: &AxisChart,
    categories: &[String],
) -> Result<ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>, RenderError>
{
    let x_range = 0.0..(categories.len().max(1) as f64);
    let values: Vec<f64> = chart.points.iter().map(|(_, v)| *v).collect();
    let y_range = value_range(&values);

    let mut ctx = ChartBuilder::on(root)
        .margin(10)
        .caption(title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)
        .map_err(draw_err)?;

    let labels = categories.to_vec();
    let x_name = chart.x_name.clone();
    let y_name = chart.y_name.clone();
    ctx.configure_mesh()
        .x_labels(categories.len().max(1))
        .x_label_formatter(&move |x| {
            let idx = *x as usize;
            labels.get(idx).cloned().unwrap_or_default()
        })
        .x_desc(x_name)
        .y_desc(y_name)
        .draw()
        .map_err(draw_err)?;

    Ok(ctx)
}

/// Bars at category positions, each labeled with its numeric value.
fn draw_bar_chart(root: &Area<'_>, chart: &AxisChart) -> Result<(), RenderError> {
    let categories = category_order(&chart.points);
    let mut ctx = build_categorical_chart(root, "Bar Chart", chart, &categories)?;

    let color = PALETTE[0];
    let bar_width = 0.8;

    for (label, value) in &chart.points {
        let x_center = category_index(&categories, label) + 0.5;
        ctx.draw_series(std::iter::once(Rectangle::new(
            [
                (x_center - bar_width / 2.0, 0.0),
                (x_center + bar_width / 2.0, *value),
            ],
            color.filled(),
        )))
        .map_err(draw_err)?;
    }

    // Value labels above each bar
    ctx.draw_series(chart.points.iter().map(|(label, value)| {
        let x_center = category_index(&categories, label) + 0.5;
        Text::new(
            format_number(*value),
            (x_center, *value),
            ("sans-serif", 14).into_font(),
        )
    }))
    .map_err(draw_err)?;

    Ok(())
}

/// Connected line over the category positions; filled to the baseline when
/// drawing an area chart.
fn draw_line_chart(root: &Area<'_>, chart: &AxisChart, filled: bool) -> Result<(), RenderError> {
    let categories = category_order(&chart.points);
    let title = if filled { "Area Chart" } else { "Line Chart" };
    let mut ctx = build_categorical_chart(root, title, chart, &categories)?;

    let color = PALETTE[0];
    let series: Vec<(f64, f64)> = chart
        .points
        .iter()
        .map(|(label, value)| (category_index(&categories, label) + 0.5, *value))
        .collect();

    if filled {
        ctx.draw_series(AreaSeries::new(series, 0.0, color.mix(0.3)).border_style(&color))
            .map_err(draw_err)?;
    } else {
        ctx.draw_series(LineSeries::new(series, color.stroke_width(2)))
            .map_err(draw_err)?;
    }

    Ok(())
}

/// One point per row, colored by its category.
fn draw_scatter_chart(root: &Area<'_>, chart: &AxisChart) -> Result<(), RenderError> {
    let categories = category_order(&chart.points);
    let mut ctx = build_categorical_chart(root, "Scatter Chart", chart, &categories)?;

    for (label, value) in &chart.points {
        let idx = category_index(&categories, label);
        let color = PALETTE[idx as usize % PALETTE.len()];
        ctx.draw_series(std::iter::once(Circle::new(
            (idx + 0.5, *value),
            4,
            color.filled(),
        )))
        .map_err(draw_err)?;
    }

    Ok(())
}

/// Pie sectors drawn directly in pixel space, labeled at the slice midpoints.
fn draw_pie_chart(root: &Area<'_>, pie: &PieChart) -> Result<(), RenderError> {
    let (width, height) = root.dim_in_pixel();
    let center = (width as f64 / 2.0, height as f64 / 2.0);
    let radius = (width.min(height) as f64) * 0.35;

    let total: f64 = pie.slices.iter().map(|(_, v)| v.max(0.0)).sum();
    if total <= 0.0 {
        // Nothing to slice; leave the blank canvas
        return Ok(());
    }

    // Start at twelve o'clock, sweep clockwise
    let mut start_angle = -std::f64::consts::FRAC_PI_2;
    for (slice_idx, (label, value)) in pie.slices.iter().enumerate() {
        let value = value.max(0.0);
        if value == 0.0 {
            continue;
        }
        let sweep = value / total * std::f64::consts::TAU;
        let end_angle = start_angle + sweep;

        let steps = ((sweep.to_degrees()).ceil() as usize).max(2);
        let mut polygon: Vec<(i32, i32)> = Vec::with_capacity(steps + 2);
        polygon.push((center.0 as i32, center.1 as i32));
        for step in 0..=steps {
            let angle = start_angle + sweep * (step as f64 / steps as f64);
            let x = center.0 + radius * angle.cos();
            let y = center.1 + radius * angle.sin();
            polygon.push((x as i32, y as i32));
        }

        let color = PALETTE[slice_idx % PALETTE.len()];
        root.draw(&Polygon::new(polygon, color.filled()))
            .map_err(draw_err)?;

        let mid_angle = (start_angle + end_angle) / 2.0;
        let label_x = center.0 + radius * 1.15 * mid_angle.cos();
        let label_y = center.1 + radius * 1.15 * mid_angle.sin();
        root.draw(&Text::new(
            label.clone(),
            (label_x as i32, label_y as i32),
            ("sans-serif", 14).into_font(),
        ))
        .map_err(draw_err)?;

        start_angle = end_angle;
    }

    Ok(())
}
