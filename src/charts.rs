//! Chart rendering into in-memory raster images.
//!
//! Every chart row is drawn on its own [`Figure`], an RGB pixel buffer split into
//! two side-by-side panels.  A figure is consumed by [`Figure::into_image`], so
//! nothing drawn for one row can leak into the next.

use std::sync::OnceLock;

use image::{DynamicImage, ImageBuffer, Rgb};
use log::debug;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{ChartError, ReportError};
use crate::model::ChartKind;
use crate::stats;
use crate::table::Table;

/// Width of a chart row image in pixels.
pub const FIGURE_WIDTH_PX: u32 = 960;
/// Height of a chart row image in pixels.
pub const FIGURE_HEIGHT_PX: u32 = 400;

const FONT_FAMILY: &str = "sans-serif";
const TITLE_FONT_SIZE: u32 = 20;
const LABEL_FONT_SIZE: u32 = 13;

type Panel<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

static CHART_FONT: OnceLock<Result<(), String>> = OnceLock::new();

/// Registers the TrueType data used for chart text.
///
/// Only the first registration in a process takes effect.
pub fn register_chart_font(data: &[u8]) -> Result<(), ChartError> {
    CHART_FONT
        .get_or_init(|| {
            let data: &'static [u8] = Box::leak(data.to_vec().into_boxed_slice());
            plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, data)
                .map_err(|_| "invalid chart font data".to_owned())
        })
        .clone()
        .map_err(ChartError::new)
}

/// An RGB canvas for one row of charts.
pub struct Figure {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Figure {
    /// Creates a white canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![255; width as usize * height as usize * 3],
        }
    }

    /// Creates a canvas with the default row size.
    pub fn row() -> Self {
        Self::new(FIGURE_WIDTH_PX, FIGURE_HEIGHT_PX)
    }

    /// Size of the canvas in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Draws one chart per column into the panels of this figure, left to right.
    ///
    /// At most two columns are drawn; a missing second column leaves the right
    /// panel blank.  Errors name the panel that could not be drawn.
    pub fn draw_pair(
        &mut self,
        kind: ChartKind,
        table: &Table,
        columns: &[String],
    ) -> Result<(), ReportError> {
        let root = BitMapBackend::with_buffer(&mut self.pixels, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(|err| figure_error(err.into()))?;

        let panels = root.split_evenly((1, 2));
        for (panel, name) in panels.iter().zip(columns) {
            let title = kind.panel_title(name);
            // infinities cannot be placed on an axis
            let values: Vec<f64> = table
                .column(name)
                .map(|column| column.numbers())
                .unwrap_or_default()
                .into_iter()
                .filter(|v| v.is_finite())
                .collect();
            let scale = stats::axis_scale(&values);
            let (values, axis_label) = if scale == 1.0 {
                (values, name.to_owned())
            } else {
                let scaled = values.iter().map(|v| v / scale).collect();
                (scaled, format!("{name} (x {scale:e})"))
            };
            let drawn = match kind {
                ChartKind::BoxPlot => draw_box_plot(panel, &title, &axis_label, &values),
                ChartKind::Histogram => draw_histogram(panel, &title, &axis_label, &values),
            };
            drawn.map_err(|source| ReportError::Chart {
                chart: title,
                source,
            })?;
        }

        root.present().map_err(|err| figure_error(err.into()))?;
        Ok(())
    }

    /// Converts the canvas into an image, consuming the figure.
    pub fn into_image(self) -> Result<DynamicImage, ChartError> {
        let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_raw(self.width, self.height, self.pixels)
                .ok_or_else(|| ChartError::new("pixel buffer does not match figure size"))?;
        Ok(DynamicImage::ImageRgb8(buffer))
    }
}

fn figure_error(source: ChartError) -> ReportError {
    ReportError::Chart {
        chart: String::from("figure"),
        source,
    }
}

/// Draws one chart row for `columns` and returns it as an image.
pub fn render_row(
    kind: ChartKind,
    table: &Table,
    columns: &[String],
) -> Result<DynamicImage, ReportError> {
    debug!("drawing {:?} row for {:?}", kind, columns);
    let mut figure = Figure::row();
    figure.draw_pair(kind, table, columns)?;
    figure.into_image().map_err(figure_error)
}

fn draw_box_plot(
    panel: &Panel<'_>,
    title: &str,
    name: &str,
    values: &[f64],
) -> Result<(), ChartError> {
    let range = stats::padded_range(values);
    let labels = [name.to_owned()];

    let mut chart = ChartBuilder::on(panel)
        .caption(title, (FONT_FAMILY, TITLE_FONT_SIZE))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(20)
        .build_cartesian_2d(range.start as f32..range.end as f32, labels[..].into_segmented())?;

    // a single y key point with an empty label; zero key points panics in plotters
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(1)
        .y_label_formatter(&|_| String::new())
        .x_desc(name)
        .label_style((FONT_FAMILY, LABEL_FONT_SIZE))
        .draw()?;

    if values.is_empty() {
        return Ok(());
    }

    let quartiles = Quartiles::new(values);
    let [lower_fence, _, _, _, upper_fence] = quartiles.values();
    let center = SegmentValue::CenterOf(&labels[0]);

    chart.draw_series(std::iter::once(
        Boxplot::new_horizontal(center.clone(), &quartiles)
            .width(60)
            .whisker_width(0.5)
            .style(BLUE),
    ))?;

    chart.draw_series(
        values
            .iter()
            .map(|&v| v as f32)
            .filter(|&v| v < lower_fence || v > upper_fence)
            .map(|v| Circle::new((v, center.clone()), 4, BLACK.filled())),
    )?;

    Ok(())
}

fn draw_histogram(
    panel: &Panel<'_>,
    title: &str,
    axis_label: &str,
    values: &[f64],
) -> Result<(), ChartError> {
    let bins = stats::histogram(values);
    let x_range = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => first.start..last.end,
        _ => stats::padded_range(values),
    };
    let bin_width = bins.first().map_or(1.0, |bin| bin.end - bin.start);
    let curve = stats::gaussian_kde(values, x_range.clone(), values.len() as f64 * bin_width);

    let max_count = bins.iter().map(|bin| bin.count).max().unwrap_or(0) as f64;
    let max_curve = curve.iter().map(|&(_, y)| y).fold(0.0, f64::max);
    let y_top = (max_count.max(max_curve) * 1.1).max(1.0);

    let mut chart = ChartBuilder::on(panel)
        .caption(title, (FONT_FAMILY, TITLE_FONT_SIZE))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, 0.0..y_top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(axis_label)
        .y_desc("Count")
        .label_style((FONT_FAMILY, LABEL_FONT_SIZE))
        .draw()?;

    chart.draw_series(bins.iter().map(|bin| {
        Rectangle::new(
            [(bin.start, 0.0), (bin.end, bin.count as f64)],
            BLUE.mix(0.4).filled(),
        )
    }))?;
    chart.draw_series(bins.iter().map(|bin| {
        Rectangle::new([(bin.start, 0.0), (bin.end, bin.count as f64)], BLUE.stroke_width(1))
    }))?;

    if !curve.is_empty() {
        chart.draw_series(LineSeries::new(curve, BLUE.stroke_width(2)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{register_chart_font, render_row, Figure, FIGURE_HEIGHT_PX, FIGURE_WIDTH_PX};
    use crate::fonts;
    use crate::model::ChartKind;
    use crate::table::{Column, Table, Value};

    fn chart_fonts_ready() -> bool {
        if !fonts::report_fonts_available() {
            eprintln!("Skipping chart drawing test: report fonts missing.");
            return false;
        }
        let fonts = fonts::load_report_fonts().expect("load report fonts");
        register_chart_font(&fonts.chart_font).expect("register chart font");
        true
    }

    fn chart_table() -> Table {
        Table::new(vec![
            Column::new(
                "C",
                vec![Value::Float(1.5), Value::Null, Value::Float(3.0), Value::Float(40.0)],
            ),
            Column::new("D", [10.0, 12.5, 9.0, 30.0]),
            Column::new("huge", [1e308, -1e308, 0.0, 5.0]),
        ])
        .unwrap()
    }

    #[test]
    fn new_figure_is_white_rgb() {
        let figure = Figure::new(4, 3);
        assert_eq!(figure.dimensions(), (4, 3));
        let image = figure.into_image().unwrap();
        let image = image.as_rgb8().expect("figure should be RGB");
        assert_eq!(image.dimensions(), (4, 3));
        assert!(image.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn draws_box_plot_and_histogram_rows() {
        if !chart_fonts_ready() {
            return;
        }
        let table = chart_table();
        let pair = ["C".to_string(), "D".to_string()];

        for kind in [ChartKind::BoxPlot, ChartKind::Histogram] {
            let image = render_row(kind, &table, &pair).unwrap();
            let image = image.as_rgb8().expect("row should be RGB");
            assert_eq!(image.dimensions(), (FIGURE_WIDTH_PX, FIGURE_HEIGHT_PX));
            assert!(image.pixels().any(|p| p.0 != [255, 255, 255]), "{kind:?} row is blank");
        }
    }

    #[test]
    fn draws_single_column_and_extreme_value_rows() {
        if !chart_fonts_ready() {
            return;
        }
        let table = chart_table();

        for kind in [ChartKind::BoxPlot, ChartKind::Histogram] {
            render_row(kind, &table, &["huge".to_string()]).unwrap();
            render_row(kind, &table, &["missing".to_string()]).unwrap();
        }
    }
}
