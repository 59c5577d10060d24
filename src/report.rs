//! Turns a [`ReportSummary`] into a PDF document.

use std::fs;
use std::path::PathBuf;

use genpdf::elements::{FrameCellDecorator, PageBreak, Paragraph, TableLayout};
use genpdf::error::Error;
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::Style;
use genpdf::{Alignment, Element, Margins};
use image::DynamicImage;
use log::{debug, info};

use crate::analysis::{self, Analysis};
use crate::builder::DocumentBuilder;
use crate::charts;
use crate::config::ReportConfig;
use crate::elements::{mm_from_f64, PinnedImages, UnderlinedText};
use crate::error::ReportError;
use crate::fonts;
use crate::layout::{self, PageGeometry, SECTION_TITLE_HEIGHT_MM};
use crate::model::{ChartKind, Comparison, OverflowPolicy, ReportSummary, SectionBody};
use crate::table::Table;

const BODY_FONT_SIZE: u8 = 9;
const HEADER_FONT_SIZE: u8 = 12;
const SECTION_FONT_SIZE: u8 = 10;
const FOOTER_FONT_SIZE: u8 = 8;
const MISSING_TABLE_WEIGHTS: [usize; 2] = [110, 30];

/// A rendered report together with the content it was rendered from.
#[derive(Debug)]
pub struct RenderedReport {
    /// Serialized PDF document.
    pub bytes: Vec<u8>,
    /// Section content of the report.
    pub summary: ReportSummary,
}

/// Generates data reports according to a [`ReportConfig`].
#[derive(Clone, Debug, Default)]
pub struct ReportGenerator {
    config: ReportConfig,
    geometry: PageGeometry,
}

impl ReportGenerator {
    /// Creates a generator for the given configuration.
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            geometry: PageGeometry::default(),
        }
    }

    /// Returns the configuration used by this generator.
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Computes the content of every section without rendering anything.
    pub fn summarize(&self, table: &Table) -> ReportSummary {
        analysis::summarize(table, &self.config)
    }

    /// Renders the report for `table` into memory.
    pub fn render(&self, table: &Table) -> Result<RenderedReport, ReportError> {
        let Analysis { summary, cleaned } = analysis::analyze(table, &self.config);

        let fonts = fonts::load_report_fonts().map_err(ReportError::FontLoad)?;
        charts::register_chart_font(&fonts.chart_font).map_err(|source| ReportError::Chart {
            chart: String::from("font registration"),
            source,
        })?;
        debug!("rendering report with font family '{}'", fonts.family_name);

        let mut document = self.document_builder(fonts.family).build();
        document.set_title(self.config.title());
        document.set_font_size(BODY_FONT_SIZE);

        for (index, section) in summary.sections().iter().enumerate() {
            if index > 0 {
                document.push(PageBreak::new());
            }
            document.push(section_title(section.title()));

            match section.body() {
                SectionBody::MissingValues(counts) => document.push(missing_values_table(counts)?),
                SectionBody::ColumnList { names, columns } => {
                    document.push(column_list(names, *columns)?)
                }
                SectionBody::Comparison(comparison) => {
                    document.push(comparison_table(comparison)?)
                }
                SectionBody::Charts {
                    kind,
                    columns,
                    overflow,
                } => {
                    let draw_row = |pair: &[String]| charts::render_row(*kind, &cleaned, pair);
                    for (page, images) in self
                        .chart_pages(*kind, columns, *overflow, draw_row)?
                        .into_iter()
                        .enumerate()
                    {
                        if page > 0 {
                            document.push(PageBreak::new());
                        }
                        document.push(images);
                    }
                }
            }
        }

        let mut bytes = Vec::new();
        document.render(&mut bytes)?;
        Ok(RenderedReport { bytes, summary })
    }

    /// Renders the report for `table` and writes it to the configured output path.
    pub fn generate(&self, table: &Table) -> Result<(PathBuf, RenderedReport), ReportError> {
        let report = self.render(table)?;
        let path = self.config.output_path().to_path_buf();
        fs::write(&path, &report.bytes)?;
        info!(
            "pdf generated successfully: {} ({} bytes)",
            path.display(),
            report.bytes.len()
        );
        Ok((path, report))
    }

    fn document_builder(&self, family: FontFamily<FontData>) -> DocumentBuilder {
        let title = self.config.title().to_owned();
        DocumentBuilder::new(family)
            .with_geometry(self.geometry)
            .with_header(move |_| {
                UnderlinedText::new(
                    title.clone(),
                    Style::new().bold().with_font_size(HEADER_FONT_SIZE),
                )
                .with_alignment(Alignment::Center)
            })
            .with_footer(|page| {
                Paragraph::new(format!("Page {page}"))
                    .aligned(Alignment::Center)
                    .styled(Style::new().italic().with_font_size(FOOTER_FONT_SIZE))
            })
    }

    /// Draws every chart row and groups the images by page.
    fn chart_pages<F>(
        &self,
        kind: ChartKind,
        columns: &[String],
        overflow: OverflowPolicy,
        mut draw_row: F,
    ) -> Result<Vec<PinnedImages>, ReportError>
    where
        F: FnMut(&[String]) -> Result<DynamicImage, ReportError>,
    {
        let chart_layout = self.config.chart_layout();
        let placements = chart_layout.place_rows(layout::chart_rows(columns.len()), overflow);

        let mut pages: Vec<PinnedImages> = Vec::new();
        for (pair, placement) in columns.chunks(2).zip(placements) {
            while pages.len() <= placement.page {
                let origin = if pages.is_empty() {
                    self.geometry.body_top() + SECTION_TITLE_HEIGHT_MM
                } else {
                    self.geometry.body_top()
                };
                pages.push(PinnedImages::new(self.geometry, origin));
            }

            let image = draw_row(pair)?;
            pages[placement.page].push(image, placement.x, placement.y, chart_layout.image_width)?;
        }

        debug!("{:?} section uses {} page(s)", kind, pages.len().max(1));
        Ok(pages)
    }
}

fn section_title(title: &str) -> UnderlinedText {
    UnderlinedText::new(title, Style::new().bold().with_font_size(SECTION_FONT_SIZE))
        .with_height(mm_from_f64(SECTION_TITLE_HEIGHT_MM))
}

fn header_cell(text: &str) -> UnderlinedText {
    UnderlinedText::new(text, Style::new().bold().with_font_size(BODY_FONT_SIZE))
        .with_alignment(Alignment::Center)
}

fn cell(text: &str) -> impl Element {
    Paragraph::new(text).padded(Margins::trbl(3, 2, 3, 2))
}

fn centered_cell(text: &str) -> impl Element {
    Paragraph::new(text)
        .aligned(Alignment::Center)
        .padded(Margins::trbl(3, 2, 3, 2))
}

fn missing_values_table(counts: &[(String, usize)]) -> Result<TableLayout, Error> {
    let mut table = TableLayout::new(MISSING_TABLE_WEIGHTS.to_vec());
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    table
        .row()
        .element(header_cell("Column Name").padded(Margins::trbl(3, 2, 3, 2)))
        .element(header_cell("Missing Values").padded(Margins::trbl(3, 2, 3, 2)))
        .push()?;

    for (name, count) in counts {
        table
            .row()
            .element(cell(name))
            .element(centered_cell(&count.to_string()))
            .push()?;
    }

    Ok(table)
}

fn column_list(names: &[String], columns: usize) -> Result<TableLayout, Error> {
    let columns = columns.max(1);
    let mut table = TableLayout::new(vec![1; columns]);

    for row in layout::multicolumn_rows(names, columns) {
        let cells: Vec<Box<dyn Element>> = row
            .into_iter()
            .map(|name| {
                let text = name.map_or("", String::as_str);
                Box::new(Paragraph::new(text).padded(Margins::trbl(0.5, 0, 0.5, 0))) as Box<dyn Element>
            })
            .collect();
        table.push_row(cells)?;
    }

    Ok(table)
}

fn comparison_table(comparison: &Comparison) -> Result<TableLayout, Error> {
    let mut table = TableLayout::new(vec![1, 1]);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    table
        .row()
        .element(header_cell("Before").padded(Margins::trbl(3, 2, 3, 2)))
        .element(header_cell("After").padded(Margins::trbl(3, 2, 3, 2)))
        .push()?;

    for (before, after) in comparison.rows() {
        table
            .row()
            .element(cell(before))
            .element(cell(after.unwrap_or("")))
            .push()?;
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, ImageBuffer, Rgb};

    use super::ReportGenerator;
    use crate::charts::{FIGURE_HEIGHT_PX, FIGURE_WIDTH_PX};
    use crate::config::ReportConfig;
    use crate::elements::PinnedImages;
    use crate::layout::PageGeometry;
    use crate::model::{ChartKind, OverflowPolicy};

    fn columns(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("n{i}")).collect()
    }

    fn pages(kind: ChartKind, count: usize, overflow: OverflowPolicy) -> Vec<PinnedImages> {
        let generator = ReportGenerator::new(ReportConfig::new());
        let mut rows = 0;
        let pages = generator
            .chart_pages(kind, &columns(count), overflow, |pair| {
                assert!(pair.len() <= 2);
                rows += 1;
                let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::new(FIGURE_WIDTH_PX, FIGURE_HEIGHT_PX);
                Ok(DynamicImage::ImageRgb8(buffer))
            })
            .unwrap();
        assert_eq!(rows, (count + 1) / 2);
        pages
    }

    fn available_height(page: usize) -> f64 {
        let geometry = PageGeometry::default();
        let origin = if page == 0 {
            geometry.body_top() + crate::layout::SECTION_TITLE_HEIGHT_MM
        } else {
            geometry.body_top()
        };
        geometry.body_bottom() - origin
    }

    #[test]
    fn box_plot_rows_continue_on_a_second_page() {
        let pages = pages(ChartKind::BoxPlot, 7, OverflowPolicy::Paginate);

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].len(), 3);
        assert_eq!(pages[1].len(), 1);
        for (index, page) in pages.iter().enumerate() {
            assert!(page.offsets(available_height(index)).iter().all(Option::is_some));
        }
    }

    #[test]
    fn continuation_row_sits_just_below_the_header() {
        let pages = pages(ChartKind::BoxPlot, 7, OverflowPolicy::Paginate);
        let offsets = pages[1].offsets(available_height(1));
        let (dx, dy) = offsets[0].unwrap();
        assert_eq!(dx, 0.0);
        assert!((dy - 3.0).abs() < 1e-9, "dy was {dy}");
    }

    #[test]
    fn first_row_sits_directly_below_the_section_title() {
        let pages = pages(ChartKind::BoxPlot, 2, OverflowPolicy::Paginate);
        assert_eq!(pages[0].offsets(available_height(0)), vec![Some((0.0, 0.0))]);
    }

    #[test]
    fn overflowing_histogram_rows_are_skipped() {
        let pages = pages(ChartKind::Histogram, 10, OverflowPolicy::Overflow);

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].len(), 5);
        let kept = pages[0]
            .offsets(available_height(0))
            .into_iter()
            .flatten()
            .count();
        assert_eq!(kept, 3);
    }

    #[test]
    fn no_columns_give_no_chart_pages() {
        let pages = pages(ChartKind::BoxPlot, 0, OverflowPolicy::Paginate);
        assert!(pages.is_empty());
        let mut page = PinnedImages::new(PageGeometry::default(), 27.0);
        assert!(page.is_empty());
        let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::new(4, 2);
        page.push(DynamicImage::ImageRgb8(buffer), 10.0, 30.0, 190.0).unwrap();
        assert!(!page.is_empty());
    }
}
