//! Report generation settings.

use std::path::{Path, PathBuf};

use crate::layout::ChartLayout;

/// File name used when no output path is configured.
pub const DEFAULT_OUTPUT_PATH: &str = "data-analysis-report.pdf";

/// Title printed in the header of every page.
pub const DEFAULT_TITLE: &str = "Data Analysis Report";

/// Maximum number of columns shown in the histogram section.
pub const DEFAULT_HISTOGRAM_COLUMNS: usize = 6;

/// Number of display columns used for the numeric column listing.
pub const DEFAULT_LIST_COLUMNS: usize = 2;

/// Settings for a single report run.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportConfig {
    output_path: PathBuf,
    title: String,
    seed: Option<u64>,
    histogram_columns: usize,
    list_columns: usize,
    paginate_histograms: bool,
    chart_layout: ChartLayout,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            title: DEFAULT_TITLE.to_owned(),
            seed: None,
            histogram_columns: DEFAULT_HISTOGRAM_COLUMNS,
            list_columns: DEFAULT_LIST_COLUMNS,
            paginate_histograms: false,
            chart_layout: ChartLayout::default(),
        }
    }
}

impl ReportConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path of the generated PDF file.
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Sets the title printed in every page header.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Seeds the random column selection of the histogram section.
    pub fn with_seed(mut self, seed: impl Into<Option<u64>>) -> Self {
        self.seed = seed.into();
        self
    }

    /// Sets how many columns the histogram section samples at most.
    pub fn with_histogram_columns(mut self, count: usize) -> Self {
        self.histogram_columns = count;
        self
    }

    /// Sets how many display columns the numeric column list uses. Zero is treated as one.
    pub fn with_list_columns(mut self, count: usize) -> Self {
        self.list_columns = count.max(1);
        self
    }

    /// Lets the histogram section break onto new pages like the box plot section.
    pub fn paginate_histograms(mut self, paginate: bool) -> Self {
        self.paginate_histograms = paginate;
        self
    }

    /// Replaces the chart placement geometry.
    pub fn with_chart_layout(mut self, layout: ChartLayout) -> Self {
        self.chart_layout = layout;
        self
    }

    /// Path of the generated PDF file.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Title printed in every page header.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Seed for the histogram column selection.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Maximum number of histogram columns.
    pub fn histogram_columns(&self) -> usize {
        self.histogram_columns
    }

    /// Number of display columns for the numeric column list.
    pub fn list_columns(&self) -> usize {
        self.list_columns
    }

    /// Whether the histogram section paginates.
    pub fn histograms_paginate(&self) -> bool {
        self.paginate_histograms
    }

    /// Chart placement geometry.
    pub fn chart_layout(&self) -> &ChartLayout {
        &self.chart_layout
    }
}
