//! Data quality and distribution reports for tabular datasets.
//!
//! A [`Table`] goes through a fixed analysis pipeline (missing values, numeric
//! columns, duplicate and constant column removal, box plots, histograms) and
//! the result is rendered into a multi-page PDF with `genpdf`.
//!
//! ```no_run
//! use datareport::{Column, ReportConfig, ReportGenerator, Table, Value};
//!
//! let table = Table::new(vec![
//!     Column::new("city", ["Oslo", "Lima", "Pune"]),
//!     Column::new("population", [0.7, 10.0, 7.4]),
//!     Column::new("rainfall", vec![Value::Float(763.0), Value::Null, Value::Float(722.0)]),
//! ])?;
//!
//! let generator = ReportGenerator::new(ReportConfig::new().with_seed(7));
//! let (path, report) = generator.generate(&table)?;
//! println!("{} ({} bytes)", path.display(), report.bytes.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod analysis;
pub mod builder;
pub mod charts;
pub mod config;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod model;
pub mod report;
pub mod stats;
pub mod table;

use std::path::PathBuf;

pub use config::ReportConfig;
pub use error::{ChartError, ReportError};
pub use layout::ChartLayout;
pub use model::{ChartKind, Comparison, OverflowPolicy, ReportSummary, Section, SectionBody};
pub use report::{RenderedReport, ReportGenerator};
pub use table::{Column, DataType, RaggedColumnsError, Table, Value};

/// Generates the report for `table` with the default configuration.
///
/// The PDF is written to [`config::DEFAULT_OUTPUT_PATH`] in the working directory.
pub fn generate_pdf(table: &Table) -> Result<(PathBuf, RenderedReport), ReportError> {
    ReportGenerator::default().generate(table)
}
