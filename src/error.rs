//! Error type returned by report generation.

use std::fmt;
use std::io;

use plotters::drawing::DrawingAreaErrorKind;

/// Failure while drawing a chart into its pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartError {
    message: String,
}

impl ChartError {
    /// Creates a chart error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ChartError {}

impl<E> From<DrawingAreaErrorKind<E>> for ChartError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        Self::new(err.to_string())
    }
}

/// Errors that can occur while generating a report.
#[derive(Debug)]
pub enum ReportError {
    /// The report font family could not be located or loaded.
    FontLoad(genpdf::error::Error),
    /// The PDF document could not be laid out or rendered.
    Render(genpdf::error::Error),
    /// A chart could not be drawn.
    Chart {
        /// Title of the chart panel that failed.
        chart: String,
        /// Underlying drawing failure.
        source: ChartError,
    },
    /// The rendered document could not be written.
    Io(io::Error),
}

impl From<genpdf::error::Error> for ReportError {
    fn from(err: genpdf::error::Error) -> Self {
        Self::Render(err)
    }
}

impl From<io::Error> for ReportError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FontLoad(_) => write!(f, "Failed to load report fonts"),
            Self::Render(_) => write!(f, "Failed to render PDF document"),
            Self::Chart { chart, .. } => write!(f, "Failed to draw chart '{chart}'"),
            Self::Io(_) => write!(f, "Failed to write report"),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FontLoad(err) | Self::Render(err) => Some(err),
            Self::Chart { source, .. } => Some(source),
            Self::Io(err) => Some(err),
        }
    }
}
