//! Data structures describing the logical content of a data report.
//!
//! The analysis phase produces a [`ReportSummary`] made of [`Section`]s, and the
//! renderer in [`crate::report`] turns each section into PDF content.  Keeping
//! the two apart means the content of a report can be inspected and compared
//! without rendering anything.

/// Kind of chart drawn for a set of columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    /// Horizontal box plot with whiskers and outliers.
    BoxPlot,
    /// Histogram with a smoothed density overlay.
    Histogram,
}

impl ChartKind {
    /// Returns the title shown above a single chart panel.
    pub fn panel_title(self, column: &str) -> String {
        match self {
            Self::BoxPlot => format!("Box Plot of {column}"),
            Self::Histogram => format!("Distribution of {column}"),
        }
    }
}

/// Whether a chart section breaks onto a new page when a row does not fit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Start a new page once the vertical cursor passes the overflow threshold.
    #[default]
    Paginate,
    /// Keep advancing the cursor on the same page.
    Overflow,
}

/// A before/after pair of column-name lists around a cleaning step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Comparison {
    before: Vec<String>,
    after: Vec<String>,
}

impl Comparison {
    /// Creates a comparison from the two lists.
    pub fn new(before: Vec<String>, after: Vec<String>) -> Self {
        Self { before, after }
    }

    /// Column names prior to the cleaning step.
    pub fn before(&self) -> &[String] {
        &self.before
    }

    /// Column names after the cleaning step.
    pub fn after(&self) -> &[String] {
        &self.after
    }

    /// Rows of the rendered comparison.
    ///
    /// Each `before` name is paired with itself when it still exists after the
    /// cleaning step and with `None` otherwise.
    pub fn rows(&self) -> impl Iterator<Item = (&str, Option<&str>)> + '_ {
        self.before.iter().map(move |name| {
            let after = self
                .after
                .iter()
                .any(|kept| kept == name)
                .then_some(name.as_str());
            (name.as_str(), after)
        })
    }
}

/// Body of a report section.
#[derive(Clone, Debug, PartialEq)]
pub enum SectionBody {
    /// Columns with at least one missing value and their counts.
    MissingValues(Vec<(String, usize)>),
    /// Plain list of column names laid out in several display columns.
    ColumnList {
        /// Names to list.
        names: Vec<String>,
        /// Number of display columns.
        columns: usize,
    },
    /// Before/after comparison of column names.
    Comparison(Comparison),
    /// Charts drawn two per row.
    Charts {
        /// Kind of chart.
        kind: ChartKind,
        /// Columns to chart, in drawing order.
        columns: Vec<String>,
        /// Behaviour when the rows do not fit on the page.
        overflow: OverflowPolicy,
    },
}

/// A titled section of the report. Every section starts on its own page.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    title: String,
    body: SectionBody,
}

impl Section {
    /// Creates a new section.
    pub fn new(title: impl Into<String>, body: SectionBody) -> Self {
        Self {
            title: title.into(),
            body,
        }
    }

    /// Returns the section title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the section body.
    pub fn body(&self) -> &SectionBody {
        &self.body
    }
}

/// Content of a whole report, in rendering order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportSummary {
    sections: Vec<Section>,
}

impl ReportSummary {
    /// Creates a summary from the given sections.
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Returns the sections in order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Returns the missing-value counts if the summary has such a section.
    pub fn missing_values(&self) -> Option<&[(String, usize)]> {
        self.sections.iter().find_map(|s| match s.body() {
            SectionBody::MissingValues(counts) => Some(counts.as_slice()),
            _ => None,
        })
    }

    /// Returns the column list of the first list section.
    pub fn numeric_columns(&self) -> Option<&[String]> {
        self.sections.iter().find_map(|s| match s.body() {
            SectionBody::ColumnList { names, .. } => Some(names.as_slice()),
            _ => None,
        })
    }

    /// Returns the comparisons in section order.
    pub fn comparisons(&self) -> Vec<&Comparison> {
        self.sections
            .iter()
            .filter_map(|s| match s.body() {
                SectionBody::Comparison(comparison) => Some(comparison),
                _ => None,
            })
            .collect()
    }

    /// Returns the charted columns for the given chart kind.
    pub fn chart_columns(&self, kind: ChartKind) -> Option<&[String]> {
        self.sections.iter().find_map(|s| match s.body() {
            SectionBody::Charts {
                kind: k, columns, ..
            } if *k == kind => Some(columns.as_slice()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Comparison;

    #[test]
    fn comparison_blanks_removed_names() {
        let comparison = Comparison::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec!["a".into(), "c".into()],
        );

        let rows: Vec<_> = comparison.rows().collect();
        assert_eq!(
            rows,
            vec![("a", Some("a")), ("b", None), ("c", Some("c"))]
        );
    }

    #[test]
    fn comparison_keeps_every_duplicate_row() {
        let comparison = Comparison::new(
            vec!["a".into(), "a".into(), "b".into()],
            vec!["a".into(), "b".into()],
        );

        let rows: Vec<_> = comparison.rows().collect();
        assert_eq!(
            rows,
            vec![("a", Some("a")), ("a", Some("a")), ("b", Some("b"))]
        );
    }
}
