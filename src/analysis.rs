//! Computes the content of every report section from a table.

use log::debug;
use rand::rngs::StdRng;
use rand::{seq::index, Rng, SeedableRng};

use crate::config::ReportConfig;
use crate::model::{ChartKind, Comparison, OverflowPolicy, ReportSummary, Section, SectionBody};
use crate::table::Table;

/// Section titles in report order.
pub const SECTION_TITLES: [&str; 6] = [
    "1. Columns with Missing Values",
    "2. Numeric Columns",
    "3. Columns with Duplicates (Before and After)",
    "4. Constant Columns (Before and After)",
    "5. Box plot for all numeric columns",
    "6. Histogram for any 6 numeric columns",
];

/// Columns that have at least one missing value, with their counts.
pub fn missing_values(table: &Table) -> Vec<(String, usize)> {
    table
        .missing_counts()
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// Drops duplicate column names from `table` and returns the before/after lists.
pub fn remove_duplicate_columns(table: &mut Table) -> Comparison {
    let before = table.column_names();
    let dropped = table.drop_duplicate_columns();
    debug!("dropped {dropped} duplicate column(s)");
    Comparison::new(before, table.column_names())
}

/// Drops constant columns from `table` and returns the before/after lists.
pub fn remove_constant_columns(table: &mut Table) -> Comparison {
    let before = table.column_names();
    let dropped = table.drop_constant_columns();
    debug!("dropped constant column(s): {dropped:?}");
    Comparison::new(before, table.column_names())
}

/// Picks at most `limit` names uniformly at random without replacement.
///
/// When `names` has no more than `limit` entries every name is returned. The
/// selected names keep their original relative order.
pub fn sample_columns<R: Rng + ?Sized>(names: &[String], limit: usize, rng: &mut R) -> Vec<String> {
    if names.len() <= limit {
        return names.to_vec();
    }
    let mut picked = index::sample(rng, names.len(), limit).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|i| names[i].clone()).collect()
}

fn histogram_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Result of running every analysis step on a table.
#[derive(Clone, Debug)]
pub struct Analysis {
    /// Content of every report section.
    pub summary: ReportSummary,
    /// The table after duplicate and constant columns were dropped.
    pub cleaned: Table,
}

/// Runs every analysis step in report order and returns only the section content.
pub fn summarize(table: &Table, config: &ReportConfig) -> ReportSummary {
    analyze(table, config).summary
}

/// Runs every analysis step in report order.
///
/// The caller's table is left untouched; cleaning steps operate on a working copy
/// so each comparison reflects the state left by the previous one.
pub fn analyze(table: &Table, config: &ReportConfig) -> Analysis {
    let mut working = table.clone();

    let missing = missing_values(&working);
    let numeric = working.numeric_column_names();
    let duplicates = remove_duplicate_columns(&mut working);
    let constants = remove_constant_columns(&mut working);

    let cleaned_numeric = working.numeric_column_names();
    let mut rng = histogram_rng(config.seed());
    let histogram_columns = sample_columns(&cleaned_numeric, config.histogram_columns(), &mut rng);
    debug!(
        "charting {} numeric column(s), {} in histograms",
        cleaned_numeric.len(),
        histogram_columns.len()
    );

    let histogram_overflow = if config.histograms_paginate() {
        OverflowPolicy::Paginate
    } else {
        OverflowPolicy::Overflow
    };

    let summary = ReportSummary::new(vec![
        Section::new(SECTION_TITLES[0], SectionBody::MissingValues(missing)),
        Section::new(
            SECTION_TITLES[1],
            SectionBody::ColumnList {
                names: numeric,
                columns: config.list_columns(),
            },
        ),
        Section::new(SECTION_TITLES[2], SectionBody::Comparison(duplicates)),
        Section::new(SECTION_TITLES[3], SectionBody::Comparison(constants)),
        Section::new(
            SECTION_TITLES[4],
            SectionBody::Charts {
                kind: ChartKind::BoxPlot,
                columns: cleaned_numeric,
                overflow: OverflowPolicy::Paginate,
            },
        ),
        Section::new(
            SECTION_TITLES[5],
            SectionBody::Charts {
                kind: ChartKind::Histogram,
                columns: histogram_columns,
                overflow: histogram_overflow,
            },
        ),
    ]);

    Analysis {
        summary,
        cleaned: working,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{analyze, missing_values, sample_columns, summarize};
    use crate::config::ReportConfig;
    use crate::model::{ChartKind, OverflowPolicy, SectionBody};
    use crate::table::{Column, Table, Value};

    fn names(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("col{i}")).collect()
    }

    fn example_table() -> Table {
        Table::new(vec![
            Column::new("A", ["x", "y", "z"]),
            Column::new("A", [1i64, 2, 3]),
            Column::new("B", [1i64, 1, 1]),
            Column::new("C", vec![Value::Float(1.5), Value::Null, Value::Float(3.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn end_to_end_section_content() {
        let table = example_table();
        let summary = summarize(&table, &ReportConfig::new().with_seed(7));

        assert_eq!(
            summary.missing_values().unwrap(),
            &[("C".to_string(), 1)]
        );

        let comparisons = summary.comparisons();
        assert_eq!(comparisons[0].before(), &["A", "A", "B", "C"]);
        assert_eq!(comparisons[0].after(), &["A", "B", "C"]);
        assert_eq!(comparisons[1].before(), &["A", "B", "C"]);
        assert_eq!(comparisons[1].after(), &["A", "C"]);

        assert_eq!(summary.numeric_columns().unwrap(), &["A", "B", "C"]);
        assert_eq!(summary.chart_columns(ChartKind::BoxPlot).unwrap(), &["C"]);
        assert_eq!(summary.chart_columns(ChartKind::Histogram).unwrap(), &["C"]);

        // the caller's table is not modified
        assert_eq!(table.columns().len(), 4);
    }

    #[test]
    fn cleaned_table_matches_final_comparison() {
        let table = example_table();
        let analysis = analyze(&table, &ReportConfig::new());
        let comparisons = analysis.summary.comparisons();
        assert_eq!(analysis.cleaned.column_names(), comparisons[1].after());
    }

    #[test]
    fn missing_values_match_recount() {
        let table = example_table();
        let expected: Vec<_> = table
            .columns()
            .iter()
            .map(|c| (c.name().to_string(), c.values().iter().filter(|v| v.is_missing()).count()))
            .filter(|(_, n)| *n > 0)
            .collect();
        assert_eq!(missing_values(&table), expected);
    }

    #[test]
    fn sampling_returns_all_when_few_columns() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(sample_columns(&names(6), 6, &mut rng), names(6));
        assert_eq!(sample_columns(&names(2), 6, &mut rng), names(2));
    }

    #[test]
    fn sampling_picks_unique_members() {
        let all = names(20);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = sample_columns(&all, 6, &mut rng);
            assert_eq!(picked.len(), 6);
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(unique.len(), 6);
            assert!(picked.iter().all(|name| all.contains(name)));
        }
    }

    #[test]
    fn seeded_summaries_are_identical() {
        let columns = (0..10)
            .map(|i| Column::new(format!("n{i}"), [i as i64, i as i64 + 1, 0]))
            .collect();
        let table = Table::new(columns).unwrap();
        let config = ReportConfig::new().with_seed(42);

        assert_eq!(summarize(&table, &config), summarize(&table, &config));
    }

    #[test]
    fn histogram_pagination_follows_config() {
        let table = example_table();
        let overflow_of = |config: &ReportConfig| {
            summarize(&table, config)
                .sections()
                .iter()
                .find_map(|s| match s.body() {
                    SectionBody::Charts {
                        kind: ChartKind::Histogram,
                        overflow,
                        ..
                    } => Some(*overflow),
                    _ => None,
                })
        };

        assert_eq!(overflow_of(&ReportConfig::new()), Some(OverflowPolicy::Overflow));
        assert_eq!(
            overflow_of(&ReportConfig::new().paginate_histograms(true)),
            Some(OverflowPolicy::Paginate)
        );
    }

    #[test]
    fn table_without_numeric_columns_yields_empty_chart_sections() {
        let table = Table::new(vec![Column::new("name", ["a", "b"])]).unwrap();
        let summary = summarize(&table, &ReportConfig::new());
        assert!(summary.numeric_columns().unwrap().is_empty());
        assert!(summary.chart_columns(ChartKind::BoxPlot).unwrap().is_empty());
        assert!(summary.chart_columns(ChartKind::Histogram).unwrap().is_empty());
    }
}
