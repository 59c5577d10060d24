//! In-memory tabular data consumed by the report generator.
//!
//! A [`Table`] is an ordered list of named [`Column`]s. Unlike most dataframe
//! libraries, column names are allowed to repeat: detecting and dropping such
//! duplicates is one of the things the report is about.

use std::collections::HashSet;
use std::fmt;

/// A single cell value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Missing value.
    Null,
    /// Integer value.
    Int(i64),
    /// Floating point value. `NaN` is treated as missing.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Free-form text.
    Text(String),
}

impl Value {
    /// Returns `true` for [`Value::Null`] and for `NaN` floats.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Float(value) => value.is_nan(),
            _ => false,
        }
    }

    /// Returns `true` for integer and floating point values.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Returns the value as `f64` if it is a non-missing number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) if !value.is_nan() => Some(*value),
            _ => None,
        }
    }

    fn distinct_key(&self) -> Option<DistinctKey<'_>> {
        if self.is_missing() {
            return None;
        }
        let key = match self {
            Self::Int(value) => DistinctKey::Number(normalized_bits(*value as f64)),
            Self::Float(value) => DistinctKey::Number(normalized_bits(*value)),
            Self::Bool(value) => DistinctKey::Bool(*value),
            Self::Text(value) => DistinctKey::Text(value),
            Self::Null => return None,
        };
        Some(key)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

// Equal numbers hash equal regardless of whether they arrived as Int or Float.
fn normalized_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

#[derive(Hash, PartialEq, Eq)]
enum DistinctKey<'a> {
    Number(u64),
    Bool(bool),
    Text(&'a str),
}

/// Inferred type of a column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DataType {
    /// Every present value is an integer or a float.
    Numeric,
    /// Anything else, including columns without any present value.
    #[default]
    Other,
}

impl DataType {
    /// Infers the data type from the provided values.
    pub fn infer(values: &[Value]) -> Self {
        let mut present = values.iter().filter(|value| !value.is_missing()).peekable();
        if present.peek().is_none() {
            return Self::Other;
        }
        if present.all(Value::is_numeric) {
            Self::Numeric
        } else {
            Self::Other
        }
    }
}

/// A named column of values.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Value>,
    data_type: DataType,
}

impl Column {
    /// Creates a column, inferring its data type from the values.
    pub fn new<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let data_type = DataType::infer(&values);
        Self {
            name: name.into(),
            values,
            data_type,
        }
    }

    /// Overrides the inferred data type and returns the updated column.
    ///
    /// Useful for typed columns that have no rows yet.
    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Returns the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the column values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns the data type of the column.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Returns `true` if the column holds numbers.
    pub fn is_numeric(&self) -> bool {
        self.data_type == DataType::Numeric
    }

    /// Number of missing values in the column.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_missing()).count()
    }

    /// Number of distinct present values. Missing values are not counted.
    pub fn distinct_count(&self) -> usize {
        self.values
            .iter()
            .filter_map(Value::distinct_key)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Returns `true` if the column has at most one distinct value.
    pub fn is_constant(&self) -> bool {
        self.distinct_count() <= 1
    }

    /// Present numeric values of the column, in row order.
    pub fn numbers(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_f64).collect()
    }
}

/// Error returned when the columns of a table have different lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaggedColumnsError {
    /// Name of the first column whose length differs.
    pub column: String,
    /// Row count of the first column.
    pub expected: usize,
    /// Row count of the offending column.
    pub found: usize,
}

impl fmt::Display for RaggedColumnsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column '{}' has {} rows, expected {}",
            self.column, self.found, self.expected
        )
    }
}

impl std::error::Error for RaggedColumnsError {}

/// An ordered collection of equally long columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Creates a table from columns, checking that all columns have the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self, RaggedColumnsError> {
        if let Some(first) = columns.first() {
            let expected = first.values.len();
            if let Some(column) = columns.iter().find(|c| c.values.len() != expected) {
                return Err(RaggedColumnsError {
                    column: column.name.clone(),
                    expected,
                    found: column.values.len(),
                });
            }
        }
        Ok(Self { columns })
    }

    /// Returns the columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |column| column.values.len())
    }

    /// Column names in order, duplicates included.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Returns the first column with the given name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Names of numeric columns in order.
    pub fn numeric_column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }

    /// Missing-value count for every column, in column order.
    pub fn missing_counts(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.missing_count()))
            .collect()
    }

    /// Drops every column whose name already appeared earlier in the table.
    ///
    /// Returns the number of dropped columns.
    pub fn drop_duplicate_columns(&mut self) -> usize {
        let before = self.columns.len();
        let mut seen = HashSet::new();
        self.columns.retain(|c| seen.insert(c.name.clone()));
        before - self.columns.len()
    }

    /// Drops every column with at most one distinct value.
    ///
    /// Returns the names of the dropped columns.
    pub fn drop_constant_columns(&mut self) -> Vec<String> {
        let mut dropped = Vec::new();
        self.columns.retain(|c| {
            if c.is_constant() {
                dropped.push(c.name.clone());
                false
            } else {
                true
            }
        });
        dropped
    }
}
