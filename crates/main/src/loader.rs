//! CSV input for the command-line tool.

use std::error::Error;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use datareport::{Column, Table, Value};
use log::debug;

const MISSING_MARKERS: [&str; 5] = ["NA", "N/A", "NaN", "nan", "null"];

/// Loads a CSV file with a header row into a [`Table`].
pub fn load_table(path: &Path) -> Result<Table, Box<dyn Error>> {
    let file = File::open(path)
        .map_err(|err| format!("failed to open {}: {}", path.display(), err))?;
    let table = read_table(BufReader::new(file))?;
    debug!(
        "loaded {} column(s) x {} row(s) from {}",
        table.columns().len(),
        table.row_count(),
        path.display()
    );
    Ok(table)
}

/// Reads CSV data with a header row.  Repeated header names are kept as separate columns.
pub fn read_table<R: Read>(reader: R) -> Result<Table, Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut values: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for record in rdr.records() {
        let record = record?;
        for (column, field) in values.iter_mut().zip(record.iter()) {
            column.push(parse_field(field));
        }
    }

    let columns = headers
        .iter()
        .zip(values)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Ok(Table::new(columns)?)
}

/// Converts a raw CSV field into a cell value.
pub fn parse_field(field: &str) -> Value {
    let field = field.trim();
    if field.is_empty() || MISSING_MARKERS.contains(&field) {
        return Value::Null;
    }
    if let Ok(int) = field.parse::<i64>() {
        return Value::Int(int);
    }
    if let Ok(float) = field.parse::<f64>() {
        return Value::Float(float);
    }
    if field.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if field.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    Value::Text(field.to_owned())
}

#[cfg(test)]
mod tests {
    use super::{parse_field, read_table};
    use datareport::{DataType, Value};

    #[test]
    fn fields_parse_into_typed_values() {
        assert_eq!(parse_field(""), Value::Null);
        assert_eq!(parse_field("NA"), Value::Null);
        assert_eq!(parse_field(" 42 "), Value::Int(42));
        assert_eq!(parse_field("-1.5"), Value::Float(-1.5));
        assert_eq!(parse_field("True"), Value::Bool(true));
        assert_eq!(parse_field("false"), Value::Bool(false));
        assert_eq!(parse_field("Oslo"), Value::Text("Oslo".to_owned()));
    }

    #[test]
    fn repeated_headers_become_separate_columns() {
        let data = "A,A,B,C\nx,1,1,1.5\ny,2,1,\nz,3,1,3.0\n";
        let table = read_table(data.as_bytes()).unwrap();

        assert_eq!(table.column_names(), vec!["A", "A", "B", "C"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.columns()[0].data_type(), DataType::Other);
        assert_eq!(table.columns()[1].data_type(), DataType::Numeric);
        assert_eq!(table.columns()[3].missing_count(), 1);
    }

    #[test]
    fn header_only_input_gives_empty_columns() {
        let table = read_table("a,b\n".as_bytes()).unwrap();
        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        assert!(read_table("a,b\n1,2\n3\n".as_bytes()).is_err());
    }
}
