use crate::value::Value;
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use indexmap::IndexMap;
use std::io;

#[derive(Debug, Clone)]
pub struct CsvData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn read_csv<R: io::Read>(input: R) -> Result<CsvData> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(input);

    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|s| s.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.context("Failed to read CSV record")?;
        let row: Vec<String> = record.iter().map(|s| s.trim().to_string()).collect();
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(anyhow!("CSV must contain at least one data row"));
    }

    Ok(CsvData { headers, rows })
}

/// Chart data from a table: the first column labels the rows, every other
/// column becomes one named series mapping row label to value.
///
/// Empty cells are left out of their column's mapping.
pub fn to_series_value(data: &CsvData) -> Result<Value> {
    if data.headers.len() < 2 {
        return Err(anyhow!(
            "CSV needs a label column and at least one value column (found {} columns)",
            data.headers.len()
        ));
    }

    let mut columns: IndexMap<String, Value> = IndexMap::new();
    for (column_index, column_name) in data.headers.iter().enumerate().skip(1) {
        let mut values = IndexMap::new();
        for (row_idx, row) in data.rows.iter().enumerate() {
            let value_str = row.get(column_index).map(String::as_str).unwrap_or("");
            if value_str.is_empty() {
                continue;
            }
            let value = value_str.parse::<f64>().with_context(|| {
                format!(
                    "Failed to parse value '{}' as number in column '{}' at row {}",
                    value_str,
                    column_name,
                    row_idx + 1
                )
            })?;
            values.insert(row[0].clone(), Value::Number(value));
        }
        columns.insert(column_name.clone(), Value::Map(values));
    }

    tracing::debug!(series = columns.len(), rows = data.rows.len(), "read CSV table");
    Ok(Value::Map(columns))
}
