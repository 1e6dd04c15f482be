use crate::error::{ChartError, Result};
use log::debug;
use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// In-memory table of parsed input data: ordered rows, named columns.
/// Immutable for the duration of a run; filtering produces a new `Dataset`.
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Load a delimited text file with a header row.
    pub fn from_csv_path(path: &Path, delimiter: u8) -> Result<Self> {
        let file = File::open(path).map_err(|e| ChartError::file_read(path, e))?;
        let dataset = Self::from_csv_reader(file, delimiter)?;
        debug!(
            "loaded {} rows x {} columns from {}",
            dataset.row_count(),
            dataset.headers.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Parse delimited text from any reader. Requires a header row and at
    /// least one data row; ragged rows are a parse error.
    pub fn from_csv_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| ChartError::Parse(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| ChartError::Parse(e.to_string()))?;
            rows.push(record.iter().map(|f| f.trim().to_string()).collect());
        }

        if rows.is_empty() {
            return Err(ChartError::Parse(
                "input must contain at least one data row".to_string(),
            ));
        }

        Ok(Self { headers, rows })
    }

    /// Load a JSON array of objects. Column names come from the first object.
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ChartError::file_read(path, e))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| ChartError::Parse(e.to_string()))?;

        let array = value
            .as_array()
            .ok_or_else(|| ChartError::Parse("input must be a JSON array of objects".to_string()))?;

        if array.is_empty() {
            return Err(ChartError::Parse("input data array is empty".to_string()));
        }

        let first_obj = array[0]
            .as_object()
            .ok_or_else(|| ChartError::Parse("items in array must be objects".to_string()))?;

        let headers: Vec<String> = first_obj.keys().cloned().collect();

        let mut rows = Vec::new();
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| ChartError::Parse("items in array must be objects".to_string()))?;

            let mut row = Vec::new();
            for header in &headers {
                let cell = match obj.get(header) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    Some(Value::Null) | None => String::new(),
                    Some(other) => {
                        return Err(ChartError::Parse(format!(
                            "unsupported value type for field '{}': {}",
                            header, other
                        )))
                    }
                };
                row.push(cell);
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Case-insensitive header lookup, matching how column names arrive from
    /// the command line.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| ChartError::ColumnNotFound(name.to_string()))
    }

    pub fn string_column(&self, name: &str) -> Result<Vec<String>> {
        let index = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[index].clone()).collect())
    }

    /// Extract a column with every cell parsed as f64. A non-numeric cell is
    /// a parse error naming the value, column and row.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let index = self.column_index(name)?;
        let mut values = Vec::with_capacity(self.rows.len());
        for (row_idx, row) in self.rows.iter().enumerate() {
            let cell = &row[index];
            let value = cell.parse::<f64>().map_err(|_| {
                ChartError::Parse(format!(
                    "failed to parse '{}' as number in column '{}' at row {}",
                    cell,
                    name,
                    row_idx + 1
                ))
            })?;
            values.push(value);
        }
        Ok(values)
    }

    /// Names of columns whose every cell parses as f64.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| self.rows.iter().all(|row| row[*idx].parse::<f64>().is_ok()))
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// New dataset keeping only rows matching the filter.
    pub fn filtered(&self, filter: &Filter) -> Result<Self> {
        let index = self.column_index(&filter.column)?;
        let rows = self
            .rows
            .iter()
            .filter(|row| match filter.op {
                FilterOp::Eq => row[index] == filter.value,
                FilterOp::Ne => row[index] != filter.value,
            })
            .cloned()
            .collect();
        Ok(Self {
            headers: self.headers.clone(),
            rows,
        })
    }

    /// New dataset with rows containing any empty cell removed.
    pub fn without_missing_rows(&self) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|row| row.iter().all(|cell| !cell.is_empty()))
            .cloned()
            .collect();
        Self {
            headers: self.headers.clone(),
            rows,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
}

/// Row filter parsed from `column=value` or `column!=value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

impl FromStr for Filter {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        if let Some((column, value)) = s.split_once("!=") {
            return Ok(Filter {
                column: column.trim().to_string(),
                op: FilterOp::Ne,
                value: value.trim().to_string(),
            });
        }
        if let Some((column, value)) = s.split_once('=') {
            return Ok(Filter {
                column: column.trim().to_string(),
                op: FilterOp::Eq,
                value: value.trim().to_string(),
            });
        }
        Err(ChartError::Parse(format!(
            "invalid filter '{}' (expected column=value or column!=value)",
            s
        )))
    }
}

/// Turn a delimiter argument into the single byte the CSV reader wants.
/// Accepts any one-character separator, plus "\t" and "tab" for tabs.
pub fn parse_delimiter(s: &str) -> Result<u8> {
    match s {
        "\\t" | "tab" => Ok(b'\t'),
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => Ok(c as u8),
                _ => Err(ChartError::Parse(format!(
                    "invalid delimiter '{}' (expected a single character, '\\t' or 'tab')",
                    s
                ))),
            }
        }
    }
}
