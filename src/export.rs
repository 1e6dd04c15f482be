use crate::dataset::Dataset;
use crate::error::{ChartError, Result};
use log::debug;
use serde_json::{Map, Value};
use std::fs::File;
use std::path::Path;

/// Write a dataset back out, format chosen by the output extension:
/// `.csv` for delimited text, `.json` for an array of objects.
pub fn export(data: &Dataset, path: &Path, delimiter: u8) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("csv") => export_csv(data, path, delimiter),
        Some("json") => export_json(data, path),
        _ => Err(ChartError::InvalidArguments(format!(
            "unsupported export format for '{}' (expected .csv or .json)",
            path.display()
        ))),
    }
}

fn export_csv(data: &Dataset, path: &Path, delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| {
            ChartError::write(path, std::io::Error::new(std::io::ErrorKind::Other, e))
        })?;

    writer
        .write_record(data.headers())
        .map_err(|e| ChartError::write(path, std::io::Error::new(std::io::ErrorKind::Other, e)))?;
    for row in data.rows() {
        writer.write_record(row).map_err(|e| {
            ChartError::write(path, std::io::Error::new(std::io::ErrorKind::Other, e))
        })?;
    }
    writer
        .flush()
        .map_err(|e| ChartError::write(path, e))?;

    debug!("exported {} rows to {}", data.row_count(), path.display());
    Ok(())
}

fn export_json(data: &Dataset, path: &Path) -> Result<()> {
    let objects: Vec<Value> = data
        .rows()
        .iter()
        .map(|row| {
            let mut object = Map::new();
            for (header, cell) in data.headers().iter().zip(row) {
                // Numeric cells round-trip as JSON numbers
                let value = match cell.parse::<f64>() {
                    Ok(n) if n.is_finite() => serde_json::Number::from_f64(n)
                        .map(Value::Number)
                        .unwrap_or_else(|| Value::String(cell.clone())),
                    _ => Value::String(cell.clone()),
                };
                object.insert(header.clone(), value);
            }
            Value::Object(object)
        })
        .collect();

    let file = File::create(path).map_err(|e| ChartError::write(path, e))?;
    serde_json::to_writer_pretty(file, &objects)
        .map_err(|e| ChartError::write(path, std::io::Error::new(std::io::ErrorKind::Other, e)))?;

    debug!("exported {} rows to {}", data.row_count(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample() -> Dataset {
        Dataset::from_csv_reader("a,b\n1,x\n2,y\n".as_bytes(), b',').unwrap()
    }

    fn out_path(name: &str) -> PathBuf {
        std::fs::create_dir_all("target/test_out").unwrap();
        PathBuf::from("target/test_out").join(name)
    }

    #[test]
    fn test_export_csv_round_trip() {
        let path = out_path("export_round_trip.csv");
        export(&sample(), &path, b';').unwrap();
        let reloaded = Dataset::from_csv_path(&path, b';').unwrap();
        assert_eq!(reloaded.headers(), sample().headers());
        assert_eq!(reloaded.rows(), sample().rows());
    }

    #[test]
    fn test_export_json_round_trip() {
        let path = out_path("export_round_trip.json");
        export(&sample(), &path, b',').unwrap();
        let reloaded = Dataset::from_json_path(&path).unwrap();
        assert_eq!(reloaded.row_count(), 2);
        assert_eq!(reloaded.numeric_column("a").unwrap(), vec![1.0, 2.0]);
        assert_eq!(reloaded.string_column("b").unwrap(), vec!["x", "y"]);
    }

    #[test]
    fn test_export_unsupported_extension() {
        let result = export(&sample(), Path::new("target/test_out/out.xml"), b',');
        assert!(matches!(result, Err(ChartError::InvalidArguments(_))));
    }
}
