use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use csvchart::chart::ChartKind;
use csvchart::dataset::{parse_delimiter, Dataset, Filter};
use csvchart::figure::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use csvchart::render::{render, render_index_series, RenderRequest};
use csvchart::summary::{value_counts, ColumnSummary};
use log::info;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "csvchart")]
#[command(about = "Render charts from CSV data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plot every named column as a line against the row index
    Series {
        /// Input file (comma-delimited CSV, or JSON array of objects)
        input: PathBuf,
        /// Columns to plot, one line series each
        #[arg(required = true, num_args = 1..)]
        columns: Vec<String>,
        /// Output PNG path
        output: PathBuf,
        /// Chart title
        #[arg(long)]
        title: Option<String>,
        /// Image width in pixels
        #[arg(long, default_value_t = DEFAULT_WIDTH)]
        width: u32,
        /// Image height in pixels
        #[arg(long, default_value_t = DEFAULT_HEIGHT)]
        height: u32,
    },
    /// Render one chart of the given type
    Plot {
        /// One of: line_plot, bar_plot, scatter_plot, pie_plot, histogram, box_plot
        chart_type: String,
        /// Input file (delimited text, or JSON array of objects)
        input: PathBuf,
        /// Field separator, e.g. ',' ';' or '\t'
        delimiter: String,
        /// One or two column names, interpreted per chart type
        #[arg(required = true, num_args = 1..=2)]
        columns: Vec<String>,
        /// Output PNG path
        output: PathBuf,
        /// Chart title
        #[arg(long)]
        title: Option<String>,
        /// Image width in pixels
        #[arg(long, default_value_t = DEFAULT_WIDTH)]
        width: u32,
        /// Image height in pixels
        #[arg(long, default_value_t = DEFAULT_HEIGHT)]
        height: u32,
    },
    /// Print an overview of the dataset, or analyze one column
    Inspect {
        /// Input file (delimited text, or JSON array of objects)
        input: PathBuf,
        /// Column to analyze; omit for a dataset overview
        column: Option<String>,
        /// Field separator
        #[arg(long, default_value = ",")]
        delimiter: String,
        /// Emit machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Convert a dataset to CSV or JSON, optionally filtering rows
    Export {
        /// Input file (delimited text, or JSON array of objects)
        input: PathBuf,
        /// Output path; .csv or .json decides the format
        output: PathBuf,
        /// Input field separator
        #[arg(long, default_value = ",")]
        delimiter: String,
        /// Output field separator (CSV only)
        #[arg(long, default_value = ",")]
        out_delimiter: String,
        /// Keep only matching rows, e.g. 'country=USA' or 'country!=USA'
        #[arg(long)]
        filter: Vec<String>,
        /// Drop rows containing empty cells
        #[arg(long)]
        drop_missing: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Series {
            input,
            columns,
            output,
            title,
            width,
            height,
        } => {
            let data = load_dataset(&input, b',')?;
            let figure = render_index_series(&columns, &data, title, width, height)
                .context("Failed to render chart")?;
            figure.save(&output).context("Failed to save chart")?;
            info!("wrote {}", output.display());
        }
        Command::Plot {
            chart_type,
            input,
            delimiter,
            columns,
            output,
            title,
            width,
            height,
        } => {
            let kind: ChartKind = chart_type.parse()?;
            let delimiter = parse_delimiter(&delimiter)?;
            let data = load_dataset(&input, delimiter)?;
            let request = RenderRequest {
                kind,
                columns,
                title,
                width,
                height,
            };
            let figure = render(&request, &data).context("Failed to render chart")?;
            figure.save(&output).context("Failed to save chart")?;
            info!("wrote {}", output.display());
        }
        Command::Inspect {
            input,
            column,
            delimiter,
            json,
        } => {
            let delimiter = parse_delimiter(&delimiter)?;
            let data = load_dataset(&input, delimiter)?;
            match column {
                Some(column) => inspect_column(&data, &column, json)?,
                None => inspect_overview(&data),
            }
        }
        Command::Export {
            input,
            output,
            delimiter,
            out_delimiter,
            filter,
            drop_missing,
        } => {
            let delimiter = parse_delimiter(&delimiter)?;
            let out_delimiter = parse_delimiter(&out_delimiter)?;
            let mut data = load_dataset(&input, delimiter)?;
            for expr in &filter {
                let filter: Filter = expr.parse()?;
                data = data.filtered(&filter)?;
            }
            if drop_missing {
                data = data.without_missing_rows();
            }
            csvchart::export::export(&data, &output, out_delimiter)
                .context("Failed to export dataset")?;
            info!("wrote {}", output.display());
        }
    }

    Ok(())
}

/// JSON inputs are recognized by extension; everything else goes through the
/// delimited-text reader.
fn load_dataset(path: &Path, delimiter: u8) -> Result<Dataset> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let data = if is_json {
        Dataset::from_json_path(path)
    } else {
        Dataset::from_csv_path(path, delimiter)
    }?;
    Ok(data)
}

fn inspect_overview(data: &Dataset) {
    println!("Rows: {}", data.row_count());
    println!("Columns: {}", data.headers().join(", "));
    let numeric = data.numeric_columns();
    if numeric.is_empty() {
        println!("Numeric columns: none");
    } else {
        println!("Numeric columns: {}", numeric.join(", "));
    }
}

fn inspect_column(data: &Dataset, column: &str, json: bool) -> Result<()> {
    if data.numeric_columns().iter().any(|c| c.eq_ignore_ascii_case(column)) {
        let summary = ColumnSummary::for_column(data, column)?
            .context("column has no values")?;
        if json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            println!("Column: {}", column);
            println!("  count:   {}", summary.count);
            println!("  mean:    {}", summary.mean);
            println!("  median:  {}", summary.median);
            println!("  min:     {}", summary.min);
            println!("  max:     {}", summary.max);
            println!("  std dev: {}", summary.std_dev);
        }
    } else {
        let counts = value_counts(data, column)?;
        if json {
            let object: serde_json::Map<String, serde_json::Value> = counts
                .into_iter()
                .map(|(value, count)| (value, serde_json::Value::from(count)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&object)?);
        } else {
            println!("Column: {} ({} unique values)", column, counts.len());
            for (value, count) in counts {
                println!("  {:<20} {}", value, count);
            }
        }
    }
    Ok(())
}
