use csvchart::chart::ChartKind;
use csvchart::dataset::Dataset;
use csvchart::error::ChartError;
use csvchart::render::{render, render_index_series, RenderRequest};
use std::fs;
use std::path::{Path, PathBuf};

const PNG_MAGIC: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

fn out_path(name: &str) -> PathBuf {
    let dir = Path::new("target/test_out");
    fs::create_dir_all(dir).expect("Failed to create output dir");
    dir.join(name)
}

fn write_fixture(name: &str, content: &str) -> PathBuf {
    let path = out_path(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

fn is_valid_png(path: &Path) -> bool {
    match fs::read(path) {
        Ok(bytes) => bytes.len() > 8 && bytes[0..8] == PNG_MAGIC,
        Err(_) => false,
    }
}

/// Full pipeline for one chart type: load, render, save.
fn run_plot(chart_type: &str, csv: &str, columns: &[&str], output: &str) -> Result<(), ChartError> {
    let input = write_fixture(&format!("{}_input.csv", output), csv);
    let data = Dataset::from_csv_path(&input, b',')?;
    let kind: ChartKind = chart_type.parse()?;
    let request = RenderRequest::new(kind, columns.iter().map(|c| c.to_string()).collect());
    let figure = render(&request, &data)?;
    figure.save(&out_path(&format!("{}.png", output)))
}

#[test]
fn test_end_to_end_line_plot() {
    let csv = "time,temp\n0,12.5\n1,13.0\n2,14.2\n3,13.8\n";
    run_plot("line_plot", csv, &["time", "temp"], "line").unwrap();
    assert!(is_valid_png(&out_path("line.png")));
}

#[test]
fn test_end_to_end_bar_plot() {
    let csv = "cat,val\nA,10\nB,20\nC,5\n";
    run_plot("bar_plot", csv, &["cat", "val"], "bar").unwrap();
    assert!(is_valid_png(&out_path("bar.png")));
}

#[test]
fn test_end_to_end_scatter_plot() {
    let csv = "a,b\n1,2\n3,4\n";
    run_plot("scatter_plot", csv, &["a", "b"], "scatter").unwrap();
    assert!(is_valid_png(&out_path("scatter.png")));
}

#[test]
fn test_end_to_end_pie_plot() {
    let csv = "share\n40\n35\n25\n";
    run_plot("pie_plot", csv, &["share"], "pie").unwrap();
    assert!(is_valid_png(&out_path("pie.png")));
}

#[test]
fn test_end_to_end_histogram() {
    let csv = "v,g\n1,a\n1.5,a\n2,a\n5,b\n5.5,b\n6,b\n2.5,a\n";
    run_plot("histogram", csv, &["v", "g"], "histogram").unwrap();
    assert!(is_valid_png(&out_path("histogram.png")));
}

#[test]
fn test_end_to_end_box_plot() {
    let csv = "v,g\n1,a\n2,a\n3,a\n4,a\n100,a\n4,b\n5,b\n6,b\n7,b\n";
    run_plot("box_plot", csv, &["v", "g"], "box").unwrap();
    assert!(is_valid_png(&out_path("box.png")));
}

#[test]
fn test_end_to_end_index_series() {
    let input = write_fixture("series_input.csv", "a,b\n1,10\n2,20\n3,15\n");
    let data = Dataset::from_csv_path(&input, b',').unwrap();
    let figure =
        render_index_series(&["a".to_string(), "b".to_string()], &data, None, 800, 600).unwrap();
    figure.save(&out_path("series.png")).unwrap();
    assert!(is_valid_png(&out_path("series.png")));
}

#[test]
fn test_end_to_end_semicolon_delimiter() {
    let input = write_fixture("semicolon_input.csv", "x;y\n1;10\n2;20\n");
    let data = Dataset::from_csv_path(&input, b';').unwrap();
    let request = RenderRequest::new(
        "line_plot".parse().unwrap(),
        vec!["x".to_string(), "y".to_string()],
    );
    let figure = render(&request, &data).unwrap();
    figure.save(&out_path("semicolon.png")).unwrap();
    assert!(is_valid_png(&out_path("semicolon.png")));
}

#[test]
fn test_unknown_chart_type_produces_no_file() {
    let result = run_plot("pei_plot", "v\n1\n", &["v"], "unknown_kind");
    assert!(matches!(result, Err(ChartError::UnknownChartType(ref t)) if t == "pei_plot"));
    assert!(!out_path("unknown_kind.png").exists());
}

#[test]
fn test_missing_column_produces_no_file() {
    let result = run_plot("scatter_plot", "a,b\n1,2\n", &["a", "zzz"], "missing_col");
    assert!(matches!(result, Err(ChartError::ColumnNotFound(_))));
    assert!(!out_path("missing_col.png").exists());
}

#[test]
fn test_missing_input_file() {
    let result = Dataset::from_csv_path(Path::new("target/test_out/no_such_input.csv"), b',');
    assert!(matches!(result, Err(ChartError::FileRead { .. })));
}

#[test]
fn test_save_into_missing_directory() {
    let data = Dataset::from_csv_reader("a,b\n1,2\n".as_bytes(), b',').unwrap();
    let request = RenderRequest::new(
        ChartKind::Scatter,
        vec!["a".to_string(), "b".to_string()],
    );
    let figure = render(&request, &data).unwrap();
    let path = Path::new("target/test_out/nope/deeper/out.png");
    let result = figure.save(path);
    assert!(matches!(result, Err(ChartError::Write { .. })));
    assert!(!path.exists());
}

#[test]
fn test_overwrites_existing_output() {
    let path = out_path("overwrite.png");
    fs::write(&path, b"not a png").unwrap();

    let data = Dataset::from_csv_reader("a,b\n1,2\n3,4\n".as_bytes(), b',').unwrap();
    let request = RenderRequest::new(
        ChartKind::Scatter,
        vec!["a".to_string(), "b".to_string()],
    );
    render(&request, &data).unwrap().save(&path).unwrap();
    assert!(is_valid_png(&path));
}

#[test]
fn test_rendering_twice_succeeds_deterministically() {
    let data = Dataset::from_csv_reader("a,b\n1,2\n3,4\n".as_bytes(), b',').unwrap();
    let request = RenderRequest::new(
        ChartKind::Scatter,
        vec!["a".to_string(), "b".to_string()],
    );
    let first = render(&request, &data).unwrap().into_png_bytes().unwrap();
    let second = render(&request, &data).unwrap().into_png_bytes().unwrap();
    assert_eq!(&first[0..8], &PNG_MAGIC);
    assert_eq!(&second[0..8], &PNG_MAGIC);
    // Same data through the same owned-figure pipeline gives identical bytes
    assert_eq!(first, second);
}
