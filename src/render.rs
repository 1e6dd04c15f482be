use crate::chart::ChartKind;
use crate::dataset::Dataset;
use crate::error::{ChartError, Result};
use crate::figure::Figure;
use crate::summary::BoxStats;
use log::debug;
use std::collections::HashMap;

/// Everything the renderer needs besides the data itself.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub kind: ChartKind,
    pub columns: Vec<String>,
    pub title: Option<String>,
    pub width: u32,
    pub height: u32,
}

impl RenderRequest {
    pub fn new(kind: ChartKind, columns: Vec<String>) -> Self {
        RenderRequest {
            kind,
            columns,
            title: None,
            width: crate::figure::DEFAULT_WIDTH,
            height: crate::figure::DEFAULT_HEIGHT,
        }
    }
}

/// Produce an in-memory chart for the request. Column names are interpreted
/// positionally per chart kind; the column count is validated up front.
pub fn render(request: &RenderRequest, data: &Dataset) -> Result<Figure> {
    let expected = request.kind.required_columns();
    if !expected.contains(&request.columns.len()) {
        return Err(ChartError::InvalidArguments(format!(
            "{} takes {} column name(s), got {}",
            request.kind,
            if expected.start() == expected.end() {
                expected.start().to_string()
            } else {
                format!("{} to {}", expected.start(), expected.end())
            },
            request.columns.len()
        )));
    }

    debug!(
        "rendering {} over columns {:?} ({} rows)",
        request.kind,
        request.columns,
        data.row_count()
    );

    let mut figure = Figure::new(request.width, request.height, request.title.clone());
    let columns: Vec<&str> = request.columns.iter().map(|c| c.as_str()).collect();

    match request.kind {
        ChartKind::Line => {
            if let [x_col, y_col] = columns[..] {
                let x_values = data.numeric_column(x_col)?;
                let y_values = data.numeric_column(y_col)?;
                let points: Vec<(f64, f64)> = x_values.into_iter().zip(y_values).collect();
                figure.draw_lines(&[(y_col.to_string(), points)])?;
            } else {
                figure.draw_lines(&[index_series(data, columns[0])?])?;
            }
        }
        ChartKind::Bar => {
            let (categories, values) = categorical_totals(data, columns[0], columns[1])?;
            figure.draw_bars(&categories, &values)?;
        }
        ChartKind::Scatter => {
            let x_values = data.numeric_column(columns[0])?;
            let y_values = data.numeric_column(columns[1])?;
            let points: Vec<(f64, f64)> = x_values.into_iter().zip(y_values).collect();
            figure.draw_scatter(&points)?;
        }
        ChartKind::Pie => {
            let values = data.numeric_column(columns[0])?;
            let labels = match columns.get(1) {
                Some(label_col) => data.string_column(label_col)?,
                None => (1..=values.len()).map(|i| i.to_string()).collect(),
            };
            figure.draw_pie(&labels, &values)?;
        }
        ChartKind::Histogram => {
            let groups = grouped_values(data, columns[0], columns[1])?;
            let total: usize = groups.iter().map(|(_, v)| v.len()).sum();
            figure.draw_histogram(&groups, sturges_bins(total))?;
        }
        ChartKind::Box => {
            let groups = grouped_values(data, columns[0], columns[1])?;
            let boxes: Vec<(String, BoxStats)> = groups
                .into_iter()
                .filter_map(|(name, values)| BoxStats::from_values(&values).map(|s| (name, s)))
                .collect();
            figure.draw_box_plot(&boxes)?;
        }
    }

    Ok(figure)
}

/// Variant used by the `series` command: every named column becomes its own
/// line series plotted against the row index.
pub fn render_index_series(
    columns: &[String],
    data: &Dataset,
    title: Option<String>,
    width: u32,
    height: u32,
) -> Result<Figure> {
    if columns.is_empty() {
        return Err(ChartError::InvalidArguments(
            "at least one column name is required".to_string(),
        ));
    }

    let mut series = Vec::with_capacity(columns.len());
    for column in columns {
        series.push(index_series(data, column)?);
    }

    let mut figure = Figure::new(width, height, title);
    figure.draw_lines(&series)?;
    Ok(figure)
}

/// One named column as (row index, value) points.
fn index_series(data: &Dataset, column: &str) -> Result<(String, Vec<(f64, f64)>)> {
    let values = data.numeric_column(column)?;
    let points = values
        .into_iter()
        .enumerate()
        .map(|(idx, v)| (idx as f64, v))
        .collect();
    Ok((column.to_string(), points))
}

/// Distinct categories in first-appearance order with their summed values.
fn categorical_totals(
    data: &Dataset,
    category_col: &str,
    value_col: &str,
) -> Result<(Vec<String>, Vec<f64>)> {
    let categories = data.string_column(category_col)?;
    let values = data.numeric_column(value_col)?;

    let mut totals: HashMap<String, f64> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for (category, value) in categories.into_iter().zip(values) {
        if !totals.contains_key(&category) {
            order.push(category.clone());
        }
        *totals.entry(category).or_insert(0.0) += value;
    }

    let sums = order.iter().map(|c| totals[c]).collect();
    Ok((order, sums))
}

/// Numeric values split by a grouping column, groups in first-appearance order.
fn grouped_values(
    data: &Dataset,
    value_col: &str,
    group_col: &str,
) -> Result<Vec<(String, Vec<f64>)>> {
    let values = data.numeric_column(value_col)?;
    let groups = data.string_column(group_col)?;

    let mut by_group: HashMap<String, Vec<f64>> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for (group, value) in groups.into_iter().zip(values) {
        if !by_group.contains_key(&group) {
            order.push(group.clone());
        }
        by_group.entry(group).or_default().push(value);
    }

    Ok(order
        .into_iter()
        .map(|g| {
            let values = by_group.remove(&g).unwrap_or_default();
            (g, values)
        })
        .collect())
}

/// Sturges' rule, clamped to something sensible for tiny inputs.
fn sturges_bins(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    ((n as f64).log2().ceil() as usize + 1).max(1)
}
