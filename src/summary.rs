use crate::dataset::Dataset;
use crate::error::Result;
use serde::Serialize;
use std::collections::HashMap;

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
}

impl ColumnSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

        Some(ColumnSummary {
            count: values.len(),
            mean,
            median: percentile(&sorted, 0.50),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            std_dev: variance.sqrt(),
        })
    }

    pub fn for_column(dataset: &Dataset, column: &str) -> Result<Option<Self>> {
        let values = dataset.numeric_column(column)?;
        Ok(Self::from_values(&values))
    }
}

/// Linearly interpolated percentile over pre-sorted data.
pub fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    let n = sorted_data.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted_data[0];
    }

    let rank = p * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = rank.ceil() as usize;

    if lower_idx == upper_idx {
        sorted_data[lower_idx]
    } else {
        let weight = rank - lower_idx as f64;
        sorted_data[lower_idx] * (1.0 - weight) + sorted_data[upper_idx] * weight
    }
}

/// Five-number summary plus outliers for one box of a box plot.
#[derive(Debug, Clone)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Quartiles with 1.5*IQR fences; whiskers reach the extreme data points
    /// inside the fences, everything outside is an outlier.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let q1 = percentile(&sorted, 0.25);
        let median = percentile(&sorted, 0.50);
        let q3 = percentile(&sorted, 0.75);
        let iqr = q3 - q1;

        let lower_fence = q1 - 1.5 * iqr;
        let upper_fence = q3 + 1.5 * iqr;

        let lower_whisker = sorted
            .iter()
            .copied()
            .find(|&v| v >= lower_fence)
            .unwrap_or(q1);
        let upper_whisker = sorted
            .iter()
            .copied()
            .rev()
            .find(|&v| v <= upper_fence)
            .unwrap_or(q3);

        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < lower_fence || v > upper_fence)
            .collect();

        Some(BoxStats {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            outliers,
        })
    }
}

/// Occurrence count of each value in a column, in first-appearance order.
pub fn value_counts(dataset: &Dataset, column: &str) -> Result<Vec<(String, usize)>> {
    let values = dataset.string_column(column)?;

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for value in values {
        if !counts.contains_key(&value) {
            order.push(value.clone());
        }
        *counts.entry(value).or_insert(0) += 1;
    }

    Ok(order.into_iter().map(|v| (v.clone(), counts[&v])).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_csv_reader(
            "v,cat\n1,a\n2,b\n3,a\n4,a\n".as_bytes(),
            b',',
        )
        .unwrap()
    }

    #[test]
    fn test_percentile_interpolation() {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&data, 0.0), 1.0);
        assert_eq!(percentile(&data, 1.0), 4.0);
        assert_eq!(percentile(&data, 0.5), 2.5);
        assert_eq!(percentile(&data, 0.25), 1.75);
    }

    #[test]
    fn test_percentile_degenerate() {
        assert_eq!(percentile(&[], 0.5), 0.0);
        assert_eq!(percentile(&[7.0], 0.5), 7.0);
    }

    #[test]
    fn test_column_summary() {
        let summary = ColumnSummary::from_values(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, 2.5);
        assert_eq!(summary.median, 2.5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
        assert!((summary.std_dev - 1.118033988749895).abs() < 1e-12);
    }

    #[test]
    fn test_column_summary_empty() {
        assert!(ColumnSummary::from_values(&[]).is_none());
    }

    #[test]
    fn test_for_column() {
        let summary = ColumnSummary::for_column(&sample(), "v").unwrap().unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, 2.5);
    }

    #[test]
    fn test_box_stats_no_outliers() {
        let stats = BoxStats::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.upper_whisker, 5.0);
        assert!(stats.outliers.is_empty());
    }

    #[test]
    fn test_box_stats_with_outlier() {
        let stats = BoxStats::from_values(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        // Fence sits at q3 + 1.5*iqr, so 100 falls outside it
        assert_eq!(stats.outliers, vec![100.0]);
        assert_eq!(stats.upper_whisker, 4.0);
    }

    #[test]
    fn test_box_stats_empty() {
        assert!(BoxStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_value_counts_first_appearance_order() {
        let counts = value_counts(&sample(), "cat").unwrap();
        assert_eq!(counts, vec![("a".to_string(), 3), ("b".to_string(), 1)]);
    }
}
