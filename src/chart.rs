use crate::error::ChartError;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Closed set of chart kinds. The type tag from the command line is parsed
/// into this enum up front, so an unrecognized tag is rejected before any
/// data is touched instead of silently matching nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
    Scatter,
    Pie,
    Histogram,
    Box,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Scatter,
        ChartKind::Pie,
        ChartKind::Histogram,
        ChartKind::Box,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            ChartKind::Line => "line_plot",
            ChartKind::Bar => "bar_plot",
            ChartKind::Scatter => "scatter_plot",
            ChartKind::Pie => "pie_plot",
            ChartKind::Histogram => "histogram",
            ChartKind::Box => "box_plot",
        }
    }

    /// How many column names each kind accepts from the command line.
    ///
    /// Line takes one column (plotted against the row index) or an x/y pair.
    /// Pie takes a value column with an optional label column. The rest are
    /// fixed two-column charts: x/y, or value/grouping.
    pub fn required_columns(&self) -> RangeInclusive<usize> {
        match self {
            ChartKind::Line => 1..=2,
            ChartKind::Pie => 1..=2,
            ChartKind::Bar | ChartKind::Scatter | ChartKind::Histogram | ChartKind::Box => 2..=2,
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ChartKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartKind::ALL
            .iter()
            .find(|kind| kind.tag() == s)
            .copied()
            .ok_or_else(|| ChartError::UnknownChartType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_all_tags() {
        for kind in ChartKind::ALL {
            assert_eq!(kind.tag().parse::<ChartKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_from_str_unknown_tag() {
        let err = "sactter_plot".parse::<ChartKind>().unwrap_err();
        assert!(matches!(err, ChartError::UnknownChartType(ref tag) if tag == "sactter_plot"));
        assert!(err.to_string().contains("sactter_plot"));
    }

    #[test]
    fn test_required_columns() {
        assert_eq!(ChartKind::Line.required_columns(), 1..=2);
        assert_eq!(ChartKind::Pie.required_columns(), 1..=2);
        assert_eq!(ChartKind::Bar.required_columns(), 2..=2);
        assert_eq!(ChartKind::Box.required_columns(), 2..=2);
    }
}
