use std::io;
use std::path::PathBuf;

/// Everything that can go wrong between loading a file and saving a chart.
///
/// No recovery is attempted anywhere: each variant propagates to `main`,
/// which prints the message and exits non-zero.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("failed to read '{}'", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("column '{0}' not found in input data")]
    ColumnNotFound(String),

    #[error("unknown chart type '{0}' (expected one of: line_plot, bar_plot, scatter_plot, pie_plot, histogram, box_plot)")]
    UnknownChartType(String),

    #[error("failed to write '{}'", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("render error: {0}")]
    Render(String),
}

pub type Result<T, E = ChartError> = std::result::Result<T, E>;

impl ChartError {
    pub(crate) fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ChartError::FileRead {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ChartError::Write {
            path: path.into(),
            source,
        }
    }
}
