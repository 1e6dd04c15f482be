// Library exports for csvchart

pub mod chart;
pub mod dataset;
pub mod error;
pub mod export;
pub mod figure;
pub mod render;
pub mod summary;

pub use chart::ChartKind;
pub use dataset::{Dataset, Filter, FilterOp};
pub use error::ChartError;
pub use figure::Figure;
pub use render::{render, render_index_series, RenderRequest};
