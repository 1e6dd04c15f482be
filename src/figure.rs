use crate::error::{ChartError, Result};
use crate::summary::BoxStats;
use image::ImageEncoder;
use log::debug;
use plotters::element::Pie;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// Colors cycled across series, groups and slices.
const PALETTE: [RGBColor; 8] = [BLUE, RED, GREEN, MAGENTA, CYAN, YELLOW, BLACK, RGBColor(255, 140, 0)];

fn palette_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// An owned render target. Each invocation creates a fresh `Figure`, draws
/// exactly one chart into it, and passes it to `save`; there is no ambient
/// "current figure" state anywhere.
#[derive(Debug)]
pub struct Figure {
    buffer: Vec<u8>,
    width: u32,
    height: u32,
    title: Option<String>,
}

impl Figure {
    pub fn new(width: u32, height: u32, title: Option<String>) -> Self {
        let buffer = vec![0u8; (width * height * 3) as usize];
        Figure {
            buffer,
            width,
            height,
            title,
        }
    }

    /// One line per named series over a shared cartesian plane, with a
    /// legend when there is more than one series.
    pub fn draw_lines(&mut self, series: &[(String, Vec<(f64, f64)>)]) -> Result<()> {
        if series.iter().all(|(_, points)| points.is_empty()) {
            return Err(ChartError::Render(
                "cannot draw a chart with no data points".to_string(),
            ));
        }

        let x_range = padded_range(series.iter().flat_map(|(_, p)| p.iter().map(|(x, _)| *x)));
        let y_range = padded_range(series.iter().flat_map(|(_, p)| p.iter().map(|(_, y)| *y)));

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| ChartError::Render(e.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(self.title.as_deref().unwrap_or(""), ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| ChartError::Render(e.to_string()))?;

        chart
            .configure_mesh()
            .draw()
            .map_err(|e| ChartError::Render(e.to_string()))?;

        for (idx, (name, points)) in series.iter().enumerate() {
            let color = palette_color(idx);
            chart
                .draw_series(LineSeries::new(
                    points.iter().copied(),
                    color.stroke_width(2),
                ))
                .map_err(|e| ChartError::Render(e.to_string()))?
                .label(name.clone())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 16, y)], color.stroke_width(2))
                });
        }

        if series.len() > 1 {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(|e| ChartError::Render(e.to_string()))?;
        }

        root.present()
            .map_err(|e| ChartError::Render(e.to_string()))?;
        Ok(())
    }

    /// Independent points, one circle each.
    pub fn draw_scatter(&mut self, points: &[(f64, f64)]) -> Result<()> {
        if points.is_empty() {
            return Err(ChartError::Render(
                "cannot draw a chart with no data points".to_string(),
            ));
        }

        let x_range = padded_range(points.iter().map(|(x, _)| *x));
        let y_range = padded_range(points.iter().map(|(_, y)| *y));

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| ChartError::Render(e.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(self.title.as_deref().unwrap_or(""), ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| ChartError::Render(e.to_string()))?;

        chart
            .configure_mesh()
            .draw()
            .map_err(|e| ChartError::Render(e.to_string()))?;

        let color = palette_color(0);
        chart
            .draw_series(
                points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
            )
            .map_err(|e| ChartError::Render(e.to_string()))?;

        root.present()
            .map_err(|e| ChartError::Render(e.to_string()))?;
        Ok(())
    }

    /// One bar per category over a categorical x-axis; bars grow from zero.
    pub fn draw_bars(&mut self, categories: &[String], values: &[f64]) -> Result<()> {
        if categories.is_empty() {
            return Err(ChartError::Render(
                "cannot draw a bar chart with no categories".to_string(),
            ));
        }
        if categories.len() != values.len() {
            return Err(ChartError::Render(format!(
                "categories and values must have the same length ({} vs {})",
                categories.len(),
                values.len()
            )));
        }

        let x_range = 0.0..(categories.len() as f64);
        let y_range = padded_range(values.iter().copied().chain(std::iter::once(0.0)));

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| ChartError::Render(e.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(self.title.as_deref().unwrap_or(""), ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| ChartError::Render(e.to_string()))?;

        let labels = categories.to_vec();
        chart
            .configure_mesh()
            .x_labels(categories.len())
            .x_label_formatter(&|x| {
                let idx = *x as usize;
                if idx < labels.len() {
                    labels[idx].clone()
                } else {
                    String::new()
                }
            })
            .draw()
            .map_err(|e| ChartError::Render(e.to_string()))?;

        let color = palette_color(0);
        let bar_width = 0.8;
        for (idx, &value) in values.iter().enumerate() {
            let x_center = idx as f64 + 0.5;
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [
                        (x_center - bar_width / 2.0, 0.0),
                        (x_center + bar_width / 2.0, value),
                    ],
                    color.filled(),
                )))
                .map_err(|e| ChartError::Render(e.to_string()))?;
        }

        root.present()
            .map_err(|e| ChartError::Render(e.to_string()))?;
        Ok(())
    }

    /// Pie with slice sizes proportional to values. Negative values or an
    /// all-zero total cannot be drawn.
    pub fn draw_pie(&mut self, labels: &[String], values: &[f64]) -> Result<()> {
        if values.is_empty() {
            return Err(ChartError::Render(
                "cannot draw a pie chart with no values".to_string(),
            ));
        }
        if labels.len() != values.len() {
            return Err(ChartError::Render(format!(
                "labels and values must have the same length ({} vs {})",
                labels.len(),
                values.len()
            )));
        }
        if values.iter().any(|&v| v < 0.0) {
            return Err(ChartError::Render(
                "pie slice values must be non-negative".to_string(),
            ));
        }
        if values.iter().sum::<f64>() <= 0.0 {
            return Err(ChartError::Render(
                "pie slice values must sum to a positive number".to_string(),
            ));
        }

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| ChartError::Render(e.to_string()))?;

        let area = match self.title.as_deref() {
            Some(title) => root
                .titled(title, ("sans-serif", 20))
                .map_err(|e| ChartError::Render(e.to_string()))?,
            None => root,
        };

        let (w, h) = area.dim_in_pixel();
        let center = ((w / 2) as i32, (h / 2) as i32);
        let radius = f64::from(w.min(h)) * 0.35;
        let sizes = values.to_vec();
        let colors: Vec<RGBColor> = (0..values.len()).map(palette_color).collect();

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, labels);
        pie.label_style(("sans-serif", 16).into_font().color(&BLACK));
        area.draw(&pie)
            .map_err(|e| ChartError::Render(e.to_string()))?;

        area.present()
            .map_err(|e| ChartError::Render(e.to_string()))?;
        Ok(())
    }

    /// Frequency buckets over shared bin edges, one translucent series per
    /// group so overlapping distributions stay readable.
    pub fn draw_histogram(&mut self, groups: &[(String, Vec<f64>)], bins: usize) -> Result<()> {
        let all_values: Vec<f64> = groups.iter().flat_map(|(_, v)| v.iter().copied()).collect();
        if all_values.is_empty() {
            return Err(ChartError::Render(
                "cannot draw a histogram with no values".to_string(),
            ));
        }
        let bins = bins.max(1);

        let min = all_values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = all_values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        let bin_width = if range == 0.0 { 1.0 } else { range / bins as f64 };

        // Count per group over the shared bins
        let mut counts: Vec<(usize, Vec<usize>)> = Vec::new();
        let mut max_count = 0usize;
        for (group_idx, (_, values)) in groups.iter().enumerate() {
            let mut group_counts = vec![0usize; bins];
            for &v in values {
                let idx = (((v - min) / bin_width).floor() as usize).min(bins - 1);
                group_counts[idx] += 1;
            }
            max_count = max_count.max(group_counts.iter().copied().max().unwrap_or(0));
            counts.push((group_idx, group_counts));
        }

        let x_range = padded_range([min, min + bin_width * bins as f64].into_iter());
        let y_range = padded_range([0.0, max_count as f64].into_iter());

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| ChartError::Render(e.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(self.title.as_deref().unwrap_or(""), ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| ChartError::Render(e.to_string()))?;

        chart
            .configure_mesh()
            .draw()
            .map_err(|e| ChartError::Render(e.to_string()))?;

        for (group_idx, group_counts) in &counts {
            let color = palette_color(*group_idx);
            let fill = color.mix(0.5);
            chart
                .draw_series(group_counts.iter().enumerate().filter(|(_, &c)| c > 0).map(
                    |(bin_idx, &count)| {
                        let left = min + bin_idx as f64 * bin_width;
                        Rectangle::new(
                            [(left, 0.0), (left + bin_width, count as f64)],
                            fill.filled(),
                        )
                    },
                ))
                .map_err(|e| ChartError::Render(e.to_string()))?
                .label(groups[*group_idx].0.clone())
                .legend(move |(x, y)| Rectangle::new([(x, y - 4), (x + 12, y + 4)], color.filled()));
        }

        if groups.len() > 1 {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(|e| ChartError::Render(e.to_string()))?;
        }

        root.present()
            .map_err(|e| ChartError::Render(e.to_string()))?;
        Ok(())
    }

    /// One box per group over a categorical x-axis: filled quartile box,
    /// whiskers with caps, median line and outlier points.
    pub fn draw_box_plot(&mut self, groups: &[(String, BoxStats)]) -> Result<()> {
        if groups.is_empty() {
            return Err(ChartError::Render(
                "cannot draw a box plot with no groups".to_string(),
            ));
        }

        let x_range = 0.0..(groups.len() as f64);
        let y_range = padded_range(groups.iter().flat_map(|(_, stats)| {
            [stats.lower_whisker, stats.upper_whisker]
                .into_iter()
                .chain(stats.outliers.iter().copied())
        }));

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| ChartError::Render(e.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(self.title.as_deref().unwrap_or(""), ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| ChartError::Render(e.to_string()))?;

        let labels: Vec<String> = groups.iter().map(|(name, _)| name.clone()).collect();
        chart
            .configure_mesh()
            .x_labels(groups.len())
            .x_label_formatter(&|x| {
                let idx = *x as usize;
                if idx < labels.len() {
                    labels[idx].clone()
                } else {
                    String::new()
                }
            })
            .draw()
            .map_err(|e| ChartError::Render(e.to_string()))?;

        let half_width = 0.25;
        let cap_half = 0.1;

        for (idx, (_, stats)) in groups.iter().enumerate() {
            let color = palette_color(idx);
            let x = idx as f64 + 0.5;

            // Whiskers and caps
            let segments = [
                vec![(x, stats.lower_whisker), (x, stats.q1)],
                vec![(x, stats.q3), (x, stats.upper_whisker)],
                vec![
                    (x - cap_half, stats.lower_whisker),
                    (x + cap_half, stats.lower_whisker),
                ],
                vec![
                    (x - cap_half, stats.upper_whisker),
                    (x + cap_half, stats.upper_whisker),
                ],
            ];
            for segment in segments {
                chart
                    .draw_series(std::iter::once(PathElement::new(
                        segment,
                        color.stroke_width(2),
                    )))
                    .map_err(|e| ChartError::Render(e.to_string()))?;
            }

            // Quartile box with outline
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(x - half_width, stats.q1), (x + half_width, stats.q3)],
                    color.mix(0.35).filled(),
                )))
                .map_err(|e| ChartError::Render(e.to_string()))?;
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(x - half_width, stats.q1), (x + half_width, stats.q3)],
                    color.stroke_width(1),
                )))
                .map_err(|e| ChartError::Render(e.to_string()))?;

            // Median line
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(x - half_width, stats.median), (x + half_width, stats.median)],
                    color.stroke_width(2),
                )))
                .map_err(|e| ChartError::Render(e.to_string()))?;

            // Outliers
            chart
                .draw_series(
                    stats
                        .outliers
                        .iter()
                        .map(|&v| Circle::new((x, v), 3, color.filled())),
                )
                .map_err(|e| ChartError::Render(e.to_string()))?;
        }

        root.present()
            .map_err(|e| ChartError::Render(e.to_string()))?;
        Ok(())
    }

    /// Encode the figure as PNG bytes.
    pub fn into_png_bytes(self) -> Result<Vec<u8>> {
        let mut png_bytes = Vec::new();
        {
            let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
            encoder
                .write_image(
                    &self.buffer,
                    self.width,
                    self.height,
                    image::ColorType::Rgb8,
                )
                .map_err(|e| ChartError::Render(format!("failed to encode PNG: {}", e)))?;
        }
        Ok(png_bytes)
    }

    /// Serialize to the path. Only `.png` is supported; the file is written
    /// through a temporary sibling and renamed, so a failed write never
    /// leaves a partial output file behind.
    pub fn save(self, path: &Path) -> Result<()> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        if extension.as_deref() != Some("png") {
            return Err(ChartError::write(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "unsupported output format (only .png is supported)",
                ),
            ));
        }

        let png_bytes = self.into_png_bytes()?;

        let tmp_path = path.with_extension("png.tmp");
        if let Err(e) = std::fs::write(&tmp_path, &png_bytes) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(ChartError::write(path, e));
        }
        if let Err(e) = std::fs::rename(&tmp_path, path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(ChartError::write(path, e));
        }

        debug!("wrote {} bytes to {}", png_bytes.len(), path.display());
        Ok(())
    }
}

/// Data range with 5% padding; a degenerate range widens by one unit each
/// way so the axis is never empty.
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return -1.0..1.0;
    }
    if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}
