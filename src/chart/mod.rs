/*
 * Chart rendering: report tables in, SVG out
 *
 * Reports assemble plain data (tick labels, named series, axis metadata);
 * everything pixel-shaped happens here, behind plotters.
 */

use crate::models::{Result, SwaplensError};
use plotters::prelude::*;
use std::path::Path;

const CHART_SIZE: (u32, u32) = (1000, 620);

/// How an axis renders its numeric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisFormat {
    /// 0.42 -> "42%"
    Percent,
    /// 0.013 -> "1.3%"
    PercentTenths,
    /// 21000 -> "21K"
    Thousands,
    /// 137.2 -> "137"
    Integer,
    /// 0.987 -> "0.99"
    Decimal,
    /// 1500 -> "$1K", 250 -> "$250"
    Dollars,
}

impl AxisFormat {
    #[must_use]
    pub fn label(&self, value: f64) -> String {
        match self {
            AxisFormat::Percent => format!("{}%", (value * 100.0).round() as i64),
            AxisFormat::PercentTenths => format!("{:.1}%", value * 100.0),
            AxisFormat::Thousands => format!("{}K", (value / 1e3) as i64),
            AxisFormat::Integer => format!("{}", value.round() as i64),
            AxisFormat::Decimal => format!("{value:.2}"),
            AxisFormat::Dollars => {
                if value >= 1_000.0 {
                    format!("${}K", (value / 1e3) as i64)
                } else {
                    format!("${}", value as i64)
                }
            }
        }
    }
}

/// One named series, one value per x tick.
#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

/// Bar chart over categorical x ticks: side-by-side groups, or stacked
/// (used for share-of-total charts, where each column's values sum to 1).
#[derive(Debug, Clone)]
pub struct BarChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub x_ticks: Vec<String>,
    pub series: Vec<Series>,
    pub stacked: bool,
    pub y_format: AxisFormat,
}

/// Scatter of per-trade points, grouped into colored series.
#[derive(Debug, Clone)]
pub struct ScatterChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub groups: Vec<(String, Vec<(f64, f64)>)>,
    pub x_format: AxisFormat,
    pub y_format: AxisFormat,
    pub log_y: bool,
}

fn chart_err<E: std::fmt::Display>(e: E) -> SwaplensError {
    SwaplensError::ChartError(e.to_string())
}

/// Renders a bar chart to `out` as SVG.
pub fn render_bar(chart: &BarChart, out: &Path) -> Result<()> {
    if chart.x_ticks.is_empty() || chart.series.is_empty() {
        return Err(SwaplensError::ChartError("nothing to chart".to_string()));
    }
    for series in &chart.series {
        if series.values.len() != chart.x_ticks.len() {
            return Err(SwaplensError::ChartError(format!(
                "series {:?} has {} values for {} ticks",
                series.name,
                series.values.len(),
                chart.x_ticks.len()
            )));
        }
    }

    let ticks = chart.x_ticks.len();
    let y_max = bar_y_max(chart);

    let root = SVGBackend::new(out, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;
    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(46)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..ticks as f64, 0f64..y_max)
        .map_err(chart_err)?;

    let tick_labels = chart.x_ticks.clone();
    let y_format = chart.y_format;
    ctx.configure_mesh()
        .disable_x_mesh()
        .x_desc(chart.x_desc.as_str())
        .y_desc(chart.y_desc.as_str())
        .x_labels(ticks)
        .x_label_formatter(&move |x: &f64| {
            tick_labels
                .get(x.floor() as usize)
                .cloned()
                .unwrap_or_default()
        })
        .y_label_formatter(&move |y: &f64| y_format.label(*y))
        .draw()
        .map_err(chart_err)?;

    let mut bottoms = vec![0f64; ticks];
    let per_series = 0.8 / chart.series.len() as f64;
    for (index, series) in chart.series.iter().enumerate() {
        let color = Palette99::pick(index).mix(0.9);
        let bars: Vec<Rectangle<(f64, f64)>> = series
            .values
            .iter()
            .enumerate()
            .map(|(tick, &value)| {
                if chart.stacked {
                    let bottom = bottoms[tick];
                    bottoms[tick] += value;
                    Rectangle::new(
                        [
                            (tick as f64 + 0.1, bottom),
                            (tick as f64 + 0.9, bottom + value),
                        ],
                        color.filled(),
                    )
                } else {
                    let x0 = tick as f64 + 0.1 + index as f64 * per_series;
                    Rectangle::new([(x0, 0.0), (x0 + per_series, value)], color.filled())
                }
            })
            .collect();
        ctx.draw_series(bars)
            .map_err(chart_err)?
            .label(series.name.as_str())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
            });
    }

    ctx.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(chart_err)?;
    root.present().map_err(chart_err)?;
    Ok(())
}

/// Renders a scatter chart to `out` as SVG.
pub fn render_scatter(chart: &ScatterChart, out: &Path) -> Result<()> {
    let points: Vec<(f64, f64)> = chart
        .groups
        .iter()
        .flat_map(|(_, points)| points.iter().copied())
        .collect();
    if points.is_empty() {
        return Err(SwaplensError::ChartError("nothing to chart".to_string()));
    }
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for (x, y) in &points {
        x_min = x_min.min(*x);
        x_max = x_max.max(*x);
        y_min = y_min.min(*y);
        y_max = y_max.max(*y);
    }
    let x_pad = ((x_max - x_min) * 0.05).max(1.0);
    let x_range = (x_min - x_pad).max(0.0)..x_max + x_pad;
    // Log axes need a strictly positive floor.
    let y_range = if chart.log_y {
        y_min.max(1e-6)..(y_max * 1.1).max(1e-6)
    } else {
        y_min.min(0.0)..y_max * 1.1
    };

    let root = SVGBackend::new(out, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let x_format = chart.x_format;
    let y_format = chart.y_format;
    if chart.log_y {
        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(46)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range.log_scale())
            .map_err(chart_err)?;
        ctx.configure_mesh()
            .x_desc(chart.x_desc.as_str())
            .y_desc(chart.y_desc.as_str())
            .x_label_formatter(&move |x: &f64| x_format.label(*x))
            .y_label_formatter(&move |y: &f64| y_format.label(*y))
            .draw()
            .map_err(chart_err)?;
        for (index, (name, group)) in chart.groups.iter().enumerate() {
            let color = Palette99::pick(index).mix(0.9);
            ctx.draw_series(
                group
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
            )
            .map_err(chart_err)?
            .label(name.as_str())
            .legend(move |(x, y)| Circle::new((x + 5, y), 4, color.filled()));
        }
        ctx.configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(chart_err)?;
    } else {
        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(46)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)
            .map_err(chart_err)?;
        ctx.configure_mesh()
            .x_desc(chart.x_desc.as_str())
            .y_desc(chart.y_desc.as_str())
            .x_label_formatter(&move |x: &f64| x_format.label(*x))
            .y_label_formatter(&move |y: &f64| y_format.label(*y))
            .draw()
            .map_err(chart_err)?;
        for (index, (name, group)) in chart.groups.iter().enumerate() {
            let color = Palette99::pick(index).mix(0.9);
            ctx.draw_series(
                group
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
            )
            .map_err(chart_err)?
            .label(name.as_str())
            .legend(move |(x, y)| Circle::new((x + 5, y), 4, color.filled()));
        }
        ctx.configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(chart_err)?;
    }
    root.present().map_err(chart_err)?;
    Ok(())
}

fn bar_y_max(chart: &BarChart) -> f64 {
    let max = if chart.stacked {
        (0..chart.x_ticks.len())
            .map(|tick| chart.series.iter().map(|s| s.values[tick]).sum::<f64>())
            .fold(0f64, f64::max)
    } else {
        chart
            .series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0f64, f64::max)
    };
    if max <= 0.0 {
        1.0
    } else {
        max * 1.05
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_formats_match_report_labels() {
        assert_eq!(AxisFormat::Percent.label(0.42), "42%");
        assert_eq!(AxisFormat::PercentTenths.label(0.0132), "1.3%");
        assert_eq!(AxisFormat::Thousands.label(21_000.0), "21K");
        assert_eq!(AxisFormat::Integer.label(137.4), "137");
        assert_eq!(AxisFormat::Dollars.label(1_500.0), "$1K");
        assert_eq!(AxisFormat::Dollars.label(250.0), "$250");
    }

    #[test]
    fn stacked_height_uses_column_sums() {
        let chart = BarChart {
            title: String::new(),
            x_desc: String::new(),
            y_desc: String::new(),
            x_ticks: vec!["a".to_string(), "b".to_string()],
            series: vec![
                Series { name: "s1".to_string(), values: vec![0.25, 0.5] },
                Series { name: "s2".to_string(), values: vec![0.75, 0.5] },
            ],
            stacked: true,
            y_format: AxisFormat::Percent,
        };
        assert!((bar_y_max(&chart) - 1.05).abs() < 1e-9);
    }
}
