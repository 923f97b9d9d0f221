use plotters::prelude::*;

use crate::models::{ChartHandle, SeriesColor};
use crate::utils::RefreshError;

fn rgb(color: SeriesColor) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

/// Fail early when the chart's output directory has gone away
fn ensure_target(handle: &ChartHandle) -> Result<(), RefreshError> {
    match handle.target().parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => Err(
            RefreshError::MissingTarget(handle.target().display().to_string()),
        ),
        _ => Ok(()),
    }
}

/// Replace the handle's single bound series and redraw its image
pub fn update_series(
    handle: &mut ChartHandle,
    labels: Vec<String>,
    values: Vec<f64>,
    series_label: &str,
) -> Result<(), RefreshError> {
    handle.set_series(labels, values, series_label);
    redraw(handle)
}

/// Replace the handle's full dataset list and redraw its image
pub fn update_datasets(
    handle: &mut ChartHandle,
    labels: Vec<String>,
    datasets: Vec<(String, Vec<f64>)>,
) -> Result<(), RefreshError> {
    handle.replace_datasets(labels, datasets);
    redraw(handle)
}

/// Render the handle's current state into its target PNG.
///
/// Datasets are drawn as circles connected by lines over an index axis
/// whose ticks show the stored labels. Multi-dataset charts get a legend.
pub fn redraw(handle: &ChartHandle) -> Result<(), RefreshError> {
    ensure_target(handle)?;

    let root = BitMapBackend::new(handle.target(), handle.dimensions()).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| RefreshError::Render(format!("Failed to fill canvas: {}", e)))?;

    // Find value range across every dataset
    let values: Vec<f64> = handle
        .datasets()
        .iter()
        .flat_map(|d| d.points.iter().copied())
        .collect();
    let (y_min, y_max) = if values.is_empty() {
        (0.0, 1.0)
    } else {
        let min_value = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max_value = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // Add some padding to the value range
        let value_range = (max_value - min_value).max(1e-8); // Avoid division by zero
        let padding = value_range * 0.1;
        ((min_value - padding).max(0.0), max_value + padding)
    };

    let labels = handle.labels();
    let x_max = (labels.len().saturating_sub(1) as f64).max(1.0);

    // Build chart with f64 axes; x is the sample index
    let mut chart = ChartBuilder::on(&root)
        .caption(handle.title(), ("sans-serif", 40.0).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, y_min..y_max)
        .map_err(|e| RefreshError::Render(format!("Failed to build chart: {}", e)))?;

    // Configure mesh; x ticks print the stored time labels
    let label_fmt = |x: &f64| {
        let idx = x.round();
        if idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    };
    chart
        .configure_mesh()
        .y_desc(handle.y_desc())
        .x_desc("Time")
        .x_labels(labels.len().clamp(2, 10))
        .x_label_formatter(&label_fmt)
        .draw()
        .map_err(|e| RefreshError::Render(format!("Failed to draw mesh: {}", e)))?;

    // Draw each dataset as circles connected by lines
    let with_legend = handle.datasets().len() > 1;
    for dataset in handle.datasets() {
        let color = rgb(dataset.color);
        let points: Vec<(f64, f64)> = dataset
            .points
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, *v))
            .collect();

        if points.len() > 1 {
            chart
                .draw_series(LineSeries::new(points.clone(), &color))
                .map_err(|e| RefreshError::Render(format!("Failed to draw line: {}", e)))?;
        }

        let drawn = chart
            .draw_series(
                points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
            )
            .map_err(|e| RefreshError::Render(format!("Failed to draw point: {}", e)))?;
        if with_legend {
            drawn
                .label(&dataset.label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
    }

    if with_legend {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(|e| RefreshError::Render(format!("Failed to draw legend: {}", e)))?;
    }

    root.present()
        .map_err(|e| RefreshError::Render(format!("Failed to render chart: {}", e)))?;

    Ok(())
}

/// Render a "no data" card in place of the chart
pub fn render_placeholder(handle: &ChartHandle, note: &str) -> Result<(), RefreshError> {
    ensure_target(handle)?;

    let (_, height) = handle.dimensions();
    let root = BitMapBackend::new(handle.target(), handle.dimensions()).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| RefreshError::Render(format!("Failed to fill canvas: {}", e)))?;

    root.draw(&Text::new(
        handle.title().to_string(),
        (40, 40),
        ("sans-serif", 32.0).into_font(),
    ))
    .map_err(|e| RefreshError::Render(format!("Failed to draw title: {}", e)))?;
    root.draw(&Text::new(
        note.to_string(),
        (40, height as i32 / 2),
        ("sans-serif", 24.0).into_font().color(&RGBColor(120, 120, 120)),
    ))
    .map_err(|e| RefreshError::Render(format!("Failed to draw note: {}", e)))?;

    root.present()
        .map_err(|e| RefreshError::Render(format!("Failed to render chart: {}", e)))?;

    Ok(())
}
